//! Adapters implementing the domain ports.

pub mod in_memory;
pub mod processor;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
#[cfg(feature = "processor-stripe")]
pub mod stripe;
