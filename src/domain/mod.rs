//! Entities, value objects and the storage ports the engine depends on.
//!
//! Nothing in here performs I/O.

pub mod account;
pub mod identity;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod product;
pub mod transaction;
