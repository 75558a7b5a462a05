//! Application layer orchestrating checkout and order management.
//!
//! `OrderEngine` combines the pricing rules with the storage and payment ports. It holds
//! no state of its own beyond the injected adapters, so one engine can be shared across
//! tasks behind an `Arc`.

pub mod engine;
pub mod requests;
