//! Core domain types
//!
//! These types are shared between the client crate (which builds search pages
//! from the provider's wire format) and the poller (which filters, batches and
//! checkpoints them).

pub mod checkpoint;
pub mod search;
