//! Scheduler layer for the poller
//!
//! Runs poll invocations: once per process for an external scheduler, or
//! sequentially on a fixed interval.

pub mod poller;

pub use poller::{PollOutcome, SearchPoller};
