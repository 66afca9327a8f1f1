//! Repository layer
//!
//! Repositories abstract the poller's three collaborators: the search
//! provider, the downstream sink and the checkpoint store. They carry no
//! business logic.
//!
//! All repositories are trait-based to enable testing and mocking.

mod checkpoint;
mod search;
mod sink;

#[cfg(test)]
pub mod testing;

// Re-export traits
pub use checkpoint::{CheckpointRepository, WriteOutcome};
pub use search::SearchRepository;
pub use sink::SinkRepository;

// Re-export implementations
pub use checkpoint::PgCheckpointRepository;
