//! Poll error taxonomy
//!
//! Nothing in the poll path retries. Every error ends the current invocation
//! and the next scheduled poll starts again from the stored checkpoint.

use skimmer_client::ClientError;
use thiserror::Error;

/// Errors raised by the checkpoint store
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// Another invocation wrote the record between our read and our write
    #[error("checkpoint was modified concurrently (expected version {expected_version})")]
    Conflict { expected_version: i64 },

    /// The storage layer failed
    #[error("checkpoint storage failed: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Errors that abort a poll invocation
#[derive(Debug, Error)]
pub enum PollError {
    /// The search provider rejected or failed a query
    #[error("search provider query failed: {0}")]
    ProviderQuery(#[source] ClientError),

    /// A batch could not be handed to the sink
    #[error("sink invocation failed: {0}")]
    Sink(#[source] ClientError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),
}

impl PollError {
    /// Whether the checkpoint lost a race with a concurrent invocation
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Checkpoint(CheckpointError::Conflict { .. }))
    }
}
