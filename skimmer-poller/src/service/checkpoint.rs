//! Search checkpoint service
//!
//! Maintains the timestamp of the newest item already handed to the sink.

use chrono::{DateTime, Utc};
use skimmer_core::domain::checkpoint::CheckpointRecord;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::CheckpointError;
use crate::repository::{CheckpointRepository, WriteOutcome};

pub struct SearchCheckpoint {
    repository: Arc<dyn CheckpointRepository>,
}

impl SearchCheckpoint {
    pub fn new(repository: Arc<dyn CheckpointRepository>) -> Self {
        Self { repository }
    }

    /// Returns the stored checkpoint, or the epoch if nothing was stored yet
    pub async fn get(&self) -> Result<DateTime<Utc>, CheckpointError> {
        Ok(self.load().await?.checkpoint)
    }

    /// Moves the checkpoint to `new_checkpoint`
    ///
    /// Compares against a fresh read, not a cached value. Equal values are a
    /// no-op. A write that loses a race with another invocation fails with
    /// `CheckpointError::Conflict` and is not retried.
    pub async fn update(&self, new_checkpoint: DateTime<Utc>) -> Result<(), CheckpointError> {
        let record = self.load().await?;

        if record.checkpoint == new_checkpoint {
            info!(
                "New checkpoint {} is the same as the current checkpoint. Not updating.",
                new_checkpoint
            );
            return Ok(());
        }

        info!(
            "Updating search checkpoint from {} to {}",
            record.checkpoint, new_checkpoint
        );

        match self
            .repository
            .write_if_match(new_checkpoint, record.version)
            .await?
        {
            WriteOutcome::Written => Ok(()),
            WriteOutcome::Conflict => {
                warn!(
                    "Checkpoint changed underneath us (read version {}); leaving it to the next poll",
                    record.version
                );
                Err(CheckpointError::Conflict {
                    expected_version: record.version,
                })
            }
        }
    }

    async fn load(&self) -> Result<CheckpointRecord, CheckpointError> {
        Ok(self
            .repository
            .read()
            .await?
            .unwrap_or_else(CheckpointRecord::initial))
    }
}
