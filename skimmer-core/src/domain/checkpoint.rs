//! Checkpoint domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key of the single checkpoint record
pub const CHECKPOINT_KEY: &str = "checkpoint";

/// Cutoff used when nothing has been checkpointed yet
pub const EPOCH: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;

/// Returns true when `created_at` lies strictly after `cutoff`
pub fn is_after_cutoff(created_at: DateTime<Utc>, cutoff: DateTime<Utc>) -> bool {
    created_at > cutoff
}

/// Persisted search checkpoint
///
/// `version` is 0 for a record that has never been written. The first
/// successful write stores version 1 and every later write increments it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointRecord {
    pub id: String,
    pub checkpoint: DateTime<Utc>,
    pub version: i64,
}

impl CheckpointRecord {
    /// The implicit record returned when the store holds nothing
    pub fn initial() -> Self {
        Self {
            id: CHECKPOINT_KEY.to_string(),
            checkpoint: EPOCH,
            version: 0,
        }
    }
}
