//! Search poller
//!
//! One invocation computes the cutoff, walks the search results past it,
//! dispatches what it found and, in stream mode, advances the checkpoint to
//! the newest dispatched item.

use chrono::{DateTime, Utc};
use skimmer_core::domain::checkpoint::EPOCH;
use tokio::time::{self, Duration};
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::error::PollError;
use crate::service::{CursorWalker, ResultBatcher, SearchCheckpoint};

/// What a single invocation did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing newer than the cutoff; sink and checkpoint were left alone
    NoResults,
    Dispatched {
        items: usize,
        batches: usize,
        /// The checkpoint written, when stream mode is enabled
        checkpoint: Option<DateTime<Utc>>,
    },
}

/// Poller that ties the walker, batcher and checkpoint together
///
/// Without a checkpoint the poller runs in "latest results" mode: every poll
/// scans from the epoch and nothing is persisted.
pub struct SearchPoller {
    walker: CursorWalker,
    batcher: ResultBatcher,
    checkpoint: Option<SearchCheckpoint>,
}

impl SearchPoller {
    /// Creates a new search poller
    ///
    /// # Arguments
    /// * `walker` - Finds items newer than the cutoff
    /// * `batcher` - Delivers found items to the sink
    /// * `checkpoint` - Checkpoint store, `Some` to enable stream mode
    pub fn new(
        walker: CursorWalker,
        batcher: ResultBatcher,
        checkpoint: Option<SearchCheckpoint>,
    ) -> Self {
        Self {
            walker,
            batcher,
            checkpoint,
        }
    }

    /// Runs one invocation inside its own tracing span
    pub async fn run_once(&self) -> Result<PollOutcome, PollError> {
        let span = info_span!("poll", poll_id = %Uuid::new_v4());
        self.poll().instrument(span).await
    }

    /// Runs invocations back to back on `interval`
    ///
    /// Failures are logged and the next tick starts a fresh invocation.
    pub async fn run(&self, interval: Duration) -> anyhow::Result<()> {
        info!("Starting search poller (interval: {:?})", interval);

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.run_once().await {
                Ok(outcome) => debug!("Poll finished: {:?}", outcome),
                Err(e) if e.is_conflict() => {
                    warn!("Poll finished without advancing the checkpoint: {:#}", e)
                }
                Err(e) => error!("Error during poll cycle: {:#}", e),
            }
        }
    }

    /// Performs a single poll
    pub async fn poll(&self) -> Result<PollOutcome, PollError> {
        let cutoff = match &self.checkpoint {
            Some(checkpoint) => checkpoint.get().await?,
            None => EPOCH,
        };
        debug!("Using cutoff {}", cutoff);

        let items = self
            .walker
            .find_since(cutoff)
            .await
            .map_err(PollError::ProviderQuery)?;

        if items.is_empty() {
            info!("No items found. Nothing to do.");
            return Ok(PollOutcome::NoResults);
        }

        let payloads: Vec<&str> = items.iter().map(|item| item.raw.as_str()).collect();
        let batches = self
            .batcher
            .dispatch(&payloads)
            .await
            .map_err(PollError::Sink)?;

        info!("Dispatched {} item(s) in {} batch(es)", items.len(), batches);

        let written = match &self.checkpoint {
            Some(checkpoint) => {
                let most_recent = items
                    .iter()
                    .map(|item| item.created_at)
                    .max()
                    .unwrap_or(cutoff);
                checkpoint.update(most_recent).await?;
                Some(most_recent)
            }
            None => None,
        };

        Ok(PollOutcome::Dispatched {
            items: items.len(),
            batches,
            checkpoint: written,
        })
    }
}
