//! Result batcher
//!
//! Splits found items into consecutive batches and hands each batch to the
//! sink as a JSON array of raw payloads.

use skimmer_client::ClientError;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tracing::info;

use crate::repository::SinkRepository;

pub struct ResultBatcher {
    sink: Arc<dyn SinkRepository>,
    target: String,
    batch_size: NonZeroUsize,
}

impl ResultBatcher {
    /// Creates a new batcher
    ///
    /// # Arguments
    /// * `sink` - Where batches are delivered
    /// * `target` - Downstream function name
    /// * `batch_size` - Maximum number of items per invocation
    pub fn new(
        sink: Arc<dyn SinkRepository>,
        target: impl Into<String>,
        batch_size: NonZeroUsize,
    ) -> Self {
        Self {
            sink,
            target: target.into(),
            batch_size,
        }
    }

    /// Dispatches `payloads` in order and returns the number of batches sent
    ///
    /// The sink only acknowledges receipt; processing is never awaited.
    pub async fn dispatch(&self, payloads: &[&str]) -> Result<usize, ClientError> {
        let mut batches = 0;

        for chunk in payloads.chunks(self.batch_size.get()) {
            let body = serde_json::to_string(chunk).map_err(|e| {
                ClientError::InvalidRequest(format!("Failed to encode batch: {}", e))
            })?;

            info!(
                "Invoking sink {} to process {} item(s)",
                self.target,
                chunk.len()
            );
            self.sink.invoke(&self.target, body).await?;
            batches += 1;
        }

        Ok(batches)
    }
}
