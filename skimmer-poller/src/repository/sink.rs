//! Sink repository

use async_trait::async_trait;
use skimmer_client::{Result, SinkClient};

/// Repository trait for the downstream batch sink
#[async_trait]
pub trait SinkRepository: Send + Sync {
    /// Hands `payload` to `target` without waiting for it to be processed
    ///
    /// # Arguments
    /// * `target` - Downstream function name
    /// * `payload` - JSON array of raw item payloads
    async fn invoke(&self, target: &str, payload: String) -> Result<()>;
}

#[async_trait]
impl SinkRepository for SinkClient {
    async fn invoke(&self, target: &str, payload: String) -> Result<()> {
        SinkClient::invoke(self, target, payload).await
    }
}
