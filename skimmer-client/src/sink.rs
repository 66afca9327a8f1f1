//! Downstream sink endpoint

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{ClientError, Result};

/// Header that asks the sink to queue the invocation instead of running it inline
pub const INVOCATION_TYPE_HEADER: &str = "X-Invocation-Type";

/// HTTP client for the batch sink
///
/// Invocations are asynchronous: the sink acknowledges receipt and processes
/// the batch on its own schedule.
#[derive(Debug, Clone)]
pub struct SinkClient {
    /// Base URL of the sink (e.g., "http://localhost:9001")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SinkClient {
    /// Create a new sink client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new sink client with a custom HTTP client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: crate::normalize_base_url(base_url),
            client,
        }
    }

    /// Get the base URL of the sink
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Hand a JSON payload to `target` without waiting for it to be processed
    ///
    /// The sink only acknowledges receipt. A non-2xx acknowledgement means
    /// the batch was not accepted and is returned as an `ApiError`.
    ///
    /// # Arguments
    /// * `target` - Name of the downstream function
    /// * `payload` - JSON body to deliver
    pub async fn invoke(&self, target: &str, payload: String) -> Result<()> {
        if !is_valid_target(target) {
            return Err(ClientError::InvalidRequest(format!(
                "invalid sink target '{}'",
                target
            )));
        }

        let url = format!("{}/functions/{}/invocations", self.base_url, target);

        let response = self
            .client
            .post(&url)
            .header(INVOCATION_TYPE_HEADER, "Event")
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Sink rejected invocation of {} with {}", target, status);
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        debug!("Sink accepted invocation of {} ({})", target, status);
        Ok(())
    }
}

/// Whether `target` can be placed in a URL path segment as-is
///
/// Allows letters, digits, `-`, `_`, `.` and `:` (qualified function names).
pub fn is_valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
}
