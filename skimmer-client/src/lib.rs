//! Skimmer HTTP Clients
//!
//! Typed HTTP clients for the remote services the poller talks to:
//! - `SearchApiClient`: the paged search provider
//! - `SinkClient`: the downstream batch sink, invoked fire-and-forget
//! - `SecretClient`: decrypts credential material once at startup
//!
//! # Example
//!
//! ```no_run
//! use skimmer_client::SearchApiClient;
//! use skimmer_core::domain::search::SearchQuery;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SearchApiClient::new("https://api.example.com/1.1/search/tweets.json")
//!         .with_token("secret");
//!
//!     let page = client.search(&SearchQuery::new("#rustlang")).await?;
//!     println!("Fetched {} items", page.len());
//!     Ok(())
//! }
//! ```

pub mod error;
mod search;
mod secrets;
mod sink;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use search::SearchApiClient;
pub use secrets::SecretClient;
pub use sink::{SinkClient, is_valid_target};

use serde::de::DeserializeOwned;

/// Strips trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an `ApiError` if the request failed,
/// or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}
