//! Search provider endpoint
//!
//! Pages are fetched one request at a time. Every item's raw JSON is cut out
//! of the response body that carried it, so callers never need a second
//! lookup to recover the provider's original representation.

use chrono::{DateTime, SubsecRound, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::value::RawValue;
use skimmer_core::domain::search::{SearchItem, SearchPage, SearchQuery};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Timestamp layout used by the provider for `created_at`
const PROVIDER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// HTTP client for the search provider
#[derive(Debug, Clone)]
pub struct SearchApiClient {
    /// Full search endpoint URL (continuation strings are appended to it)
    endpoint: String,
    /// Bearer token, if the provider requires one
    token: Option<String>,
    /// HTTP client instance
    client: Client,
}

impl SearchApiClient {
    /// Create a new search client for `endpoint`
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(endpoint, Client::new())
    }

    /// Create a new search client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    pub fn with_client(endpoint: impl Into<String>, client: Client) -> Self {
        Self {
            endpoint: crate::normalize_base_url(endpoint),
            token: None,
            client,
        }
    }

    /// Authenticate every request with `token`
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Get the search endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Run one search request and return the resulting page
    ///
    /// # Arguments
    /// * `query` - Initial query, or a continuation returned by a previous page
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        let request = match &query.continuation {
            Some(next) => self.client.get(format!("{}{}", self.endpoint, next)),
            None => self.client.get(&self.endpoint).query(&[
                ("q", query.text.clone()),
                ("count", query.count.to_string()),
            ]),
        };

        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let body: SearchResponse = crate::handle_response(response).await?;

        debug!(
            "Search response carried {} item(s), continuation: {}",
            body.statuses.len(),
            body.search_metadata.next_results.is_some()
        );

        body.into_page(query)
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    statuses: Vec<Box<RawValue>>,
    #[serde(default)]
    search_metadata: SearchMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct SearchMetadata {
    next_results: Option<String>,
}

/// The fields of an item the poller needs; everything else stays in `raw`
#[derive(Debug, Deserialize)]
struct ItemHeader {
    id_str: String,
    created_at: String,
}

impl SearchResponse {
    fn into_page(self, query: &SearchQuery) -> Result<SearchPage> {
        let items = self
            .statuses
            .iter()
            .map(|raw| parse_item(raw))
            .collect::<Result<Vec<_>>>()?;

        let next_query = self
            .search_metadata
            .next_results
            .filter(|next| !next.is_empty())
            .map(|next| query.next(next));

        Ok(SearchPage { items, next_query })
    }
}

fn parse_item(raw: &RawValue) -> Result<SearchItem> {
    let header: ItemHeader = serde_json::from_str(raw.get())
        .map_err(|e| ClientError::ParseError(format!("Invalid search item: {}", e)))?;

    Ok(SearchItem {
        created_at: parse_created_at(&header.created_at)?,
        id: header.id_str,
        raw: raw.get().to_string(),
    })
}

/// Parses a provider timestamp at microsecond precision
///
/// Checkpoints are stored as `TIMESTAMPTZ`, which keeps microseconds only.
fn parse_created_at(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_str(value, PROVIDER_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|ts| ts.with_timezone(&Utc).trunc_subsecs(6))
        .map_err(|e| ClientError::ParseError(format!("Invalid created_at '{}': {}", value, e)))
}
