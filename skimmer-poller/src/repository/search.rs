//! Search repository

use async_trait::async_trait;
use skimmer_client::{Result, SearchApiClient};
use skimmer_core::domain::search::{SearchPage, SearchQuery};

/// Repository trait for the paged search provider
#[async_trait]
pub trait SearchRepository: Send + Sync {
    /// Runs one query and returns the page it produced
    ///
    /// Each item in the page already carries its raw payload.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage>;
}

#[async_trait]
impl SearchRepository for SearchApiClient {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        SearchApiClient::search(self, query).await
    }
}
