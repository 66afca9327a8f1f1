//! Search cursor walker
//!
//! Pages through provider results, newest first, until the cutoff boundary
//! shows up inside a page or the provider runs out of pages. Pages are
//! fetched strictly one after another since each continuation comes from the
//! previous response.

use chrono::{DateTime, Utc};
use skimmer_client::ClientError;
use skimmer_core::domain::checkpoint::is_after_cutoff;
use skimmer_core::domain::search::{SearchItem, SearchQuery};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::repository::SearchRepository;

pub struct CursorWalker {
    search: Arc<dyn SearchRepository>,
    query_text: String,
}

impl CursorWalker {
    pub fn new(search: Arc<dyn SearchRepository>, query_text: impl Into<String>) -> Self {
        Self {
            search,
            query_text: query_text.into(),
        }
    }

    /// Collects every item created strictly after `cutoff`
    ///
    /// Items keep provider order. An id seen on an earlier page keeps its
    /// first position and later copies are dropped. Any provider error aborts
    /// the walk.
    pub async fn find_since(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<SearchItem>, ClientError> {
        let mut query = Some(SearchQuery::new(self.query_text.as_str()));
        let mut seen = HashSet::new();
        let mut found = Vec::new();

        while let Some(current) = query.take() {
            info!("Calling search API with query: {:?}", current);
            let page = self.search.search(&current).await?;
            let total = page.len();
            info!("{} search results found.", total);

            let mut within_cutoff = 0;
            for item in page.items {
                if !is_after_cutoff(item.created_at, cutoff) {
                    continue;
                }
                within_cutoff += 1;
                if seen.insert(item.id.clone()) {
                    found.push(item);
                } else {
                    debug!("Skipping duplicate item {}", item.id);
                }
            }

            info!(
                "{}/{} search results found within cutoff of {}.",
                within_cutoff, total, cutoff
            );

            if within_cutoff < total {
                info!("Cutoff reached. Stopping pagination");
                break;
            }

            query = page.next_query;
        }

        Ok(found)
    }
}
