//! Search domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of results requested per provider page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// A single search result
///
/// `raw` is the provider's JSON for this item, taken from the same response
/// that produced `id` and `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub raw: String,
}

/// A query against the search provider
///
/// The first query carries only the search text. Follow-up queries carry the
/// provider's opaque continuation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    pub count: u32,
    pub continuation: Option<String>,
}

impl SearchQuery {
    /// Creates the initial query for `text`
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            count: DEFAULT_PAGE_SIZE,
            continuation: None,
        }
    }

    /// Creates the query that fetches the page after this one
    pub fn next(&self, continuation: impl Into<String>) -> Self {
        Self {
            text: self.text.clone(),
            count: self.count,
            continuation: Some(continuation.into()),
        }
    }
}

/// One page of provider results, in provider order
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub items: Vec<SearchItem>,
    pub next_query: Option<SearchQuery>,
}

impl SearchPage {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
