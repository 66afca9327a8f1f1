//! In-memory repositories for tests

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skimmer_client::{ClientError, Result};
use skimmer_core::domain::checkpoint::{CHECKPOINT_KEY, CheckpointRecord};
use skimmer_core::domain::search::{SearchItem, SearchPage, SearchQuery};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{CheckpointRepository, SearchRepository, SinkRepository, WriteOutcome};

/// Builds an item whose raw payload is its id
pub fn item(id: &str, created_at: DateTime<Utc>) -> SearchItem {
    SearchItem {
        id: id.to_string(),
        created_at,
        raw: id.to_string(),
    }
}

/// Builds a page, optionally pointing at a following page
pub fn page(items: Vec<SearchItem>, has_next: bool) -> SearchPage {
    let next_query = has_next.then(|| SearchQuery::new("q").next("?max_id=next"));
    SearchPage { items, next_query }
}

/// Search provider that replays scripted pages in order
///
/// Asking for more pages than were scripted is a provider error.
pub struct ScriptedSearch {
    pages: Mutex<VecDeque<SearchPage>>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl ScriptedSearch {
    pub fn new(pages: Vec<SearchPage>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchRepository for ScriptedSearch {
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage> {
        self.queries.lock().unwrap().push(query.clone());
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ClientError::api_error(503, "no page scripted"))
    }
}

/// Search provider that always serves the same single page
pub struct StaticSearch {
    page: SearchPage,
}

impl StaticSearch {
    pub fn new(items: Vec<SearchItem>) -> Self {
        Self {
            page: page(items, false),
        }
    }
}

#[async_trait]
impl SearchRepository for StaticSearch {
    async fn search(&self, _query: &SearchQuery) -> Result<SearchPage> {
        Ok(self.page.clone())
    }
}

/// Sink that records every accepted invocation
#[derive(Default)]
pub struct RecordingSink {
    invocations: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    reject_call: Option<usize>,
}

impl RecordingSink {
    /// Rejects the `call`-th invocation (1-based) with a 503 and accepts the rest
    pub fn rejecting_call(call: usize) -> Self {
        Self {
            reject_call: Some(call),
            ..Self::default()
        }
    }

    /// Payloads in invocation order
    pub fn payloads(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|(_, payload)| payload.clone())
            .collect()
    }

    pub fn targets(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }
}

#[async_trait]
impl SinkRepository for RecordingSink {
    async fn invoke(&self, target: &str, payload: String) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.reject_call == Some(call) {
            return Err(ClientError::api_error(503, "sink unavailable"));
        }

        self.invocations
            .lock()
            .unwrap()
            .push((target.to_string(), payload));
        Ok(())
    }
}

/// Checkpoint store kept in memory, with the same version semantics as Postgres
#[derive(Default)]
pub struct InMemoryCheckpointRepository {
    record: Mutex<Option<CheckpointRecord>>,
    writes: AtomicUsize,
    concurrent_writer: AtomicBool,
}

impl InMemoryCheckpointRepository {
    /// Starts with a stored record at version 1
    pub fn with_checkpoint(checkpoint: DateTime<Utc>) -> Self {
        let repository = Self::default();
        *repository.record.lock().unwrap() = Some(CheckpointRecord {
            id: CHECKPOINT_KEY.to_string(),
            checkpoint,
            version: 1,
        });
        repository
    }

    /// Number of successful writes
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<CheckpointRecord> {
        self.record.lock().unwrap().clone()
    }

    /// Makes another writer bump the record right before our next write
    pub fn race_next_write(&self) {
        self.concurrent_writer.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CheckpointRepository for InMemoryCheckpointRepository {
    async fn read(&self) -> std::result::Result<Option<CheckpointRecord>, sqlx::Error> {
        Ok(self.stored())
    }

    async fn write_if_match(
        &self,
        checkpoint: DateTime<Utc>,
        expected_version: i64,
    ) -> std::result::Result<WriteOutcome, sqlx::Error> {
        let mut record = self.record.lock().unwrap();

        if self.concurrent_writer.swap(false, Ordering::SeqCst) {
            let bumped = match record.take() {
                Some(current) => CheckpointRecord {
                    version: current.version + 1,
                    ..current
                },
                None => CheckpointRecord {
                    version: 1,
                    ..CheckpointRecord::initial()
                },
            };
            *record = Some(bumped);
        }

        let current_version = record.as_ref().map_or(0, |r| r.version);
        if current_version != expected_version {
            return Ok(WriteOutcome::Conflict);
        }

        *record = Some(CheckpointRecord {
            id: CHECKPOINT_KEY.to_string(),
            checkpoint,
            version: current_version + 1,
        });
        self.writes.fetch_add(1, Ordering::SeqCst);

        Ok(WriteOutcome::Written)
    }
}
