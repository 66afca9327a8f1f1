//! Skimmer Poller
//!
//! Polls a search provider for new items matching a fixed query and forwards
//! them to a downstream sink in batches.
//!
//! Architecture:
//! - Configuration: Load settings from the environment
//! - Repositories: Search provider, sink and checkpoint store behind traits
//! - Services: Checkpoint store, cursor walker and result batcher
//! - Scheduler: One poll per process, or polls on a fixed interval
//!
//! With stream mode enabled the newest dispatched timestamp is checkpointed
//! so the next poll only surfaces items created after it.

mod config;
mod db;
mod error;
mod repository;
mod scheduler;
mod service;

use anyhow::{Context, Result};
use skimmer_client::{SearchApiClient, SecretClient, SinkClient};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{PgCheckpointRepository, SearchRepository, SinkRepository};
use crate::scheduler::{PollOutcome, SearchPoller};
use crate::service::{CursorWalker, ResultBatcher, SearchCheckpoint};

/// Upper bound on any single provider query or sink invocation
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skimmer_poller=info,skimmer_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Skimmer poller");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    info!(
        "Loaded configuration: search_text={:?}, sink_target={}, batch_size={}, stream_mode_enabled={}",
        config.search_text, config.sink_target, config.batch_size, config.stream_mode_enabled
    );

    let poller = build_poller(&config).await?;

    match config.poll_interval {
        Some(interval) => poller.run(interval).await,
        None => {
            match poller.run_once().await? {
                PollOutcome::NoResults => info!("Poll finished with no new items"),
                PollOutcome::Dispatched {
                    items,
                    batches,
                    checkpoint,
                } => info!(
                    "Poll finished: {} item(s) in {} batch(es), checkpoint: {:?}",
                    items, batches, checkpoint
                ),
            }
            Ok(())
        }
    }
}

/// Wires clients, repositories and services into a poller
async fn build_poller(config: &Config) -> Result<SearchPoller> {
    let http_client = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    // Credentials are resolved once, here
    let secrets = config
        .secret_decrypt_url
        .as_deref()
        .map(|url| SecretClient::with_client(url, http_client.clone()));
    let token = config
        .search_credential
        .resolve(secrets.as_ref())
        .await?;

    let mut search_client =
        SearchApiClient::with_client(config.search_api_url.clone(), http_client.clone());
    if let Some(token) = token {
        search_client = search_client.with_token(token);
    }
    let search: Arc<dyn SearchRepository> = Arc::new(search_client);
    let sink: Arc<dyn SinkRepository> =
        Arc::new(SinkClient::with_client(config.sink_url.clone(), http_client));

    info!("Search and sink clients initialized");

    let batch_size =
        NonZeroUsize::new(config.batch_size).context("batch_size must be greater than 0")?;

    let checkpoint = if config.stream_mode_enabled {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL is required when stream mode is enabled")?;

        info!("Connecting to checkpoint database...");
        let pool = db::create_pool(database_url)
            .await
            .context("Failed to create database pool")?;
        db::run_migrations(&pool, &config.checkpoint_table)
            .await
            .context("Failed to prepare checkpoint table")?;

        let repository = PgCheckpointRepository::new(pool, config.checkpoint_table.clone());
        Some(SearchCheckpoint::new(Arc::new(repository)))
    } else {
        info!("Stream mode disabled, every poll scans from the epoch");
        None
    };

    Ok(SearchPoller::new(
        CursorWalker::new(search, config.search_text.clone()),
        ResultBatcher::new(sink, config.sink_target.clone(), batch_size),
        checkpoint,
    ))
}
