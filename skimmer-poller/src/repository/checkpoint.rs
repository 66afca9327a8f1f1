//! Checkpoint repository
//!
//! A compare-and-swap store for the single checkpoint record. Reads return
//! the record with its version; writes only land if the stored version still
//! matches the one the caller read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skimmer_core::domain::checkpoint::{CHECKPOINT_KEY, CheckpointRecord};
use sqlx::PgPool;

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The stored version no longer matched the expected one
    Conflict,
}

/// Repository trait for the versioned checkpoint record
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Reads the stored record, if any
    async fn read(&self) -> Result<Option<CheckpointRecord>, sqlx::Error>;

    /// Stores `checkpoint` if the record is still at `expected_version`
    ///
    /// An `expected_version` of 0 means the record must not exist yet.
    async fn write_if_match(
        &self,
        checkpoint: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<WriteOutcome, sqlx::Error>;
}

/// Postgres implementation of CheckpointRepository
pub struct PgCheckpointRepository {
    pool: PgPool,
    table: String,
}

impl PgCheckpointRepository {
    /// Creates a new Postgres checkpoint repository
    ///
    /// # Arguments
    /// * `pool` - Connection pool
    /// * `table` - Checkpoint table name, already validated as an identifier
    pub fn new(pool: PgPool, table: impl Into<String>) -> Self {
        Self {
            pool,
            table: table.into(),
        }
    }
}

#[async_trait]
impl CheckpointRepository for PgCheckpointRepository {
    async fn read(&self) -> Result<Option<CheckpointRecord>, sqlx::Error> {
        let sql = format!(
            "SELECT id, checkpoint, version FROM {} WHERE id = $1",
            self.table
        );

        let row = sqlx::query_as::<_, CheckpointRow>(&sql)
            .bind(CHECKPOINT_KEY)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn write_if_match(
        &self,
        checkpoint: DateTime<Utc>,
        expected_version: i64,
    ) -> Result<WriteOutcome, sqlx::Error> {
        let result = if expected_version == 0 {
            let sql = format!(
                r#"
                INSERT INTO {} (id, checkpoint, version)
                VALUES ($1, $2, 1)
                ON CONFLICT (id) DO NOTHING
                "#,
                self.table
            );

            sqlx::query(&sql)
                .bind(CHECKPOINT_KEY)
                .bind(checkpoint)
                .execute(&self.pool)
                .await?
        } else {
            let sql = format!(
                r#"
                UPDATE {}
                SET checkpoint = $2, version = version + 1
                WHERE id = $1 AND version = $3
                "#,
                self.table
            );

            sqlx::query(&sql)
                .bind(CHECKPOINT_KEY)
                .bind(checkpoint)
                .bind(expected_version)
                .execute(&self.pool)
                .await?
        };

        if result.rows_affected() == 1 {
            Ok(WriteOutcome::Written)
        } else {
            Ok(WriteOutcome::Conflict)
        }
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct CheckpointRow {
    id: String,
    checkpoint: DateTime<Utc>,
    version: i64,
}

impl From<CheckpointRow> for CheckpointRecord {
    fn from(row: CheckpointRow) -> Self {
        CheckpointRecord {
            id: row.id,
            checkpoint: row.checkpoint,
            version: row.version,
        }
    }
}
