use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// Creates the checkpoint table if it is missing
///
/// `table` must already be validated as a plain identifier; it is spliced
/// into the statement.
pub async fn run_migrations(pool: &PgPool, table: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {table} (
            id VARCHAR(255) PRIMARY KEY,
            checkpoint TIMESTAMPTZ NOT NULL,
            version BIGINT NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    tracing::info!("Checkpoint table {} is ready", table);
    Ok(())
}

/// Whether `name` can be used as an unquoted table name
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    name.len() <= 63 && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
