use std::str::FromStr;
use std::time::Duration;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Creates and returns a SQLite connection pool.
///
/// In-memory databases live and die with a single connection, so those pools
/// are pinned to one connection that is never recycled. File databases use WAL
/// and wait up to `BUSY_TIMEOUT` for the write lock.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}...");

    let connect = SqliteConnectOptions::from_str(database_url)?;
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(connect)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(
                connect
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(BUSY_TIMEOUT),
            )
            .await?
    };

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Creates the application tables if they do not exist yet.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            BLOB PRIMARY KEY NOT NULL,
            username      TEXT NOT NULL UNIQUE,
            email         TEXT NOT NULL UNIQUE,
            full_name     TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at    TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema ready");
    Ok(())
}
