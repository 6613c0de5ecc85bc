//! SQL statement modules, one per table, plus the pool bootstrap.
//!
//! Every statement is a fixed, parameterized string. Single-statement helpers
//! take any [`SqliteExecutor`] so they run on the pool or inside a
//! transaction; helpers that issue several statements take
//! `&mut SqliteConnection`.

pub mod attendance;
pub mod enquiries;
pub mod expenses;
pub mod invoices;
pub mod master;
pub mod measurements;
pub mod members;
pub mod receipts;
pub mod staff;

use crate::errors::AppResult;
use sqlx::{
    SqliteExecutor,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions},
};
use std::{str::FromStr, time::Duration};
use tracing::info;

/// Open the database file (creating it when missing) and apply migrations.
pub async fn connect(database_url: &str) -> AppResult<SqlitePool> {
    let in_memory = database_url.contains(":memory:");

    let mut options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
        if let Some(parent) = options.get_filename().parent() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // One operator at a time; a single connection also keeps an in-memory
    // database alive and shared for the life of the pool.
    let pool = SqlitePoolOptions::new()
        .max_connections(if in_memory { 1 } else { 4 })
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    info!("Database ready at {}", database_url);
    Ok(pool)
}

/// Bump a named counter and return its new value.
pub async fn next_sequence(conn: impl SqliteExecutor<'_>, name: &str) -> AppResult<i64> {
    let value: i64 =
        sqlx::query_scalar("UPDATE sequences SET value = value + 1 WHERE name = ? RETURNING value")
            .bind(name)
            .fetch_one(conn)
            .await?;
    Ok(value)
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    connect("sqlite::memory:").await.expect("in-memory database")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequences_increment_independently() {
        let pool = test_pool().await;

        assert_eq!(next_sequence(&pool, "receipt").await.unwrap(), 1);
        assert_eq!(next_sequence(&pool, "receipt").await.unwrap(), 2);
        assert_eq!(next_sequence(&pool, "invoice").await.unwrap(), 1);
    }
}
