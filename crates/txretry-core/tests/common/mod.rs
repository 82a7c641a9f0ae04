//! Shared helpers for the SQLite integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use txretry_core::backoff::Constant;
use txretry_core::classify::SqlStateError;
use txretry_core::{AbortTx, TxOptions};

/// Application error as a caller of the executor would define it.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("conflict: {0}")]
    Conflict(#[from] SqlStateError),
    #[error("aborted")]
    Abort(#[from] AbortTx),
    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Single-connection in-memory pool; every pooled connection would get its own database otherwise.
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    create_schema(&pool).await;
    pool
}

pub async fn file_pool(path: &Path) -> SqlitePool {
    let opts = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .unwrap();
    create_schema(&pool).await;
    pool
}

async fn create_schema(pool: &SqlitePool) {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            email TEXT NOT NULL UNIQUE
        )",
    )
    .execute(pool)
    .await
    .unwrap();
}

pub async fn user_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Options that retry without sleeping.
pub fn fast(max_attempts: u32) -> TxOptions {
    TxOptions::default()
        .with_max_attempts(max_attempts)
        .with_backoff(Constant(Duration::ZERO))
}
