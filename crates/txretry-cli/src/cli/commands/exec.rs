//! `txretry exec` – run SQL statements inside one retryable transaction.

use anyhow::{bail, Result};
use futures::FutureExt;
use sqlx::{Executor, PgPool, Postgres, Sqlite, SqlitePool, Transaction};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use txretry_core::classify::ErrorClassification;
use txretry_core::{run_in_tx, TxContext, TxError, TxOptions};

/// Counters updated by each attempt.
#[derive(Debug, Default)]
struct Progress {
    attempts: AtomicU32,
    rows_affected: AtomicU64,
}

pub async fn run_exec(
    database_url: &str,
    statements: &[String],
    opts: &TxOptions,
    timeout: Option<Duration>,
) -> Result<()> {
    let ctx = match timeout {
        Some(t) => TxContext::new().with_timeout(t),
        None => TxContext::new(),
    };
    let progress = Arc::new(Progress::default());

    let outcome = if is_postgres_url(database_url) {
        let pool = PgPool::connect(database_url).await?;
        let res = exec_postgres(&ctx, &pool, opts, statements, &progress).await;
        pool.close().await;
        res
    } else if database_url.starts_with("sqlite:") {
        let pool = SqlitePool::connect(database_url).await?;
        let res = exec_sqlite(&ctx, &pool, opts, statements, &progress).await;
        pool.close().await;
        res
    } else {
        bail!("unsupported database URL scheme (expected postgres:// or sqlite:)");
    };

    let attempts = progress.attempts.load(Ordering::SeqCst);
    match outcome {
        Ok(()) => {
            println!(
                "committed after {} attempt(s), {} row(s) affected",
                attempts,
                progress.rows_affected.load(Ordering::SeqCst)
            );
            Ok(())
        }
        Err(err) => {
            let class = ErrorClassification::of(&err);
            tracing::debug!(?class, attempts, "exec failed");
            let state = class.sql_state.as_deref().unwrap_or("-");
            Err(anyhow::Error::new(err)
                .context(format!("{} (sqlstate {state})", class.kind)))
        }
    }
}

fn is_postgres_url(url: &str) -> bool {
    url.starts_with("postgres://") || url.starts_with("postgresql://")
}

async fn exec_postgres(
    ctx: &TxContext,
    pool: &PgPool,
    opts: &TxOptions,
    statements: &[String],
    progress: &Arc<Progress>,
) -> Result<(), TxError<sqlx::Error>> {
    run_in_tx(ctx, pool, opts, |tx: &mut Transaction<'static, Postgres>| {
        progress.attempts.fetch_add(1, Ordering::SeqCst);
        let progress = Arc::clone(progress);
        let statements = statements.to_vec();
        async move {
            let mut rows = 0;
            for sql in &statements {
                let conn = &mut **tx;
                rows += conn.execute(sqlx::raw_sql(sql.as_str())).await?.rows_affected();
            }
            progress.rows_affected.store(rows, Ordering::SeqCst);
            Ok::<(), sqlx::Error>(())
        }
        .boxed()
    })
    .await
}

async fn exec_sqlite(
    ctx: &TxContext,
    pool: &SqlitePool,
    opts: &TxOptions,
    statements: &[String],
    progress: &Arc<Progress>,
) -> Result<(), TxError<sqlx::Error>> {
    run_in_tx(ctx, pool, opts, |tx: &mut Transaction<'static, Sqlite>| {
        progress.attempts.fetch_add(1, Ordering::SeqCst);
        let progress = Arc::clone(progress);
        let statements = statements.to_vec();
        async move {
            let mut rows = 0;
            for sql in &statements {
                let conn = &mut **tx;
                rows += conn.execute(sqlx::raw_sql(sql.as_str())).await?.rows_affected();
            }
            progress.rows_affected.store(rows, Ordering::SeqCst);
            Ok::<(), sqlx::Error>(())
        }
        .boxed()
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statements(sql: &[&str]) -> Vec<String> {
        sql.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn sqlite_statements_commit_together() {
        let sql = statements(&[
            "CREATE TABLE t (x INTEGER PRIMARY KEY)",
            "INSERT INTO t (x) VALUES (1), (2)",
        ]);
        let opts = TxOptions::default().with_max_attempts(1);
        run_exec("sqlite::memory:", &sql, &opts, None).await.unwrap();
    }

    #[tokio::test]
    async fn failing_statement_reports_kind() {
        let sql = statements(&[
            "CREATE TABLE t (x INTEGER PRIMARY KEY)",
            "INSERT INTO t (x) VALUES (1), (1)",
        ]);
        let opts = TxOptions::default().with_max_attempts(3);
        let err = run_exec("sqlite::memory:", &sql, &opts, Some(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("other (sqlstate -)"), "{err:#}");
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected() {
        let err = run_exec("mysql://localhost/app", &statements(&["SELECT 1"]), &TxOptions::default(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported database URL scheme"));
    }

    #[test]
    fn postgres_url_schemes() {
        assert!(is_postgres_url("postgres://localhost/app"));
        assert!(is_postgres_url("postgresql://user@db:5432/app"));
        assert!(!is_postgres_url("sqlite::memory:"));
        assert!(!is_postgres_url("mysql://localhost/app"));
    }
}
