//! SQLite binding: `SqlitePool` as a transaction source.
//!
//! SQLite transactions are always serializable, so the requested isolation
//! level is accepted and ignored. `read_only` is not enforced either.

use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool};

use super::{BeginOptions, BeginTx, Transaction};
use crate::context::TxContext;

#[async_trait]
impl BeginTx for SqlitePool {
    type Tx = sqlx::Transaction<'static, Sqlite>;
    type Error = sqlx::Error;

    async fn begin_tx(&self, _ctx: &TxContext, opts: &BeginOptions) -> Result<Self::Tx, Self::Error> {
        tracing::trace!(isolation = ?opts.isolation, read_only = opts.read_only, "sqlite begin");
        self.begin().await
    }
}

#[async_trait]
impl Transaction for sqlx::Transaction<'static, Sqlite> {
    type Error = sqlx::Error;

    async fn commit(self) -> Result<(), Self::Error> {
        sqlx::Transaction::commit(self).await
    }

    async fn rollback(self) -> Result<(), Self::Error> {
        sqlx::Transaction::rollback(self).await
    }
}
