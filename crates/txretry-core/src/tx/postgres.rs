//! PostgreSQL binding: `PgPool` as a transaction source.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres};

use super::{BeginOptions, BeginTx, Transaction};
use crate::context::TxContext;

/// `SET TRANSACTION` statement for the options; must be the first statement
/// of the transaction.
pub(crate) fn set_transaction_sql(opts: &BeginOptions) -> Option<String> {
    let mut modes = Vec::with_capacity(2);
    if let Some(level) = opts.isolation.as_sql() {
        modes.push(format!("ISOLATION LEVEL {level}"));
    }
    if opts.read_only {
        modes.push("READ ONLY".to_string());
    }
    if modes.is_empty() {
        None
    } else {
        Some(format!("SET TRANSACTION {}", modes.join(", ")))
    }
}

#[async_trait]
impl BeginTx for PgPool {
    type Tx = sqlx::Transaction<'static, Postgres>;
    type Error = sqlx::Error;

    async fn begin_tx(&self, _ctx: &TxContext, opts: &BeginOptions) -> Result<Self::Tx, Self::Error> {
        let mut tx = self.begin().await?;
        if let Some(stmt) = set_transaction_sql(opts) {
            sqlx::query(&stmt).execute(&mut *tx).await?;
        }
        Ok(tx)
    }
}

#[async_trait]
impl Transaction for sqlx::Transaction<'static, Postgres> {
    type Error = sqlx::Error;

    async fn commit(self) -> Result<(), Self::Error> {
        sqlx::Transaction::commit(self).await
    }

    async fn rollback(self) -> Result<(), Self::Error> {
        sqlx::Transaction::rollback(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::IsolationLevel;

    #[test]
    fn serializable_read_write() {
        let opts = BeginOptions {
            isolation: IsolationLevel::Serializable,
            read_only: false,
        };
        assert_eq!(
            set_transaction_sql(&opts).as_deref(),
            Some("SET TRANSACTION ISOLATION LEVEL SERIALIZABLE")
        );
    }

    #[test]
    fn read_only_repeatable_read() {
        let opts = BeginOptions {
            isolation: IsolationLevel::RepeatableRead,
            read_only: true,
        };
        assert_eq!(
            set_transaction_sql(&opts).as_deref(),
            Some("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        );
    }

    #[test]
    fn nothing_to_set() {
        assert_eq!(set_transaction_sql(&BeginOptions::default()), None);
    }
}
