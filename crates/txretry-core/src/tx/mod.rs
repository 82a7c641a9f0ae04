//! Transaction source abstraction and per-run options.
//!
//! The executor never talks to a driver directly. It needs something that can
//! begin a transaction ([`BeginTx`]) and a handle that can commit or roll back
//! ([`Transaction`]). Bindings for sqlx pools live in the submodules.

mod postgres;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::backoff::{self, SharedBackoff};
use crate::context::TxContext;

/// Attempts per run when `TxOptions::max_attempts` is zero.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Resolved to `Serializable` by the executor.
    #[default]
    Default,
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// SQL spelling, as used in `SET TRANSACTION ISOLATION LEVEL`.
    pub fn as_sql(self) -> Option<&'static str> {
        match self {
            IsolationLevel::Default => None,
            IsolationLevel::ReadUncommitted => Some("READ UNCOMMITTED"),
            IsolationLevel::ReadCommitted => Some("READ COMMITTED"),
            IsolationLevel::RepeatableRead => Some("REPEATABLE READ"),
            IsolationLevel::Serializable => Some("SERIALIZABLE"),
        }
    }
}

/// What the source needs to open one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BeginOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
}

/// Options for one executor run.
#[derive(Clone)]
pub struct TxOptions {
    pub isolation: IsolationLevel,
    pub read_only: bool,
    /// Total attempts including the first; zero means [`DEFAULT_MAX_ATTEMPTS`].
    pub max_attempts: u32,
    /// Delay between attempts. `None` uses exponential backoff with full jitter.
    pub backoff: Option<SharedBackoff>,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            isolation: IsolationLevel::Serializable,
            read_only: false,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: None,
        }
    }
}

impl fmt::Debug for TxOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TxOptions")
            .field("isolation", &self.isolation)
            .field("read_only", &self.read_only)
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff.as_ref().map(|_| "custom"))
            .finish()
    }
}

impl TxOptions {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_backoff(mut self, backoff: impl backoff::BackoffStrategy + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Attempts actually made: zero falls back to the default.
    pub fn effective_max_attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            DEFAULT_MAX_ATTEMPTS
        } else {
            self.max_attempts
        }
    }

    /// Begin options with `Default` isolation upgraded to `Serializable`.
    pub fn begin_options(&self) -> BeginOptions {
        let isolation = match self.isolation {
            IsolationLevel::Default => IsolationLevel::Serializable,
            other => other,
        };
        BeginOptions {
            isolation,
            read_only: self.read_only,
        }
    }

    pub fn effective_backoff(&self) -> SharedBackoff {
        match &self.backoff {
            Some(b) => Arc::clone(b),
            None => Arc::new(backoff::default_exponential_full_jitter()),
        }
    }
}

/// Something that can open transactions, e.g. a connection pool.
///
/// `ctx` is passed along for sources that can use it. Implementations may
/// ignore it: the executor races `begin_tx` against `ctx.done()` and drops
/// the pending begin when the context ends first.
#[async_trait]
pub trait BeginTx: Send + Sync {
    type Tx: Transaction<Error = Self::Error>;
    type Error: std::error::Error + Send + Sync + 'static;

    async fn begin_tx(&self, ctx: &TxContext, opts: &BeginOptions) -> Result<Self::Tx, Self::Error>;
}

/// An open transaction.
///
/// `commit` and `rollback` consume the handle, so a transaction is finished
/// at most once. Dropping an unfinished handle must roll it back (sqlx
/// transactions do); the executor relies on this when a run is cancelled
/// mid-flight.
#[async_trait]
pub trait Transaction: Send + Sized {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn commit(self) -> Result<(), Self::Error>;
    async fn rollback(self) -> Result<(), Self::Error>;
}
