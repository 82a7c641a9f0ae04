//! Retryable database transactions.
//!
//! [`retry::run_in_tx`] runs a closure inside a transaction and retries the
//! whole body when the database reports a serialization failure (SQLSTATE
//! `40001`), waiting between attempts according to a [`backoff`] strategy.
//! [`classify`] inspects driver errors for their SQLSTATE code and constraint
//! name so callers can react to unique and foreign-key violations.

pub mod config;
pub mod logging;

pub mod backoff;
pub mod classify;
pub mod context;
pub mod retry;
pub mod tx;

pub use context::{Canceled, TxContext};
pub use retry::{run_in_tx, run_in_tx_background, AbortTx, TxError};
pub use tx::{BeginOptions, BeginTx, IsolationLevel, Transaction, TxOptions};
