//! Retryable serializable transactions.
//!
//! This module ties the classifier and the backoff strategies together: the
//! executor runs a transaction body, classifies any failure, and either
//! retries after a backoff delay (serialization failures only) or returns.

mod error;
mod policy;
mod run;

pub use error::{is_abort, AbortTx, TxError};
pub use policy::{RetryDecision, RetryPolicy};
pub use run::{run_in_tx, run_in_tx_background};
