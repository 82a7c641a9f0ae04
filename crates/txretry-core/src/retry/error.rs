//! Executor error type and the abort sentinel.

use std::error::Error as StdError;

use crate::classify::chain;
use crate::context::Canceled;

/// Returned (anywhere in the error chain) by a transaction body to roll back
/// and end the run successfully, without retrying.
///
/// Wrap it with `#[source]`/`#[from]`, not `#[error(transparent)]`:
/// transparent variants hide the wrapped value from the `source()` chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("transaction aborted")]
pub struct AbortTx;

/// Whether `err` is, or was caused by, [`AbortTx`].
pub fn is_abort(err: &(dyn StdError + 'static)) -> bool {
    chain(err).any(|e| e.is::<AbortTx>())
}

/// Why a retryable transaction run failed.
#[derive(Debug, thiserror::Error)]
pub enum TxError<E>
where
    E: StdError + 'static,
{
    /// The transaction could not be opened. Never retried.
    #[error("begin transaction: {0}")]
    Begin(#[source] E),
    /// The body or the commit failed with a final error, or the attempt
    /// budget ran out. `source` is the last error observed, unchanged.
    #[error("transaction failed after {attempts} attempt(s): {source}")]
    Failed {
        attempts: u32,
        #[source]
        source: E,
    },
    /// The context was canceled or timed out before the next attempt.
    #[error("transaction retry interrupted: {0}")]
    Canceled(#[from] Canceled),
}

impl<E> TxError<E>
where
    E: StdError + 'static,
{
    /// The underlying database or application error, if any.
    pub fn into_source(self) -> Option<E> {
        match self {
            TxError::Begin(e) => Some(e),
            TxError::Failed { source, .. } => Some(source),
            TxError::Canceled(_) => None,
        }
    }

    pub fn source_ref(&self) -> Option<&E> {
        match self {
            TxError::Begin(e) => Some(e),
            TxError::Failed { source, .. } => Some(source),
            TxError::Canceled(_) => None,
        }
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, TxError::Canceled(_))
    }

    /// Attempts made before giving up, for `Failed`.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            TxError::Failed { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}
