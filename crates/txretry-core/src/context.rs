//! Cancellation context for transaction runs.
//!
//! A `TxContext` carries a shared cancel flag and an optional deadline. The
//! executor checks it before every attempt and races it against the backoff
//! sleep, so a caller can stop a retry loop from another task.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Canceled {
    #[error("context canceled")]
    Canceled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation handle. Clones share the cancel flag; each clone may carry
/// its own deadline.
#[derive(Debug, Clone)]
pub struct TxContext {
    cancel: Arc<watch::Sender<bool>>,
    deadline: Option<Instant>,
}

impl Default for TxContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TxContext {
    /// A context that is never done unless `cancel()` is called.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            cancel: Arc::new(tx),
            deadline: None,
        }
    }

    /// Alias of [`TxContext::new`] for call sites that never cancel.
    pub fn background() -> Self {
        Self::new()
    }

    /// Same cancel flag, done at `deadline` at the latest.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        };
        Self {
            cancel: Arc::clone(&self.cancel),
            deadline: Some(deadline),
        }
    }

    /// Same cancel flag, done after `timeout` at the latest.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone sharing its flag.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    /// `Some` once canceled or past the deadline. Cancellation wins over the deadline.
    pub fn err(&self) -> Option<Canceled> {
        if *self.cancel.borrow() {
            return Some(Canceled::Canceled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Some(Canceled::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolves when the context is canceled or its deadline passes.
    pub async fn done(&self) -> Canceled {
        let mut rx = self.cancel.subscribe();
        let canceled = async move {
            // The sender lives in `self`, so `changed` cannot fail while we wait.
            while !*rx.borrow_and_update() {
                if rx.changed().await.is_err() {
                    std::future::pending::<()>().await;
                }
            }
        };
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = canceled => Canceled::Canceled,
                    _ = tokio::time::sleep_until(deadline) => Canceled::DeadlineExceeded,
                }
            }
            None => {
                canceled.await;
                Canceled::Canceled
            }
        }
    }
}
