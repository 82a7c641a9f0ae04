//! Retry loop: run a transaction body until it commits, aborts, or the policy says stop.

use futures::future::BoxFuture;
use futures::FutureExt;
use std::error::Error as StdError;
use std::panic::AssertUnwindSafe;

use super::error::{is_abort, TxError};
use super::policy::{RetryDecision, RetryPolicy};
use crate::classify;
use crate::context::TxContext;
use crate::tx::{BeginTx, Transaction, TxOptions};

/// Runs `f` inside a transaction, retrying the whole body on serialization
/// failures.
///
/// Each attempt begins a fresh transaction with the effective isolation
/// level (`Default` becomes `Serializable`), runs `f`, and commits if `f`
/// succeeded. Whatever happens the transaction is finished before the next
/// step: committed, or rolled back when `f` fails or panics.
///
/// - `Ok(())`: committed, or `f` returned an error carrying [`AbortTx`](super::AbortTx).
/// - `TxError::Begin`: the source could not open a transaction (not retried).
/// - `TxError::Failed`: a final error from `f` or from commit, or the last
///   serialization failure once `max_attempts` is used up.
/// - `TxError::Canceled`: `ctx` was done before an attempt, while one was in
///   flight (the open transaction is dropped, so it never commits), or during
///   the backoff wait.
///
/// Final errors are wrapped, not rewritten: [`TxError::into_source`] returns
/// the body's or the driver's error exactly as it was produced.
pub async fn run_in_tx<S, F, E>(
    ctx: &TxContext,
    source: &S,
    opts: &TxOptions,
    mut f: F,
) -> Result<(), TxError<E>>
where
    S: BeginTx + ?Sized,
    F: for<'t> FnMut(&'t mut S::Tx) -> BoxFuture<'t, Result<(), E>> + Send,
    E: StdError + From<S::Error> + Send + 'static,
{
    let policy = RetryPolicy::from_options(opts);
    let begin_opts = opts.begin_options();
    let mut attempt = 1u32;

    loop {
        if let Some(reason) = ctx.err() {
            return Err(TxError::Canceled(reason));
        }

        let tx = tokio::select! {
            biased;
            reason = ctx.done() => return Err(TxError::Canceled(reason)),
            res = source.begin_tx(ctx, &begin_opts) => res.map_err(|e| TxError::Begin(E::from(e)))?,
        };

        // Dropping the attempt drops the open transaction, which rolls it back.
        let outcome = tokio::select! {
            biased;
            reason = ctx.done() => {
                tracing::debug!(attempt, %reason, "context done during transaction, rolling back");
                return Err(TxError::Canceled(reason));
            }
            res = run_attempt(tx, &mut f) => res,
        };

        let err = match outcome {
            Ok(()) => {
                tracing::debug!(attempt, "transaction committed");
                return Ok(());
            }
            Err(e) if is_abort(&e) => {
                tracing::debug!(attempt, "transaction aborted by caller");
                return Ok(());
            }
            Err(e) => e,
        };

        let kind = classify::classify(&err);
        match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => {
                if kind.is_retryable() {
                    tracing::warn!(attempts = attempt, error = %err, "transaction retry budget exhausted");
                } else {
                    tracing::debug!(attempt, %kind, error = %err, "transaction failed");
                }
                return Err(TxError::Failed {
                    attempts: attempt,
                    source: err,
                });
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(attempt, ?delay, error = %err, "serialization failure, retrying transaction");
                tokio::select! {
                    biased;
                    reason = ctx.done() => return Err(TxError::Canceled(reason)),
                    _ = tokio::time::sleep(delay) => {}
                }
                attempt += 1;
            }
        }
    }
}

/// [`run_in_tx`] with a context that is never canceled.
pub async fn run_in_tx_background<S, F, E>(source: &S, opts: &TxOptions, f: F) -> Result<(), TxError<E>>
where
    S: BeginTx + ?Sized,
    F: for<'t> FnMut(&'t mut S::Tx) -> BoxFuture<'t, Result<(), E>> + Send,
    E: StdError + From<S::Error> + Send + 'static,
{
    let ctx = TxContext::background();
    run_in_tx(&ctx, source, opts, f).await
}

/// One begin..commit/rollback cycle on an already open transaction.
async fn run_attempt<T, F, E>(mut tx: T, f: &mut F) -> Result<(), E>
where
    T: Transaction,
    F: for<'t> FnMut(&'t mut T) -> BoxFuture<'t, Result<(), E>>,
    E: From<T::Error>,
{
    let outcome = AssertUnwindSafe(f(&mut tx)).catch_unwind().await;
    match outcome {
        Ok(Ok(())) => tx.commit().await.map_err(E::from),
        Ok(Err(e)) => {
            rollback(tx).await;
            Err(e)
        }
        Err(panic) => {
            rollback(tx).await;
            std::panic::resume_unwind(panic)
        }
    }
}

async fn rollback<T: Transaction>(tx: T) {
    if let Err(err) = tx.rollback().await {
        tracing::debug!(error = %err, "rollback failed");
    }
}
