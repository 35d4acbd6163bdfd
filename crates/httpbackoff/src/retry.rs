//! The retry engine.
//!
//! [`Retrier`] runs an operation, classifies each outcome with a
//! [`StatusPolicy`], and asks a [`BackoffStrategy`] how long to wait before
//! the next attempt:
//!
//! ```text
//! START -> ATTEMPT -> SUCCESS                       (terminal)
//!                  -> PERMANENT_FAILURE             (terminal)
//!                  -> RETRYABLE_FAILURE -> STOP     (terminal, last error returned)
//!                                       -> sleep -> ATTEMPT
//! ```
//!
//! Attempts are strictly sequential. The only suspension point between
//! attempts is the backoff sleep, which a [`CancellationToken`] can cut short.

use crate::error::{BoxError, Error, Result};
use crate::notify::{RetryNotify, TracingNotify};
use crate::outcome::{Disposition, Outcome, StatusPolicy};
use crate::traits::HttpStatus;
use httpbackoff_core::backoff::{BackoffConfig, BackoffStrategy, ExponentialBackoff};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a retry sequence ended with.
///
/// The response is the one from the *last* attempt, even when that attempt
/// failed, so callers can inspect the body of a final 4xx or 5xx.
#[derive(Debug)]
pub struct RetryResult<R> {
    attempts: u32,
    ending: Ending<R>,
}

#[derive(Debug)]
enum Ending<R> {
    Success(R),
    Failure { response: Option<R>, error: Error },
}

impl<R> RetryResult<R> {
    pub(crate) fn success(response: R, attempts: u32) -> Self {
        Self {
            attempts,
            ending: Ending::Success(response),
        }
    }

    pub(crate) fn failure(response: Option<R>, attempts: u32, error: Error) -> Self {
        Self {
            attempts,
            ending: Ending::Failure { response, error },
        }
    }

    /// A sequence that failed before the operation could be invoked.
    pub(crate) fn not_attempted(error: Error) -> Self {
        Self::failure(None, 0, error)
    }

    /// Number of times the operation was invoked (one plus the number of retries).
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Response of the last attempt, if it produced one.
    pub fn response(&self) -> Option<&R> {
        match &self.ending {
            Ending::Success(response) => Some(response),
            Ending::Failure { response, .. } => response.as_ref(),
        }
    }

    /// Why the sequence failed; `None` on success.
    pub fn error(&self) -> Option<&Error> {
        match &self.ending {
            Ending::Success(_) => None,
            Ending::Failure { error, .. } => Some(error),
        }
    }

    /// Whether the last attempt returned a 2xx.
    pub fn is_success(&self) -> bool {
        matches!(self.ending, Ending::Success(_))
    }

    /// Consume into `(response, attempts, error)`.
    pub fn into_parts(self) -> (Option<R>, u32, Option<Error>) {
        match self.ending {
            Ending::Success(response) => (Some(response), self.attempts, None),
            Ending::Failure { response, error } => (response, self.attempts, Some(error)),
        }
    }

    /// The successful response, or the error. The last failing response, if
    /// any, is dropped.
    pub fn into_result(self) -> Result<R> {
        match self.ending {
            Ending::Success(response) => Ok(response),
            Ending::Failure { error, .. } => Err(error),
        }
    }

    /// Transform the response, keeping attempts and error.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> RetryResult<T> {
        let ending = match self.ending {
            Ending::Success(response) => Ending::Success(f(response)),
            Ending::Failure { response, error } => Ending::Failure {
                response: response.map(f),
                error,
            },
        };
        RetryResult {
            attempts: self.attempts,
            ending,
        }
    }
}

impl<R: HttpStatus> RetryResult<R> {
    /// Status code of the last response, if any.
    pub fn status(&self) -> Option<u16> {
        self.response().map(|r| r.status_code())
    }
}

/// Drives one retry sequence at a time.
///
/// The retrier owns its scheduler, so it must not be shared between
/// concurrent sequences; build one per sequence (cheap) or use
/// [`Client`](crate::Client), which does so on every call.
///
/// # Examples
///
/// ```rust
/// use httpbackoff::{BackoffConfig, Retrier};
/// use httpbackoff_core::backoff::ExponentialBackoff;
///
/// # async fn example() {
/// let mut retrier = Retrier::new(ExponentialBackoff::new(BackoffConfig::fast()));
/// let result = retrier
///     .run(|| async { Ok::<_, std::io::Error>(http::StatusCode::OK) })
///     .await;
///
/// assert!(result.is_success());
/// assert_eq!(result.attempts(), 1);
/// # }
/// ```
#[derive(Debug)]
pub struct Retrier<B, N = TracingNotify> {
    backoff: B,
    policy: StatusPolicy,
    notify: N,
    cancel: Option<CancellationToken>,
}

impl<B: BackoffStrategy> Retrier<B> {
    /// Create a retrier with the default status policy and tracing notifications.
    pub fn new(backoff: B) -> Self {
        Self {
            backoff,
            policy: StatusPolicy::default(),
            notify: TracingNotify,
            cancel: None,
        }
    }
}

impl<B: BackoffStrategy, N: RetryNotify> Retrier<B, N> {
    /// Use `policy` to decide which statuses are retried.
    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report retries to `notify` instead.
    pub fn with_notify<M: RetryNotify>(self, notify: M) -> Retrier<B, M> {
        Retrier {
            backoff: self.backoff,
            policy: self.policy,
            notify,
            cancel: self.cancel,
        }
    }

    /// Abandon the sequence as soon as `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The scheduler, e.g. to inspect its state after a run.
    pub fn backoff(&self) -> &B {
        &self.backoff
    }

    /// Run `operation` until it succeeds, fails permanently, the scheduler
    /// stops, or the sequence is cancelled.
    ///
    /// `operation` performs exactly one HTTP attempt per call. The scheduler is
    /// reset first, so a retrier can run several sequences one after another.
    pub async fn run<F, Fut, R, E>(&mut self, mut operation: F) -> RetryResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        R: HttpStatus,
        E: Into<BoxError>,
    {
        self.backoff.reset();
        let mut attempts = 0u32;

        loop {
            attempts += 1;
            let outcome = Outcome::classify(operation().await);
            let (disposition, response, error) = self.policy.resolve(outcome);

            let error = match (disposition, error) {
                (Disposition::Retryable, Some(error)) => error,
                (disposition, error) => {
                    tracing::debug!(
                        attempts,
                        ?disposition,
                        status = response.as_ref().map(|r| r.status_code()),
                        "HTTP call finished"
                    );
                    return match (response, error) {
                        (response, Some(error)) => RetryResult::failure(response, attempts, error),
                        (Some(response), None) => RetryResult::success(response, attempts),
                        (None, None) => unreachable!("a success outcome always carries its response"),
                    };
                }
            };

            let Some(wait) = self.backoff.next_backoff() else {
                tracing::warn!(attempts, error = %error, "giving up on HTTP call, backoff exhausted");
                return RetryResult::failure(response, attempts, error);
            };

            self.notify.notify(&error, wait, attempts);

            if !sleep(self.cancel.as_ref(), wait).await {
                tracing::info!(attempts, "HTTP retries cancelled");
                return RetryResult::failure(response, attempts, Error::Cancelled);
            }
        }
    }
}

/// Sleep for `wait`; `false` if cancelled first.
async fn sleep(cancel: Option<&CancellationToken>, wait: Duration) -> bool {
    match cancel {
        None => {
            tokio::time::sleep(wait).await;
            true
        }
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => false,
                _ = tokio::time::sleep(wait) => true,
            }
        }
    }
}

/// Retry `operation` with a fresh exponential scheduler built from `config`
/// and the default [`StatusPolicy`].
///
/// An invalid `config` is reported as [`Error::InvalidConfig`] with zero
/// attempts; `operation` is not invoked.
///
/// ```rust
/// use httpbackoff::{retry, BackoffConfig};
///
/// # async fn example() {
/// let result = retry(BackoffConfig::fast(), || async {
///     reqwest::get("http://localhost:1/unreachable").await
/// })
/// .await;
///
/// assert!(result.error().is_some_and(|e| e.is_network()));
/// # }
/// ```
pub async fn retry<F, Fut, R, E>(config: BackoffConfig, operation: F) -> RetryResult<R>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<R, E>>,
    R: HttpStatus,
    E: Into<BoxError>,
{
    match ExponentialBackoff::try_new(config) {
        Ok(backoff) => Retrier::new(backoff).run(operation).await,
        Err(err) => RetryResult::not_attempted(err.into()),
    }
}
