//! Classification of a single attempt.
//!
//! Each invocation of the caller's operation yields an [`Outcome`]. The
//! [`StatusPolicy`] then decides whether that outcome ends the sequence or is
//! worth another attempt.

use crate::error::{BadHttpResponseCode, BoxError, Error};
use crate::traits::HttpStatus;
use std::collections::BTreeSet;

/// Status codes outside the 5xx range that are retried by default.
pub const DEFAULT_RETRYABLE_STATUSES: &[u16] = &[429];

/// The result of one attempt, tagged by status class.
///
/// The message depends on the [`StatusPolicy`], so it is produced by
/// [`StatusPolicy::resolve`]; the attempt index is tracked by the engine and
/// reported through [`RetryResult::attempts`](crate::RetryResult::attempts).
#[derive(Debug)]
pub enum Outcome<R> {
    /// No response: the operation itself failed.
    NetworkFailure(BoxError),

    /// Status in `[500, 600)`.
    ServerError(R),

    /// Status in `[400, 500)`.
    ClientError(R),

    /// Status in `[200, 300)`.
    Success(R),

    /// Any other status (1xx, 3xx, or out of range).
    OtherStatus(R),
}

/// What the engine does with an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Terminal: return the response without error.
    Success,
    /// Wait and try again, unless the backoff budget is spent.
    Retryable,
    /// Terminal: return the response with an error.
    Permanent,
}

impl<R: HttpStatus> Outcome<R> {
    /// Tag the raw result of an operation by status class.
    pub fn classify<E: Into<BoxError>>(result: Result<R, E>) -> Self {
        match result {
            Err(err) => Self::NetworkFailure(err.into()),
            Ok(response) => match response.status_code() / 100 {
                2 => Self::Success(response),
                4 => Self::ClientError(response),
                5 => Self::ServerError(response),
                _ => Self::OtherStatus(response),
            },
        }
    }

    /// Status code, when a response was received.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(|r| r.status_code())
    }
}

impl<R> Outcome<R> {
    /// The response, when one was received.
    pub fn response(&self) -> Option<&R> {
        match self {
            Self::NetworkFailure(_) => None,
            Self::ServerError(r) | Self::ClientError(r) | Self::Success(r) | Self::OtherStatus(r) => {
                Some(r)
            }
        }
    }

    /// Consume the outcome, keeping only the response.
    pub fn into_response(self) -> Option<R> {
        match self {
            Self::NetworkFailure(_) => None,
            Self::ServerError(r) | Self::ClientError(r) | Self::Success(r) | Self::OtherStatus(r) => {
                Some(r)
            }
        }
    }
}

/// Decides which outcomes are worth retrying.
///
/// Network failures and 5xx statuses are always retried and 2xx always
/// succeeds. Every other status is permanent unless listed here. By default
/// `429 Too Many Requests` is listed, since it asks the caller to back off
/// rather than to give up.
///
/// ```rust
/// use httpbackoff::StatusPolicy;
///
/// let policy = StatusPolicy::default();
/// assert!(policy.is_retryable_status(429));
/// assert!(policy.is_retryable_status(503));
/// assert!(!policy.is_retryable_status(404));
///
/// let strict = StatusPolicy::strict();
/// assert!(!strict.is_retryable_status(429));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPolicy {
    retryable: BTreeSet<u16>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::with_statuses(DEFAULT_RETRYABLE_STATUSES.iter().copied())
    }
}

impl StatusPolicy {
    /// Every non-2xx, non-5xx status is permanent, 429 included.
    pub fn strict() -> Self {
        Self {
            retryable: BTreeSet::new(),
        }
    }

    /// Retry exactly these statuses in addition to 5xx.
    pub fn with_statuses(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            retryable: statuses.into_iter().collect(),
        }
    }

    /// Also retry `status`.
    pub fn retry_status(mut self, status: u16) -> Self {
        self.retryable.insert(status);
        self
    }

    /// Stop retrying `status`. Has no effect on 5xx.
    pub fn never_retry_status(mut self, status: u16) -> Self {
        self.retryable.remove(&status);
        self
    }

    /// Extra retryable statuses, in ascending order.
    pub fn retryable_statuses(&self) -> impl Iterator<Item = u16> + '_ {
        self.retryable.iter().copied()
    }

    /// Whether a response with this status is retried.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        status / 100 == 5 || self.retryable.contains(&status)
    }

    /// Disposition of an attempt's outcome.
    pub fn disposition<R: HttpStatus>(&self, outcome: &Outcome<R>) -> Disposition {
        match outcome {
            Outcome::NetworkFailure(_) | Outcome::ServerError(_) => Disposition::Retryable,
            Outcome::Success(_) => Disposition::Success,
            Outcome::ClientError(r) | Outcome::OtherStatus(r) => {
                if self.retryable.contains(&r.status_code()) {
                    Disposition::Retryable
                } else {
                    Disposition::Permanent
                }
            }
        }
    }

    /// Split an outcome into its disposition, response and error.
    ///
    /// The error is `None` exactly when the disposition is
    /// [`Disposition::Success`].
    pub fn resolve<R: HttpStatus>(
        &self,
        outcome: Outcome<R>,
    ) -> (Disposition, Option<R>, Option<Error>) {
        let disposition = self.disposition(&outcome);
        match outcome {
            Outcome::NetworkFailure(err) => (disposition, None, Some(Error::Network(err))),
            Outcome::Success(response) => (disposition, Some(response), None),
            Outcome::ServerError(response)
            | Outcome::ClientError(response)
            | Outcome::OtherStatus(response) => {
                let code = response.status_code();
                let bad = match disposition {
                    Disposition::Retryable => Error::Intermittent(BadHttpResponseCode::intermittent(code)),
                    _ => Error::Permanent(BadHttpResponseCode::permanent(code)),
                };
                (disposition, Some(response), Some(bad))
            }
        }
    }
}
