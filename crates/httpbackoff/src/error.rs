//! Error types for retried HTTP calls
//!
//! Every non-success end state of a retry sequence is surfaced as an [`Error`].
//! Failures that carry an HTTP status are wrapped in [`BadHttpResponseCode`],
//! whose message is prefixed `(Intermittent)` when the status was retryable
//! and retries ran out, or `(Permanent)` when the status was not retried.

use httpbackoff_core::ConfigError;
use thiserror::Error;

/// Boxed error returned by a failed HTTP operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for httpbackoff operations
pub type Result<T> = std::result::Result<T, Error>;

/// A response was received, but its status code was not in `[200, 300)`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct BadHttpResponseCode {
    /// HTTP status code of the last response
    pub code: u16,

    /// Human-readable description, prefixed `(Intermittent)` or `(Permanent)`
    pub message: String,
}

impl BadHttpResponseCode {
    /// A retryable status whose retries were exhausted.
    pub fn intermittent(code: u16) -> Self {
        Self {
            code,
            message: format!("(Intermittent) HTTP response code {code}"),
        }
    }

    /// A status that is never retried.
    pub fn permanent(code: u16) -> Self {
        Self {
            code,
            message: format!("(Permanent) HTTP response code {code}"),
        }
    }
}

/// Errors that can end a retry sequence
#[derive(Debug, Error)]
pub enum Error {
    /// The operation failed without a response (DNS, connect, timeout, ...).
    #[error("network failure: {0}")]
    Network(#[source] BoxError),

    /// Retryable status (5xx, or a client status the policy retries) that was
    /// still being returned when the backoff budget ran out.
    #[error(transparent)]
    Intermittent(BadHttpResponseCode),

    /// Status that is never retried (4xx, 1xx, 3xx).
    #[error(transparent)]
    Permanent(BadHttpResponseCode),

    /// The retry sequence was cancelled while waiting between attempts.
    #[error("retry sequence cancelled")]
    Cancelled,

    /// Backoff parameters were rejected.
    #[error("invalid backoff configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// Settings could not be read or parsed.
    #[error("invalid settings: {0}")]
    Settings(String),

    /// Settings file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The request URL could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[source] reqwest::Error),

    /// The request has a streaming body, so it cannot be re-sent.
    #[error("request body cannot be cloned for retries")]
    RequestNotCloneable,

    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(#[source] reqwest::Error),
}

impl Error {
    /// Status code of the last response, if a response was received.
    pub fn status_code(&self) -> Option<u16> {
        self.bad_response().map(|bad| bad.code)
    }

    /// The structured status failure, if any.
    pub fn bad_response(&self) -> Option<&BadHttpResponseCode> {
        match self {
            Self::Intermittent(bad) | Self::Permanent(bad) => Some(bad),
            _ => None,
        }
    }

    /// Whether the failure kind is one the engine retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Intermittent(_))
    }

    /// Whether the failure was a status that is never retried.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Permanent(_))
    }

    /// Whether the failure happened before any response was received.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the sequence was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Settings(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Settings(err.to_string())
    }
}
