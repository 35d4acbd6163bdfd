//! Error types for backoff configuration.

use std::time::Duration;
use thiserror::Error;

/// A [`BackoffConfig`](crate::backoff::BackoffConfig) that cannot produce a
/// sensible schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The first interval must be longer than zero.
    #[error("initial interval must be greater than zero")]
    ZeroInitialInterval,

    /// Intervals must grow between attempts.
    #[error("multiplier must be greater than 1.0, got {0}")]
    InvalidMultiplier(f64),

    /// Jitter is a fraction of the interval.
    #[error("randomization factor must be in [0, 1), got {0}")]
    InvalidRandomizationFactor(f64),

    /// The cap would truncate the very first interval.
    #[error("max interval {max:?} is shorter than initial interval {initial:?}")]
    MaxIntervalTooSmall {
        /// Configured initial interval
        initial: Duration,
        /// Configured max interval
        max: Duration,
    },
}
