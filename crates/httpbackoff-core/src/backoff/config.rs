//! Parameters of an exponential backoff curve.

use crate::error::ConfigError;
use std::time::Duration;

/// Parameters for [`ExponentialBackoff`](super::ExponentialBackoff).
///
/// This is plain data: it carries no running state, so one value can be
/// copied into as many concurrent retry sequences as needed.
///
/// Two presets are provided:
///
/// - [`BackoffConfig::default`] for talking to real services (seconds scale)
/// - [`BackoffConfig::fast`] for tests against local stubs (milliseconds scale)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffConfig {
    /// Wait before the first retry, before jitter.
    pub initial_interval: Duration,

    /// Jitter as a fraction of the current interval, in `[0, 1)`.
    pub randomization_factor: f64,

    /// Growth factor applied to the interval after each retry.
    pub multiplier: f64,

    /// Upper bound on the un-jittered interval.
    pub max_interval: Duration,

    /// Give up once this much time has passed since the sequence started.
    /// `Duration::ZERO` disables the cutoff.
    pub max_elapsed_time: Duration,
}

impl Default for BackoffConfig {
    /// Defaults:
    /// - `initial_interval`: 500ms
    /// - `randomization_factor`: 0.5
    /// - `multiplier`: 1.5
    /// - `max_interval`: 60s
    /// - `max_elapsed_time`: 15min
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_millis(500),
            randomization_factor: 0.5,
            multiplier: 1.5,
            max_interval: Duration::from_secs(60),
            max_elapsed_time: Duration::from_secs(15 * 60),
        }
    }
}

impl BackoffConfig {
    /// Millisecond-scale settings for exercising retries against local servers.
    ///
    /// - `initial_interval`: 1ms
    /// - `randomization_factor`: 0.2
    /// - `multiplier`: 1.2
    /// - `max_interval`: 5ms
    /// - `max_elapsed_time`: 20ms
    pub fn fast() -> Self {
        Self {
            initial_interval: Duration::from_millis(1),
            randomization_factor: 0.2,
            multiplier: 1.2,
            max_interval: Duration::from_millis(5),
            max_elapsed_time: Duration::from_millis(20),
        }
    }

    /// Whether the elapsed-time cutoff is active.
    pub fn has_elapsed_limit(&self) -> bool {
        !self.max_elapsed_time.is_zero()
    }

    /// Check that the parameters describe a growing, bounded curve.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_interval.is_zero() {
            return Err(ConfigError::ZeroInitialInterval);
        }
        if !self.multiplier.is_finite() || self.multiplier <= 1.0 {
            return Err(ConfigError::InvalidMultiplier(self.multiplier));
        }
        if !(0.0..1.0).contains(&self.randomization_factor) {
            return Err(ConfigError::InvalidRandomizationFactor(
                self.randomization_factor,
            ));
        }
        if self.max_interval < self.initial_interval {
            return Err(ConfigError::MaxIntervalTooSmall {
                initial: self.initial_interval,
                max: self.max_interval,
            });
        }
        Ok(())
    }
}
