//! Exponential backoff with jitter.

use super::config::BackoffConfig;
use super::strategy::BackoffStrategy;
use crate::error::ConfigError;
use rand::Rng;
use std::time::Duration;
use tokio::time::Instant;

/// Exponential backoff scheduler with randomized jitter and an elapsed-time
/// cutoff.
///
/// Each call to [`next_backoff`](BackoffStrategy::next_backoff) hands out the
/// current interval perturbed by jitter, then grows the interval by the
/// multiplier, capped at `max_interval`.
///
/// # Mathematical Formula
///
/// ```text
/// delta      = current_interval * randomization_factor
/// randomized = random(current_interval - delta, current_interval + delta)
/// next       = min(current_interval * multiplier, max_interval)
/// ```
///
/// The clock starts at [`reset`](BackoffStrategy::reset), which a retry loop
/// calls before its first attempt, so time spent in attempts counts against
/// the budget. A scheduler that was never reset starts its clock on the first
/// call. Once more than `max_elapsed_time` has passed, `None` is returned.
///
/// # Examples
///
/// ```rust
/// use httpbackoff_core::backoff::{BackoffStrategy, ExponentialBackoff};
/// use std::time::Duration;
///
/// let mut backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .multiplier(2.0)
///     .randomization_factor(0.0)
///     .build();
///
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
/// ```
///
/// # Concurrency
///
/// The scheduler is owned by a single retry sequence. Sharing one instance
/// between concurrent sequences would mix their intervals and clocks; copy the
/// [`BackoffConfig`] instead and build one scheduler per sequence.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    config: BackoffConfig,
    current_interval: Duration,
    start_time: Option<Instant>,
}

impl ExponentialBackoff {
    /// Create a scheduler in its initial state.
    ///
    /// The parameters are not checked; see [`try_new`](Self::try_new).
    pub fn new(config: BackoffConfig) -> Self {
        Self {
            config,
            current_interval: config.initial_interval,
            start_time: None,
        }
    }

    /// Create a scheduler after checking the parameters with
    /// [`BackoffConfig::validate`].
    pub fn try_new(config: BackoffConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    /// Create a new builder starting from [`BackoffConfig::default`].
    pub fn builder() -> ExponentialBackoffBuilder {
        ExponentialBackoffBuilder::default()
    }

    /// The parameters this scheduler was built with.
    pub fn config(&self) -> &BackoffConfig {
        &self.config
    }

    /// The un-jittered interval the next call will be based on.
    pub fn current_interval(&self) -> Duration {
        self.current_interval
    }

    /// Time since the sequence started, or zero if it has not started.
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|start| start.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    fn grow(&mut self) {
        let max = self.config.max_interval;
        let next = self.current_interval.as_nanos() as f64 * self.config.multiplier;
        self.current_interval = if next.is_finite() && next < max.as_nanos() as f64 {
            Duration::from_nanos(next.round() as u64)
        } else {
            max
        };
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(BackoffConfig::default())
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        let start = *self.start_time.get_or_insert_with(Instant::now);

        if self.config.has_elapsed_limit() && start.elapsed() > self.config.max_elapsed_time {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                elapsed = ?start.elapsed(),
                max_elapsed_time = ?self.config.max_elapsed_time,
                "backoff budget exhausted"
            );
            return None;
        }

        let interval = self.current_interval.min(self.config.max_interval);
        let randomized = randomize(interval, self.config.randomization_factor);
        self.grow();
        Some(randomized)
    }

    fn reset(&mut self) {
        self.current_interval = self.config.initial_interval;
        self.start_time = Some(Instant::now());
    }
}

/// Uniform draw from `[interval * (1 - factor), interval * (1 + factor)]`.
///
/// A non-finite factor leaves the interval untouched.
fn randomize(interval: Duration, factor: f64) -> Duration {
    if !factor.is_finite() || factor <= 0.0 || interval.is_zero() {
        return interval;
    }
    let secs = interval.as_secs_f64();
    let delta = secs * factor;
    let low = (secs - delta).max(0.0);
    let high = secs + delta;
    let drawn = rand::thread_rng().gen_range(low..=high);
    Duration::try_from_secs_f64(drawn).unwrap_or(interval)
}

/// Largest jitter factor the builder accepts; 1.0 itself is invalid.
const MAX_RANDOMIZATION_FACTOR: f64 = 1.0 - f64::EPSILON;

/// Builder for configuring `ExponentialBackoff`.
///
/// Unset parameters fall back to [`BackoffConfig::default`].
///
/// # Examples
///
/// ```rust
/// use httpbackoff_core::backoff::ExponentialBackoff;
/// use std::time::Duration;
///
/// let backoff = ExponentialBackoff::builder()
///     .initial_interval(Duration::from_millis(100))
///     .max_interval(Duration::from_secs(30))
///     .max_elapsed_time(Duration::from_secs(120))
///     .multiplier(2.0)
///     .randomization_factor(0.1)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExponentialBackoffBuilder {
    initial_interval: Option<Duration>,
    randomization_factor: Option<f64>,
    multiplier: Option<f64>,
    max_interval: Option<Duration>,
    max_elapsed_time: Option<Duration>,
}

impl ExponentialBackoffBuilder {
    /// Set the interval before the first retry.
    ///
    /// Default: 500ms
    pub fn initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = Some(interval);
        self
    }

    /// Set the jitter factor.
    ///
    /// A factor of 0.2 lets each wait vary by ±20%. Values are clamped to
    /// `[0.0, 1.0)`; NaN is kept so that [`try_build`](Self::try_build)
    /// rejects it.
    ///
    /// Default: 0.5
    pub fn randomization_factor(mut self, factor: f64) -> Self {
        self.randomization_factor = Some(factor.clamp(0.0, MAX_RANDOMIZATION_FACTOR));
        self
    }

    /// Set the growth factor between retries.
    ///
    /// Default: 1.5
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = Some(multiplier);
        self
    }

    /// Set the cap on the un-jittered interval.
    ///
    /// Default: 60s
    pub fn max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = Some(interval);
        self
    }

    /// Set the total time budget; `Duration::ZERO` retries without limit.
    ///
    /// Default: 15min
    pub fn max_elapsed_time(mut self, elapsed: Duration) -> Self {
        self.max_elapsed_time = Some(elapsed);
        self
    }

    /// The configuration described so far.
    pub fn config(&self) -> BackoffConfig {
        let defaults = BackoffConfig::default();
        BackoffConfig {
            initial_interval: self.initial_interval.unwrap_or(defaults.initial_interval),
            randomization_factor: self
                .randomization_factor
                .unwrap_or(defaults.randomization_factor),
            multiplier: self.multiplier.unwrap_or(defaults.multiplier),
            max_interval: self.max_interval.unwrap_or(defaults.max_interval),
            max_elapsed_time: self.max_elapsed_time.unwrap_or(defaults.max_elapsed_time),
        }
    }

    /// Build the `ExponentialBackoff` instance without checking the parameters.
    pub fn build(self) -> ExponentialBackoff {
        ExponentialBackoff::new(self.config())
    }

    /// Build the `ExponentialBackoff` instance, rejecting parameters that
    /// [`BackoffConfig::validate`] refuses.
    pub fn try_build(self) -> Result<ExponentialBackoff, ConfigError> {
        ExponentialBackoff::try_new(self.config())
    }
}
