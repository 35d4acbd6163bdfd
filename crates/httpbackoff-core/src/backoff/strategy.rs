//! The scheduler trait and the simple schedulers built on it.

use std::time::Duration;

/// A source of wait intervals for one retry sequence.
///
/// A scheduler is stateful: every call to [`next_backoff`](Self::next_backoff)
/// advances it. Each independent retry sequence needs its own instance, and
/// [`reset`](Self::reset) must be called before a sequence starts.
///
/// # Examples
///
/// ```rust
/// use httpbackoff_core::backoff::{BackoffStrategy, ConstantBackoff};
/// use std::time::Duration;
///
/// let mut backoff = ConstantBackoff::new(Duration::from_millis(10));
/// backoff.reset();
/// assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(10)));
/// ```
pub trait BackoffStrategy: Send {
    /// Wait interval before the next attempt.
    ///
    /// # Returns
    /// - `Some(Duration)`: wait this long, then try again
    /// - `None`: stop retrying
    fn next_backoff(&mut self) -> Option<Duration>;

    /// Restore the scheduler to its initial state for a fresh sequence.
    fn reset(&mut self);
}

impl<B: BackoffStrategy + ?Sized> BackoffStrategy for Box<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

impl<B: BackoffStrategy + ?Sized> BackoffStrategy for &mut B {
    fn next_backoff(&mut self) -> Option<Duration> {
        (**self).next_backoff()
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Retries immediately, forever.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroBackoff;

impl BackoffStrategy for ZeroBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(Duration::ZERO)
    }

    fn reset(&mut self) {}
}

/// Never retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopBackoff;

impl BackoffStrategy for StopBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        None
    }

    fn reset(&mut self) {}
}

/// Waits the same interval before every retry, forever.
#[derive(Debug, Clone, Copy)]
pub struct ConstantBackoff {
    interval: Duration,
}

impl ConstantBackoff {
    /// Create a scheduler that always waits `interval`.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl BackoffStrategy for ConstantBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        Some(self.interval)
    }

    fn reset(&mut self) {}
}

/// Caps another scheduler at a fixed number of retries.
///
/// After `max_retries` intervals have been handed out, the wrapped scheduler
/// is no longer consulted and `None` is returned. The cap applies to retries,
/// so the operation runs at most `max_retries + 1` times.
///
/// ```rust
/// use httpbackoff_core::backoff::{BackoffStrategy, WithMaxRetries, ZeroBackoff};
///
/// let mut backoff = WithMaxRetries::new(ZeroBackoff, 2);
/// assert!(backoff.next_backoff().is_some());
/// assert!(backoff.next_backoff().is_some());
/// assert!(backoff.next_backoff().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct WithMaxRetries<B> {
    inner: B,
    max_retries: u32,
    retries: u32,
}

impl<B: BackoffStrategy> WithMaxRetries<B> {
    /// Wrap `inner`, allowing at most `max_retries` retries.
    pub fn new(inner: B, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            retries: 0,
        }
    }

    /// Number of retries handed out since the last reset.
    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// The wrapped scheduler.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: BackoffStrategy> BackoffStrategy for WithMaxRetries<B> {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.retries >= self.max_retries {
            return None;
        }
        let next = self.inner.next_backoff()?;
        self.retries += 1;
        Some(next)
    }

    fn reset(&mut self) {
        self.retries = 0;
        self.inner.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_backoff_never_stops() {
        let mut backoff = ZeroBackoff;
        for _ in 0..100 {
            assert_eq!(backoff.next_backoff(), Some(Duration::ZERO));
        }
    }

    #[test]
    fn test_stop_backoff_always_stops() {
        let mut backoff = StopBackoff;
        assert_eq!(backoff.next_backoff(), None);
        backoff.reset();
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn test_constant_backoff() {
        let mut backoff = ConstantBackoff::new(Duration::from_millis(250));
        for _ in 0..5 {
            assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(250)));
        }
    }

    #[test]
    fn test_with_max_retries_caps_and_resets() {
        let mut backoff = WithMaxRetries::new(ConstantBackoff::new(Duration::from_millis(1)), 3);

        for _ in 0..3 {
            assert!(backoff.next_backoff().is_some());
        }
        assert_eq!(backoff.retries(), 3);
        assert_eq!(backoff.next_backoff(), None);
        assert_eq!(backoff.next_backoff(), None);

        backoff.reset();
        assert_eq!(backoff.retries(), 0);
        assert!(backoff.next_backoff().is_some());
    }

    #[test]
    fn test_with_max_retries_zero_never_retries() {
        let mut backoff = WithMaxRetries::new(ZeroBackoff, 0);
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn test_with_max_retries_respects_inner_stop() {
        let mut backoff = WithMaxRetries::new(StopBackoff, 10);
        assert_eq!(backoff.next_backoff(), None);
        // A stop from the inner scheduler does not consume a retry.
        assert_eq!(backoff.retries(), 0);
    }

    #[test]
    fn test_boxed_strategy_delegates() {
        let mut backoff: Box<dyn BackoffStrategy> =
            Box::new(ConstantBackoff::new(Duration::from_secs(2)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_secs(2)));
    }
}
