//! Per-retry notification hook.

use crate::error::Error;
use std::sync::Arc;
use std::time::Duration;

/// Observer told about every retry before the engine sleeps.
pub trait RetryNotify: Send + Sync {
    /// `error` is the failure of attempt number `attempt`; the next attempt
    /// starts after `wait`.
    fn notify(&self, error: &Error, wait: Duration, attempt: u32);
}

impl<T: RetryNotify + ?Sized> RetryNotify for Arc<T> {
    fn notify(&self, error: &Error, wait: Duration, attempt: u32) {
        (**self).notify(error, wait, attempt)
    }
}

impl<T: RetryNotify + ?Sized> RetryNotify for &T {
    fn notify(&self, error: &Error, wait: Duration, attempt: u32) {
        (**self).notify(error, wait, attempt)
    }
}

/// Logs each retry at debug level under the `httpbackoff` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotify;

impl RetryNotify for TracingNotify {
    fn notify(&self, error: &Error, wait: Duration, attempt: u32) {
        tracing::debug!(
            target: "httpbackoff",
            attempt,
            wait = ?wait,
            status = error.status_code(),
            "Error: {}",
            error
        );
    }
}

/// Ignores retries.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotify;

impl RetryNotify for NoopNotify {
    fn notify(&self, _error: &Error, _wait: Duration, _attempt: u32) {}
}

/// Adapter turning a closure into a [`RetryNotify`].
///
/// ```rust
/// use httpbackoff::notify::notify_fn;
///
/// let notify = notify_fn(|error, wait, attempt| {
///     eprintln!("attempt {attempt} failed ({error}), retrying in {wait:?}");
/// });
/// # let _ = notify;
/// ```
#[derive(Clone)]
pub struct NotifyFn<F>(F);

/// Wrap a closure as a [`RetryNotify`].
pub fn notify_fn<F>(f: F) -> NotifyFn<F>
where
    F: Fn(&Error, Duration, u32) + Send + Sync,
{
    NotifyFn(f)
}

impl<F> RetryNotify for NotifyFn<F>
where
    F: Fn(&Error, Duration, u32) + Send + Sync,
{
    fn notify(&self, error: &Error, wait: Duration, attempt: u32) {
        (self.0)(error, wait, attempt)
    }
}

impl<F> std::fmt::Debug for NotifyFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("NotifyFn")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BadHttpResponseCode;
    use std::sync::Mutex;

    #[test]
    fn test_notify_fn_receives_arguments() {
        let seen = Mutex::new(Vec::new());
        let notify = notify_fn(|error: &Error, wait, attempt| {
            seen.lock().unwrap().push((error.status_code(), wait, attempt));
        });

        let error = Error::Intermittent(BadHttpResponseCode::intermittent(503));
        notify.notify(&error, Duration::from_millis(7), 2);

        assert_eq!(
            seen.into_inner().unwrap(),
            vec![(Some(503), Duration::from_millis(7), 2)]
        );
    }

    #[test]
    fn test_arc_dyn_notify_delegates() {
        let count = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&count);
        let notify: Arc<dyn RetryNotify> = Arc::new(notify_fn(move |_: &Error, _, _| {
            *counter.lock().unwrap() += 1;
        }));

        notify.notify(&Error::Cancelled, Duration::ZERO, 1);
        notify.notify(&Error::Cancelled, Duration::ZERO, 2);
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_tracing_notify_does_not_panic_without_subscriber() {
        TracingNotify.notify(
            &Error::Network(std::io::Error::other("refused").into()),
            Duration::from_millis(1),
            1,
        );
    }
}
