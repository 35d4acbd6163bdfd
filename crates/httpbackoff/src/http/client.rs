//! HTTP client with retries
//!
//! Wraps a [`reqwest::Client`] and retries every call it makes. Each call
//! gets its own scheduler, so one `Client` can be cloned and shared across
//! tasks freely.

use crate::config::Settings;
use crate::error::{BoxError, Error, Result};
use crate::notify::{RetryNotify, TracingNotify};
use crate::outcome::StatusPolicy;
use crate::retry::{Retrier, RetryResult};
use crate::traits::HttpStatus;
use bytes::Bytes;
use httpbackoff_core::backoff::{
    BackoffConfig, BackoffStrategy, ExponentialBackoff, WithMaxRetries,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{IntoUrl, Method, Request, RequestBuilder, Response};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// HTTP client that retries network failures and retryable statuses.
///
/// # Examples
///
/// ```rust,no_run
/// use httpbackoff::Client;
///
/// # async fn example() -> httpbackoff::Result<()> {
/// let client = Client::new();
/// let result = client.get("https://example.com/health").await;
///
/// println!("{} attempt(s)", result.attempts());
/// let response = result.into_result()?;
/// println!("{}", response.text().await.unwrap_or_default());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    backoff: BackoffConfig,
    max_retries: Option<u32>,
    policy: StatusPolicy,
    notify: Arc<dyn RetryNotify>,
}

impl Client {
    /// Create a client with default backoff settings and a default reqwest client.
    pub fn new() -> Self {
        ClientBuilder::default().assemble(reqwest::Client::new())
    }

    /// Create a builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from loaded settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::builder()
            .backoff(settings.backoff_config()?)
            .max_retries(settings.max_retries)
            .policy(settings.status_policy())
            .build()
    }

    /// The backoff parameters applied to every call.
    pub fn backoff_config(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// The status policy applied to every call.
    pub fn policy(&self) -> &StatusPolicy {
        &self.policy
    }

    /// Get a reference to the underlying reqwest client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }

    fn scheduler(&self) -> Box<dyn BackoffStrategy> {
        let backoff = ExponentialBackoff::new(self.backoff);
        match self.max_retries {
            Some(max) => Box::new(WithMaxRetries::new(backoff, max)),
            None => Box::new(backoff),
        }
    }

    fn retrier(&self) -> Retrier<Box<dyn BackoffStrategy>, Arc<dyn RetryNotify>> {
        Retrier::new(self.scheduler())
            .with_policy(self.policy.clone())
            .with_notify(Arc::clone(&self.notify))
    }

    /// Retry an arbitrary operation with this client's settings.
    ///
    /// `operation` performs one HTTP attempt per call.
    pub async fn retry<F, Fut, R, E>(&self, operation: F) -> RetryResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        R: HttpStatus,
        E: Into<BoxError>,
    {
        self.retrier().run(operation).await
    }

    /// Like [`retry`](Self::retry), but gives up with [`Error::Cancelled`]
    /// as soon as `token` is cancelled while waiting between attempts.
    pub async fn retry_with_cancel<F, Fut, R, E>(
        &self,
        token: CancellationToken,
        operation: F,
    ) -> RetryResult<R>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<R, E>>,
        R: HttpStatus,
        E: Into<BoxError>,
    {
        self.retrier()
            .with_cancellation(token)
            .run(operation)
            .await
    }

    /// GET `url`.
    pub async fn get(&self, url: impl IntoUrl) -> RetryResult<Response> {
        self.method(Method::GET, url).await
    }

    /// HEAD `url`.
    pub async fn head(&self, url: impl IntoUrl) -> RetryResult<Response> {
        self.method(Method::HEAD, url).await
    }

    /// POST `body` to `url` with the given content type. The body is re-sent
    /// unchanged on every attempt.
    pub async fn post(
        &self,
        url: impl IntoUrl,
        content_type: &str,
        body: impl Into<Bytes>,
    ) -> RetryResult<Response> {
        let body: Bytes = body.into();
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(body);
        self.send(request).await
    }

    /// POST `form` to `url` as `application/x-www-form-urlencoded`.
    pub async fn post_form<T: Serialize + ?Sized>(
        &self,
        url: impl IntoUrl,
        form: &T,
    ) -> RetryResult<Response> {
        self.send(self.http.post(url).form(form)).await
    }

    /// Build the request and retry it.
    pub async fn send(&self, request: RequestBuilder) -> RetryResult<Response> {
        match request.build() {
            Ok(request) => self.execute(request).await,
            Err(err) => RetryResult::not_attempted(Error::InvalidUrl(err)),
        }
    }

    /// Retry a prepared request, sending a fresh copy on every attempt.
    ///
    /// Requests whose body is a stream cannot be copied and fail with
    /// [`Error::RequestNotCloneable`] without being sent.
    pub async fn execute(&self, request: Request) -> RetryResult<Response> {
        if request.try_clone().is_none() {
            return RetryResult::not_attempted(Error::RequestNotCloneable);
        }

        tracing::debug!(method = %request.method(), url = %request.url(), "sending HTTP request");
        self.retry(|| {
            let attempt = request.try_clone();
            let http = self.http.clone();
            async move {
                match attempt {
                    Some(attempt) => http.execute(attempt).await.map_err(BoxError::from),
                    None => Err(Error::RequestNotCloneable.into()),
                }
            }
        })
        .await
    }

    async fn method(&self, method: Method, url: impl IntoUrl) -> RetryResult<Response> {
        self.send(self.http.request(method, url)).await
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("backoff", &self.backoff)
            .field("max_retries", &self.max_retries)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    http: Option<reqwest::Client>,
    backoff: BackoffConfig,
    max_retries: Option<u32>,
    policy: StatusPolicy,
    notify: Option<Arc<dyn RetryNotify>>,
}

impl ClientBuilder {
    /// Use this reqwest client for all requests.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Set the backoff parameters.
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff = config;
        self
    }

    /// Stop after this many retries even if the time budget allows more.
    pub fn max_retries(mut self, max_retries: impl Into<Option<u32>>) -> Self {
        self.max_retries = max_retries.into();
        self
    }

    /// Set the status policy.
    pub fn policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report retries to `notify` instead of logging them.
    pub fn notify(mut self, notify: impl RetryNotify + 'static) -> Self {
        self.notify = Some(Arc::new(notify));
        self
    }

    /// Build the client, validating the backoff parameters.
    pub fn build(mut self) -> Result<Client> {
        self.backoff.validate()?;
        let http = match self.http.take() {
            Some(http) => http,
            None => reqwest::Client::builder().build().map_err(Error::Client)?,
        };
        Ok(self.assemble(http))
    }

    fn assemble(self, http: reqwest::Client) -> Client {
        Client {
            http,
            backoff: self.backoff,
            max_retries: self.max_retries,
            policy: self.policy,
            notify: self.notify.unwrap_or_else(|| Arc::new(TracingNotify)),
        }
    }
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("backoff", &self.backoff)
            .field("max_retries", &self.max_retries)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use httpbackoff_core::ConfigError;
    use std::time::Duration;

    #[test]
    fn test_default_client() {
        let client = Client::new();
        assert_eq!(client.backoff_config(), &BackoffConfig::default());
        assert_eq!(client.policy(), &StatusPolicy::default());
    }

    #[test]
    fn test_builder_rejects_invalid_backoff() {
        let err = Client::builder()
            .backoff(BackoffConfig {
                initial_interval: Duration::ZERO,
                ..BackoffConfig::default()
            })
            .build()
            .unwrap_err();
        assert_matches!(err, Error::InvalidConfig(ConfigError::ZeroInitialInterval));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            max_retries: Some(2),
            retryable_statuses: vec![],
            ..Settings::from(BackoffConfig::fast())
        };
        let client = Client::from_settings(&settings).unwrap();
        assert_eq!(client.backoff_config(), &BackoffConfig::fast());
        assert_eq!(client.policy(), &StatusPolicy::strict());
        assert_eq!(client.max_retries, Some(2));
    }

    #[tokio::test]
    async fn test_retry_caps_attempts() {
        let client = Client::builder()
            .backoff(BackoffConfig::fast())
            .max_retries(2)
            .build()
            .unwrap();

        let result = client
            .retry(|| async { Ok::<_, std::io::Error>(http::StatusCode::BAD_GATEWAY) })
            .await;
        assert_eq!(result.attempts(), 3);
        assert_eq!(result.status(), Some(502));
    }

    #[tokio::test]
    async fn test_retry_with_cancel_before_wait() {
        let client = Client::builder()
            .backoff(BackoffConfig {
                initial_interval: Duration::from_secs(60),
                max_interval: Duration::from_secs(60),
                ..BackoffConfig::default()
            })
            .build()
            .unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = client
            .retry_with_cancel(token, || async {
                Ok::<_, std::io::Error>(http::StatusCode::SERVICE_UNAVAILABLE)
            })
            .await;
        assert_eq!(result.attempts(), 1);
        assert_matches!(result.error(), Some(Error::Cancelled));
    }

    #[tokio::test]
    async fn test_invalid_url_not_attempted() {
        let result = Client::new().get("not a url").await;
        assert_eq!(result.attempts(), 0);
        assert!(result.response().is_none());
        assert_matches!(result.error(), Some(Error::InvalidUrl(_)));
    }
}
