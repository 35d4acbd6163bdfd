//! Retried HTTP calls over reqwest
//!
//! [`Client`] carries the retry settings. The free functions here use a
//! process-wide default client, for one-off calls.

pub mod client;

pub use client::{Client, ClientBuilder};

use crate::retry::RetryResult;
use bytes::Bytes;
use reqwest::{IntoUrl, Response};
use serde::Serialize;
use std::sync::OnceLock;

fn default_client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(Client::new)
}

/// GET `url` with default retry settings.
pub async fn get(url: impl IntoUrl) -> RetryResult<Response> {
    default_client().get(url).await
}

/// HEAD `url` with default retry settings.
pub async fn head(url: impl IntoUrl) -> RetryResult<Response> {
    default_client().head(url).await
}

/// POST `body` to `url` with default retry settings.
pub async fn post(
    url: impl IntoUrl,
    content_type: &str,
    body: impl Into<Bytes>,
) -> RetryResult<Response> {
    default_client().post(url, content_type, body).await
}

/// POST `form` to `url`, form-encoded, with default retry settings.
pub async fn post_form<T: Serialize + ?Sized>(url: impl IntoUrl, form: &T) -> RetryResult<Response> {
    default_client().post_form(url, form).await
}
