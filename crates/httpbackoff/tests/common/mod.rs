//! Shared helpers for integration tests
#![allow(dead_code)]

use httpbackoff::{BackoffConfig, Client};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use wiremock::{Request, Respond, ResponseTemplate};

/// Answers with queued status codes in order, then 200 once the queue is empty.
pub struct QueuedResponses {
    statuses: Mutex<VecDeque<u16>>,
}

impl QueuedResponses {
    pub fn new(statuses: impl IntoIterator<Item = u16>) -> Self {
        Self {
            statuses: Mutex::new(statuses.into_iter().collect()),
        }
    }
}

impl Respond for QueuedResponses {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let status = self.statuses.lock().unwrap().pop_front().unwrap_or(200);
        ResponseTemplate::new(status).set_body_string(format!("status {status}"))
    }
}

/// Short waits with enough budget for a handful of retries.
pub fn quick_backoff() -> BackoffConfig {
    BackoffConfig {
        max_elapsed_time: Duration::from_secs(5),
        ..BackoffConfig::fast()
    }
}

/// reqwest client that ignores proxy settings from the environment.
pub fn direct_http() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("Failed to build reqwest client")
}

pub fn client(backoff: BackoffConfig) -> Client {
    Client::builder()
        .http_client(direct_http())
        .backoff(backoff)
        .build()
        .expect("Failed to build client")
}

/// A local URL nothing is listening on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}
