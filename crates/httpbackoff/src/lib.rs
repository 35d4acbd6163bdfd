#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Retry outbound HTTP calls with exponential backoff.
//!
//! An HTTP operation is re-invoked until it returns a 2xx, returns a status
//! that is not worth retrying, or the backoff budget is spent:
//!
//! - **Network failures** (no response) are retried
//! - **5xx** and **429** are retried; their final error reads
//!   `(Intermittent) HTTP response code {code}`
//! - **Other statuses** end the sequence at once with
//!   `(Permanent) HTTP response code {code}`
//!
//! Every call reports the last response, the number of attempts, and the
//! error, if any. The wait between attempts follows an
//! [`ExponentialBackoff`] schedule and can be cut short by a
//! [`CancellationToken`](tokio_util::sync::CancellationToken).
//!
//! # Usage
//!
//! ```rust,no_run
//! use httpbackoff::{BackoffConfig, Client};
//!
//! # async fn example() -> httpbackoff::Result<()> {
//! let client = Client::builder()
//!     .backoff(BackoffConfig::default())
//!     .max_retries(5)
//!     .build()?;
//!
//! let result = client.get("https://example.com/items").await;
//! if let Some(error) = result.error() {
//!     eprintln!("gave up after {} attempts: {error}", result.attempts());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Any future producing a response can be retried, not only reqwest calls:
//!
//! ```rust
//! use httpbackoff::{retry, BackoffConfig};
//!
//! # async fn example() {
//! let result = retry(BackoffConfig::fast(), || async {
//!     Ok::<_, std::io::Error>(http::StatusCode::OK)
//! })
//! .await;
//! assert_eq!(result.attempts(), 1);
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
#[cfg(feature = "trace")]
pub mod logging;
pub mod notify;
pub mod outcome;
pub mod retry;
pub mod traits;

// Re-export commonly used types
pub use config::Settings;
pub use error::{BadHttpResponseCode, BoxError, Error, Result};
pub use http::{Client, ClientBuilder, get, head, post, post_form};
pub use httpbackoff_core::backoff::{
    BackoffConfig, BackoffStrategy, ExponentialBackoff, WithMaxRetries,
};
pub use notify::{NoopNotify, RetryNotify, TracingNotify};
pub use outcome::{Disposition, Outcome, StatusPolicy};
pub use retry::{Retrier, RetryResult, retry};
pub use traits::HttpStatus;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use httpbackoff::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        BackoffConfig, Client, Error, ExponentialBackoff, HttpStatus, Result, Retrier,
        RetryResult, StatusPolicy,
    };
    pub use tokio_util::sync::CancellationToken;
}
