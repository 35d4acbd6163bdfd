#![deny(unsafe_code)]
#![warn(missing_docs)]

//! Backoff scheduling for retry loops.
//!
//! This crate computes *when* to retry. It knows nothing about HTTP or about
//! the operation being retried; the `httpbackoff` crate drives it.
//!
//! - **Exponential backoff** with jitter, an interval cap and an elapsed-time budget
//! - **Attempt caps** via [`WithMaxRetries`](backoff::WithMaxRetries)
//! - **Simple schedulers** (constant, zero, stop) for composition and tests
//!
//! # Examples
//!
//! ```rust
//! use httpbackoff_core::prelude::*;
//! use std::time::Duration;
//!
//! let mut backoff = ExponentialBackoff::builder()
//!     .initial_interval(Duration::from_millis(100))
//!     .randomization_factor(0.0)
//!     .build();
//!
//! assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
//! ```

pub mod backoff;
pub mod error;

pub use error::ConfigError;

/// Convenient re-exports of commonly used items.
///
/// ```rust
/// use httpbackoff_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backoff::{
        BackoffConfig, BackoffStrategy, ExponentialBackoff, ExponentialBackoffBuilder,
        WithMaxRetries,
    };
    pub use crate::error::ConfigError;
}
