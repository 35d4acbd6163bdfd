//! Backoff schedulers.
//!
//! A scheduler answers one question for a retry loop: how long to wait before
//! the next attempt, or whether to stop.
//!
//! # Key Types
//!
//! - [`BackoffStrategy`] - Core trait for schedulers
//! - [`ExponentialBackoff`] - Exponential growth with jitter and an elapsed-time budget
//! - [`BackoffConfig`] - Copyable parameters for [`ExponentialBackoff`]
//! - [`WithMaxRetries`] - Caps any scheduler at a number of retries
//!
//! # Examples
//!
//! ```rust
//! use httpbackoff_core::backoff::{BackoffConfig, BackoffStrategy, ExponentialBackoff};
//!
//! let mut backoff = ExponentialBackoff::new(BackoffConfig::fast());
//! backoff.reset();
//! while let Some(wait) = backoff.next_backoff() {
//!     // sleep for `wait`, then try again
//!     # let _ = wait;
//!     # break;
//! }
//! ```

mod config;
mod exponential;
mod strategy;

pub use config::BackoffConfig;
pub use exponential::{ExponentialBackoff, ExponentialBackoffBuilder};
pub use strategy::{BackoffStrategy, ConstantBackoff, StopBackoff, WithMaxRetries, ZeroBackoff};
