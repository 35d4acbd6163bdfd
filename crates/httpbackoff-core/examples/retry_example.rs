//! Example: Printing backoff schedules
//!
//! This example demonstrates:
//! 1. A deterministic exponential schedule (no jitter)
//! 2. Jitter impact (run multiple times to see variance)
//! 3. Capping the number of retries
//!
//! Run with:
//! ```bash
//! cargo run -p httpbackoff-core --example retry_example
//! ```

use httpbackoff_core::backoff::ZeroBackoff;
use httpbackoff_core::prelude::*;
use std::time::Duration;

fn print_schedule(label: &str, backoff: &mut dyn BackoffStrategy, steps: usize) {
    println!("\n=== {label} ===\n");
    for step in 1..=steps {
        match backoff.next_backoff() {
            Some(wait) => println!("  Retry {step}: wait {wait:?}"),
            None => {
                println!("  Retry {step}: stop");
                break;
            }
        }
    }
}

fn main() {
    let mut deterministic = ExponentialBackoff::builder()
        .initial_interval(Duration::from_millis(100))
        .multiplier(2.0)
        .max_interval(Duration::from_secs(2))
        .randomization_factor(0.0)
        .build();
    print_schedule("Exponential, no jitter", &mut deterministic, 8);

    let mut jittered = ExponentialBackoff::new(BackoffConfig::default());
    print_schedule("Exponential, default jitter", &mut jittered, 8);

    let mut capped = WithMaxRetries::new(ZeroBackoff, 3);
    print_schedule("Zero wait, at most 3 retries", &mut capped, 8);
}
