//! Fetch a URL, retrying network failures and server errors.
//!
//! ```bash
//! cargo run --example get_with_retry --features trace -- https://httpbin.org/status/503
//!
//! # Show every retry
//! DEBUG=httpbackoff cargo run --example get_with_retry --features trace -- <url>
//! ```
//!
//! Settings are read from `HTTPBACKOFF_*` variables (see `Settings::from_env`).

use httpbackoff::{Client, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    httpbackoff::logging::init_tracing();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/status/500,200".to_string());

    let settings = Settings::from_env()?;
    let client = Client::from_settings(&settings)?;

    println!("GET {url}");
    let result = client.get(&url).await;
    println!("attempts: {}", result.attempts());

    match result.into_parts() {
        (Some(response), _, None) => {
            println!("status: {}", response.status());
            println!("{}", response.text().await?);
        }
        (response, _, Some(error)) => {
            if let Some(response) = response {
                println!("last status: {}", response.status());
            }
            println!("error: {error}");
        }
        (None, _, None) => {}
    }

    Ok(())
}
