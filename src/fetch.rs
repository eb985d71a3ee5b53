//! HTTP fetching with exponential backoff retry logic.
//!
//! One [`reqwest::Client`] is built at startup and shared by the feed,
//! scrape, and Airtable paths so they all carry the same identifying
//! User-Agent and timeouts. Only the feed fetch goes through
//! [`get_text_with_backoff`]; scraping is best-effort and persistence is
//! deliberately not retried.
//!
//! # Retry Strategy
//!
//! - Up to 5 retry attempts (see [`crate::config::FEED_MAX_RETRIES`])
//! - Exponential backoff starting at 1 second
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use std::time::{Duration, Instant};

use rand::{rng, Rng};
use reqwest::Client;
use tokio::time::sleep;
use tracing::{error, instrument, warn};

use crate::config::{CONNECT_TIMEOUT, REQUEST_TIMEOUT, USER_AGENT};
use crate::error::SyncError;

/// Delay cap for the backoff schedule.
const MAX_DELAY: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
pub fn build_client() -> Result<Client, SyncError> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;
    Ok(client)
}

/// GET a URL and return the response body, treating non-2xx as an error.
#[instrument(level = "debug", skip(client))]
pub async fn get_text(client: &Client, url: &str) -> Result<String, SyncError> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.text().await?)
}

/// GET a URL with exponential backoff on any failure.
///
/// The delay between attempts follows:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), 30s) + random_jitter(0..250ms)
/// ```
///
/// Returns the last error once `max_retries` extra attempts are exhausted.
#[instrument(level = "info", skip(client, base_delay))]
pub async fn get_text_with_backoff(
    client: &Client,
    url: &str,
    max_retries: usize,
    base_delay: Duration,
) -> Result<String, SyncError> {
    let total_t0 = Instant::now();
    let mut attempt = 0usize;

    loop {
        match get_text(client, url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                attempt += 1;

                if attempt > max_retries {
                    error!(
                        attempt,
                        max = max_retries,
                        elapsed_ms_total = total_t0.elapsed().as_millis() as u128,
                        error = %e,
                        "fetch exhausted retries"
                    );
                    return Err(e);
                }

                // backoff calc
                let mut delay = base_delay.saturating_mul(1 << (attempt - 1).min(16) as u32);
                if delay > MAX_DELAY {
                    delay = MAX_DELAY;
                }
                let jitter_ms: u64 = rng().random_range(0..=250);
                let delay = delay + Duration::from_millis(jitter_ms);

                warn!(
                    attempt,
                    max = max_retries,
                    ?delay,
                    error = %e,
                    "fetch attempt failed; backing off"
                );
                sleep(delay).await;
            }
        }
    }
}
