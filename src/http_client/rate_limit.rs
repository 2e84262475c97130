//! Retry helpers for rate-limited provider APIs.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::HttpResponse;

/// Maximum retry attempts on rate limit (429) errors.
pub const MAX_RETRIES: u32 = 5;

/// Parse a Retry-After header value (seconds only, capped at 60s).
pub fn parse_retry_after(header_value: Option<&str>) -> Option<Duration> {
    let value = header_value?;
    value
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| Duration::from_secs(secs.min(60)))
}

/// Calculate exponential backoff delay for a given attempt.
pub fn backoff_delay(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay_ms.min(60_000))
}

/// Retry a request on 429 responses with exponential backoff.
///
/// Returns the first non-429 response. Once `MAX_RETRIES` is exhausted the
/// error built by `on_exhausted` (given the last Retry-After seconds) is returned.
pub async fn retry_on_rate_limit<F, Fut, E, X>(
    label: &str,
    make_request: F,
    on_exhausted: X,
) -> Result<HttpResponse, E>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<HttpResponse, E>>,
    X: FnOnce(Option<u64>) -> E,
{
    let mut attempt = 0;
    loop {
        let response = make_request().await?;

        if !response.is_rate_limited() {
            return Ok(response);
        }

        let retry_after = response.retry_after();
        let retry_after_secs = retry_after.and_then(|s| s.trim().parse::<u64>().ok());

        if attempt >= MAX_RETRIES {
            return Err(on_exhausted(retry_after_secs));
        }

        let wait = parse_retry_after(retry_after).unwrap_or_else(|| backoff_delay(attempt, 1000));

        warn!(
            "{} rate limited (attempt {}), waiting {:?}",
            label,
            attempt + 1,
            wait
        );
        tokio::time::sleep(wait).await;
        attempt += 1;
    }
}
