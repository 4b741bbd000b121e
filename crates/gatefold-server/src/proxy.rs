//! Image fetching for the proxy route.
//!
//! One narrow retry: a failed byte fetch is retried once after a fixed
//! delay, and the final attempt's outcome is surfaced as-is rather than
//! retried indefinitely. This is the only retry loop in the system.

use std::time::Duration;

use tracing::debug;

/// Delay between the first attempt and the single retry.
pub const RETRY_DELAY: Duration = Duration::from_millis(300);

/// Browser-ish user agent; some image hosts refuse the default one.
const USER_AGENT: &str = "Mozilla/5.0";

/// Fetch image bytes, retrying once on failure.
///
/// Returns the final upstream response — possibly still non-success, which
/// the caller maps onto its own status.
///
/// # Errors
///
/// Returns the transport error if the retry failed to connect at all.
pub async fn fetch_with_retry(
    http: &reqwest::Client,
    url: &str,
) -> Result<reqwest::Response, reqwest::Error> {
    match send(http, url).await {
        Ok(response) if response.status().is_success() => return Ok(response),
        Ok(response) => {
            debug!(status = %response.status(), "image fetch failed, retrying once");
        }
        Err(e) => {
            debug!(error = %e, "image fetch errored, retrying once");
        }
    }

    tokio::time::sleep(RETRY_DELAY).await;
    send(http, url).await
}

async fn send(http: &reqwest::Client, url: &str) -> Result<reqwest::Response, reqwest::Error> {
    http.get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await
}
