//! HTTP retry policy with exponential backoff.
//!
//! Mirrors the behavior of the official OpenAI SDKs:
//!
//! - Max retries: 2 (3 total attempts)
//! - Backoff: 500ms doubling per attempt, capped at 8s, down-jittered by up to 25%
//! - Retryable: HTTP 408, 409, 429, 5xx and connect/timeout errors
//! - `x-should-retry: true|false` overrides the status check
//! - `Retry-After` / `Retry-After-Ms` replace the computed delay when in (0, 60s)
//!
//! Every attempt carries `X-Stainless-Retry-Count` and the same `Idempotency-Key`.

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode, header::HeaderMap};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Down-jitter factor (0.25 = up to 25% shorter).
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            jitter_factor: 0.25,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Server-requested delay from `Retry-After-Ms` (float ms) or `Retry-After` (int s).
///
/// Values outside `(0, 60s)` are ignored.
#[must_use]
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let in_range = |d: Duration| d > Duration::ZERO && d < Duration::from_secs(60);

    let from_ms = headers
        .get("retry-after-ms")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| Duration::from_secs_f64(ms / 1000.0))
        .filter(|d| in_range(*d));
    if from_ms.is_some() {
        return from_ms;
    }

    headers
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .filter(|d| in_range(*d))
}

#[must_use]
pub fn should_retry(status: StatusCode, headers: &HeaderMap) -> bool {
    if let Some(value) = headers.get("x-should-retry").and_then(|v| v.to_str().ok()) {
        if value.eq_ignore_ascii_case("true") {
            return true;
        }
        if value.eq_ignore_ascii_case("false") {
            return false;
        }
    }

    matches!(status.as_u16(), 408 | 409 | 429 | 500..=599)
}

/// Delay before retry number `attempt + 1`.
#[must_use]
pub fn backoff_delay(attempt: u32, config: &RetryConfig, headers: Option<&HeaderMap>) -> Duration {
    if let Some(delay) = headers.and_then(parse_retry_after) {
        return delay;
    }

    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(attempt.min(30) as i32);
    let capped = base.min(config.max_delay.as_secs_f64());
    let jitter = 1.0 - rand::random::<f64>() * config.jitter_factor;
    Duration::from_secs_f64(capped * jitter)
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Result of [`send_with_retry`].
#[derive(Debug)]
pub enum RetryOutcome {
    /// 2xx response.
    Success(Response),
    /// Final non-2xx response, kept for error body inspection.
    HttpError(Response),
    /// Transport failure on the last attempt made.
    Transport { attempts: u32, source: reqwest::Error },
}

/// Send the request built by `build_request`, retrying transient failures.
///
/// `build_request` is called once per attempt. `timeout` is advertised to the
/// server in `X-Stainless-Timeout`; the client enforces its own timeout.
pub async fn send_with_retry<F>(
    build_request: F,
    timeout: Option<Duration>,
    config: &RetryConfig,
) -> RetryOutcome
where
    F: Fn() -> RequestBuilder,
{
    let idempotency_key = format!("stainless-retry-{}", Uuid::new_v4());
    let mut attempt = 0u32;

    loop {
        let mut request = build_request()
            .header("X-Stainless-Retry-Count", attempt.to_string())
            .header("Idempotency-Key", &idempotency_key);
        if let Some(timeout) = timeout {
            request = request.header("X-Stainless-Timeout", timeout.as_secs().to_string());
        }
        let can_retry = attempt < config.max_retries;

        let delay = match request.send().await {
            Ok(response) if response.status().is_success() => {
                return RetryOutcome::Success(response);
            }
            Ok(response) => {
                if !(can_retry && should_retry(response.status(), response.headers())) {
                    return RetryOutcome::HttpError(response);
                }
                let delay = backoff_delay(attempt, config, Some(response.headers()));
                tracing::debug!(
                    status = %response.status(),
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after error status"
                );
                delay
            }
            Err(error) => {
                if !(can_retry && is_retryable_error(&error)) {
                    return RetryOutcome::Transport {
                        attempts: attempt + 1,
                        source: error,
                    };
                }
                let delay = backoff_delay(attempt, config, None);
                tracing::debug!(
                    %error,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis(),
                    "Retrying request after connection error"
                );
                delay
            }
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn parses_retry_after_ms_first() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after-ms", HeaderValue::from_static("1500"));
        headers.insert("retry-after", HeaderValue::from_static("5"));
        assert_eq!(
            parse_retry_after(&headers),
            Some(Duration::from_millis(1500))
        );
    }

    #[test]
    fn parses_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("5"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(5)));
    }

    #[test]
    fn ignores_out_of_range_retry_after() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("120"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert("retry-after", HeaderValue::from_static("0"));
        assert_eq!(parse_retry_after(&headers), None);

        headers.clear();
        headers.insert("retry-after-ms", HeaderValue::from_static("NaN"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn retryable_statuses() {
        let headers = HeaderMap::new();
        for status in [408, 409, 429, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(status).unwrap();
            assert!(should_retry(status, &headers), "{status}");
        }
        for status in [400, 401, 403, 404, 422] {
            let status = StatusCode::from_u16(status).unwrap();
            assert!(!should_retry(status, &headers), "{status}");
        }
    }

    #[test]
    fn should_retry_header_overrides_status() {
        let mut headers = HeaderMap::new();
        headers.insert("x-should-retry", HeaderValue::from_static("true"));
        assert!(should_retry(StatusCode::BAD_REQUEST, &headers));

        headers.insert("x-should-retry", HeaderValue::from_static("false"));
        assert!(!should_retry(StatusCode::TOO_MANY_REQUESTS, &headers));
    }

    #[test]
    fn backoff_stays_within_jitter_window() {
        let config = RetryConfig::default();
        for _ in 0..100 {
            let first = backoff_delay(0, &config, None);
            assert!(first >= Duration::from_millis(375));
            assert!(first <= Duration::from_millis(500));

            let capped = backoff_delay(10, &config, None);
            assert!(capped >= Duration::from_secs(6));
            assert!(capped <= Duration::from_secs(8));
        }
    }

    #[test]
    fn backoff_prefers_server_delay() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("3"));
        let delay = backoff_delay(0, &RetryConfig::default(), Some(&headers));
        assert_eq!(delay, Duration::from_secs(3));
    }
}
