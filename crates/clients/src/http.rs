//! Shared HTTP plumbing: client construction and bounded retry.

use std::time::Duration;

use research_core::{Config, ResearchError, Result};

const RETRY_BASE_DELAY_MS: u64 = 500;
const RETRY_MAX_DELAY_MS: u64 = 4_000;

/// Build the shared HTTP client for an adapter family.
///
/// Redirects are followed (renamed repos, status-page moves); the per-client
/// timeout covers the whole request, connect included.
pub fn build_client(config: &Config, timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(timeout)
        .build()
        .expect("HTTP client construction cannot fail with these options")
}

/// Run `op` up to `attempts` times, backing off exponentially with jitter
/// between failures. Only transport-level failures (connect, timeout) are
/// retried; HTTP status errors surface immediately.
pub async fn with_retry<T, F, Fut>(attempts: u32, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_error = None;
    for attempt in 0..attempts.max(1) {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() => {
                if attempt + 1 < attempts {
                    tokio::time::sleep(backoff_delay(attempt)).await;
                }
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_error.unwrap_or_else(|| ResearchError::Internal("retry loop exhausted".into())))
}

fn backoff_delay(attempt: u32) -> Duration {
    let base = RETRY_BASE_DELAY_MS.saturating_mul(1 << attempt.min(8));
    Duration::from_millis(base.saturating_add(jitter_ms()).min(RETRY_MAX_DELAY_MS))
}

fn jitter_ms() -> u64 {
    let mut bytes = [0u8; 2];
    if getrandom::getrandom(&mut bytes).is_err() {
        return 0;
    }
    u64::from(u16::from_be_bytes(bytes)) % 500
}

/// Extract the host of a URL, lowercased, without a leading `www.`.
pub fn url_host(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").unwrap_or(&host).to_string())
}
