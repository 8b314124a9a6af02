use std::{env, time::Duration};

use anyhow::Result;
use rand::Rng;
use reqwest::{Client, Response, StatusCode};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/116.0.0.0 Safari/537.36";

/// Initialize the global tracing subscriber. `RUST_LOG` wins over the
/// configured default level.
pub fn init_logger(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Create a browser-like HTTP client. Honors a `SYSTEM_PROXY` environment
/// variable when set.
pub fn create_browser_client() -> Client {
    let mut builder = Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT);

    if let Ok(proxy_url) = env::var("SYSTEM_PROXY") {
        match reqwest::Proxy::all(&proxy_url) {
            Ok(proxy) => {
                tracing::debug!(proxy = %proxy_url, "Using system proxy");
                builder = builder.proxy(proxy);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to configure system proxy, continuing without");
            }
        }
    }

    builder.build().unwrap_or_else(|_| Client::new())
}

/// Add up to 50% random jitter to a delay so repeated requests do not land in
/// lockstep.
fn jittered_ms(delay_ms: u64) -> u64 {
    delay_ms + rand::thread_rng().gen_range(0..=delay_ms / 2)
}

/// Sleep for roughly `base_ms` between history pages.
pub async fn polite_pause(base_ms: u64) {
    tokio::time::sleep(Duration::from_millis(jittered_ms(base_ms))).await;
}

/// Retry a request up to `max_retries` times with jittered exponential
/// backoff. Only throttling responses (429/403) are retried; other non-2xx
/// statuses are returned for the caller to interpret.
pub async fn retry_request<F, Fut>(
    request_fn: F,
    max_retries: usize,
    initial_delay_ms: u64,
) -> Result<Response>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Response>> + Send,
{
    let mut delay_ms = initial_delay_ms;
    let mut last_error = None;

    for attempt in 0..max_retries {
        match request_fn().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }
                if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::FORBIDDEN {
                    tracing::warn!(
                        attempt = attempt + 1,
                        status = %status,
                        "Request throttled, backing off"
                    );
                    last_error = Some(anyhow::anyhow!("request failed with status {}", status));
                } else {
                    return Ok(response);
                }
            }
            Err(e) => {
                tracing::warn!(attempt = attempt + 1, error = %e, "Request failed");
                last_error = Some(e);
            }
        }

        if attempt < max_retries - 1 {
            tokio::time::sleep(Duration::from_millis(jittered_ms(delay_ms))).await;
            delay_ms *= 2;
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("failed after {} attempts", max_retries)))
}
