//! Paced HTTP Dispatcher for the Printful API
//!
//! Printful enforces one shared rate budget per credential, so every outbound
//! call goes through a single serial queue. The queue is a fair
//! (FIFO) async mutex guarding the time the previous call completed; a caller
//! holds it for the whole request, which serializes calls in submission order.

use reqwest::{Client, Method};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use crate::providers::traits::{ProviderError, ProviderResult};

/// Default minimum gap between two upstream calls
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(3000);

/// Serial pacing gate
///
/// At most one operation runs at a time, operations start in the order they
/// asked for the gate, and each one starts no sooner than `min_interval`
/// after the previous one completed.
pub struct Pacer {
    min_interval: Duration,

    /// Completion time of the previous operation
    last_completed: Mutex<Option<Instant>>,
}

impl Pacer {
    /// Create a new pacer
    pub fn new(min_interval: Duration) -> Self {
        Pacer {
            min_interval,
            last_completed: Mutex::new(None),
        }
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait for our turn and the interval, then run `operation`
    pub async fn run<F, Fut, T>(&self, operation: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let mut last_completed = self.last_completed.lock().await;

        if let Some(previous) = *last_completed {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                info!(wait_ms = wait.as_millis() as u64, "Respecting Printful rate limit");
                tokio::time::sleep(wait).await;
            }
        }

        let result = operation().await;
        *last_completed = Some(Instant::now());
        result
    }
}

/// Dispatcher for authenticated, paced Printful requests
pub struct RequestDispatcher {
    /// Inner HTTP client
    client: Client,

    /// API base URL without trailing slash
    base_url: String,

    /// Bearer token
    api_key: String,

    /// Shared pacing gate
    pacer: Pacer,
}

impl RequestDispatcher {
    /// Create a new dispatcher
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. `https://api.printful.com`
    /// * `api_key` - Printful private token
    /// * `min_interval` - Minimum gap between calls
    /// * `timeout` - Per-request timeout
    pub fn new(
        base_url: &str,
        api_key: &str,
        min_interval: Duration,
        timeout: Duration,
    ) -> ProviderResult<Self> {
        if api_key.is_empty() {
            return Err(ProviderError::NotConfigured("Printful API key is required".to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("mockup-resolver/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(RequestDispatcher {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            pacer: Pacer::new(min_interval),
        })
    }

    /// Configured minimum interval
    pub fn min_interval(&self) -> Duration {
        self.pacer.min_interval()
    }

    /// Paced GET
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> ProviderResult<Value> {
        self.execute(Method::GET, path, query, None).await
    }

    /// Paced POST with a JSON body
    pub async fn post(&self, path: &str, body: &Value) -> ProviderResult<Value> {
        self.execute(Method::POST, path, &[], Some(body)).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ProviderResult<Value> {
        let url = format!("{}{}", self.base_url, path);

        self.pacer
            .run(|| async {
                debug!(method = %method, path = %path, has_body = body.is_some(), "Printful request");

                let mut builder = self
                    .client
                    .request(method.clone(), &url)
                    .bearer_auth(&self.api_key);
                if !query.is_empty() {
                    builder = builder.query(query);
                }
                if let Some(body) = body {
                    builder = builder.json(body);
                }

                let response = builder.send().await?;
                let status = response.status();
                let text = response.text().await?;

                if !status.is_success() {
                    error!(method = %method, path = %path, status = status.as_u16(), "Printful API request failed");
                    debug!(body = %text, "Printful error body");

                    if status == reqwest::StatusCode::NOT_FOUND {
                        return Err(ProviderError::NotFound { path: path.to_string(), body: text });
                    }
                    return Err(ProviderError::Upstream { status: status.as_u16(), body: text });
                }

                if text.trim().is_empty() {
                    return Ok(Value::Null);
                }

                let payload: Value = serde_json::from_str(&text).map_err(|e| {
                    ProviderError::ParseError(format!(
                        "JSON parse error: {} - Body: {}",
                        e,
                        truncate(&text, 500)
                    ))
                })?;
                trace!(path = %path, payload = %payload, "Printful response payload");

                Ok::<Value, ProviderError>(payload)
            })
            .await
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
