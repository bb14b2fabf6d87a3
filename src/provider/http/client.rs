//! HTTP client wrapper for LLM gateway requests.

use crate::provider::error::Error;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use serde::{Serialize, de::DeserializeOwned};
use std::future::Future;
use std::time::Duration;

/// Connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// First backoff delay; doubled after every failed attempt.
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
/// Upper bound for a single backoff sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Authentication configuration.
#[derive(Clone)]
pub enum AuthConfig {
    /// No authentication (local gateways).
    None,
    /// Bearer token authentication (Authorization: Bearer {token}).
    Bearer(String),
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}

/// HTTP client for LLM API requests with bounded retries.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: String,
    auth: AuthConfig,
    max_retries: u32,
}

impl HttpClient {
    /// Create a new HTTP client with the given request timeout.
    pub fn new(base_url: impl Into<String>, auth: AuthConfig, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
            max_retries: 0,
        }
    }

    /// Retry transient failures up to `max_retries` extra attempts.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Build headers including authentication.
    fn build_headers(&self) -> Result<HeaderMap, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let AuthConfig::Bearer(token) = &self.auth {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| Error::Api("Bearer token contains invalid header characters".into()))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    /// POST a JSON body and deserialize the response, retrying transient failures.
    pub async fn post_json<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, Error> {
        self.with_retries(path, || async {
            let response = self
                .client
                .post(self.url(path))
                .headers(self.build_headers()?)
                .json(body)
                .send()
                .await?;
            read_json(response).await
        })
        .await
    }

    /// GET a JSON document, retrying transient failures.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, Error> {
        self.with_retries(path, || async {
            let response = self
                .client
                .get(self.url(path))
                .headers(self.build_headers()?)
                .send()
                .await?;
            read_json(response).await
        })
        .await
    }

    /// Single-shot probe: true when the endpoint answers with a success status.
    pub async fn probe(&self, path: &str, timeout: Duration) -> bool {
        let Ok(headers) = self.build_headers() else {
            return false;
        };
        match self
            .client
            .get(self.url(path))
            .headers(headers)
            .timeout(timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(path, error = %e, "Probe request failed");
                false
            }
        }
    }

    async fn with_retries<R, F, Fut>(&self, path: &str, op: F) -> Result<R, Error>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<R, Error>>,
    {
        let mut attempt = 0;
        let mut backoff = INITIAL_BACKOFF;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = match &e {
                        Error::RateLimited {
                            retry_after: Some(secs),
                        } => Duration::from_secs(*secs).min(MAX_BACKOFF),
                        _ => backoff,
                    };
                    tracing::warn!(
                        path,
                        attempt,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient LLM request failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn read_json<R: DeserializeOwned>(response: reqwest::Response) -> Result<R, Error> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(&response);
        return Err(Error::RateLimited { retry_after });
    }
    let text = response.text().await?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str(&text)
        .map_err(|e| Error::Api(format!("Failed to parse response: {e}\nBody: {text}")))
}

/// Extract and parse `Retry-After` header from a response.
fn parse_retry_after(response: &reqwest::Response) -> Option<u64> {
    let value = response.headers().get(RETRY_AFTER)?;
    parse_retry_after_value(value.to_str().ok()?)
}

/// Parse a `Retry-After` header value as whole seconds, rounding fractions up.
/// HTTP-date values and non-finite numbers yield `None`.
fn parse_retry_after_value(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<u64>() {
        return Some(secs.max(1));
    }
    s.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && *f > 0.0)
        .map(|f| (f.ceil() as u64).max(1))
}
