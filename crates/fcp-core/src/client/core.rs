//! Core HTTP client for the FCP server.
//!
//! Wraps a pooled reqwest client with request-level retry logic: transient
//! statuses (429/502/503/504) and connection/timeout errors are retried
//! with exponential backoff and jitter, honoring the server's Retry-After
//! header on rate limits.

use crate::client::error::ClientError;
use crate::config::Config;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Default maximum number of retries per request.
const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default delay before the first retry.
const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
/// Backoff multiplier between retries.
const RETRY_BACKOFF: f64 = 2.0;
/// HTTP statuses retried besides 429.
const RETRYABLE_STATUS_CODES: [u16; 3] = [502, 503, 504];
/// Default cap on response body size (10MB).
const DEFAULT_MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024;

/// HTTP client for the FCP server with retry logic and connection pooling.
///
/// Constructed explicitly and passed to callers; holds no process-wide
/// state, so dropping it releases the connection pool deterministically.
#[derive(Debug, Clone)]
pub struct FcpClient {
    http: reqwest::Client,
    base_url: String,
    user_id: String,
    max_retries: u32,
    retry_delay: Duration,
    max_response_size: usize,
}

impl FcpClient {
    /// Create a client from configuration.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert("X-Client-Type", HeaderValue::from_static("cli"));
        if let Some(token) = &config.auth_token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ClientError::InvalidResponse(format!("invalid auth token: {}", e)))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("fcp-cli/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout())
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ClientError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
            user_id: config.user_id.clone(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_response_size: DEFAULT_MAX_RESPONSE_SIZE,
        })
    }

    /// Override the retry schedule (primarily for tests).
    pub fn with_retry(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    /// The user ID sent with write requests.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Check server health.
    pub async fn health_check(&self) -> Result<Value, ClientError> {
        self.request(Method::GET, "/health/", None).await
    }

    /// Issue a request with retry, returning the parsed JSON body.
    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut delay = self.retry_delay;

        for attempt in 0..=self.max_retries {
            let mut req = self.http.request(method.clone(), &url);
            if let Some(json) = body {
                req = req.json(json);
            }

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_client_error() || status.is_server_error() {
                        if attempt < self.max_retries && Self::is_retryable_status(status) {
                            let wait = if status == StatusCode::TOO_MANY_REQUESTS {
                                let hint = parse_retry_after(resp.headers());
                                warn!(
                                    path,
                                    wait_secs = hint.unwrap_or(delay).as_secs(),
                                    attempt = attempt + 1,
                                    max_retries = self.max_retries,
                                    "Rate limited, waiting before retry"
                                );
                                hint.unwrap_or(delay)
                            } else {
                                warn!(
                                    path,
                                    status = status.as_u16(),
                                    attempt = attempt + 1,
                                    max_retries = self.max_retries,
                                    "Retrying request"
                                );
                                jittered(delay)
                            };
                            tokio::time::sleep(wait).await;
                            delay = delay.mul_f64(RETRY_BACKOFF);
                            continue;
                        }
                        return Err(Self::classify_status(status, path, resp.headers()));
                    }

                    let bytes = resp
                        .bytes()
                        .await
                        .map_err(|e| ClientError::Connection(e.to_string()))?;
                    if self.max_response_size > 0 && bytes.len() > self.max_response_size {
                        return Err(ClientError::ResponseTooLarge {
                            size: bytes.len(),
                            max: self.max_response_size,
                        });
                    }
                    return serde_json::from_slice(&bytes)
                        .map_err(|e| ClientError::InvalidResponse(e.to_string()));
                }
                Err(e) => {
                    let retryable = e.is_timeout() || e.is_connect();
                    if retryable && attempt < self.max_retries {
                        warn!(
                            path,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Connection error, retrying: {}",
                            e
                        );
                        tokio::time::sleep(jittered(delay)).await;
                        delay = delay.mul_f64(RETRY_BACKOFF);
                        continue;
                    }
                    return Err(if e.is_timeout() {
                        ClientError::Timeout(e.to_string())
                    } else {
                        ClientError::Connection(e.to_string())
                    });
                }
            }
        }

        Err(ClientError::Connection(format!(
            "request to {} failed after {} retries",
            path, self.max_retries
        )))
    }

    fn is_retryable_status(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || RETRYABLE_STATUS_CODES.contains(&status.as_u16())
    }

    fn classify_status(status: StatusCode, path: &str, headers: &HeaderMap) -> ClientError {
        match status {
            StatusCode::NOT_FOUND => ClientError::NotFound(path.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ClientError::Auth { status: status.as_u16() }
            }
            StatusCode::TOO_MANY_REQUESTS => {
                ClientError::RateLimited { retry_after: parse_retry_after(headers) }
            }
            s if s.is_server_error() => ClientError::Server { status: s.as_u16() },
            s => ClientError::Unexpected {
                status: s.as_u16(),
                message: s.canonical_reason().unwrap_or("HTTP error").to_string(),
            },
        }
    }
}

/// Parse the Retry-After header as whole seconds.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Add up to 10% random jitter to a backoff delay.
fn jittered(delay: Duration) -> Duration {
    let jitter = rand::thread_rng().gen_range(0.0..0.1);
    delay + delay.mul_f64(jitter)
}
