//! HTTP transport backed by reqwest

use crate::client::{Api, ApiTransport, ClientError};
use async_trait::async_trait;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP transport
#[derive(Clone)]
pub struct TransportConfig {
    /// Bearer token for the resource-manager API
    pub arm_token: Option<String>,

    /// Bearer token for the graph API
    pub graph_token: Option<String>,

    /// Retries for throttled or transient responses
    pub max_retries: usize,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Base delay for exponential backoff when no Retry-After is sent
    pub retry_base_delay_ms: u64,

    /// Ceiling for any retry delay, including a server's Retry-After
    pub max_retry_delay_ms: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            arm_token: None,
            graph_token: None,
            max_retries: 3,
            timeout_secs: 60,
            retry_base_delay_ms: 500,
            max_retry_delay_ms: 30_000,
        }
    }
}

// Tokens stay out of logs
impl std::fmt::Debug for TransportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("arm_token", &self.arm_token.as_ref().map(|_| "<redacted>"))
            .field("graph_token", &self.graph_token.as_ref().map(|_| "<redacted>"))
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .field("retry_base_delay_ms", &self.retry_base_delay_ms)
            .field("max_retry_delay_ms", &self.max_retry_delay_ms)
            .finish()
    }
}

impl TransportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arm_token(mut self, token: String) -> Self {
        self.arm_token = Some(token);
        self
    }

    pub fn with_graph_token(mut self, token: String) -> Self {
        self.graph_token = Some(token);
        self
    }

    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay_ms(mut self, delay_ms: u64) -> Self {
        self.retry_base_delay_ms = delay_ms;
        self
    }

    pub fn with_max_retry_delay_ms(mut self, delay_ms: u64) -> Self {
        self.max_retry_delay_ms = delay_ms;
        self
    }
}

/// GETs JSON documents with bearer auth, retrying 429 and 5xx responses
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn token(&self, api: Api) -> Result<&str, ClientError> {
        let token = match api {
            Api::ResourceManager => self.config.arm_token.as_deref(),
            Api::Graph => self.config.graph_token.as_deref(),
        };
        token.ok_or(ClientError::MissingToken(api))
    }

    fn backoff(&self, attempt: usize, retry_after: Option<u64>) -> Duration {
        let delay_ms = match retry_after {
            Some(secs) => secs.saturating_mul(1000),
            None => {
                let factor = 1u64 << attempt.min(6);
                self.config.retry_base_delay_ms.saturating_mul(factor)
            }
        };
        Duration::from_millis(delay_ms.min(self.config.max_retry_delay_ms))
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get_json(&self, api: Api, url: &str) -> Result<Value, ClientError> {
        let token = self.token(api)?;
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!("GET {} (attempt {})", url, attempt);

            let response = self
                .client
                .get(url)
                .bearer_auth(token)
                .send()
                .await
                .map_err(|e| ClientError::Transport(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                return response.json::<Value>().await.map_err(|e| ClientError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }

            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if !retryable {
                let body = response.text().await.unwrap_or_default();
                return Err(ClientError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            if attempt > self.config.max_retries {
                return Err(ClientError::RetriesExhausted {
                    url: url.to_string(),
                    attempts: attempt,
                });
            }

            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let delay = self.backoff(attempt, retry_after);
            warn!(
                "GET {} returned {}, retrying in {}ms",
                url,
                status.as_u16(),
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}
