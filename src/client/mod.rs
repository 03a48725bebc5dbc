//! Resource client for the Azure resource-manager and graph APIs

pub mod http;

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

pub use http::{HttpTransport, TransportConfig};

/// Which remote API a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    ResourceManager,
    Graph,
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Api::ResourceManager => f.write_str("resource manager"),
            Api::Graph => f.write_str("graph"),
        }
    }
}

/// Error types for client operations
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("No access token configured for the {0} API")]
    MissingToken(Api),

    #[error("GET {url} returned {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("GET {url} still throttled after {attempts} attempts")]
    RetriesExhausted { url: String, attempts: usize },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },
}

impl ClientError {
    /// 403/404 on a child collection usually means the feature is not
    /// provisioned for that parent
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClientError::Status { status: 403 | 404, .. })
    }
}

/// Trait for issuing single GET requests - allows for different implementations
#[async_trait]
pub trait ApiTransport: Send + Sync {
    async fn get_json(&self, api: Api, url: &str) -> Result<Value, ClientError>;
}

/// Walks a paginated collection one page at a time
pub struct Pager {
    transport: Arc<dyn ApiTransport>,
    api: Api,
    next: Option<String>,
    pages: usize,
}

impl Pager {
    pub fn new(transport: Arc<dyn ApiTransport>, api: Api, url: String) -> Self {
        Self {
            transport,
            api,
            next: Some(url),
            pages: 0,
        }
    }

    /// Fetch the next page, or `None` once the collection is exhausted
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>, ClientError> {
        let Some(url) = self.next.take() else {
            return Ok(None);
        };

        let mut body = self.transport.get_json(self.api, &url).await?;
        self.pages += 1;

        self.next = body
            .get("nextLink")
            .or_else(|| body.get("@odata.nextLink"))
            .and_then(Value::as_str)
            .filter(|link| !link.is_empty())
            .map(str::to_string);

        let items = match body.get_mut("value").map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(ClientError::Decode {
                    url,
                    message: "missing 'value' array".to_string(),
                })
            }
            Some(_) => {
                return Err(ClientError::Decode {
                    url,
                    message: "'value' is not an array".to_string(),
                })
            }
        };

        debug!(
            "Fetched page {} from {} ({} items, more: {})",
            self.pages,
            url,
            items.len(),
            self.next.is_some()
        );
        Ok(Some(items))
    }

    /// Number of pages fetched so far
    pub fn pages(&self) -> usize {
        self.pages
    }
}

/// Builds request URLs and hands out pagers
#[derive(Clone)]
pub struct ResourceClient {
    transport: Arc<dyn ApiTransport>,
    arm_endpoint: String,
    graph_endpoint: String,
}

impl ResourceClient {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        arm_endpoint: impl Into<String>,
        graph_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            arm_endpoint: arm_endpoint.into().trim_end_matches('/').to_string(),
            graph_endpoint: graph_endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute resource-manager URL for a path or resource id
    pub fn arm_url(&self, path: &str, api_version: &str) -> String {
        let separator = if path.contains('?') { '&' } else { '?' };
        format!(
            "{}{}{}api-version={}",
            self.arm_endpoint,
            ensure_leading_slash(path),
            separator,
            api_version
        )
    }

    /// Absolute graph URL for a path
    pub fn graph_url(&self, path: &str) -> String {
        format!("{}{}", self.graph_endpoint, ensure_leading_slash(path))
    }

    /// Page through a resource-manager collection
    pub fn list_arm(&self, path: &str, api_version: &str) -> Pager {
        Pager::new(
            self.transport.clone(),
            Api::ResourceManager,
            self.arm_url(path, api_version),
        )
    }

    /// Page through a graph collection
    pub fn list_graph(&self, path: &str) -> Pager {
        Pager::new(self.transport.clone(), Api::Graph, self.graph_url(path))
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}
