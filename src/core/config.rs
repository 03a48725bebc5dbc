//! Integration configuration from YAML

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DEFAULT_ARM_ENDPOINT: &str = "https://management.azure.com";
pub const DEFAULT_GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

/// Runtime configuration for one ingestion run
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    /// Directory (tenant) the account entity is keyed on
    #[serde(default, alias = "directoryId")]
    pub directory_id: Option<String>,

    /// Subscription scoping every resource-manager step
    #[serde(default, alias = "subscriptionId")]
    pub subscription_id: Option<String>,

    /// Whether identity-directory steps run
    #[serde(
        default,
        alias = "ingestActiveDirectory",
        deserialize_with = "deserialize_boolish"
    )]
    pub ingest_active_directory: bool,

    /// Default verified domain, shown on the account entity
    #[serde(default, alias = "defaultDomain")]
    pub default_domain: Option<String>,

    #[serde(default = "default_arm_endpoint", alias = "armEndpoint")]
    pub arm_endpoint: String,

    #[serde(default = "default_graph_endpoint", alias = "graphEndpoint")]
    pub graph_endpoint: String,

    /// Timeout for a single step (in seconds)
    #[serde(default = "default_step_timeout", alias = "stepTimeoutSecs")]
    pub step_timeout_secs: u64,

    /// Retries the HTTP transport makes for throttled responses
    #[serde(default = "default_max_retries", alias = "maxRetries")]
    pub max_retries: usize,

    #[serde(default, alias = "armToken", skip_serializing)]
    pub arm_token: Option<String>,

    #[serde(default, alias = "graphToken", skip_serializing)]
    pub graph_token: Option<String>,
}

fn default_arm_endpoint() -> String {
    DEFAULT_ARM_ENDPOINT.to_string()
}

fn default_graph_endpoint() -> String {
    DEFAULT_GRAPH_ENDPOINT.to_string()
}

fn default_step_timeout() -> u64 {
    300
}

fn default_max_retries() -> usize {
    3
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self {
            directory_id: None,
            subscription_id: None,
            ingest_active_directory: false,
            default_domain: None,
            arm_endpoint: default_arm_endpoint(),
            graph_endpoint: default_graph_endpoint(),
            step_timeout_secs: default_step_timeout(),
            max_retries: default_max_retries(),
            arm_token: None,
            graph_token: None,
        }
    }
}

impl std::fmt::Debug for IntegrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationConfig")
            .field("directory_id", &self.directory_id)
            .field("subscription_id", &self.subscription_id)
            .field("ingest_active_directory", &self.ingest_active_directory)
            .field("default_domain", &self.default_domain)
            .field("arm_endpoint", &self.arm_endpoint)
            .field("graph_endpoint", &self.graph_endpoint)
            .field("step_timeout_secs", &self.step_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("arm_token", &self.arm_token.as_ref().map(|_| "<redacted>"))
            .field("graph_token", &self.graph_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl IntegrationConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document means "no configuration"
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: IntegrationConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, endpoint) in [
            ("arm_endpoint", &self.arm_endpoint),
            ("graph_endpoint", &self.graph_endpoint),
        ] {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                anyhow::bail!("{} must be an http(s) URL, got '{}'", name, endpoint);
            }
        }
        if self.step_timeout_secs == 0 {
            anyhow::bail!("step_timeout_secs must be greater than zero");
        }
        Ok(())
    }

    /// A subscription id is present. Its format is not checked.
    pub fn has_subscription_id(&self) -> bool {
        self.subscription_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }
}

/// Parse a boolean-ish value: booleans, 1/0, and the strings
/// true/false/1/0/yes/no. Null reads as false.
pub fn parse_boolish(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn deserialize_boolish<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = serde_yaml::Value::deserialize(deserializer)?;
    match &value {
        serde_yaml::Value::Null => Ok(false),
        serde_yaml::Value::Bool(b) => Ok(*b),
        serde_yaml::Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(D::Error::custom(format!("expected 0 or 1, got {}", n))),
        },
        serde_yaml::Value::String(s) => parse_boolish(s)
            .ok_or_else(|| D::Error::custom(format!("expected a boolean, got '{}'", s))),
        other => Err(D::Error::custom(format!("expected a boolean, got {:?}", other))),
    }
}
