//! CLI command definitions

use crate::core::config::{parse_boolish, IntegrationConfig};
use crate::execution::SchedulingStrategy;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Settings that may come from flags or the environment, overriding the
/// configuration file
#[derive(Debug, Args, Clone, Default)]
pub struct ConfigOverrides {
    /// Subscription to ingest resource-manager data from
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Directory (tenant) id
    #[arg(long, env = "AZURE_DIRECTORY_ID")]
    pub directory_id: Option<String>,

    /// Ingest users, groups, and service principals
    #[arg(long, env = "AZURE_INGEST_ACTIVE_DIRECTORY", value_parser = parse_bool_arg)]
    pub ingest_active_directory: Option<bool>,

    /// Bearer token for the resource-manager API
    #[arg(long, env = "AZURE_ARM_TOKEN", hide_env_values = true)]
    pub arm_token: Option<String>,

    /// Bearer token for the graph API
    #[arg(long, env = "AZURE_GRAPH_TOKEN", hide_env_values = true)]
    pub graph_token: Option<String>,
}

impl ConfigOverrides {
    fn is_empty(&self) -> bool {
        self.subscription_id.is_none()
            && self.directory_id.is_none()
            && self.ingest_active_directory.is_none()
            && self.arm_token.is_none()
            && self.graph_token.is_none()
    }

    pub fn apply(&self, config: &mut IntegrationConfig) {
        if let Some(id) = &self.subscription_id {
            config.subscription_id = Some(id.clone());
        }
        if let Some(id) = &self.directory_id {
            config.directory_id = Some(id.clone());
        }
        if let Some(ingest) = self.ingest_active_directory {
            config.ingest_active_directory = ingest;
        }
        if let Some(token) = &self.arm_token {
            config.arm_token = Some(token.clone());
        }
        if let Some(token) = &self.graph_token {
            config.graph_token = Some(token.clone());
        }
    }
}

/// Load the configuration file (if any) and apply overrides.
///
/// With neither a file nor an override there is no configuration at all.
pub fn load_config(
    path: Option<&str>,
    overrides: &ConfigOverrides,
) -> Result<Option<IntegrationConfig>> {
    let mut config = match path {
        Some(path) => IntegrationConfig::from_file(path)?,
        None if overrides.is_empty() => return Ok(None),
        None => IntegrationConfig::default(),
    };
    overrides.apply(&mut config);
    Ok(Some(config))
}

/// Run an ingestion
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to integration YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory to write entities, relationships, and the run summary to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Scheduling strategy
    #[arg(long, value_enum, default_value_t = SchedulingStrategyArg::Sequential)]
    pub strategy: SchedulingStrategyArg,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Show the enablement map
#[derive(Debug, Args, Clone)]
pub struct StepsCommand {
    /// Path to integration YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: ConfigOverrides,
}

/// Validate the catalog and configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to integration YAML file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Scheduling strategy argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchedulingStrategyArg {
    Sequential,
    Parallel,
    #[clap(name = "parallel-limited")]
    ParallelLimited,
}

impl From<SchedulingStrategyArg> for SchedulingStrategy {
    fn from(arg: SchedulingStrategyArg) -> Self {
        match arg {
            SchedulingStrategyArg::Sequential => SchedulingStrategy::Sequential,
            SchedulingStrategyArg::Parallel => SchedulingStrategy::Parallel,
            SchedulingStrategyArg::ParallelLimited => SchedulingStrategy::LimitedParallel(4),
        }
    }
}

/// Parse a boolean-ish flag value
pub fn parse_bool_arg(s: &str) -> Result<bool, String> {
    parse_boolish(s).ok_or_else(|| format!("Invalid boolean: {}", s))
}
