//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{RunCommand, StepsCommand, ValidateCommand};
use std::ffi::OsString;

/// Azure directory and resource-manager ingestion
#[derive(Debug, Parser, Clone)]
#[command(name = "azure-ingest")]
#[command(version)]
#[command(about = "Ingests Azure directory and resource-manager data into an entity graph", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run an ingestion
    Run(RunCommand),

    /// Show which steps a configuration enables
    Steps(StepsCommand),

    /// Validate the step catalog and, optionally, a configuration
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commands::SchedulingStrategyArg;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "azure-ingest",
            "run",
            "--config",
            "config.yaml",
            "--output-dir",
            "out",
            "--strategy",
            "parallel-limited",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        let Command::Run(cmd) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(cmd.config.as_deref(), Some("config.yaml"));
        assert_eq!(cmd.output_dir.as_deref(), Some(std::path::Path::new("out")));
        assert_eq!(cmd.strategy, SchedulingStrategyArg::ParallelLimited);
    }

    #[test]
    fn test_parse_steps_json() {
        let cli = Cli::try_parse_from(["azure-ingest", "steps", "--json"]).unwrap();
        let Command::Steps(cmd) = cli.command else {
            panic!("expected steps");
        };
        assert!(cmd.json);
        assert!(cmd.config.is_none());
    }

    #[test]
    fn test_rejects_bad_boolean_override() {
        let result = Cli::try_parse_from([
            "azure-ingest",
            "run",
            "--ingest-active-directory",
            "sometimes",
        ]);
        assert!(result.is_err());
    }
}
