use anyhow::{Context, Result};
use azure_ingest::cli::commands::{load_config, RunCommand, StepsCommand, ValidateCommand};
use azure_ingest::cli::output::*;
use azure_ingest::cli::{Cli, Command};
use azure_ingest::client::{HttpTransport, ResourceClient, TransportConfig};
use azure_ingest::core::config::IntegrationConfig;
use azure_ingest::core::{resolve_step_start_states, ExecutionStatus, StepCatalog, StepServices};
use azure_ingest::execution::{ExecutionEngine, SchedulingStrategy};
use azure_ingest::export::{create_summary, write_graph};
use azure_ingest::store::InMemoryJobState;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "azure_ingest=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Run(cmd) => run_ingestion(cmd).await?,
        Command::Steps(cmd) => show_steps(cmd)?,
        Command::Validate(cmd) => validate(cmd)?,
    }

    Ok(())
}

async fn run_ingestion(cmd: &RunCommand) -> Result<()> {
    let config = load_config(cmd.config.as_deref(), &cmd.overrides)
        .context("Failed to load integration config")?;
    let catalog = Arc::new(StepCatalog::standard().context("Invalid step catalog")?);
    let start_states = resolve_step_start_states(config.as_ref(), &catalog);

    if config.is_none() {
        println!(
            "{} No configuration given; only {} will run",
            WARN,
            style("ad-account").bold()
        );
    }
    let config = Arc::new(config.unwrap_or_default());

    let transport = build_transport(&config)?;
    let client = ResourceClient::new(
        Arc::new(transport),
        config.arm_endpoint.clone(),
        config.graph_endpoint.clone(),
    );
    let job_state = Arc::new(InMemoryJobState::new());
    let services = StepServices::new(config.clone(), client, job_state.clone());

    let strategy: SchedulingStrategy = cmd.strategy.into();
    let progress = create_progress_bar(catalog.len());
    let bar = progress.clone();
    let engine = ExecutionEngine::new(catalog.clone(), strategy).with_event_handler(move |event| {
        bar.println(format_execution_event(&event));
        if is_step_finished(&event) {
            bar.inc(1);
        }
    });

    let run = engine.execute(&start_states, &services).await;
    progress.finish_and_clear();
    let run = run.context("Ingestion run could not complete")?;

    let summary = create_summary(&run, &catalog);
    println!("\n{} Ingestion summary", INFO);
    println!("{}", format_summary(&summary));

    if let Some(dir) = &cmd.output_dir {
        let entities = job_state.collected_entities().await;
        let relationships = job_state.collected_relationships().await;
        write_graph(dir, &summary, &entities, &relationships).await?;
        println!(
            "\n{} Graph written to {}",
            CHECK,
            style(dir.display()).bold()
        );
    }

    if run.status == ExecutionStatus::Failed {
        error!("{} step(s) failed", summary.counts.failed);
        std::process::exit(1);
    }
    Ok(())
}

fn build_transport(config: &IntegrationConfig) -> Result<HttpTransport> {
    let mut transport = TransportConfig::new().with_max_retries(config.max_retries);
    if let Some(token) = &config.arm_token {
        transport = transport.with_arm_token(token.clone());
    }
    if let Some(token) = &config.graph_token {
        transport = transport.with_graph_token(token.clone());
    }
    HttpTransport::new(transport).context("Failed to build HTTP client")
}

fn show_steps(cmd: &StepsCommand) -> Result<()> {
    let config = load_config(cmd.config.as_deref(), &cmd.overrides)
        .context("Failed to load integration config")?;
    let catalog = StepCatalog::standard().context("Invalid step catalog")?;
    let start_states = resolve_step_start_states(config.as_ref(), &catalog);

    if cmd.json {
        let steps: Vec<_> = catalog
            .execution_order()
            .iter()
            .map(|id| {
                serde_json::json!({
                    "id": id,
                    "group": catalog.group_of(*id).map(|g| g.as_str()),
                    "disabled": start_states[id].disabled,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    let enabled = start_states.values().filter(|s| s.is_enabled()).count();
    println!(
        "{} {} of {} steps enabled",
        INFO,
        style(enabled).cyan(),
        catalog.len()
    );
    for id in catalog.execution_order() {
        let group = catalog.group_of(*id).map(|g| g.as_str()).unwrap_or("-");
        println!(
            "  {:<60} {:<16} {}",
            id.as_str(),
            style(group).dim(),
            format_start_state(start_states[id])
        );
    }
    Ok(())
}

fn validate(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating step catalog...", INFO);

    let catalog = match StepCatalog::standard() {
        Ok(catalog) => catalog,
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    };
    println!("{} Step catalog is valid!", CHECK);
    println!("  Steps: {}", style(catalog.len()).cyan());

    if let Some(path) = &cmd.config {
        match IntegrationConfig::from_file(path) {
            Ok(config) => {
                println!("{} Configuration is valid!", CHECK);
                println!(
                    "  Directory ingestion: {}",
                    style(config.ingest_active_directory).cyan()
                );
                println!(
                    "  Subscription: {}",
                    style(config.subscription_id.as_deref().unwrap_or("<none>")).cyan()
                );
            }
            Err(e) => {
                println!("{} Validation failed:", CROSS);
                println!("  {}", style(format!("{:#}", e)).red());
                std::process::exit(1);
            }
        }
    }

    if cmd.json {
        let order: Vec<&str> = catalog.execution_order().iter().map(|id| id.as_str()).collect();
        let data = serde_json::json!({
            "steps": catalog.len(),
            "execution_order": order,
        });
        println!("\n{}", serde_json::to_string_pretty(&data)?);
    } else {
        println!("  Execution order:");
        for (i, id) in catalog.execution_order().iter().enumerate() {
            println!("    {:>2}. {}", i + 1, id);
        }
    }
    Ok(())
}
