//! Run summaries and graph export

use crate::core::{ExecutionStatus, IngestionRun, StepCatalog, StepCounts, StepState};
use crate::graph::{Entity, Relationship};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const ENTITIES_FILE: &str = "entities.json";
pub const RELATIONSHIPS_FILE: &str = "relationships.json";
pub const SUMMARY_FILE: &str = "summary.json";

/// Summary of an ingestion run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    /// When execution started
    pub started_at: DateTime<Utc>,

    /// When execution completed (if complete)
    pub completed_at: Option<DateTime<Utc>>,

    /// Progress (0.0 to 1.0)
    pub progress: f64,

    pub counts: StepCounts,

    /// Graph objects written by completed steps
    pub entities: usize,
    pub relationships: usize,

    /// Per-step outcomes, in execution order
    pub steps: Vec<StepSummary>,
}

/// Outcome of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    pub id: String,
    pub name: String,
    pub group: Option<String>,
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entities: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationships: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

/// Create a summary from a finished run
pub fn create_summary(run: &IngestionRun, catalog: &StepCatalog) -> RunSummary {
    let mut entities = 0;
    let mut relationships = 0;

    let steps = catalog
        .execution_order()
        .iter()
        .filter_map(|id| {
            let step = catalog.get(*id)?;
            let state = run.state(*id)?;
            let mut summary = StepSummary {
                id: id.to_string(),
                name: step.name.clone(),
                group: catalog.group_of(*id).map(|g| g.to_string()),
                state: state.label(),
                entities: None,
                relationships: None,
                error: None,
                skip_reason: None,
            };
            match state {
                StepState::Completed {
                    entities: e,
                    relationships: r,
                    ..
                } => {
                    entities += e;
                    relationships += r;
                    summary.entities = Some(*e);
                    summary.relationships = Some(*r);
                }
                StepState::Failed { error, .. } => summary.error = Some(error.clone()),
                StepState::Skipped { reason } => summary.skip_reason = Some(reason.to_string()),
                StepState::Pending | StepState::Running { .. } => {}
            }
            Some(summary)
        })
        .collect();

    RunSummary {
        execution_id: run.execution_id,
        status: run.status,
        started_at: run.started_at.unwrap_or_else(Utc::now),
        completed_at: run.completed_at,
        progress: run.progress(),
        counts: run.counts(),
        entities,
        relationships,
        steps,
    }
}

async fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf> {
    let path = dir.join(name);
    let json = serde_json::to_vec_pretty(value)
        .with_context(|| format!("Failed to serialize {}", name))?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Write the collected graph and the run summary into `dir`
pub async fn write_graph(
    dir: &Path,
    summary: &RunSummary,
    entities: &[Entity],
    relationships: &[Relationship],
) -> Result<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    write_json(dir, ENTITIES_FILE, entities).await?;
    write_json(dir, RELATIONSHIPS_FILE, relationships).await?;
    write_json(dir, SUMMARY_FILE, summary).await?;

    info!(
        "Wrote {} entities and {} relationships to {}",
        entities.len(),
        relationships.len(),
        dir.display()
    );
    Ok(())
}
