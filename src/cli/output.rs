//! CLI output formatting

use crate::core::{ExecutionStatus, StepStartState};
use crate::execution::ExecutionEvent;
use crate::export::RunSummary;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create a progress bar over every catalog step
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Whether an event moves a step into a terminal state
pub fn is_step_finished(event: &ExecutionEvent) -> bool {
    matches!(
        event,
        ExecutionEvent::StepCompleted { .. }
            | ExecutionEvent::StepFailed { .. }
            | ExecutionEvent::StepSkipped { .. }
    )
}

/// Format a start state for display
pub fn format_start_state(state: StepStartState) -> String {
    if state.is_enabled() {
        style("enabled").green().to_string()
    } else {
        style("disabled").dim().to_string()
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            execution_id,
            total_steps,
            enabled_steps,
        } => format!(
            "{} Starting ingestion ({}): {} of {} steps enabled",
            ROCKET,
            style(&execution_id.to_string()[..8]).dim(),
            style(enabled_steps).cyan(),
            total_steps
        ),
        ExecutionEvent::StepStarted { step_id, name } => {
            format!("{} {} {}", SPINNER, style(step_id).cyan(), style(name).dim())
        }
        ExecutionEvent::StepCompleted {
            step_id,
            entities,
            relationships,
        } => format!(
            "{} {} ({} entities, {} relationships)",
            CHECK,
            style(step_id).green(),
            entities,
            relationships
        ),
        ExecutionEvent::StepFailed { step_id, error } => {
            format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
        }
        ExecutionEvent::StepSkipped { step_id, reason } => {
            format!("{} {} ({})", SKIP, style(step_id).dim(), reason)
        }
        ExecutionEvent::RunCompleted {
            execution_id,
            status,
            counts,
        } => format!(
            "{} Ingestion ({}) {}: {} completed, {} failed, {} skipped",
            INFO,
            style(&execution_id.to_string()[..8]).dim(),
            format_status(*status),
            counts.completed,
            counts.failed,
            counts.skipped
        ),
    }
}

/// Format a run summary for display
pub fn format_summary(summary: &RunSummary) -> String {
    let mut lines = vec![
        format!("  ID: {}", style(summary.execution_id).cyan()),
        format!("  Status: {}", format_status(summary.status)),
        format!("  Started: {}", style(summary.started_at.to_rfc3339()).dim()),
    ];
    if let Some(completed) = summary.completed_at {
        if let Ok(duration) = completed.signed_duration_since(summary.started_at).to_std() {
            lines.push(format!("  Duration: {}", style(format_duration(duration)).dim()));
        }
    }
    lines.push(format!(
        "  Steps: {} completed, {} failed, {} skipped",
        style(summary.counts.completed).green(),
        style(summary.counts.failed).red(),
        style(summary.counts.skipped).dim()
    ));
    lines.push(format!(
        "  Graph: {} entities, {} relationships",
        style(summary.entities).cyan(),
        style(summary.relationships).cyan()
    ));
    for step in summary.steps.iter().filter(|s| s.error.is_some()) {
        lines.push(format!(
            "  {} {}: {}",
            CROSS,
            style(&step.id).red(),
            step.error.as_deref().unwrap_or_default()
        ));
    }
    lines.join("\n")
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
