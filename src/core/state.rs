//! Execution state models

use crate::core::step::StepId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExecutionStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every executed step succeeded
    Completed,
    /// At least one step failed
    Failed,
}

/// Why a step did not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    /// Disabled by its start state
    Disabled(String),
    /// A dependency was skipped
    DependencySkipped(StepId),
    /// A dependency failed
    DependencyFailed(StepId),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled(reason) => write!(f, "disabled: {}", reason),
            SkipReason::DependencySkipped(dep) => write!(f, "dependency '{}' was skipped", dep),
            SkipReason::DependencyFailed(dep) => write!(f, "dependency '{}' failed", dep),
        }
    }
}

/// State of a single step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StepState {
    /// Step is waiting for dependencies
    Pending,
    /// Step is currently running
    Running { started_at: DateTime<Utc> },
    /// Step completed successfully
    Completed {
        entities: usize,
        relationships: usize,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
    },
    /// Step handler returned an error or timed out
    Failed {
        error: String,
        started_at: DateTime<Utc>,
        failed_at: DateTime<Utc>,
    },
    /// Step never ran
    Skipped { reason: SkipReason },
}

impl StepState {
    /// Check if step is in a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepState::Completed { .. } | StepState::Failed { .. } | StepState::Skipped { .. }
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepState::Pending => "pending",
            StepState::Running { .. } => "running",
            StepState::Completed { .. } => "completed",
            StepState::Failed { .. } => "failed",
            StepState::Skipped { .. } => "skipped",
        }
    }
}
