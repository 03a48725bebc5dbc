//! Ingestion run: per-step state for one invocation

use crate::core::catalog::StepCatalog;
use crate::core::state::{ExecutionStatus, SkipReason, StepState};
use crate::core::step::StepId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Counts of steps by state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub running: usize,
    pub pending: usize,
}

/// State of a single run
#[derive(Debug, Clone, Serialize)]
pub struct IngestionRun {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    /// State of every catalog step
    pub steps: BTreeMap<StepId, StepState>,
}

impl IngestionRun {
    /// Create a run with every catalog step pending
    pub fn new(catalog: &StepCatalog) -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            steps: catalog.ids().map(|id| (id, StepState::Pending)).collect(),
        }
    }

    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Close the run; it fails when any step failed
    pub fn finish(&mut self) {
        self.status = if self.counts().failed > 0 {
            ExecutionStatus::Failed
        } else {
            ExecutionStatus::Completed
        };
        self.completed_at = Some(Utc::now());
    }

    pub fn state(&self, id: StepId) -> Option<&StepState> {
        self.steps.get(&id)
    }

    pub fn set_state(&mut self, id: StepId, state: StepState) {
        self.steps.insert(id, state);
    }

    /// Pending steps whose dependencies all completed, in catalog order
    pub fn ready_steps(&self, catalog: &StepCatalog) -> Vec<StepId> {
        catalog
            .execution_order()
            .iter()
            .copied()
            .filter(|id| matches!(self.state(*id), Some(StepState::Pending)))
            .filter(|id| {
                catalog.get(*id).is_some_and(|step| {
                    step.depends_on
                        .iter()
                        .all(|dep| matches!(self.state(*dep), Some(StepState::Completed { .. })))
                })
            })
            .collect()
    }

    /// Skip pending steps whose dependency was skipped or failed.
    ///
    /// One pass in execution order reaches every transitive dependent.
    /// Returns the newly skipped steps with their reasons.
    pub fn propagate_skips(&mut self, catalog: &StepCatalog) -> Vec<(StepId, SkipReason)> {
        let mut skipped = Vec::new();

        for id in catalog.execution_order() {
            if !matches!(self.state(*id), Some(StepState::Pending)) {
                continue;
            }
            let Some(step) = catalog.get(*id) else {
                continue;
            };

            let reason = step.depends_on.iter().find_map(|dep| match self.state(*dep) {
                Some(StepState::Failed { .. }) => Some(SkipReason::DependencyFailed(*dep)),
                Some(StepState::Skipped { .. }) => Some(SkipReason::DependencySkipped(*dep)),
                _ => None,
            });

            if let Some(reason) = reason {
                self.set_state(
                    *id,
                    StepState::Skipped {
                        reason: reason.clone(),
                    },
                );
                skipped.push((*id, reason));
            }
        }

        skipped
    }

    pub fn is_complete(&self) -> bool {
        self.steps.values().all(StepState::is_terminal)
    }

    pub fn counts(&self) -> StepCounts {
        let mut counts = StepCounts {
            total: self.steps.len(),
            ..Default::default()
        };
        for state in self.steps.values() {
            match state {
                StepState::Pending => counts.pending += 1,
                StepState::Running { .. } => counts.running += 1,
                StepState::Completed { .. } => counts.completed += 1,
                StepState::Failed { .. } => counts.failed += 1,
                StepState::Skipped { .. } => counts.skipped += 1,
            }
        }
        counts
    }

    /// Fraction of steps in a terminal state (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        let counts = self.counts();
        if counts.total == 0 {
            return 0.0;
        }
        (counts.completed + counts.failed + counts.skipped) as f64 / counts.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::StepFamily;
    use crate::core::context::StepContext;
    use crate::core::step::{Step, StepError, StepGroup, StepHandler};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl StepHandler for Noop {
        async fn execute(&self, _ctx: &StepContext) -> Result<(), StepError> {
            Ok(())
        }
    }

    const A: StepId = StepId::new("a");
    const B: StepId = StepId::new("b");
    const C: StepId = StepId::new("c");
    const D: StepId = StepId::new("d");

    // a <- b <- c, and d independent
    fn catalog() -> StepCatalog {
        StepCatalog::from_families([StepFamily::new(
            "test",
            StepGroup::ResourceScope,
            vec![
                Step::new(A, "A", Noop),
                Step::new(B, "B", Noop).depends_on([A]),
                Step::new(C, "C", Noop).depends_on([B]),
                Step::new(D, "D", Noop),
            ],
        )])
        .unwrap()
    }

    fn completed() -> StepState {
        StepState::Completed {
            entities: 0,
            relationships: 0,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_ready_steps() {
        let catalog = catalog();
        let mut run = IngestionRun::new(&catalog);

        assert_eq!(run.ready_steps(&catalog), vec![A, D]);

        run.set_state(A, completed());
        assert_eq!(run.ready_steps(&catalog), vec![B, D]);
    }

    #[test]
    fn test_skips_propagate_transitively() {
        let catalog = catalog();
        let mut run = IngestionRun::new(&catalog);
        run.set_state(
            A,
            StepState::Skipped {
                reason: SkipReason::Disabled("off".to_string()),
            },
        );

        let skipped = run.propagate_skips(&catalog);
        assert_eq!(
            skipped,
            vec![
                (B, SkipReason::DependencySkipped(A)),
                (C, SkipReason::DependencySkipped(B)),
            ]
        );
        assert_eq!(run.state(D), Some(&StepState::Pending));
    }

    #[test]
    fn test_failure_skips_dependents_and_fails_run() {
        let catalog = catalog();
        let mut run = IngestionRun::new(&catalog);
        run.start();
        run.set_state(
            A,
            StepState::Failed {
                error: "boom".to_string(),
                started_at: Utc::now(),
                failed_at: Utc::now(),
            },
        );
        run.set_state(D, completed());

        let skipped = run.propagate_skips(&catalog);
        assert_eq!(skipped[0], (B, SkipReason::DependencyFailed(A)));
        assert!(run.is_complete());

        run.finish();
        assert_eq!(run.status, ExecutionStatus::Failed);
        assert_eq!(run.counts().skipped, 2);
        assert_eq!(run.progress(), 1.0);
    }

    #[test]
    fn test_skips_alone_complete_the_run() {
        let catalog = catalog();
        let mut run = IngestionRun::new(&catalog);
        for id in [A, D] {
            run.set_state(
                id,
                StepState::Skipped {
                    reason: SkipReason::Disabled("off".to_string()),
                },
            );
        }
        run.propagate_skips(&catalog);
        run.finish();
        assert_eq!(run.status, ExecutionStatus::Completed);
    }
}
