//! Main execution engine - orchestrates an ingestion run

use crate::core::{
    ExecutionStatus, IngestionRun, SkipReason, StepCatalog, StepCounts, StepId, StepServices,
    StepStartStates, StepState,
};
use crate::execution::{ExecutionResult, ExecutionScheduler, SchedulingStrategy, StepExecutor};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        execution_id: Uuid,
        total_steps: usize,
        enabled_steps: usize,
    },
    StepStarted {
        step_id: StepId,
        name: String,
    },
    StepCompleted {
        step_id: StepId,
        entities: usize,
        relationships: usize,
    },
    StepFailed {
        step_id: StepId,
        error: String,
    },
    StepSkipped {
        step_id: StepId,
        reason: SkipReason,
    },
    RunCompleted {
        execution_id: Uuid,
        status: ExecutionStatus,
        counts: StepCounts,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Errors that stop a run from starting or finishing
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("No start state for step '{0}'")]
    MissingStartState(StepId),

    #[error("Start state given for unknown step '{0}'")]
    UnknownStep(StepId),

    #[error("Run stalled with steps still pending: {}", join_ids(.0))]
    Stalled(Vec<StepId>),

    #[error("Step task failed to join: {0}")]
    Join(String),
}

fn join_ids(ids: &[StepId]) -> String {
    ids.iter().map(StepId::as_str).collect::<Vec<_>>().join(", ")
}

/// Main ingestion execution engine
pub struct ExecutionEngine {
    catalog: Arc<StepCatalog>,
    scheduler: ExecutionScheduler,
    event_handlers: Vec<EventHandler>,
}

impl ExecutionEngine {
    pub fn new(catalog: Arc<StepCatalog>, strategy: SchedulingStrategy) -> Self {
        Self {
            catalog,
            scheduler: ExecutionScheduler::new(strategy),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.add_event_handler(handler);
        self
    }

    /// Emit an event to all handlers
    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Every catalog step needs exactly one decision, and nothing else
    fn check_start_states(&self, start_states: &StepStartStates) -> Result<(), EngineError> {
        for id in self.catalog.ids() {
            if !start_states.contains_key(&id) {
                return Err(EngineError::MissingStartState(id));
            }
        }
        for id in start_states.keys() {
            if !self.catalog.contains(*id) {
                return Err(EngineError::UnknownStep(*id));
            }
        }
        Ok(())
    }

    /// Execute every enabled step whose dependencies complete
    pub async fn execute(
        &self,
        start_states: &StepStartStates,
        services: &StepServices,
    ) -> Result<IngestionRun, EngineError> {
        self.check_start_states(start_states)?;

        let mut run = IngestionRun::new(&self.catalog);
        let execution_id = run.execution_id;
        let enabled_steps = start_states.values().filter(|s| s.is_enabled()).count();

        info!(
            "Starting ingestion run {} ({} of {} steps enabled, {:?} scheduling)",
            execution_id,
            enabled_steps,
            self.catalog.len(),
            self.scheduler.strategy()
        );
        run.start();
        self.emit_event(ExecutionEvent::RunStarted {
            execution_id,
            total_steps: self.catalog.len(),
            enabled_steps,
        });

        for id in self.catalog.execution_order() {
            if start_states[id].disabled {
                let reason = SkipReason::Disabled(
                    self.catalog
                        .group_of(*id)
                        .map(|group| group.disabled_reason())
                        .unwrap_or("disabled")
                        .to_string(),
                );
                self.mark_step_skipped(&mut run, *id, reason);
            }
        }
        self.propagate_skips(&mut run);

        let executor = Arc::new(StepExecutor::new(services.config.step_timeout_secs));
        let mut in_flight: JoinSet<(StepId, DateTime<Utc>, ExecutionResult)> = JoinSet::new();

        loop {
            let step_ids = self
                .scheduler
                .next_steps(&run, &self.catalog, in_flight.len());

            for step_id in step_ids {
                let Some(step) = self.catalog.get(step_id).cloned() else {
                    continue;
                };
                let started_at = Utc::now();
                run.set_state(step_id, StepState::Running { started_at });
                self.emit_event(ExecutionEvent::StepStarted {
                    step_id,
                    name: step.name.clone(),
                });

                let executor = executor.clone();
                let services = services.clone();
                in_flight.spawn(async move {
                    // A panicking handler fails its own step only
                    let result = tokio::spawn(async move { executor.execute(&step, &services).await })
                        .await
                        .unwrap_or_else(|e| ExecutionResult::Failed {
                            error: format!("step task panicked: {}", e),
                        });
                    (step_id, started_at, result)
                });
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };
            let (step_id, started_at, result) = joined.map_err(|e| EngineError::Join(e.to_string()))?;

            match result {
                ExecutionResult::Success {
                    entities,
                    relationships,
                } => {
                    run.set_state(
                        step_id,
                        StepState::Completed {
                            entities,
                            relationships,
                            started_at,
                            completed_at: Utc::now(),
                        },
                    );
                    self.emit_event(ExecutionEvent::StepCompleted {
                        step_id,
                        entities,
                        relationships,
                    });
                }
                ExecutionResult::Failed { error } => {
                    run.set_state(
                        step_id,
                        StepState::Failed {
                            error: error.clone(),
                            started_at,
                            failed_at: Utc::now(),
                        },
                    );
                    self.emit_event(ExecutionEvent::StepFailed { step_id, error });
                }
            }
            self.propagate_skips(&mut run);
        }

        if !run.is_complete() {
            let pending: Vec<StepId> = run
                .steps
                .iter()
                .filter(|(_, state)| !state.is_terminal())
                .map(|(id, _)| *id)
                .collect();
            error!("No steps ready to run and none running - run stalled");
            return Err(EngineError::Stalled(pending));
        }

        run.finish();
        let counts = run.counts();
        info!(
            "Ingestion run {} finished: {:?} ({} completed, {} failed, {} skipped)",
            execution_id, run.status, counts.completed, counts.failed, counts.skipped
        );
        self.emit_event(ExecutionEvent::RunCompleted {
            execution_id,
            status: run.status,
            counts,
        });

        Ok(run)
    }

    fn mark_step_skipped(&self, run: &mut IngestionRun, step_id: StepId, reason: SkipReason) {
        info!("Skipping step {}: {}", step_id, reason);
        run.set_state(
            step_id,
            StepState::Skipped {
                reason: reason.clone(),
            },
        );
        self.emit_event(ExecutionEvent::StepSkipped { step_id, reason });
    }

    fn propagate_skips(&self, run: &mut IngestionRun) {
        for (step_id, reason) in run.propagate_skips(&self.catalog) {
            if matches!(reason, SkipReason::DependencyFailed(_)) {
                warn!("Skipping step {}: {}", step_id, reason);
            } else {
                info!("Skipping step {}: {}", step_id, reason);
            }
            self.emit_event(ExecutionEvent::StepSkipped { step_id, reason });
        }
    }
}
