//! Execution scheduler - determines which steps to run next

use crate::core::{IngestionRun, StepCatalog, StepId};
use serde::{Deserialize, Serialize};

/// Strategy for scheduling step execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SchedulingStrategy {
    /// Execute steps in dependency order, one at a time
    #[default]
    Sequential,

    /// Execute all ready steps in parallel
    Parallel,

    /// Limited parallelism (max N concurrent steps)
    LimitedParallel(usize),
}

/// Scheduler for determining which steps to run
pub struct ExecutionScheduler {
    strategy: SchedulingStrategy,
}

impl ExecutionScheduler {
    pub fn new(strategy: SchedulingStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> SchedulingStrategy {
        self.strategy
    }

    /// Get the next batch of steps to start, given `running` in flight
    pub fn next_steps(&self, run: &IngestionRun, catalog: &StepCatalog, running: usize) -> Vec<StepId> {
        let slots = match self.strategy {
            SchedulingStrategy::Sequential => 1,
            SchedulingStrategy::Parallel => usize::MAX,
            SchedulingStrategy::LimitedParallel(max) => max.max(1),
        };
        let remaining = slots.saturating_sub(running);
        if remaining == 0 {
            return vec![];
        }

        run.ready_steps(catalog).into_iter().take(remaining).collect()
    }
}
