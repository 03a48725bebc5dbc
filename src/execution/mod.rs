//! Ingestion execution engine

pub mod engine;
pub mod executor;
pub mod scheduler;

pub use engine::{EngineError, EventHandler, ExecutionEngine, ExecutionEvent};
pub use executor::{ExecutionResult, StepExecutor};
pub use scheduler::{ExecutionScheduler, SchedulingStrategy};
