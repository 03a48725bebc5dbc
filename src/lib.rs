//! azure-ingest - ingests Azure directory and resource-manager data into an
//! entity/relationship graph

pub mod cli;
pub mod client;
pub mod core;
pub mod execution;
pub mod export;
pub mod graph;
pub mod steps;
pub mod store;

// Re-export commonly used types
pub use client::{ApiTransport, ClientError, ResourceClient};
pub use core::config::IntegrationConfig;
pub use core::{resolve_step_start_states, IngestionRun, StepCatalog, StepServices, StepStartStates};
pub use execution::{ExecutionEngine, ExecutionEvent, SchedulingStrategy};
pub use graph::{Entity, Relationship};
pub use store::{InMemoryJobState, JobState};
