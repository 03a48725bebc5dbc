//! Scenario-based tests for azure-ingest

mod helpers;

mod directory_ingestion;
mod resource_ingestion;
mod skip_propagation;
mod start_states;
