//! Core domain models for ingestion
//!
//! This module defines the step graph, its catalog, the start-state
//! resolver, and per-run state.

pub mod catalog;
pub mod config;
pub mod context;
pub mod run;
pub mod start_state;
pub mod state;
pub mod step;

pub use catalog::*;
pub use context::*;
pub use run::*;
pub use start_state::*;
pub use state::*;
pub use step::*;
