//! Step start-state resolution
//!
//! Decides, before a run begins, which catalog steps are enabled. The
//! decision is made per [`StepGroup`]: every step inherits the gate of the
//! family that declared it.

use crate::core::catalog::StepCatalog;
use crate::core::config::IntegrationConfig;
use crate::core::step::{StepGroup, StepStartState, StepStartStates};

/// Feature gates derived once from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatureFlags {
    pub directory_ingestion: bool,
    pub resource_scope: bool,
}

impl FeatureFlags {
    /// Absent configuration leaves every optional gate closed
    pub fn from_config(config: Option<&IntegrationConfig>) -> Self {
        match config {
            Some(config) => Self {
                directory_ingestion: config.ingest_active_directory,
                resource_scope: config.has_subscription_id(),
            },
            None => Self::default(),
        }
    }

    /// Decision for every step of a group
    pub fn start_state(&self, group: StepGroup) -> StepStartState {
        let enabled = match group {
            StepGroup::Account => true,
            StepGroup::Directory => self.directory_ingestion,
            StepGroup::ResourceScope => self.resource_scope,
        };
        StepStartState { disabled: !enabled }
    }
}

/// Compute the enablement map for every step in the catalog.
///
/// Pure: reads neither network nor store and returns the same map for the
/// same inputs.
///
/// # Panics
///
/// Panics if a catalog step ends up without a decision.
pub fn resolve_step_start_states(
    config: Option<&IntegrationConfig>,
    catalog: &StepCatalog,
) -> StepStartStates {
    let flags = FeatureFlags::from_config(config);

    let states: StepStartStates = catalog
        .ids()
        .filter_map(|id| {
            catalog
                .group_of(id)
                .map(|group| (id, flags.start_state(group)))
        })
        .collect();

    for id in catalog.ids() {
        assert!(
            states.contains_key(&id),
            "step '{}' has no start state",
            id
        );
    }

    states
}
