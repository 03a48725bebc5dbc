//! Resource-manager families, all gated on a configured subscription

pub mod api_management;
pub mod authorization;
pub mod batch;
pub mod cdn;
pub mod compute;
pub mod container_registry;
pub mod cosmosdb;
pub mod databases;
pub mod dns;
pub mod event_grid;
pub mod interservice;
pub mod key_vault;
pub mod monitor;
pub mod network;
pub mod private_dns;
pub mod resources;
pub mod service_bus;
pub mod storage;
pub mod subscriptions;

use crate::core::{StepFamily, StepId};
use crate::graph::EntityMeta;
use crate::steps::account::STEP_AD_ACCOUNT;
use crate::steps::handlers::ArmListStep;

/// Account and resource groups, plus `extra`
pub(crate) fn scoped_deps(extra: &[StepId]) -> Vec<StepId> {
    let mut deps = vec![STEP_AD_ACCOUNT, resources::STEP_RM_RESOURCES_RESOURCE_GROUPS];
    deps.extend_from_slice(extra);
    deps
}

/// Subscription-scoped provider collection; resource groups HAS each item
pub(crate) fn provider(
    path: &'static str,
    api_version: &'static str,
    meta: &'static EntityMeta,
) -> ArmListStep {
    ArmListStep::subscription(path, api_version, meta).with_resource_group()
}

pub fn families() -> Vec<StepFamily> {
    vec![
        subscriptions::family(),
        resources::family(),
        key_vault::family(),
        network::family(),
        compute::family(),
        interservice::family(),
        cosmosdb::family(),
        databases::family(),
        storage::family(),
        authorization::family(),
        api_management::family(),
        dns::family(),
        private_dns::family(),
        container_registry::family(),
        service_bus::family(),
        cdn::family(),
        batch::family(),
        event_grid::family(),
        monitor::family(),
    ]
}
