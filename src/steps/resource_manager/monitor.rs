//! Diagnostic settings and the storage accounts they archive to

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::handlers::{LinkRule, LinkStep};
use crate::steps::resource_manager::key_vault::STEP_RM_KEYVAULT_VAULTS;
use crate::steps::resource_manager::network::{
    STEP_RM_NETWORK_LOAD_BALANCERS, STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES,
    STEP_RM_NETWORK_SECURITY_GROUPS, STEP_RM_NETWORK_VIRTUAL_NETWORKS,
};
use crate::steps::resource_manager::scoped_deps;
use crate::steps::resource_manager::storage::{STEP_RM_STORAGE_RESOURCES, STORAGE_ACCOUNT};
use crate::steps::resource_manager::subscriptions::STEP_RM_SUBSCRIPTIONS;

pub const STEP_RM_MONITOR_DIAGNOSTIC_SETTING_RELATIONSHIPS: StepId =
    StepId::new("rm-monitor-diagnostic-setting-relationships");

/// Listed under a resource id
pub const DIAGNOSTIC_SETTINGS_PATH: &str = "providers/microsoft.insights/diagnosticSettings";
pub const DIAGNOSTIC_SETTINGS_API_VERSION: &str = "2021-05-01-preview";

pub static DIAGNOSTIC_SETTING: EntityMeta =
    EntityMeta::new("Diagnostic Setting", "azure_diagnostic_setting", "Configuration");

/// Steps whose resources carry diagnostic settings
pub const DIAGNOSED_STEPS: &[StepId] = &[
    STEP_RM_SUBSCRIPTIONS,
    STEP_RM_KEYVAULT_VAULTS,
    STEP_RM_NETWORK_VIRTUAL_NETWORKS,
    STEP_RM_NETWORK_SECURITY_GROUPS,
    STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES,
    STEP_RM_NETWORK_LOAD_BALANCERS,
];

pub fn family() -> StepFamily {
    let mut deps = scoped_deps(DIAGNOSED_STEPS);
    deps.push(STEP_RM_STORAGE_RESOURCES);

    StepFamily::new(
        "monitor",
        StepGroup::ResourceScope,
        vec![Step::new(
            STEP_RM_MONITOR_DIAGNOSTIC_SETTING_RELATIONSHIPS,
            "Diagnostic Setting Relationships",
            LinkStep::new(vec![LinkRule::new(
                &DIAGNOSTIC_SETTING,
                "properties.storageAccountId",
                RelationshipClass::Uses,
                vec![&STORAGE_ACCOUNT],
            )]),
        )
        .depends_on(deps)],
    )
}
