//! Resource groups of the configured subscription

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::account::STEP_AD_ACCOUNT;
use crate::steps::handlers::ArmListStep;

pub const STEP_RM_RESOURCES_RESOURCE_GROUPS: StepId = StepId::new("rm-resources-resource-groups");

pub static RESOURCE_GROUP: EntityMeta =
    EntityMeta::new("Resource Group", "azure_resource_group", "Group");

pub fn family() -> StepFamily {
    StepFamily::new(
        "resources",
        StepGroup::ResourceScope,
        vec![Step::new(
            STEP_RM_RESOURCES_RESOURCE_GROUPS,
            "Resource Groups",
            ArmListStep::subscription("resourcegroups", "2021-04-01", &RESOURCE_GROUP),
        )
        .depends_on([STEP_AD_ACCOUNT])],
    )
}
