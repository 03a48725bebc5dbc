//! Role assignments and definitions, classic administrators, and the
//! principals and scopes assignments point at

use crate::core::{Step, StepFamily, StepGroup, StepHandler, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::active_directory::{
    GROUP, SERVICE_PRINCIPAL, STEP_AD_GROUPS, STEP_AD_SERVICE_PRINCIPALS, STEP_AD_USERS, USER,
};
use crate::steps::handlers::{ArmListStep, ChainStep, LinkRule, LinkStep};
use crate::steps::resource_manager::compute::{STEP_RM_COMPUTE_VIRTUAL_MACHINES, VIRTUAL_MACHINE};
use crate::steps::resource_manager::key_vault::{KEY_VAULT, STEP_RM_KEYVAULT_VAULTS};
use crate::steps::resource_manager::resources::{RESOURCE_GROUP, STEP_RM_RESOURCES_RESOURCE_GROUPS};
use crate::steps::resource_manager::scoped_deps;
use crate::steps::resource_manager::storage::{STEP_RM_STORAGE_RESOURCES, STORAGE_ACCOUNT};
use crate::steps::resource_manager::subscriptions::{STEP_RM_SUBSCRIPTIONS, SUBSCRIPTION};
use std::sync::Arc;

pub const STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENTS: StepId =
    StepId::new("rm-authorization-role-assignments");
pub const STEP_RM_AUTHORIZATION_ROLE_DEFINITIONS: StepId =
    StepId::new("rm-authorization-role-definitions");
pub const STEP_RM_AUTHORIZATION_CLASSIC_ADMINISTRATORS: StepId =
    StepId::new("rm-authorization-classic-administrators");
pub const STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENT_PRINCIPAL_RELATIONSHIPS: StepId =
    StepId::new("rm-authorization-role-assignment-principal-relationships");
pub const STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENT_SCOPE_RELATIONSHIPS: StepId =
    StepId::new("rm-authorization-role-assignment-scope-relationships");

const API_VERSION: &str = "2015-07-01";
const CLASSIC_API_VERSION: &str = "2015-06-01";

pub static ROLE_ASSIGNMENT: EntityMeta =
    EntityMeta::new("Role Assignment", "azure_role_assignment", "AccessPolicy");
pub static ROLE_DEFINITION: EntityMeta =
    EntityMeta::new("Role Definition", "azure_role_definition", "AccessRole");
pub static CLASSIC_ADMIN: EntityMeta =
    EntityMeta::new("Classic Administrator", "azure_classic_admin", "User");

fn role_definitions() -> ChainStep {
    let list: Arc<dyn StepHandler> = Arc::new(ArmListStep::subscription(
        "providers/Microsoft.Authorization/roleDefinitions",
        API_VERSION,
        &ROLE_DEFINITION,
    ));
    let link: Arc<dyn StepHandler> = Arc::new(LinkStep::new(vec![LinkRule::new(
        &ROLE_ASSIGNMENT,
        "properties.roleDefinitionId",
        RelationshipClass::Uses,
        vec![&ROLE_DEFINITION],
    )]));
    ChainStep::new(vec![list, link])
}

pub fn family() -> StepFamily {
    StepFamily::new(
        "authorization",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENTS,
                "Role Assignments",
                ArmListStep::subscription(
                    "providers/Microsoft.Authorization/roleAssignments",
                    API_VERSION,
                    &ROLE_ASSIGNMENT,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_AUTHORIZATION_ROLE_DEFINITIONS,
                "Role Definitions",
                role_definitions(),
            )
            .depends_on(scoped_deps(&[STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENTS])),
            Step::new(
                STEP_RM_AUTHORIZATION_CLASSIC_ADMINISTRATORS,
                "Classic Administrators",
                ArmListStep::subscription(
                    "providers/Microsoft.Authorization/classicAdministrators",
                    CLASSIC_API_VERSION,
                    &CLASSIC_ADMIN,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENT_PRINCIPAL_RELATIONSHIPS,
                "Role Assignment to Principal Relationships",
                LinkStep::new(vec![LinkRule::new(
                    &ROLE_ASSIGNMENT,
                    "properties.principalId",
                    RelationshipClass::Assigned,
                    vec![&USER, &GROUP, &SERVICE_PRINCIPAL],
                )]),
            )
            .depends_on([
                STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENTS,
                STEP_AD_USERS,
                STEP_AD_GROUPS,
                STEP_AD_SERVICE_PRINCIPALS,
            ]),
            Step::new(
                STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENT_SCOPE_RELATIONSHIPS,
                "Role Assignment to Scope Relationships",
                LinkStep::new(vec![LinkRule::new(
                    &ROLE_ASSIGNMENT,
                    "properties.scope",
                    RelationshipClass::Allows,
                    vec![
                        &SUBSCRIPTION,
                        &RESOURCE_GROUP,
                        &KEY_VAULT,
                        &STORAGE_ACCOUNT,
                        &VIRTUAL_MACHINE,
                    ],
                )]),
            )
            .depends_on([
                STEP_RM_AUTHORIZATION_ROLE_ASSIGNMENTS,
                STEP_RM_SUBSCRIPTIONS,
                STEP_RM_RESOURCES_RESOURCE_GROUPS,
                STEP_RM_KEYVAULT_VAULTS,
                STEP_RM_STORAGE_RESOURCES,
                STEP_RM_COMPUTE_VIRTUAL_MACHINES,
            ]),
        ],
    )
}
