//! Identity-directory family: users, groups, and service principals

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::account::STEP_AD_ACCOUNT;
use crate::steps::handlers::{GraphListStep, GroupMembersStep};

pub const STEP_AD_GROUPS: StepId = StepId::new("ad-groups");
pub const STEP_AD_GROUP_MEMBERS: StepId = StepId::new("ad-group-members");
pub const STEP_AD_USERS: StepId = StepId::new("ad-users");
pub const STEP_AD_SERVICE_PRINCIPALS: StepId = StepId::new("ad-service-principals");

pub static USER: EntityMeta = EntityMeta::new("User", "azure_user", "User");
pub static GROUP: EntityMeta = EntityMeta::new("Group", "azure_user_group", "UserGroup");
pub static SERVICE_PRINCIPAL: EntityMeta =
    EntityMeta::new("Service Principal", "azure_service_principal", "Service");

pub fn family() -> StepFamily {
    StepFamily::new(
        "active-directory",
        StepGroup::Directory,
        vec![
            Step::new(STEP_AD_GROUPS, "Active Directory Groups", GraphListStep::new("/groups", &GROUP))
                .depends_on([STEP_AD_ACCOUNT]),
            Step::new(
                STEP_AD_GROUP_MEMBERS,
                "Active Directory Group Members",
                GroupMembersStep::new(&GROUP, vec![&USER, &GROUP, &SERVICE_PRINCIPAL]),
            )
            .depends_on([
                STEP_AD_ACCOUNT,
                STEP_AD_GROUPS,
                STEP_AD_USERS,
                STEP_AD_SERVICE_PRINCIPALS,
            ]),
            Step::new(STEP_AD_USERS, "Active Directory Users", GraphListStep::new("/users", &USER))
                .depends_on([STEP_AD_ACCOUNT]),
            Step::new(
                STEP_AD_SERVICE_PRINCIPALS,
                "Active Directory Service Principals",
                GraphListStep::new("/servicePrincipals", &SERVICE_PRINCIPAL),
            )
            .depends_on([STEP_AD_ACCOUNT]),
        ],
    )
}
