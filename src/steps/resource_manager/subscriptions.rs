//! Subscriptions and the locations they can deploy to

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::account::STEP_AD_ACCOUNT;
use crate::steps::handlers::ArmListStep;

pub const STEP_RM_SUBSCRIPTIONS: StepId = StepId::new("rm-subscriptions");
pub const STEP_RM_SUBSCRIPTION_LOCATIONS: StepId = StepId::new("rm-subscription-locations");

const API_VERSION: &str = "2020-01-01";

pub static SUBSCRIPTION: EntityMeta = EntityMeta::new("Subscription", "azure_subscription", "Account");
pub static LOCATION: EntityMeta = EntityMeta::new("Location", "azure_location", "Site");

pub fn family() -> StepFamily {
    StepFamily::new(
        "subscriptions",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_SUBSCRIPTIONS,
                "Subscriptions",
                ArmListStep::root("/subscriptions", API_VERSION, &SUBSCRIPTION)
                    .with_diagnostic_settings(),
            )
            .depends_on([STEP_AD_ACCOUNT]),
            Step::new(
                STEP_RM_SUBSCRIPTION_LOCATIONS,
                "Subscription Locations",
                ArmListStep::children(&SUBSCRIPTION, "locations", API_VERSION, &LOCATION)
                    .class(RelationshipClass::Uses),
            )
            .depends_on([STEP_AD_ACCOUNT, STEP_RM_SUBSCRIPTIONS]),
        ],
    )
}
