//! Account family: the root entity every other step hangs off

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::AccountStep;

pub const STEP_AD_ACCOUNT: StepId = StepId::new("ad-account");

pub static ACCOUNT: EntityMeta = EntityMeta::new("Account", "azure_account", "Account");

pub fn family() -> StepFamily {
    StepFamily::new(
        "account",
        StepGroup::Account,
        vec![Step::new(STEP_AD_ACCOUNT, "Active Directory Info", AccountStep)],
    )
}
