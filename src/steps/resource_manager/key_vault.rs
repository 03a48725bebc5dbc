//! Key vaults, their keys and secrets, and access-policy principals

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::active_directory::{
    GROUP, SERVICE_PRINCIPAL, STEP_AD_GROUPS, STEP_AD_SERVICE_PRINCIPALS, STEP_AD_USERS, USER,
};
use crate::steps::handlers::{ArmListStep, LinkRule, LinkStep};
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_KEYVAULT_VAULTS: StepId = StepId::new("rm-keyvault-vaults");
pub const STEP_RM_KEYVAULT_KEYS: StepId = StepId::new("rm-keyvault-keys");
pub const STEP_RM_KEYVAULT_SECRETS: StepId = StepId::new("rm-keyvault-secrets");
pub const STEP_RM_KEYVAULT_ACCESS_POLICY_RELATIONSHIPS: StepId =
    StepId::new("rm-keyvault-access-policy-relationships");

const API_VERSION: &str = "2019-09-01";

pub static KEY_VAULT: EntityMeta = EntityMeta::new("Key Vault", "azure_keyvault_service", "Service");
pub static KEY: EntityMeta = EntityMeta::new("Key Vault Key", "azure_keyvault_key", "Key");
pub static SECRET: EntityMeta = EntityMeta::new("Key Vault Secret", "azure_keyvault_secret", "Secret");

pub fn family() -> StepFamily {
    StepFamily::new(
        "key-vault",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_KEYVAULT_VAULTS,
                "Key Vaults",
                provider("providers/Microsoft.KeyVault/vaults", API_VERSION, &KEY_VAULT)
                    .with_diagnostic_settings(),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_KEYVAULT_KEYS,
                "Key Vault Keys",
                ArmListStep::children(&KEY_VAULT, "keys", API_VERSION, &KEY)
                    .class(RelationshipClass::Contains),
            )
            .depends_on(scoped_deps(&[STEP_RM_KEYVAULT_VAULTS])),
            Step::new(
                STEP_RM_KEYVAULT_SECRETS,
                "Key Vault Secrets",
                ArmListStep::children(&KEY_VAULT, "secrets", API_VERSION, &SECRET)
                    .class(RelationshipClass::Contains),
            )
            .depends_on(scoped_deps(&[STEP_RM_KEYVAULT_VAULTS])),
            Step::new(
                STEP_RM_KEYVAULT_ACCESS_POLICY_RELATIONSHIPS,
                "Key Vault Access Policy Relationships",
                LinkStep::new(vec![LinkRule::new(
                    &KEY_VAULT,
                    "properties.accessPolicies.*.objectId",
                    RelationshipClass::Allows,
                    vec![&USER, &GROUP, &SERVICE_PRINCIPAL],
                )]),
            )
            .depends_on([
                STEP_RM_KEYVAULT_VAULTS,
                STEP_AD_USERS,
                STEP_AD_GROUPS,
                STEP_AD_SERVICE_PRINCIPALS,
            ]),
        ],
    )
}
