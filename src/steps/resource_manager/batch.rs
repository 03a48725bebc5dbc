use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_BATCH_ACCOUNTS: StepId = StepId::new("rm-batch-accounts");
pub const STEP_RM_BATCH_POOLS: StepId = StepId::new("rm-batch-pools");
pub const STEP_RM_BATCH_APPLICATIONS: StepId = StepId::new("rm-batch-applications");
pub const STEP_RM_BATCH_CERTIFICATES: StepId = StepId::new("rm-batch-certificates");

const API_VERSION: &str = "2020-09-01";

pub static BATCH_ACCOUNT: EntityMeta = EntityMeta::new("Batch Account", "azure_batch_account", "Service");
pub static BATCH_POOL: EntityMeta = EntityMeta::new("Batch Pool", "azure_batch_pool", "Cluster");
pub static BATCH_APPLICATION: EntityMeta =
    EntityMeta::new("Batch Application", "azure_batch_application", "Process");
pub static BATCH_CERTIFICATE: EntityMeta =
    EntityMeta::new("Batch Certificate", "azure_batch_certificate", "Certificate");

fn account_children(id: StepId, name: &str, path: &'static str, meta: &'static EntityMeta) -> Step {
    Step::new(id, name, ArmListStep::children(&BATCH_ACCOUNT, path, API_VERSION, meta))
        .depends_on(scoped_deps(&[STEP_RM_BATCH_ACCOUNTS]))
}

pub fn family() -> StepFamily {
    StepFamily::new(
        "batch",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_BATCH_ACCOUNTS,
                "Batch Accounts",
                provider("providers/Microsoft.Batch/batchAccounts", API_VERSION, &BATCH_ACCOUNT),
            )
            .depends_on(scoped_deps(&[])),
            account_children(STEP_RM_BATCH_POOLS, "Batch Pools", "pools", &BATCH_POOL),
            account_children(
                STEP_RM_BATCH_APPLICATIONS,
                "Batch Applications",
                "applications",
                &BATCH_APPLICATION,
            ),
            account_children(
                STEP_RM_BATCH_CERTIFICATES,
                "Batch Certificates",
                "certificates",
                &BATCH_CERTIFICATE,
            ),
        ],
    )
}
