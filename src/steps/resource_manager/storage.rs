//! Storage accounts with their containers, shares, queues, and tables

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_STORAGE_RESOURCES: StepId = StepId::new("rm-storage-resources");
pub const STEP_RM_STORAGE_QUEUES: StepId = StepId::new("rm-storage-queues");
pub const STEP_RM_STORAGE_TABLES: StepId = StepId::new("rm-storage-tables");

const API_VERSION: &str = "2019-06-01";

pub static STORAGE_ACCOUNT: EntityMeta =
    EntityMeta::new("Storage Account", "azure_storage_account", "Service");
pub static STORAGE_CONTAINER: EntityMeta =
    EntityMeta::new("Storage Container", "azure_storage_container", "DataStore");
pub static STORAGE_FILE_SHARE: EntityMeta =
    EntityMeta::new("Storage File Share", "azure_storage_file_share", "DataStore");
pub static STORAGE_QUEUE: EntityMeta = EntityMeta::new("Storage Queue", "azure_storage_queue", "Queue");
pub static STORAGE_TABLE: EntityMeta = EntityMeta::new("Storage Table", "azure_storage_table", "DataStore");

pub fn family() -> StepFamily {
    StepFamily::new(
        "storage",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_STORAGE_RESOURCES,
                "Storage Resources",
                provider("providers/Microsoft.Storage/storageAccounts", API_VERSION, &STORAGE_ACCOUNT)
                    .nested(
                        "blobServices/default/containers",
                        API_VERSION,
                        &STORAGE_CONTAINER,
                        RelationshipClass::Has,
                    )
                    .nested(
                        "fileServices/default/shares",
                        API_VERSION,
                        &STORAGE_FILE_SHARE,
                        RelationshipClass::Has,
                    ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_STORAGE_QUEUES,
                "Storage Queues",
                ArmListStep::children(
                    &STORAGE_ACCOUNT,
                    "queueServices/default/queues",
                    API_VERSION,
                    &STORAGE_QUEUE,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_STORAGE_RESOURCES])),
            Step::new(
                STEP_RM_STORAGE_TABLES,
                "Storage Tables",
                ArmListStep::children(
                    &STORAGE_ACCOUNT,
                    "tableServices/default/tables",
                    API_VERSION,
                    &STORAGE_TABLE,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_STORAGE_RESOURCES])),
        ],
    )
}
