use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_CONTAINER_REGISTRIES: StepId = StepId::new("rm-container-registries");
pub const STEP_RM_CONTAINER_REGISTRY_WEBHOOKS: StepId = StepId::new("rm-container-registry-webhooks");

const API_VERSION: &str = "2019-05-01";

pub static CONTAINER_REGISTRY: EntityMeta =
    EntityMeta::new("Container Registry", "azure_container_registry", "DataStore");
pub static CONTAINER_REGISTRY_WEBHOOK: EntityMeta = EntityMeta::new(
    "Container Registry Webhook",
    "azure_container_registry_webhook",
    "ApplicationEndpoint",
);

pub fn family() -> StepFamily {
    StepFamily::new(
        "container-registry",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_CONTAINER_REGISTRIES,
                "Container Registries",
                provider(
                    "providers/Microsoft.ContainerRegistry/registries",
                    API_VERSION,
                    &CONTAINER_REGISTRY,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_CONTAINER_REGISTRY_WEBHOOKS,
                "Container Registry Webhooks",
                ArmListStep::children(
                    &CONTAINER_REGISTRY,
                    "webhooks",
                    API_VERSION,
                    &CONTAINER_REGISTRY_WEBHOOK,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_CONTAINER_REGISTRIES])),
        ],
    )
}
