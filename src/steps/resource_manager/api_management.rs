use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_API_MANAGEMENT_SERVICES: StepId = StepId::new("rm-api-management-services");
pub const STEP_RM_API_MANAGEMENT_APIS: StepId = StepId::new("rm-api-management-apis");

const API_VERSION: &str = "2019-12-01";

pub static API_MANAGEMENT_SERVICE: EntityMeta =
    EntityMeta::new("API Management Service", "azure_api_management_service", "Gateway");
pub static API_MANAGEMENT_API: EntityMeta =
    EntityMeta::new("API Management API", "azure_api_management_api", "ApplicationEndpoint");

pub fn family() -> StepFamily {
    StepFamily::new(
        "api-management",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_API_MANAGEMENT_SERVICES,
                "API Management Services",
                provider(
                    "providers/Microsoft.ApiManagement/service",
                    API_VERSION,
                    &API_MANAGEMENT_SERVICE,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_API_MANAGEMENT_APIS,
                "API Management APIs",
                ArmListStep::children(&API_MANAGEMENT_SERVICE, "apis", API_VERSION, &API_MANAGEMENT_API),
            )
            .depends_on(scoped_deps(&[STEP_RM_API_MANAGEMENT_SERVICES])),
        ],
    )
}
