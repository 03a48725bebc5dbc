use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_CDN_PROFILES: StepId = StepId::new("rm-cdn-profiles");
pub const STEP_RM_CDN_ENDPOINTS: StepId = StepId::new("rm-cdn-endpoints");

const API_VERSION: &str = "2019-12-31";

pub static CDN_PROFILE: EntityMeta = EntityMeta::new("CDN Profile", "azure_cdn_profile", "Gateway");
pub static CDN_ENDPOINT: EntityMeta = EntityMeta::new("CDN Endpoint", "azure_cdn_endpoint", "Gateway");

pub fn family() -> StepFamily {
    StepFamily::new(
        "cdn",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_CDN_PROFILES,
                "CDN Profiles",
                provider("providers/Microsoft.Cdn/profiles", API_VERSION, &CDN_PROFILE),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_CDN_ENDPOINTS,
                "CDN Endpoints",
                ArmListStep::children(&CDN_PROFILE, "endpoints", API_VERSION, &CDN_ENDPOINT),
            )
            .depends_on(scoped_deps(&[STEP_RM_CDN_PROFILES])),
        ],
    )
}
