use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_DNS_ZONES: StepId = StepId::new("rm-dns-zones");
pub const STEP_RM_DNS_RECORD_SETS: StepId = StepId::new("rm-dns-record-sets");

const API_VERSION: &str = "2018-05-01";

pub static DNS_ZONE: EntityMeta = EntityMeta::new("DNS Zone", "azure_dns_zone", "DomainZone");
pub static DNS_RECORD_SET: EntityMeta =
    EntityMeta::new("DNS Record Set", "azure_dns_record_set", "DomainRecord");

pub fn family() -> StepFamily {
    StepFamily::new(
        "dns",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_DNS_ZONES,
                "DNS Zones",
                provider("providers/Microsoft.Network/dnszones", API_VERSION, &DNS_ZONE),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_DNS_RECORD_SETS,
                "DNS Record Sets",
                ArmListStep::children(&DNS_ZONE, "recordsets", API_VERSION, &DNS_RECORD_SET),
            )
            .depends_on(scoped_deps(&[STEP_RM_DNS_ZONES])),
        ],
    )
}
