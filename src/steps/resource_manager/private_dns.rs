use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_PRIVATE_DNS_ZONES: StepId = StepId::new("rm-private-dns-zones");
pub const STEP_RM_PRIVATE_DNS_RECORD_SETS: StepId = StepId::new("rm-private-dns-record-sets");

const API_VERSION: &str = "2020-06-01";

pub static PRIVATE_DNS_ZONE: EntityMeta =
    EntityMeta::new("Private DNS Zone", "azure_private_dns_zone", "DomainZone");
pub static PRIVATE_DNS_RECORD_SET: EntityMeta =
    EntityMeta::new("Private DNS Record Set", "azure_private_dns_record_set", "DomainRecord");

pub fn family() -> StepFamily {
    StepFamily::new(
        "private-dns",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_PRIVATE_DNS_ZONES,
                "Private DNS Zones",
                provider(
                    "providers/Microsoft.Network/privateDnsZones",
                    API_VERSION,
                    &PRIVATE_DNS_ZONE,
                ),
            )
            .depends_on(scoped_deps(&[])),
            // ALL lists every record type in one collection
            Step::new(
                STEP_RM_PRIVATE_DNS_RECORD_SETS,
                "Private DNS Record Sets",
                ArmListStep::children(&PRIVATE_DNS_ZONE, "ALL", API_VERSION, &PRIVATE_DNS_RECORD_SET),
            )
            .depends_on(scoped_deps(&[STEP_RM_PRIVATE_DNS_ZONES])),
        ],
    )
}
