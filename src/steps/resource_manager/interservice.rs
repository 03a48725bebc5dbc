//! Relationships between compute and network resources

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::RelationshipClass;
use crate::steps::handlers::{LinkRule, LinkStep};
use crate::steps::resource_manager::compute::{STEP_RM_COMPUTE_VIRTUAL_MACHINES, VIRTUAL_MACHINE};
use crate::steps::resource_manager::network::{
    NETWORK_INTERFACE, PUBLIC_IP_ADDRESS, STEP_RM_NETWORK_INTERFACES,
    STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES, STEP_RM_NETWORK_VIRTUAL_NETWORKS, SUBNET,
};

pub const STEP_RM_COMPUTE_NETWORK_RELATIONSHIPS: StepId =
    StepId::new("rm-compute-network-relationships");

pub fn family() -> StepFamily {
    StepFamily::new(
        "interservice",
        StepGroup::ResourceScope,
        vec![Step::new(
            STEP_RM_COMPUTE_NETWORK_RELATIONSHIPS,
            "Compute Network Relationships",
            LinkStep::new(vec![
                LinkRule::new(
                    &VIRTUAL_MACHINE,
                    "properties.networkProfile.networkInterfaces.*.id",
                    RelationshipClass::Uses,
                    vec![&NETWORK_INTERFACE],
                ),
                LinkRule::new(
                    &NETWORK_INTERFACE,
                    "properties.ipConfigurations.*.properties.publicIPAddress.id",
                    RelationshipClass::Uses,
                    vec![&PUBLIC_IP_ADDRESS],
                ),
                LinkRule::new(
                    &NETWORK_INTERFACE,
                    "properties.ipConfigurations.*.properties.subnet.id",
                    RelationshipClass::Has,
                    vec![&SUBNET],
                )
                .reversed(),
            ]),
        )
        .depends_on([
            STEP_RM_COMPUTE_VIRTUAL_MACHINES,
            STEP_RM_NETWORK_INTERFACES,
            STEP_RM_NETWORK_VIRTUAL_NETWORKS,
            STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES,
        ])],
    )
}
