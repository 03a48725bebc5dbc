//! Virtual networks, security groups, interfaces, addresses, and balancers

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::{EntityMeta, RelationshipClass};
use crate::steps::handlers::{LinkRule, LinkStep};
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_NETWORK_VIRTUAL_NETWORKS: StepId = StepId::new("rm-network-virtual-networks");
pub const STEP_RM_NETWORK_SECURITY_GROUPS: StepId = StepId::new("rm-network-security-groups");
pub const STEP_RM_NETWORK_SECURITY_GROUP_RULE_RELATIONSHIPS: StepId =
    StepId::new("rm-network-security-group-rule-relationships");
pub const STEP_RM_NETWORK_INTERFACES: StepId = StepId::new("rm-network-interfaces");
pub const STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES: StepId = StepId::new("rm-network-public-ip-addresses");
pub const STEP_RM_NETWORK_LOAD_BALANCERS: StepId = StepId::new("rm-network-load-balancers");

const API_VERSION: &str = "2020-05-01";

pub static VIRTUAL_NETWORK: EntityMeta = EntityMeta::new("Virtual Network", "azure_vnet", "Network");
pub static SUBNET: EntityMeta = EntityMeta::new("Subnet", "azure_subnet", "Network");
pub static SECURITY_GROUP: EntityMeta =
    EntityMeta::new("Network Security Group", "azure_security_group", "Firewall");
pub static NETWORK_INTERFACE: EntityMeta =
    EntityMeta::new("Network Interface", "azure_nic", "NetworkInterface");
pub static PUBLIC_IP_ADDRESS: EntityMeta =
    EntityMeta::new("Public IP Address", "azure_public_ip", "IpAddress");
pub static LOAD_BALANCER: EntityMeta = EntityMeta::new("Load Balancer", "azure_lb", "Gateway");

pub fn family() -> StepFamily {
    StepFamily::new(
        "network",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_NETWORK_VIRTUAL_NETWORKS,
                "Virtual Networks",
                provider("providers/Microsoft.Network/virtualNetworks", API_VERSION, &VIRTUAL_NETWORK)
                    .embedded("properties.subnets.*", &SUBNET, RelationshipClass::Contains)
                    .with_diagnostic_settings(),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_NETWORK_SECURITY_GROUPS,
                "Network Security Groups",
                provider(
                    "providers/Microsoft.Network/networkSecurityGroups",
                    API_VERSION,
                    &SECURITY_GROUP,
                )
                .with_diagnostic_settings(),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_NETWORK_SECURITY_GROUP_RULE_RELATIONSHIPS,
                "Network Security Group Rule Relationships",
                LinkStep::new(vec![
                    LinkRule::new(
                        &SECURITY_GROUP,
                        "properties.subnets.*.id",
                        RelationshipClass::Protects,
                        vec![&SUBNET],
                    ),
                    LinkRule::new(
                        &SECURITY_GROUP,
                        "properties.networkInterfaces.*.id",
                        RelationshipClass::Protects,
                        vec![&NETWORK_INTERFACE],
                    ),
                ]),
            )
            .depends_on([
                STEP_RM_NETWORK_SECURITY_GROUPS,
                STEP_RM_NETWORK_VIRTUAL_NETWORKS,
                STEP_RM_NETWORK_INTERFACES,
            ]),
            Step::new(
                STEP_RM_NETWORK_INTERFACES,
                "Network Interfaces",
                provider(
                    "providers/Microsoft.Network/networkInterfaces",
                    API_VERSION,
                    &NETWORK_INTERFACE,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_NETWORK_PUBLIC_IP_ADDRESSES,
                "Public IP Addresses",
                provider(
                    "providers/Microsoft.Network/publicIPAddresses",
                    API_VERSION,
                    &PUBLIC_IP_ADDRESS,
                )
                .with_diagnostic_settings(),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_NETWORK_LOAD_BALANCERS,
                "Load Balancers",
                provider("providers/Microsoft.Network/loadBalancers", API_VERSION, &LOAD_BALANCER)
                    .with_diagnostic_settings(),
            )
            .depends_on(scoped_deps(&[])),
        ],
    )
}
