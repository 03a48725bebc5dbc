//! Service Bus namespaces, queues, topics, and topic subscriptions

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_SERVICE_BUS_NAMESPACES: StepId = StepId::new("rm-service-bus-namespaces");
pub const STEP_RM_SERVICE_BUS_QUEUES: StepId = StepId::new("rm-service-bus-queues");
pub const STEP_RM_SERVICE_BUS_TOPICS: StepId = StepId::new("rm-service-bus-topics");
pub const STEP_RM_SERVICE_BUS_SUBSCRIPTIONS: StepId = StepId::new("rm-service-bus-subscriptions");

const API_VERSION: &str = "2017-04-01";

pub static SERVICE_BUS_NAMESPACE: EntityMeta =
    EntityMeta::new("Service Bus Namespace", "azure_service_bus_namespace", "Service");
pub static SERVICE_BUS_QUEUE: EntityMeta =
    EntityMeta::new("Service Bus Queue", "azure_service_bus_queue", "Queue");
pub static SERVICE_BUS_TOPIC: EntityMeta =
    EntityMeta::new("Service Bus Topic", "azure_service_bus_topic", "Queue");
pub static SERVICE_BUS_SUBSCRIPTION: EntityMeta = EntityMeta::new(
    "Service Bus Subscription",
    "azure_service_bus_subscription",
    "Subscription",
);

pub fn family() -> StepFamily {
    StepFamily::new(
        "service-bus",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_SERVICE_BUS_NAMESPACES,
                "Service Bus Namespaces",
                provider(
                    "providers/Microsoft.ServiceBus/namespaces",
                    API_VERSION,
                    &SERVICE_BUS_NAMESPACE,
                ),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_SERVICE_BUS_QUEUES,
                "Service Bus Queues",
                ArmListStep::children(&SERVICE_BUS_NAMESPACE, "queues", API_VERSION, &SERVICE_BUS_QUEUE),
            )
            .depends_on(scoped_deps(&[STEP_RM_SERVICE_BUS_NAMESPACES])),
            Step::new(
                STEP_RM_SERVICE_BUS_TOPICS,
                "Service Bus Topics",
                ArmListStep::children(&SERVICE_BUS_NAMESPACE, "topics", API_VERSION, &SERVICE_BUS_TOPIC),
            )
            .depends_on(scoped_deps(&[STEP_RM_SERVICE_BUS_NAMESPACES])),
            Step::new(
                STEP_RM_SERVICE_BUS_SUBSCRIPTIONS,
                "Service Bus Subscriptions",
                ArmListStep::children(
                    &SERVICE_BUS_TOPIC,
                    "subscriptions",
                    API_VERSION,
                    &SERVICE_BUS_SUBSCRIPTION,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_SERVICE_BUS_TOPICS])),
        ],
    )
}
