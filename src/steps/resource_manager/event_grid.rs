//! Event Grid domains and topics with their event subscriptions

use crate::core::{Step, StepFamily, StepGroup, StepId};
use crate::graph::EntityMeta;
use crate::steps::handlers::ArmListStep;
use crate::steps::resource_manager::{provider, scoped_deps};

pub const STEP_RM_EVENT_GRID_DOMAINS: StepId = StepId::new("rm-event-grid-domains");
pub const STEP_RM_EVENT_GRID_DOMAIN_TOPICS: StepId = StepId::new("rm-event-grid-domain-topics");
pub const STEP_RM_EVENT_GRID_DOMAIN_TOPIC_SUBSCRIPTIONS: StepId =
    StepId::new("rm-event-grid-domain-topic-subscriptions");
pub const STEP_RM_EVENT_GRID_TOPICS: StepId = StepId::new("rm-event-grid-topics");
pub const STEP_RM_EVENT_GRID_TOPIC_SUBSCRIPTIONS: StepId =
    StepId::new("rm-event-grid-topic-subscriptions");

const API_VERSION: &str = "2020-06-01";
const EVENT_SUBSCRIPTIONS: &str = "providers/Microsoft.EventGrid/eventSubscriptions";

pub static EVENT_GRID_DOMAIN: EntityMeta =
    EntityMeta::new("Event Grid Domain", "azure_event_grid_domain", "Service");
pub static EVENT_GRID_DOMAIN_TOPIC: EntityMeta =
    EntityMeta::new("Event Grid Domain Topic", "azure_event_grid_domain_topic", "Queue");
pub static EVENT_GRID_DOMAIN_TOPIC_SUBSCRIPTION: EntityMeta = EntityMeta::new(
    "Event Grid Domain Topic Subscription",
    "azure_event_grid_domain_topic_subscription",
    "Subscription",
);
pub static EVENT_GRID_TOPIC: EntityMeta =
    EntityMeta::new("Event Grid Topic", "azure_event_grid_topic", "Queue");
pub static EVENT_GRID_TOPIC_SUBSCRIPTION: EntityMeta = EntityMeta::new(
    "Event Grid Topic Subscription",
    "azure_event_grid_topic_subscription",
    "Subscription",
);

pub fn family() -> StepFamily {
    StepFamily::new(
        "event-grid",
        StepGroup::ResourceScope,
        vec![
            Step::new(
                STEP_RM_EVENT_GRID_DOMAINS,
                "Event Grid Domains",
                provider("providers/Microsoft.EventGrid/domains", API_VERSION, &EVENT_GRID_DOMAIN),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_EVENT_GRID_DOMAIN_TOPICS,
                "Event Grid Domain Topics",
                ArmListStep::children(&EVENT_GRID_DOMAIN, "topics", API_VERSION, &EVENT_GRID_DOMAIN_TOPIC),
            )
            .depends_on(scoped_deps(&[STEP_RM_EVENT_GRID_DOMAINS])),
            Step::new(
                STEP_RM_EVENT_GRID_DOMAIN_TOPIC_SUBSCRIPTIONS,
                "Event Grid Domain Topic Subscriptions",
                ArmListStep::children(
                    &EVENT_GRID_DOMAIN_TOPIC,
                    EVENT_SUBSCRIPTIONS,
                    API_VERSION,
                    &EVENT_GRID_DOMAIN_TOPIC_SUBSCRIPTION,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_EVENT_GRID_DOMAIN_TOPICS])),
            Step::new(
                STEP_RM_EVENT_GRID_TOPICS,
                "Event Grid Topics",
                provider("providers/Microsoft.EventGrid/topics", API_VERSION, &EVENT_GRID_TOPIC),
            )
            .depends_on(scoped_deps(&[])),
            Step::new(
                STEP_RM_EVENT_GRID_TOPIC_SUBSCRIPTIONS,
                "Event Grid Topic Subscriptions",
                ArmListStep::children(
                    &EVENT_GRID_TOPIC,
                    EVENT_SUBSCRIPTIONS,
                    API_VERSION,
                    &EVENT_GRID_TOPIC_SUBSCRIPTION,
                ),
            )
            .depends_on(scoped_deps(&[STEP_RM_EVENT_GRID_TOPICS])),
        ],
    )
}
