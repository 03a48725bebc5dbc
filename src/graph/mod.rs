//! Graph objects produced by ingestion steps

pub mod converter;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub use converter::{
    create_arm_entity, create_direct_relationship, create_resource_entity, parse_resource_id,
    select_values, ConvertError, ResourceId, WebLinker,
};

/// Static description of an entity type a step may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityMeta {
    /// Human-readable resource name
    pub resource_name: &'static str,

    /// Entity `_type`
    pub entity_type: &'static str,

    /// Entity `_class`
    pub class: &'static str,
}

impl EntityMeta {
    pub const fn new(
        resource_name: &'static str,
        entity_type: &'static str,
        class: &'static str,
    ) -> Self {
        Self {
            resource_name,
            entity_type,
            class,
        }
    }
}

/// Relationship verbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationshipClass {
    Has,
    Contains,
    Uses,
    Allows,
    Assigned,
    Protects,
}

impl RelationshipClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipClass::Has => "HAS",
            RelationshipClass::Contains => "CONTAINS",
            RelationshipClass::Uses => "USES",
            RelationshipClass::Allows => "ALLOWS",
            RelationshipClass::Assigned => "ASSIGNED",
            RelationshipClass::Protects => "PROTECTS",
        }
    }
}

impl fmt::Display for RelationshipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of a relationship type a step may emit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationshipMeta {
    pub source: &'static EntityMeta,
    pub class: RelationshipClass,
    pub target: &'static EntityMeta,
}

impl RelationshipMeta {
    pub const fn new(
        source: &'static EntityMeta,
        class: RelationshipClass,
        target: &'static EntityMeta,
    ) -> Self {
        Self {
            source,
            class,
            target,
        }
    }

    /// The `_type` every relationship of this shape carries
    pub fn relationship_type(&self) -> String {
        relationship_type(self.source.entity_type, self.class, self.target.entity_type)
    }
}

/// Build a relationship `_type` from its endpoints.
///
/// Leading `_`-separated segments the target shares with the source are
/// dropped, keeping at least one, so `azure_account` HAS
/// `azure_keyvault_service` becomes `azure_account_has_keyvault_service` and
/// `azure_keyvault_service` CONTAINS `azure_keyvault_key` becomes
/// `azure_keyvault_service_contains_key`.
pub fn relationship_type(from_type: &str, class: RelationshipClass, to_type: &str) -> String {
    let verb = class.as_str().to_ascii_lowercase();
    let from: Vec<&str> = from_type.split('_').collect();
    let to: Vec<&str> = to_type.split('_').collect();
    let shared = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count()
        .min(to.len().saturating_sub(1));
    format!("{}_{}_{}", from_type, verb, to[shared..].join("_"))
}

/// A node in the ingested graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "_key")]
    pub key: String,

    #[serde(rename = "_type")]
    pub entity_type: String,

    #[serde(rename = "_class")]
    pub class: String,

    #[serde(rename = "displayName")]
    pub display_name: String,

    /// Flattened scalar properties
    #[serde(flatten)]
    pub properties: Map<String, Value>,

    /// Source document the entity was converted from
    #[serde(rename = "_rawData", default, skip_serializing_if = "Value::is_null")]
    pub raw_data: Value,
}

impl Entity {
    /// Look up a string property
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

/// A directed edge between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    #[serde(rename = "_key")]
    pub key: String,

    #[serde(rename = "_type")]
    pub relationship_type: String,

    #[serde(rename = "_class")]
    pub class: RelationshipClass,

    #[serde(rename = "_fromEntityKey")]
    pub from_key: String,

    #[serde(rename = "_toEntityKey")]
    pub to_key: String,

    #[serde(rename = "displayName")]
    pub display_name: String,
}
