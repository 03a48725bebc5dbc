//! Converters from remote resource documents to graph objects

use crate::graph::{relationship_type, Entity, EntityMeta, Relationship, RelationshipClass};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use thiserror::Error;

/// Error converting a remote document
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("{resource} document has no 'id'")]
    MissingId { resource: &'static str },
}

/// Keys the entity struct already owns
const RESERVED_KEYS: &[&str] = &["_key", "_type", "_class", "_rawData", "displayName"];

/// Convert a resource-manager or graph document into an entity.
///
/// The document's `id` becomes the entity key. Top-level scalars, scalars
/// under `properties`, and `tags` (as `tag.<name>`) are copied into the
/// entity's properties; the full document is kept as raw data.
pub fn create_resource_entity(meta: &EntityMeta, resource: &Value) -> Result<Entity, ConvertError> {
    let id = resource
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or(ConvertError::MissingId {
            resource: meta.resource_name,
        })?;

    let display_name = resource
        .get("displayName")
        .or_else(|| resource.get("name"))
        .and_then(Value::as_str)
        .unwrap_or(id)
        .to_string();

    let mut properties = Map::new();
    copy_scalars(resource, &mut properties);
    if let Some(nested) = resource.get("properties") {
        copy_scalars(nested, &mut properties);
    }
    if let Some(Value::Object(tags)) = resource.get("tags") {
        for (name, value) in tags {
            properties.insert(format!("tag.{}", name), value.clone());
        }
    }
    if let Some(parsed) = parse_resource_id(id) {
        properties.insert(
            "subscriptionId".to_string(),
            Value::String(parsed.subscription_id),
        );
        if let Some(group) = parsed.resource_group {
            properties.insert("resourceGroup".to_string(), Value::String(group));
        }
    }

    Ok(Entity {
        key: id.to_string(),
        entity_type: meta.entity_type.to_string(),
        class: meta.class.to_string(),
        display_name,
        properties,
        raw_data: resource.clone(),
    })
}

/// Builds Azure portal links for resource entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebLinker {
    default_domain: Option<String>,
}

impl WebLinker {
    const PORTAL: &'static str = "https://portal.azure.com";

    pub fn new(default_domain: Option<&str>) -> Self {
        Self {
            default_domain: default_domain.filter(|d| !d.is_empty()).map(str::to_string),
        }
    }

    /// Portal URL of the resource with the given ARM id
    pub fn resource_url(&self, resource_id: &str) -> String {
        match &self.default_domain {
            Some(domain) => format!("{}/#@{}/resource{}", Self::PORTAL, domain, resource_id),
            None => format!("{}/#resource{}", Self::PORTAL, resource_id),
        }
    }
}

/// Convert a resource-manager document, adding its portal `webLink`
pub fn create_arm_entity(
    meta: &EntityMeta,
    resource: &Value,
    linker: &WebLinker,
) -> Result<Entity, ConvertError> {
    let mut entity = create_resource_entity(meta, resource)?;
    entity.properties.insert(
        "webLink".to_string(),
        Value::String(linker.resource_url(&entity.key)),
    );
    Ok(entity)
}

fn copy_scalars(source: &Value, target: &mut Map<String, Value>) {
    let Value::Object(fields) = source else {
        return;
    };
    for (name, value) in fields {
        if name.starts_with('@') || RESERVED_KEYS.contains(&name.as_str()) {
            continue;
        }
        if matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)) {
            target.entry(name.clone()).or_insert_with(|| value.clone());
        }
    }
}

/// Create a relationship between two stored entities
pub fn create_direct_relationship(
    class: RelationshipClass,
    from: &Entity,
    to: &Entity,
) -> Relationship {
    Relationship {
        key: format!(
            "{}|{}|{}",
            from.key,
            class.as_str().to_ascii_lowercase(),
            to.key
        ),
        relationship_type: relationship_type(&from.entity_type, class, &to.entity_type),
        class,
        from_key: from.key.clone(),
        to_key: to.key.clone(),
        display_name: class.as_str().to_string(),
    }
}

/// Scope segments of an ARM resource id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceId {
    pub subscription_id: String,
    pub resource_group: Option<String>,
}

impl ResourceId {
    /// Key of the resource group entity that owns this resource
    pub fn resource_group_key(&self) -> Option<String> {
        self.resource_group.as_ref().map(|group| {
            format!(
                "/subscriptions/{}/resourceGroups/{}",
                self.subscription_id, group
            )
        })
    }
}

fn resource_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^/subscriptions/([^/]+)(?:/resourceGroups/([^/]+))?")
            .expect("resource id pattern is valid")
    })
}

/// Parse the subscription and resource group out of an ARM id
pub fn parse_resource_id(id: &str) -> Option<ResourceId> {
    let captures = resource_id_pattern().captures(id)?;
    Some(ResourceId {
        subscription_id: captures.get(1)?.as_str().to_string(),
        resource_group: captures.get(2).map(|m| m.as_str().to_string()),
    })
}

/// Select values from a document by dotted path.
///
/// A `*` segment fans out over every element of an array (or every value of
/// an object). Missing segments yield nothing.
pub fn select_values<'a>(value: &'a Value, path: &str) -> Vec<&'a Value> {
    let mut current = vec![value];
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        let mut next = Vec::new();
        for node in current {
            match (segment, node) {
                ("*", Value::Array(items)) => next.extend(items.iter()),
                ("*", Value::Object(fields)) => next.extend(fields.values()),
                (name, Value::Object(fields)) => {
                    if let Some(child) = fields.get(name) {
                        next.push(child);
                    }
                }
                _ => {}
            }
        }
        current = next;
    }
    current.into_iter().filter(|v| !v.is_null()).collect()
}
