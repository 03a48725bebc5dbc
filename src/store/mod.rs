//! Job state: the key/value and graph-object store steps share during a run

pub mod scoped;

pub use scoped::StepJobState;

use crate::graph::{Entity, Relationship};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;

/// Error types for job state operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Duplicate key '{0}'")]
    DuplicateKey(String),

    #[error("Step '{step}' did not declare {kind} type '{type_name}'")]
    UndeclaredType {
        step: String,
        kind: &'static str,
        type_name: String,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Trait for job state backends
#[async_trait::async_trait]
pub trait JobState: Send + Sync {
    /// Store a named value
    async fn set_data(&self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Load a named value
    async fn get_data(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Add an entity; keys are unique for the run
    async fn add_entity(&self, entity: Entity) -> Result<Entity, StoreError>;

    /// Add a relationship; keys are unique for the run
    async fn add_relationship(&self, relationship: Relationship) -> Result<(), StoreError>;

    /// Find an entity by key (case-insensitive)
    async fn find_entity(&self, key: &str) -> Result<Option<Entity>, StoreError>;

    /// All entities of a type, in insertion order
    async fn entities_of_type(&self, entity_type: &str) -> Result<Vec<Entity>, StoreError>;

    /// Check whether an entity or relationship key is taken
    async fn has_key(&self, key: &str) -> Result<bool, StoreError>;
}

#[derive(Default)]
struct Collected {
    data: HashMap<String, Value>,
    entities: Vec<Entity>,
    entity_index: HashMap<String, usize>,
    by_type: HashMap<String, Vec<usize>>,
    relationships: Vec<Relationship>,
    relationship_keys: HashSet<String>,
}

/// In-memory job state
pub struct InMemoryJobState {
    inner: RwLock<Collected>,
}

impl InMemoryJobState {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Collected::default()),
        }
    }

    /// Every entity added so far
    pub async fn collected_entities(&self) -> Vec<Entity> {
        self.inner.read().await.entities.clone()
    }

    /// Every relationship added so far
    pub async fn collected_relationships(&self) -> Vec<Relationship> {
        self.inner.read().await.relationships.clone()
    }
}

impl Default for InMemoryJobState {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(key: &str) -> String {
    key.to_ascii_lowercase()
}

#[async_trait::async_trait]
impl JobState for InMemoryJobState {
    async fn set_data(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.write().await.data.insert(key.to_string(), value);
        Ok(())
    }

    async fn get_data(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.inner.read().await.data.get(key).cloned())
    }

    async fn add_entity(&self, entity: Entity) -> Result<Entity, StoreError> {
        let mut inner = self.inner.write().await;
        let normalized = normalize(&entity.key);
        if inner.entity_index.contains_key(&normalized)
            || inner.relationship_keys.contains(&normalized)
        {
            return Err(StoreError::DuplicateKey(entity.key));
        }

        let index = inner.entities.len();
        inner.entity_index.insert(normalized, index);
        inner
            .by_type
            .entry(entity.entity_type.clone())
            .or_default()
            .push(index);
        inner.entities.push(entity.clone());
        Ok(entity)
    }

    async fn add_relationship(&self, relationship: Relationship) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let normalized = normalize(&relationship.key);
        if inner.entity_index.contains_key(&normalized)
            || !inner.relationship_keys.insert(normalized)
        {
            return Err(StoreError::DuplicateKey(relationship.key));
        }
        inner.relationships.push(relationship);
        Ok(())
    }

    async fn find_entity(&self, key: &str) -> Result<Option<Entity>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .entity_index
            .get(&normalize(key))
            .map(|&index| inner.entities[index].clone()))
    }

    async fn entities_of_type(&self, entity_type: &str) -> Result<Vec<Entity>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_type
            .get(entity_type)
            .map(|indexes| indexes.iter().map(|&i| inner.entities[i].clone()).collect())
            .unwrap_or_default())
    }

    async fn has_key(&self, key: &str) -> Result<bool, StoreError> {
        let inner = self.inner.read().await;
        let normalized = normalize(key);
        Ok(inner.entity_index.contains_key(&normalized)
            || inner.relationship_keys.contains(&normalized))
    }
}
