//! Step-scoped view of the job state

use crate::graph::{Entity, Relationship};
use crate::store::{JobState, StoreError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Job state handed to a single step.
///
/// Rejects writes of types the step did not declare and counts what the
/// step produced. Reads pass straight through.
pub struct StepJobState {
    step_id: String,
    inner: Arc<dyn JobState>,
    entity_types: BTreeSet<String>,
    relationship_types: BTreeSet<String>,
    entities_added: AtomicUsize,
    relationships_added: AtomicUsize,
}

impl StepJobState {
    pub fn new(
        step_id: impl Into<String>,
        inner: Arc<dyn JobState>,
        entity_types: BTreeSet<String>,
        relationship_types: BTreeSet<String>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            inner,
            entity_types,
            relationship_types,
            entities_added: AtomicUsize::new(0),
            relationships_added: AtomicUsize::new(0),
        }
    }

    pub fn entities_added(&self) -> usize {
        self.entities_added.load(Ordering::SeqCst)
    }

    pub fn relationships_added(&self) -> usize {
        self.relationships_added.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl JobState for StepJobState {
    async fn set_data(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.inner.set_data(key, value).await
    }

    async fn get_data(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.inner.get_data(key).await
    }

    async fn add_entity(&self, entity: Entity) -> Result<Entity, StoreError> {
        if !self.entity_types.contains(&entity.entity_type) {
            return Err(StoreError::UndeclaredType {
                step: self.step_id.clone(),
                kind: "entity",
                type_name: entity.entity_type,
            });
        }
        let entity = self.inner.add_entity(entity).await?;
        self.entities_added.fetch_add(1, Ordering::SeqCst);
        Ok(entity)
    }

    async fn add_relationship(&self, relationship: Relationship) -> Result<(), StoreError> {
        if !self.relationship_types.contains(&relationship.relationship_type) {
            return Err(StoreError::UndeclaredType {
                step: self.step_id.clone(),
                kind: "relationship",
                type_name: relationship.relationship_type,
            });
        }
        self.inner.add_relationship(relationship).await?;
        self.relationships_added.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn find_entity(&self, key: &str) -> Result<Option<Entity>, StoreError> {
        self.inner.find_entity(key).await
    }

    async fn entities_of_type(&self, entity_type: &str) -> Result<Vec<Entity>, StoreError> {
        self.inner.entities_of_type(entity_type).await
    }

    async fn has_key(&self, key: &str) -> Result<bool, StoreError> {
        self.inner.has_key(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryJobState;
    use serde_json::Map;

    fn user(key: &str) -> Entity {
        Entity {
            key: key.to_string(),
            entity_type: "azure_user".to_string(),
            class: "User".to_string(),
            display_name: key.to_string(),
            properties: Map::new(),
            raw_data: Value::Null,
        }
    }

    #[tokio::test]
    async fn test_rejects_undeclared_entity_type() {
        let shared: Arc<dyn JobState> = Arc::new(InMemoryJobState::new());
        let scoped = StepJobState::new(
            "ad-groups",
            shared.clone(),
            BTreeSet::from(["azure_user_group".to_string()]),
            BTreeSet::new(),
        );

        let err = scoped.add_entity(user("u1")).await.unwrap_err();
        assert!(err.to_string().contains("ad-groups"));
        assert!(!shared.has_key("u1").await.unwrap());
        assert_eq!(scoped.entities_added(), 0);
    }

    #[tokio::test]
    async fn test_counts_declared_writes() {
        let shared: Arc<dyn JobState> = Arc::new(InMemoryJobState::new());
        let scoped = StepJobState::new(
            "ad-users",
            shared.clone(),
            BTreeSet::from(["azure_user".to_string()]),
            BTreeSet::new(),
        );

        scoped.add_entity(user("u1")).await.unwrap();
        scoped.add_entity(user("u2")).await.unwrap();
        assert_eq!(scoped.entities_added(), 2);
        assert!(shared.find_entity("u2").await.unwrap().is_some());
    }
}
