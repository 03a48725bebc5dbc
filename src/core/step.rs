//! Step domain model

use crate::client::ClientError;
use crate::core::context::StepContext;
use crate::graph::{ConvertError, EntityMeta, RelationshipMeta};
use crate::store::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Unique step identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StepId(&'static str);

impl StepId {
    pub const fn new(id: &'static str) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Named gate shared by every step of a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepGroup {
    /// The root account step; never gated
    Account,
    /// Identity-directory steps, gated on directory ingestion
    Directory,
    /// Resource-manager steps, gated on a configured subscription
    ResourceScope,
}

impl StepGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepGroup::Account => "account",
            StepGroup::Directory => "directory",
            StepGroup::ResourceScope => "resource-scope",
        }
    }

    /// Why a step of this group is disabled
    pub fn disabled_reason(&self) -> &'static str {
        match self {
            StepGroup::Account => "account step is never disabled",
            StepGroup::Directory => "directory ingestion not configured",
            StepGroup::ResourceScope => "no subscription id configured",
        }
    }
}

impl fmt::Display for StepGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a step runs in this invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepStartState {
    pub disabled: bool,
}

impl StepStartState {
    pub const ENABLED: StepStartState = StepStartState { disabled: false };
    pub const DISABLED: StepStartState = StepStartState { disabled: true };

    pub fn is_enabled(&self) -> bool {
        !self.disabled
    }
}

/// Enablement map: one decision per declared step
pub type StepStartStates = BTreeMap<StepId, StepStartState>;

/// Error types for step handlers
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("Required job data '{0}' is missing")]
    MissingData(&'static str),

    #[error("Required configuration '{0}' is missing")]
    MissingConfig(&'static str),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

/// Types a handler writes, declared up front
#[derive(Debug, Clone, Default)]
pub struct DeclaredTypes {
    pub entities: Vec<&'static EntityMeta>,
    pub relationships: Vec<RelationshipMeta>,
}

impl DeclaredTypes {
    pub fn merge(&mut self, other: DeclaredTypes) {
        for entity in other.entities {
            if !self.entities.contains(&entity) {
                self.entities.push(entity);
            }
        }
        for relationship in other.relationships {
            if !self.relationships.contains(&relationship) {
                self.relationships.push(relationship);
            }
        }
    }
}

/// Trait for step handlers - allows for different implementations
#[async_trait]
pub trait StepHandler: Send + Sync {
    /// Run the step against the shared job state
    async fn execute(&self, ctx: &StepContext) -> Result<(), StepError>;

    /// Entity and relationship types this handler writes
    fn declared_types(&self) -> DeclaredTypes {
        DeclaredTypes::default()
    }
}

/// A single step in the ingestion graph
#[derive(Clone)]
pub struct Step {
    /// Unique step identifier
    pub id: StepId,

    /// Human-readable step name
    pub name: String,

    /// Entity types this step may write
    pub entity_types: BTreeSet<String>,

    /// Relationship types this step may write
    pub relationship_types: BTreeSet<String>,

    /// List of step IDs this step depends on
    pub depends_on: Vec<StepId>,

    pub handler: Arc<dyn StepHandler>,
}

impl Step {
    /// Create a step; declared types start from what the handler reports
    pub fn new(id: StepId, name: impl Into<String>, handler: impl StepHandler + 'static) -> Self {
        let declared = handler.declared_types();
        Step {
            id,
            name: name.into(),
            entity_types: declared
                .entities
                .iter()
                .map(|meta| meta.entity_type.to_string())
                .collect(),
            relationship_types: declared
                .relationships
                .iter()
                .map(RelationshipMeta::relationship_type)
                .collect(),
            depends_on: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    pub fn depends_on(mut self, deps: impl IntoIterator<Item = StepId>) -> Self {
        self.depends_on.extend(deps);
        self
    }

    /// Declare extra entity types beyond what the handler reports
    pub fn entities(mut self, metas: impl IntoIterator<Item = &'static EntityMeta>) -> Self {
        self.entity_types
            .extend(metas.into_iter().map(|meta| meta.entity_type.to_string()));
        self
    }

    /// Declare extra relationship types beyond what the handler reports
    pub fn relationships(mut self, metas: impl IntoIterator<Item = RelationshipMeta>) -> Self {
        self.relationship_types
            .extend(metas.into_iter().map(|meta| meta.relationship_type()));
        self
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("entity_types", &self.entity_types)
            .field("relationship_types", &self.relationship_types)
            .field("depends_on", &self.depends_on)
            .finish_non_exhaustive()
    }
}
