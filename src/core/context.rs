//! Step context - what a handler can reach while it runs

use crate::client::ResourceClient;
use crate::core::config::IntegrationConfig;
use crate::core::step::{StepError, StepId};
use crate::graph::{Entity, WebLinker};
use crate::store::JobState;
use std::sync::Arc;

/// Data key the account step publishes its entity under
pub const ACCOUNT_ENTITY_KEY: &str = "ACCOUNT_ENTITY";

/// Services shared by every step of a run
#[derive(Clone)]
pub struct StepServices {
    pub config: Arc<IntegrationConfig>,
    pub client: ResourceClient,
    pub job_state: Arc<dyn JobState>,
}

impl StepServices {
    pub fn new(
        config: Arc<IntegrationConfig>,
        client: ResourceClient,
        job_state: Arc<dyn JobState>,
    ) -> Self {
        Self {
            config,
            client,
            job_state,
        }
    }
}

/// Execution context for one step
#[derive(Clone)]
pub struct StepContext {
    pub step_id: StepId,
    pub config: Arc<IntegrationConfig>,
    pub client: ResourceClient,
    /// Step-scoped view of the job state
    pub job_state: Arc<dyn JobState>,
}

impl StepContext {
    /// The account entity published by the account step
    pub async fn account_entity(&self) -> Result<Entity, StepError> {
        let value = self
            .job_state
            .get_data(ACCOUNT_ENTITY_KEY)
            .await?
            .ok_or(StepError::MissingData(ACCOUNT_ENTITY_KEY))?;
        serde_json::from_value(value)
            .map_err(|e| StepError::Store(crate::store::StoreError::Serialization(e)))
    }

    /// Portal links for the account's default domain
    pub async fn web_linker(&self) -> Result<WebLinker, StepError> {
        let account = self.account_entity().await?;
        Ok(WebLinker::new(account.property_str("defaultDomain")))
    }

    /// The configured subscription id
    pub fn subscription_id(&self) -> Result<&str, StepError> {
        self.config
            .subscription_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(StepError::MissingConfig("subscription_id"))
    }
}
