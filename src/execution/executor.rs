//! Step executor - runs one step's handler against a scoped job state

use crate::core::{Step, StepContext, StepError, StepServices};
use crate::store::StepJobState;
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info};

/// Result of executing a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Step completed successfully
    Success {
        entities: usize,
        relationships: usize,
    },
    /// Handler returned an error or timed out
    Failed { error: String },
}

/// Executes a single step
pub struct StepExecutor {
    timeout_secs: u64,
}

impl StepExecutor {
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Execute a step and return the result
    pub async fn execute(&self, step: &Step, services: &StepServices) -> ExecutionResult {
        info!("Executing step: {}", step.id);

        let scoped = Arc::new(StepJobState::new(
            step.id.as_str(),
            services.job_state.clone(),
            step.entity_types.clone(),
            step.relationship_types.clone(),
        ));
        let ctx = StepContext {
            step_id: step.id,
            config: services.config.clone(),
            client: services.client.clone(),
            job_state: scoped.clone(),
        };

        let outcome = match timeout(
            Duration::from_secs(self.timeout_secs),
            step.handler.execute(&ctx),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(StepError::Timeout(self.timeout_secs)),
        };

        match outcome {
            Ok(()) => {
                let entities = scoped.entities_added();
                let relationships = scoped.relationships_added();
                debug!(
                    "Step {} produced {} entities and {} relationships",
                    step.id, entities, relationships
                );
                ExecutionResult::Success {
                    entities,
                    relationships,
                }
            }
            Err(e) => {
                error!("Step {} failed: {}", step.id, e);
                ExecutionResult::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{Api, ApiTransport, ClientError, ResourceClient};
    use crate::core::config::IntegrationConfig;
    use crate::core::{DeclaredTypes, StepHandler, StepId};
    use crate::graph::{EntityMeta, Entity};
    use crate::store::{InMemoryJobState, JobState};
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    static USER: EntityMeta = EntityMeta::new("User", "azure_user", "User");

    struct NoTransport;

    #[async_trait]
    impl ApiTransport for NoTransport {
        async fn get_json(&self, api: Api, _url: &str) -> Result<Value, ClientError> {
            Err(ClientError::MissingToken(api))
        }
    }

    struct WritesEntity {
        entity_type: &'static str,
    }

    #[async_trait]
    impl StepHandler for WritesEntity {
        async fn execute(&self, ctx: &StepContext) -> Result<(), StepError> {
            ctx.job_state
                .add_entity(Entity {
                    key: "u1".to_string(),
                    entity_type: self.entity_type.to_string(),
                    class: "User".to_string(),
                    display_name: "u1".to_string(),
                    properties: Map::new(),
                    raw_data: Value::Null,
                })
                .await?;
            Ok(())
        }

        fn declared_types(&self) -> DeclaredTypes {
            DeclaredTypes {
                entities: vec![&USER],
                relationships: vec![],
            }
        }
    }

    struct Sleeps;

    #[async_trait]
    impl StepHandler for Sleeps {
        async fn execute(&self, _ctx: &StepContext) -> Result<(), StepError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
    }

    fn services() -> StepServices {
        StepServices::new(
            Arc::new(IntegrationConfig::default()),
            ResourceClient::new(Arc::new(NoTransport), "https://arm", "https://graph"),
            Arc::new(InMemoryJobState::new()),
        )
    }

    #[tokio::test]
    async fn test_success_counts_writes() {
        let step = Step::new(
            StepId::new("ad-users"),
            "Users",
            WritesEntity {
                entity_type: "azure_user",
            },
        );
        let services = services();
        let result = StepExecutor::new(10).execute(&step, &services).await;

        assert_eq!(
            result,
            ExecutionResult::Success {
                entities: 1,
                relationships: 0
            }
        );
        assert!(services.job_state.has_key("u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_undeclared_type_fails_step() {
        let step = Step::new(
            StepId::new("ad-users"),
            "Users",
            WritesEntity {
                entity_type: "azure_user_group",
            },
        );
        let result = StepExecutor::new(10).execute(&step, &services()).await;

        match result {
            ExecutionResult::Failed { error } => assert!(error.contains("azure_user_group")),
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout() {
        let step = Step::new(StepId::new("slow"), "Slow", Sleeps);
        let executor = StepExecutor { timeout_secs: 0 };
        let result = executor.execute(&step, &services()).await;

        assert_eq!(
            result,
            ExecutionResult::Failed {
                error: "Timeout after 0 seconds".to_string()
            }
        );
    }
}
