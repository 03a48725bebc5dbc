//! Test utility functions for ingestion scenarios

#![allow(dead_code)]

use async_trait::async_trait;
use azure_ingest::client::{Api, ApiTransport, ClientError, ResourceClient};
use azure_ingest::core::config::IntegrationConfig;
use azure_ingest::core::{
    resolve_step_start_states, IngestionRun, SkipReason, StepCatalog, StepId, StepServices,
    StepState,
};
use azure_ingest::execution::{ExecutionEngine, ExecutionEvent, SchedulingStrategy};
use azure_ingest::graph::{Entity, Relationship};
use azure_ingest::store::InMemoryJobState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ARM: &str = "http://arm.test";
pub const GRAPH: &str = "http://graph.test";
pub const SUBSCRIPTION_ID: &str = "sub-1";
pub const DIRECTORY_ID: &str = "tenant-1";

/// Canned responses keyed by request path. Unknown paths answer with an
/// empty collection.
#[derive(Default)]
pub struct MockTransport {
    routes: HashMap<String, Result<Vec<Value>, u16>>,
    requests: Mutex<Vec<(Api, String)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(mut self, path: impl Into<String>, items: Vec<Value>) -> Self {
        self.routes.insert(path.into(), Ok(items));
        self
    }

    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.routes.insert(path.into(), Err(status));
        self
    }

    /// Paths requested so far, in order
    pub fn requests(&self) -> Vec<(Api, String)> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requested(&self, api: Api) -> usize {
        self.requests().iter().filter(|(a, _)| *a == api).count()
    }
}

fn request_path(url: &str) -> &str {
    let path = url
        .strip_prefix(ARM)
        .or_else(|| url.strip_prefix(GRAPH))
        .unwrap_or(url);
    path.split('?').next().unwrap_or(path)
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn get_json(&self, api: Api, url: &str) -> Result<Value, ClientError> {
        let path = request_path(url).to_string();
        self.requests.lock().unwrap().push((api, path.clone()));

        match self.routes.get(&path) {
            Some(Ok(items)) => Ok(json!({ "value": items })),
            Some(Err(status)) => Err(ClientError::Status {
                url: url.to_string(),
                status: *status,
                body: String::new(),
            }),
            None => Ok(json!({ "value": [] })),
        }
    }
}

pub fn config(ingest_active_directory: bool, subscription_id: Option<&str>) -> IntegrationConfig {
    IntegrationConfig {
        directory_id: Some(DIRECTORY_ID.to_string()),
        subscription_id: subscription_id.map(str::to_string),
        ingest_active_directory,
        arm_endpoint: ARM.to_string(),
        graph_endpoint: GRAPH.to_string(),
        step_timeout_secs: 5,
        ..Default::default()
    }
}

/// Everything a scenario inspects after a run
pub struct ScenarioResult {
    pub run: IngestionRun,
    pub catalog: Arc<StepCatalog>,
    pub events: Vec<ExecutionEvent>,
    pub job_state: Arc<InMemoryJobState>,
    pub transport: Arc<MockTransport>,
}

impl ScenarioResult {
    pub fn state(&self, id: &str) -> &StepState {
        self.run
            .steps
            .iter()
            .find(|(step, _)| step.as_str() == id)
            .map(|(_, state)| state)
            .unwrap_or_else(|| panic!("no step '{}' in run", id))
    }

    pub fn skip_reason(&self, id: &str) -> &SkipReason {
        match self.state(id) {
            StepState::Skipped { reason } => reason,
            other => panic!("step '{}' is {}, not skipped", id, other.label()),
        }
    }

    pub async fn entities(&self) -> Vec<Entity> {
        self.job_state.collected_entities().await
    }

    pub async fn entities_of_type(&self, entity_type: &str) -> Vec<Entity> {
        self.entities()
            .await
            .into_iter()
            .filter(|e| e.entity_type == entity_type)
            .collect()
    }

    pub async fn relationships(&self) -> Vec<Relationship> {
        self.job_state.collected_relationships().await
    }

    /// Whether a relationship of the given type links the two keys
    pub async fn has_relationship(&self, relationship_type: &str, from: &str, to: &str) -> bool {
        self.relationships().await.iter().any(|r| {
            r.relationship_type == relationship_type && r.from_key == from && r.to_key == to
        })
    }

    /// Ids of steps whose handlers were started
    pub fn started_steps(&self) -> Vec<StepId> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ExecutionEvent::StepStarted { step_id, .. } => Some(*step_id),
                _ => None,
            })
            .collect()
    }
}

/// Run the standard catalog against a mock transport
pub async fn run_ingestion(
    config: Option<IntegrationConfig>,
    transport: MockTransport,
    strategy: SchedulingStrategy,
) -> ScenarioResult {
    let catalog = Arc::new(StepCatalog::standard().unwrap());
    let start_states = resolve_step_start_states(config.as_ref(), &catalog);

    let transport = Arc::new(transport);
    let job_state = Arc::new(InMemoryJobState::new());
    let services = StepServices::new(
        Arc::new(config.unwrap_or_default()),
        ResourceClient::new(transport.clone(), ARM, GRAPH),
        job_state.clone(),
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let engine = ExecutionEngine::new(catalog.clone(), strategy)
        .with_event_handler(move |event| sink.lock().unwrap().push(event));

    let run = engine.execute(&start_states, &services).await.unwrap();
    let events = events.lock().unwrap().clone();

    ScenarioResult {
        run,
        catalog,
        events,
        job_state,
        transport,
    }
}

pub fn account_key() -> String {
    format!("azure_account:{}", DIRECTORY_ID)
}

pub fn subscription_path(rest: &str) -> String {
    format!("/subscriptions/{}/{}", SUBSCRIPTION_ID, rest)
}

pub fn resource_group_id() -> String {
    subscription_path("resourceGroups/rg-1")
}

/// ARM id of a resource in rg-1
pub fn resource_id(provider_path: &str) -> String {
    format!("{}/providers/{}", resource_group_id(), provider_path)
}
