//! Test: disabled and failed steps never run, and neither do their dependents

use crate::helpers::*;
use azure_ingest::client::Api;
use azure_ingest::core::{ExecutionStatus, SkipReason, StepId, StepState};
use azure_ingest::execution::SchedulingStrategy;
use serde_json::json;

#[tokio::test]
async fn test_no_config_runs_account_only() {
    let result = run_ingestion(None, MockTransport::new(), SchedulingStrategy::Sequential).await;

    assert_eq!(result.run.status, ExecutionStatus::Completed);
    assert_eq!(result.started_steps(), vec![StepId::new("ad-account")]);
    assert!(result.transport.requests().is_empty());

    let counts = result.run.counts();
    assert_eq!(counts.completed, 1);
    assert_eq!(counts.skipped, result.catalog.len() - 1);

    // the account falls back to a default key without a directory id
    let accounts = result.entities_of_type("azure_account").await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].key, "azure_account:default");
}

#[tokio::test]
async fn test_missing_subscription_skips_resource_steps() {
    let result = run_ingestion(
        Some(config(true, None)),
        MockTransport::new(),
        SchedulingStrategy::Sequential,
    )
    .await;

    assert_eq!(result.run.status, ExecutionStatus::Completed);
    assert_eq!(result.transport.requested(Api::ResourceManager), 0);
    assert_eq!(
        result.skip_reason("rm-keyvault-vaults"),
        &SkipReason::Disabled("no subscription id configured".to_string())
    );
    assert!(matches!(result.state("ad-users"), StepState::Completed { .. }));
    assert!(matches!(
        result.state("ad-group-members"),
        StepState::Completed { .. }
    ));
}

#[tokio::test]
async fn test_principal_links_skip_without_directory() {
    let result = run_ingestion(
        Some(config(false, Some(SUBSCRIPTION_ID))),
        MockTransport::new(),
        SchedulingStrategy::Sequential,
    )
    .await;

    assert_eq!(result.run.status, ExecutionStatus::Completed);
    assert_eq!(result.transport.requested(Api::Graph), 0);
    assert_eq!(
        result.skip_reason("ad-users"),
        &SkipReason::Disabled("directory ingestion not configured".to_string())
    );
    assert!(matches!(
        result.skip_reason("rm-keyvault-access-policy-relationships"),
        SkipReason::DependencySkipped(_)
    ));
    assert!(matches!(
        result.skip_reason("rm-authorization-role-assignment-principal-relationships"),
        SkipReason::DependencySkipped(_)
    ));
    assert!(matches!(
        result.state("rm-keyvault-vaults"),
        StepState::Completed { .. }
    ));
    assert!(matches!(
        result.state("rm-authorization-role-assignment-scope-relationships"),
        StepState::Completed { .. }
    ));
}

#[tokio::test]
async fn test_failure_skips_dependents_only() {
    let transport = MockTransport::new()
        .with_items(
            subscription_path("resourcegroups"),
            vec![json!({ "id": resource_group_id(), "name": "rg-1" })],
        )
        .with_status(subscription_path("providers/Microsoft.KeyVault/vaults"), 500);

    let result = run_ingestion(
        Some(config(true, Some(SUBSCRIPTION_ID))),
        transport,
        SchedulingStrategy::Parallel,
    )
    .await;

    assert_eq!(result.run.status, ExecutionStatus::Failed);
    let StepState::Failed { error, .. } = result.state("rm-keyvault-vaults") else {
        panic!("vaults should have failed");
    };
    assert!(error.contains("500"), "{}", error);

    for dependent in [
        "rm-keyvault-keys",
        "rm-keyvault-secrets",
        "rm-keyvault-access-policy-relationships",
        "rm-authorization-role-assignment-scope-relationships",
        "rm-monitor-diagnostic-setting-relationships",
    ] {
        assert_eq!(
            result.skip_reason(dependent),
            &SkipReason::DependencyFailed(StepId::new("rm-keyvault-vaults")),
            "{}",
            dependent
        );
    }

    // unrelated families still ran
    assert!(matches!(
        result.state("rm-storage-resources"),
        StepState::Completed { .. }
    ));
    assert_eq!(result.run.counts().failed, 1);
}

#[tokio::test]
async fn test_skipped_steps_emit_events_and_never_start() {
    let result = run_ingestion(
        Some(config(true, None)),
        MockTransport::new(),
        SchedulingStrategy::Sequential,
    )
    .await;

    let started = result.started_steps();
    for step in result.catalog.steps() {
        let skipped = matches!(result.run.state(step.id), Some(StepState::Skipped { .. }));
        assert_eq!(skipped, !started.contains(&step.id), "{}", step.id);
    }
}
