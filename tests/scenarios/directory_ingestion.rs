//! Test: users, groups, service principals, and group membership

use crate::helpers::*;
use azure_ingest::core::{ExecutionStatus, StepState};
use azure_ingest::execution::SchedulingStrategy;
use serde_json::json;

fn directory() -> MockTransport {
    MockTransport::new()
        .with_items(
            "/users",
            vec![
                json!({ "id": "user-1", "displayName": "Ada", "userPrincipalName": "ada@example.com" }),
                json!({ "id": "user-2", "displayName": "Grace", "userPrincipalName": "grace@example.com" }),
            ],
        )
        .with_items(
            "/groups",
            vec![
                json!({ "id": "group-1", "displayName": "Engineers" }),
                json!({ "id": "group-2", "displayName": "Admins" }),
            ],
        )
        .with_items(
            "/servicePrincipals",
            vec![json!({ "id": "sp-1", "displayName": "deployer" })],
        )
        .with_items(
            "/groups/group-1/members",
            vec![
                json!({ "id": "user-1" }),
                json!({ "id": "sp-1" }),
                json!({ "id": "group-2" }),
                json!({ "id": "device-9" }),
            ],
        )
}

#[tokio::test]
async fn test_directory_objects_hang_off_the_account() {
    let result = run_ingestion(
        Some(config(true, None)),
        directory(),
        SchedulingStrategy::Sequential,
    )
    .await;

    assert_eq!(result.run.status, ExecutionStatus::Completed);
    assert_eq!(result.entities_of_type("azure_user").await.len(), 2);
    assert_eq!(result.entities_of_type("azure_user_group").await.len(), 2);
    assert_eq!(result.entities_of_type("azure_service_principal").await.len(), 1);

    let account = account_key();
    assert!(result.has_relationship("azure_account_has_user", &account, "user-1").await);
    assert!(
        result
            .has_relationship("azure_account_has_user_group", &account, "group-2")
            .await
    );
    assert!(
        result
            .has_relationship("azure_account_has_service_principal", &account, "sp-1")
            .await
    );

    let users = result.entities_of_type("azure_user").await;
    assert_eq!(users[0].display_name, "Ada");
    assert_eq!(users[0].property_str("userPrincipalName"), Some("ada@example.com"));
}

#[tokio::test]
async fn test_group_members_link_only_ingested_objects() {
    let result = run_ingestion(
        Some(config(true, None)),
        directory(),
        SchedulingStrategy::Parallel,
    )
    .await;

    let StepState::Completed { relationships, .. } = result.state("ad-group-members") else {
        panic!("group members should complete");
    };
    // device-9 was never ingested
    assert_eq!(*relationships, 3);

    assert!(result.has_relationship("azure_user_group_has_user", "group-1", "user-1").await);
    assert!(
        result
            .has_relationship("azure_user_group_has_service_principal", "group-1", "sp-1")
            .await
    );
    assert!(
        result
            .has_relationship("azure_user_group_has_group", "group-1", "group-2")
            .await
    );
}

#[tokio::test]
async fn test_account_entity_carries_directory_settings() {
    let mut config = config(true, None);
    config.default_domain = Some("example.onmicrosoft.com".to_string());

    let result = run_ingestion(Some(config), MockTransport::new(), SchedulingStrategy::Sequential).await;

    let accounts = result.entities_of_type("azure_account").await;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].key, account_key());
    assert_eq!(accounts[0].display_name, "example.onmicrosoft.com");
    assert_eq!(accounts[0].property_str("directoryId"), Some(DIRECTORY_ID));
}

#[tokio::test]
async fn test_graph_failure_fails_the_step() {
    let transport = directory().with_status("/users", 403);

    let result = run_ingestion(
        Some(config(true, None)),
        transport,
        SchedulingStrategy::Sequential,
    )
    .await;

    assert_eq!(result.run.status, ExecutionStatus::Failed);
    assert!(matches!(result.state("ad-users"), StepState::Failed { .. }));
    assert!(matches!(result.state("ad-groups"), StepState::Completed { .. }));
    assert!(matches!(
        result.state("ad-group-members"),
        StepState::Skipped { .. }
    ));
}
