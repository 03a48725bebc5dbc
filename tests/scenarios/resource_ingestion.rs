//! Test: resource-manager families, their parents, and cross-resource links

use crate::helpers::*;
use azure_ingest::core::{ExecutionStatus, StepState};
use azure_ingest::execution::SchedulingStrategy;
use azure_ingest::export::{create_summary, write_graph, ENTITIES_FILE, RELATIONSHIPS_FILE, SUMMARY_FILE};
use serde_json::{json, Value};

fn vault_id() -> String {
    resource_id("Microsoft.KeyVault/vaults/kv-1")
}

fn vnet_id() -> String {
    resource_id("Microsoft.Network/virtualNetworks/vnet-1")
}

fn subnet_id() -> String {
    format!("{}/subnets/default", vnet_id())
}

fn nic_id() -> String {
    resource_id("Microsoft.Network/networkInterfaces/nic-1")
}

fn public_ip_id() -> String {
    resource_id("Microsoft.Network/publicIPAddresses/ip-1")
}

fn vm_id() -> String {
    resource_id("Microsoft.Compute/virtualMachines/vm-1")
}

fn disk_id() -> String {
    resource_id("Microsoft.Compute/disks/osdisk-1")
}

fn sql_server_id() -> String {
    resource_id("Microsoft.Sql/servers/sql-1")
}

fn storage_account_id() -> String {
    resource_id("Microsoft.Storage/storageAccounts/logs1")
}

fn diagnostic_setting(parent: &str, name: &str) -> Value {
    json!({
        "id": format!("{}/providers/microsoft.insights/diagnosticSettings/{}", parent, name),
        "name": name,
        // the insights API reports storage ids in lower case
        "properties": { "storageAccountId": storage_account_id().to_lowercase() },
    })
}

fn role_definition_id() -> String {
    subscription_path("providers/Microsoft.Authorization/roleDefinitions/reader")
}

fn role_assignment_id() -> String {
    subscription_path("providers/Microsoft.Authorization/roleAssignments/ra-1")
}

fn subscription_transport() -> MockTransport {
    MockTransport::new()
        .with_items("/users", vec![json!({ "id": "user-1", "displayName": "Ada" })])
        .with_items(
            "/subscriptions",
            vec![json!({
                "id": format!("/subscriptions/{}", SUBSCRIPTION_ID),
                "subscriptionId": SUBSCRIPTION_ID,
                "displayName": "Development",
            })],
        )
        .with_items(
            subscription_path("locations"),
            vec![json!({
                "id": subscription_path("locations/westeurope"),
                "name": "westeurope",
            })],
        )
        .with_items(
            subscription_path("resourcegroups"),
            vec![json!({ "id": resource_group_id(), "name": "rg-1", "location": "westeurope" })],
        )
        .with_items(
            subscription_path("providers/Microsoft.KeyVault/vaults"),
            vec![json!({
                "id": vault_id(),
                "name": "kv-1",
                "tags": { "env": "dev" },
                "properties": {
                    "enableSoftDelete": true,
                    "accessPolicies": [{ "objectId": "user-1" }, { "objectId": "unknown-principal" }],
                },
            })],
        )
        .with_items(
            format!("{}/keys", vault_id()),
            vec![json!({ "id": format!("{}/keys/signing", vault_id()), "name": "signing" })],
        )
        .with_status(format!("{}/secrets", vault_id()), 403)
        .with_items(
            format!("{}/providers/microsoft.insights/diagnosticSettings", vault_id()),
            vec![diagnostic_setting(&vault_id(), "vault-audit")],
        )
        .with_items(
            subscription_path("providers/microsoft.insights/diagnosticSettings"),
            vec![diagnostic_setting(&format!("/subscriptions/{}", SUBSCRIPTION_ID), "activity-log")],
        )
        .with_items(
            subscription_path("providers/Microsoft.Storage/storageAccounts"),
            vec![json!({ "id": storage_account_id(), "name": "logs1" })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Network/virtualNetworks"),
            vec![json!({
                "id": vnet_id(),
                "name": "vnet-1",
                "properties": { "subnets": [{ "id": subnet_id(), "name": "default" }] },
            })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Network/networkSecurityGroups"),
            vec![json!({
                "id": resource_id("Microsoft.Network/networkSecurityGroups/nsg-1"),
                "name": "nsg-1",
                "properties": { "subnets": [{ "id": subnet_id() }] },
            })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Network/networkInterfaces"),
            vec![json!({
                "id": nic_id(),
                "name": "nic-1",
                "properties": {
                    "ipConfigurations": [{
                        "properties": {
                            "subnet": { "id": subnet_id() },
                            "publicIPAddress": { "id": public_ip_id() },
                        },
                    }],
                },
            })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Network/publicIPAddresses"),
            vec![json!({ "id": public_ip_id(), "name": "ip-1" })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Compute/disks"),
            vec![json!({ "id": disk_id(), "name": "osdisk-1" })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Compute/virtualMachines"),
            vec![json!({
                "id": vm_id(),
                "name": "vm-1",
                "properties": {
                    "storageProfile": { "osDisk": { "managedDisk": { "id": disk_id() } } },
                    "networkProfile": { "networkInterfaces": [{ "id": nic_id() }] },
                },
            })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Sql/servers"),
            vec![json!({ "id": sql_server_id(), "name": "sql-1" })],
        )
        .with_items(
            format!("{}/databases", sql_server_id()),
            vec![json!({ "id": format!("{}/databases/orders", sql_server_id()), "name": "orders" })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Authorization/roleAssignments"),
            vec![json!({
                "id": role_assignment_id(),
                "name": "ra-1",
                "properties": {
                    "principalId": "user-1",
                    "roleDefinitionId": role_definition_id(),
                    "scope": resource_group_id(),
                },
            })],
        )
        .with_items(
            subscription_path("providers/Microsoft.Authorization/roleDefinitions"),
            vec![json!({
                "id": role_definition_id(),
                "name": "reader",
                "properties": { "roleName": "Reader" },
            })],
        )
}

async fn run_subscription() -> ScenarioResult {
    run_ingestion(
        Some(config(true, Some(SUBSCRIPTION_ID))),
        subscription_transport(),
        SchedulingStrategy::LimitedParallel(4),
    )
    .await
}

#[tokio::test]
async fn test_full_run_completes() {
    let result = run_subscription().await;

    assert_eq!(result.run.status, ExecutionStatus::Completed);
    assert_eq!(result.run.counts().completed, result.catalog.len());
}

#[tokio::test]
async fn test_subscription_and_resource_groups() {
    let result = run_subscription().await;
    let subscription = format!("/subscriptions/{}", SUBSCRIPTION_ID);

    assert!(
        result
            .has_relationship("azure_account_has_subscription", &account_key(), &subscription)
            .await
    );
    assert!(
        result
            .has_relationship(
                "azure_subscription_uses_location",
                &subscription,
                &subscription_path("locations/westeurope"),
            )
            .await
    );
    assert!(
        result
            .has_relationship("azure_account_has_resource_group", &account_key(), &resource_group_id())
            .await
    );
}

#[tokio::test]
async fn test_key_vault_family() {
    let result = run_subscription().await;
    let vault = vault_id();

    let vaults = result.entities_of_type("azure_keyvault_service").await;
    assert_eq!(vaults.len(), 1);
    assert_eq!(vaults[0].property_str("resourceGroup"), Some("rg-1"));
    assert_eq!(vaults[0].property_str("tag.env"), Some("dev"));

    assert!(
        result
            .has_relationship("azure_resource_group_has_keyvault_service", &resource_group_id(), &vault)
            .await
    );
    assert!(
        result
            .has_relationship(
                "azure_keyvault_service_contains_key",
                &vault,
                &format!("{}/keys/signing", vault),
            )
            .await
    );
    assert!(
        result
            .has_relationship("azure_keyvault_service_allows_user", &vault, "user-1")
            .await
    );

    // a 403 on a child collection reads as empty
    let StepState::Completed { entities, .. } = result.state("rm-keyvault-secrets") else {
        panic!("secrets should complete");
    };
    assert_eq!(*entities, 0);
}

#[tokio::test]
async fn test_diagnostic_settings() {
    let result = run_subscription().await;
    let subscription = format!("/subscriptions/{}", SUBSCRIPTION_ID);
    let subscription_setting = format!(
        "{}/providers/microsoft.insights/diagnosticSettings/activity-log",
        subscription
    );
    let vault_setting = format!(
        "{}/providers/microsoft.insights/diagnosticSettings/vault-audit",
        vault_id()
    );

    assert_eq!(result.entities_of_type("azure_diagnostic_setting").await.len(), 2);
    assert!(
        result
            .has_relationship(
                "azure_subscription_has_diagnostic_setting",
                &subscription,
                &subscription_setting,
            )
            .await
    );
    assert!(
        result
            .has_relationship(
                "azure_keyvault_service_has_diagnostic_setting",
                &vault_id(),
                &vault_setting,
            )
            .await
    );
    for setting in [&subscription_setting, &vault_setting] {
        assert!(
            result
                .has_relationship(
                    "azure_diagnostic_setting_uses_storage_account",
                    setting,
                    &storage_account_id(),
                )
                .await,
            "{} should use the storage account",
            setting
        );
    }
}

#[tokio::test]
async fn test_resources_link_to_portal() {
    let mut config = config(true, Some(SUBSCRIPTION_ID));
    config.default_domain = Some("contoso.onmicrosoft.com".to_string());
    let result = run_ingestion(
        Some(config),
        subscription_transport(),
        SchedulingStrategy::Sequential,
    )
    .await;

    let vaults = result.entities_of_type("azure_keyvault_service").await;
    assert_eq!(
        vaults[0].property_str("webLink"),
        Some(format!("https://portal.azure.com/#@contoso.onmicrosoft.com/resource{}", vault_id()).as_str())
    );

    // directory objects are not resource-manager resources
    let users = result.entities_of_type("azure_user").await;
    assert!(users[0].property_str("webLink").is_none());
}

#[tokio::test]
async fn test_compute_and_network_links() {
    let result = run_subscription().await;

    assert!(
        result
            .has_relationship("azure_vnet_contains_subnet", &vnet_id(), &subnet_id())
            .await
    );
    assert!(
        result
            .has_relationship(
                "azure_security_group_protects_subnet",
                &resource_id("Microsoft.Network/networkSecurityGroups/nsg-1"),
                &subnet_id(),
            )
            .await
    );
    assert!(result.has_relationship("azure_vm_uses_nic", &vm_id(), &nic_id()).await);
    assert!(
        result
            .has_relationship("azure_vm_uses_managed_disk", &vm_id(), &disk_id())
            .await
    );
    assert!(
        result
            .has_relationship("azure_nic_uses_public_ip", &nic_id(), &public_ip_id())
            .await
    );
    assert!(result.has_relationship("azure_subnet_has_nic", &subnet_id(), &nic_id()).await);
}

#[tokio::test]
async fn test_nested_databases() {
    let result = run_subscription().await;

    assert!(
        result
            .has_relationship(
                "azure_sql_server_has_database",
                &sql_server_id(),
                &format!("{}/databases/orders", sql_server_id()),
            )
            .await
    );
}

#[tokio::test]
async fn test_role_assignment_links() {
    let result = run_subscription().await;
    let assignment = role_assignment_id();

    assert!(
        result
            .has_relationship("azure_role_assignment_assigned_user", &assignment, "user-1")
            .await
    );
    assert!(
        result
            .has_relationship("azure_role_assignment_uses_definition", &assignment, &role_definition_id())
            .await
    );
    assert!(
        result
            .has_relationship("azure_role_assignment_allows_resource_group", &assignment, &resource_group_id())
            .await
    );
}

#[tokio::test]
async fn test_relationship_keys_are_unique() {
    let result = run_subscription().await;
    let relationships = result.relationships().await;

    let mut keys: Vec<String> = relationships.iter().map(|r| r.key.to_lowercase()).collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), relationships.len());
}

#[tokio::test]
async fn test_export_writes_graph() {
    let result = run_subscription().await;
    let dir = tempfile::tempdir().unwrap();

    let summary = create_summary(&result.run, &result.catalog);
    let entities = result.entities().await;
    let relationships = result.relationships().await;
    write_graph(dir.path(), &summary, &entities, &relationships)
        .await
        .unwrap();

    let read = |name: &str| -> Value {
        serde_json::from_slice(&std::fs::read(dir.path().join(name)).unwrap()).unwrap()
    };
    assert_eq!(read(ENTITIES_FILE).as_array().unwrap().len(), entities.len());
    assert_eq!(
        read(RELATIONSHIPS_FILE).as_array().unwrap().len(),
        relationships.len()
    );

    let summary = read(SUMMARY_FILE);
    assert_eq!(summary["status"], "Completed");
    assert_eq!(summary["entities"], entities.len());
    assert_eq!(summary["steps"][0]["id"], "ad-account");
}
