//! Test: enablement map over the standard catalog

use crate::helpers::*;
use azure_ingest::core::config::IntegrationConfig;
use azure_ingest::core::{resolve_step_start_states, StepCatalog, StepGroup, StepStartStates};

fn enabled_ids(states: &StepStartStates) -> Vec<&'static str> {
    states
        .iter()
        .filter(|(_, state)| state.is_enabled())
        .map(|(id, _)| id.as_str())
        .collect()
}

fn resolve(config: Option<&IntegrationConfig>) -> (StepCatalog, StepStartStates) {
    let catalog = StepCatalog::standard().unwrap();
    let states = resolve_step_start_states(config, &catalog);
    (catalog, states)
}

/// Every group decision, checked against the family the step belongs to
fn assert_groups(
    catalog: &StepCatalog,
    states: &StepStartStates,
    directory: bool,
    resource_scope: bool,
) {
    assert_eq!(states.len(), catalog.len());
    for (id, state) in states {
        let expected = match catalog.group_of(*id).unwrap() {
            StepGroup::Account => true,
            StepGroup::Directory => directory,
            StepGroup::ResourceScope => resource_scope,
        };
        assert_eq!(state.is_enabled(), expected, "step {}", id);
    }
}

#[test]
fn test_absent_config_enables_account_only() {
    let (_, states) = resolve(None);
    assert_eq!(enabled_ids(&states), vec!["ad-account"]);
}

#[test]
fn test_directory_only() {
    let config = config(true, None);
    let (catalog, states) = resolve(Some(&config));
    assert_groups(&catalog, &states, true, false);
    assert!(states.values().filter(|s| s.is_enabled()).count() == 5);
}

#[test]
fn test_subscription_only() {
    let config = config(false, Some(SUBSCRIPTION_ID));
    let (catalog, states) = resolve(Some(&config));
    assert_groups(&catalog, &states, false, true);
}

#[test]
fn test_everything_enabled() {
    let config = config(true, Some(SUBSCRIPTION_ID));
    let (catalog, states) = resolve(Some(&config));
    assert_groups(&catalog, &states, true, true);
    assert!(states.values().all(|s| s.is_enabled()));
}

#[test]
fn test_empty_subscription_id_disables_resource_scope() {
    let config = config(true, Some(""));
    let (catalog, states) = resolve(Some(&config));
    assert_groups(&catalog, &states, true, false);
}

#[test]
fn test_boolish_yaml_gate() {
    let config = IntegrationConfig::from_yaml("ingestActiveDirectory: \"1\"\nsubscriptionId: \"x\"").unwrap();
    let (catalog, states) = resolve(Some(&config));
    assert_groups(&catalog, &states, true, true);
}

#[test]
fn test_resolution_is_repeatable() {
    let config = config(true, None);
    let (catalog, first) = resolve(Some(&config));
    let second = resolve_step_start_states(Some(&config), &catalog);
    assert_eq!(first, second);
}
