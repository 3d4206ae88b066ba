// policy-table-config/tests/settings.rs
// ============================================================================
// Module: Settings Tests
// Description: Validate policy settings defaults and validation.
// Purpose: Ensure settings fail closed on invalid storage folders.
// Dependencies: policy-table-config, serde_json
// ============================================================================

//! ## Overview
//! Settings validation matrices: defaults through the constructor and serde,
//! plus the path-limit rejections.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;

use policy_table_config::PolicySettings;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn constructor_applies_default_retry_budget() {
    let settings = PolicySettings::new("/var/data");
    assert_eq!(settings.app_storage_folder(), Path::new("/var/data"));
    assert_eq!(settings.attempts_to_open_policy_db(), 5);
    assert_eq!(settings.open_attempt_timeout_ms(), 100);
}

#[test]
fn serde_applies_default_retry_budget() {
    let settings: PolicySettings =
        serde_json::from_str(r#"{"app_storage_folder":"/var/data"}"#).unwrap();
    assert_eq!(settings.attempts_to_open_policy_db(), 5);
    assert_eq!(settings.open_attempt_timeout_ms(), 100);
}

#[test]
fn serde_accepts_explicit_retry_budget() {
    let settings: PolicySettings = serde_json::from_str(
        r#"{"app_storage_folder":"/var/data","attempts_to_open_policy_db":3,"open_attempt_timeout_ms":1}"#,
    )
    .unwrap();
    assert_eq!(settings.attempts_to_open_policy_db(), 3);
    assert_eq!(settings.open_attempt_timeout_ms(), 1);
}

#[test]
fn valid_settings_pass_validation() {
    let settings = PolicySettings::new("/var/data/policy");
    assert!(settings.validate().is_ok());
}

#[test]
fn empty_storage_folder_is_rejected() {
    let settings = PolicySettings::new("");
    assert!(settings.validate().is_err());
}

#[test]
fn overlong_path_component_is_rejected() {
    let settings = PolicySettings::new(format!("/var/{}", "x".repeat(300)));
    assert!(settings.validate().is_err());
}

#[test]
fn overlong_total_path_is_rejected() {
    let component = "y".repeat(200);
    let mut path = String::from("/var");
    for _ in 0..25 {
        path.push('/');
        path.push_str(&component);
    }
    let settings = PolicySettings::new(path);
    assert!(settings.validate().is_err());
}
