// policy-table-core/tests/table_serde.rs
// ============================================================================
// Module: Document Model Tests
// Description: Validate policy document serialization and variants.
// Purpose: Pin the JSON forms of application policies and enum tokens.
// Dependencies: policy-table-core, serde_json
// ============================================================================

//! ## Overview
//! The document model is the exchange format with the OEM backend. These
//! tests pin the tagged application-policy variants (null / alias string /
//! structured object), the enum token tables, and insertion-ordered
//! deduplication inside RPC permission lists.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_table_core::table::AppHmiType;
use policy_table_core::table::ApplicationParams;
use policy_table_core::table::ApplicationPolicy;
use policy_table_core::table::HmiLevel;
use policy_table_core::table::Maybe;
use policy_table_core::table::Parameter;
use policy_table_core::table::PolicyTableDocument;
use policy_table_core::table::Priority;
use policy_table_core::table::RequestType;
use policy_table_core::table::RpcPermissions;
use policy_table_core::table::is_predefined_app;

// ============================================================================
// SECTION: Application Policy Variants
// ============================================================================

#[test]
fn revoked_policy_serializes_as_null() {
    let json = serde_json::to_string(&ApplicationPolicy::Revoked).unwrap();
    assert_eq!(json, "null");
    let back: ApplicationPolicy = serde_json::from_str("null").unwrap();
    assert!(back.is_revoked());
}

#[test]
fn alias_policies_serialize_as_strings() {
    assert_eq!(
        serde_json::to_string(&ApplicationPolicy::Default).unwrap(),
        r#""default""#
    );
    assert_eq!(
        serde_json::to_string(&ApplicationPolicy::PreDataConsent).unwrap(),
        r#""pre_DataConsent""#
    );
    let back: ApplicationPolicy = serde_json::from_str(r#""default""#).unwrap();
    assert_eq!(back, ApplicationPolicy::Default);
    let back: ApplicationPolicy = serde_json::from_str(r#""pre_DataConsent""#).unwrap();
    assert_eq!(back, ApplicationPolicy::PreDataConsent);
}

#[test]
fn unknown_alias_is_rejected() {
    let result = serde_json::from_str::<ApplicationPolicy>(r#""factory_default""#);
    assert!(result.is_err());
}

#[test]
fn structured_policy_round_trips() {
    let policy = ApplicationPolicy::Params(ApplicationParams {
        priority: Maybe::Set(Priority::Normal),
        memory_kb: Maybe::Set(128),
        heart_beat_timeout_ms: Maybe::Set(5_000),
        certificate: Maybe::Unset,
        groups: vec!["Base-4".to_string()],
        nicknames: Maybe::Set(vec!["Music App".to_string()]),
        app_hmi_types: Maybe::Set(vec![AppHmiType::Media]),
        request_types: Maybe::Set(vec![RequestType::Http]),
    });
    let json = serde_json::to_string(&policy).unwrap();
    let back: ApplicationPolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(back, policy);
}

#[test]
fn structured_policy_uses_wire_field_names() {
    let policy = ApplicationPolicy::Params(ApplicationParams {
        app_hmi_types: Maybe::Set(vec![AppHmiType::Media]),
        request_types: Maybe::Set(vec![RequestType::Http]),
        ..ApplicationParams::default()
    });
    let json = serde_json::to_value(&policy).unwrap();
    assert_eq!(json["AppHMIType"][0], "MEDIA");
    assert_eq!(json["RequestType"][0], "HTTP");
}

// ============================================================================
// SECTION: Enum Tokens
// ============================================================================

#[test]
fn enum_tokens_round_trip() {
    for priority in [
        Priority::Emergency,
        Priority::Navigation,
        Priority::VoiceCom,
        Priority::Communication,
        Priority::Normal,
        Priority::None,
    ] {
        assert_eq!(
            Priority::from_json_token(priority.json_token()),
            Some(priority)
        );
    }
    for level in [
        HmiLevel::Full,
        HmiLevel::Limited,
        HmiLevel::Background,
        HmiLevel::None,
    ] {
        assert_eq!(HmiLevel::from_json_token(level.json_token()), Some(level));
    }
}

#[test]
fn unknown_tokens_are_rejected() {
    assert_eq!(Priority::from_json_token("CRITICAL"), None);
    assert_eq!(HmiLevel::from_json_token("full"), None);
    assert_eq!(Parameter::from_json_token("warpDrive"), None);
    assert_eq!(AppHmiType::from_json_token("GAMING"), None);
    assert_eq!(RequestType::from_json_token("TELEMETRY"), None);
}

#[test]
fn serde_tokens_match_json_tokens() {
    let json = serde_json::to_string(&Priority::VoiceCom).unwrap();
    assert_eq!(json, r#""VOICECOM""#);
    let json = serde_json::to_string(&Parameter::FuelLevelState).unwrap();
    assert_eq!(json, r#""fuelLevel_State""#);
}

// ============================================================================
// SECTION: RPC Permissions
// ============================================================================

#[test]
fn rpc_permission_lists_stay_unique_and_ordered() {
    let mut permissions = RpcPermissions::default();
    permissions.insert_hmi_level(HmiLevel::Full);
    permissions.insert_hmi_level(HmiLevel::Limited);
    permissions.insert_hmi_level(HmiLevel::Full);
    assert_eq!(permissions.hmi_levels, vec![HmiLevel::Full, HmiLevel::Limited]);

    permissions.insert_parameter(Parameter::Speed);
    permissions.insert_parameter(Parameter::Gps);
    permissions.insert_parameter(Parameter::Speed);
    assert_eq!(
        permissions.parameters.value(),
        Some(&vec![Parameter::Speed, Parameter::Gps])
    );
}

// ============================================================================
// SECTION: Document Round-Trip
// ============================================================================

#[test]
fn document_round_trips_with_mixed_presence() {
    let mut document = PolicyTableDocument::default();
    let table = &mut document.policy_table;
    table.module_config.exchange_after_x_ignition_cycles = 100;
    table.module_config.vehicle_make = Maybe::Set("Ford".to_string());
    table.module_config.certificate = Maybe::Null;
    table
        .module_config
        .notifications_per_minute_by_priority
        .insert(Priority::Normal, 3);

    let mut rpcs = BTreeMap::new();
    let mut show = RpcPermissions::default();
    show.insert_hmi_level(HmiLevel::Full);
    show.insert_parameter(Parameter::MainField1);
    rpcs.insert("Show".to_string(), show);
    table.functional_groupings.insert(
        "Base-4".to_string(),
        policy_table_core::table::FunctionalGroupRpcs {
            user_consent_prompt: Maybe::Unset,
            rpcs: Maybe::Set(rpcs),
        },
    );
    table
        .app_policies_section
        .apps
        .insert("appX".to_string(), ApplicationPolicy::Default);
    table
        .app_policies_section
        .apps
        .insert("appY".to_string(), ApplicationPolicy::Revoked);

    let json = serde_json::to_string(&document).unwrap();
    let back: PolicyTableDocument = serde_json::from_str(&json).unwrap();
    assert_eq!(back, document);
}

#[test]
fn predefined_ids_are_recognized() {
    assert!(is_predefined_app("default"));
    assert!(is_predefined_app("pre_DataConsent"));
    assert!(is_predefined_app("device"));
    assert!(!is_predefined_app("app1"));
}
