// policy-table-store-sqlite/tests/common/mod.rs
// ============================================================================
// Module: Store Test Helpers
// Description: Shared fixtures for policy store tests.
// Purpose: Build scratch stores and representative policy documents.
// Dependencies: policy-table-core, policy-table-config, policy-table-store-sqlite
// ============================================================================

#![allow(dead_code, reason = "Each test binary uses a subset of the helpers.")]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use policy_table_config::PolicySettings;
use policy_table_core::interfaces::InitResult;
use policy_table_core::table::AppHmiType;
use policy_table_core::table::ApplicationParams;
use policy_table_core::table::ApplicationPolicy;
use policy_table_core::table::ConsumerFriendlyMessages;
use policy_table_core::table::FunctionalGroupRpcs;
use policy_table_core::table::HmiLevel;
use policy_table_core::table::Maybe;
use policy_table_core::table::MessageLanguages;
use policy_table_core::table::MessageString;
use policy_table_core::table::ModuleMeta;
use policy_table_core::table::Parameter;
use policy_table_core::table::PolicyTableDocument;
use policy_table_core::table::Priority;
use policy_table_core::table::RequestType;
use policy_table_core::table::RpcPermissions;
use policy_table_store_sqlite::SqlitePolicyTable;

// ============================================================================
// SECTION: Store Fixtures
// ============================================================================

/// Opens and bootstraps a fresh store in the given folder.
pub fn store_for(folder: &Path) -> SqlitePolicyTable {
    let store = SqlitePolicyTable::new(PolicySettings::new(folder));
    assert_eq!(store.init(), InitResult::Success);
    store
}

/// Path of the database file inside a storage folder.
pub fn database_path(folder: &Path) -> std::path::PathBuf {
    folder.join(policy_table_store_sqlite::DATABASE_NAME)
}

// ============================================================================
// SECTION: Document Fixtures
// ============================================================================

/// Builds a representative policy document: one permission group bound to
/// one ordinary application, a default application, device priority, update
/// cadence limits, retry schedule, notification limits, and endpoints.
pub fn sample_document() -> PolicyTableDocument {
    let mut document = PolicyTableDocument::default();
    let table = &mut document.policy_table;

    table.module_config.preloaded_pt = Maybe::Set(false);
    table.module_config.exchange_after_x_ignition_cycles = 100;
    table.module_config.exchange_after_x_kilometers = 500;
    table.module_config.exchange_after_x_days = 30;
    table.module_config.timeout_after_x_seconds = 60;
    table.module_config.seconds_between_retries = vec![1, 5, 25, 125, 625];
    table
        .module_config
        .notifications_per_minute_by_priority
        .insert(Priority::Normal, 3);
    table
        .module_config
        .notifications_per_minute_by_priority
        .insert(Priority::Communication, 6);
    table.module_config.endpoints.insert(
        "0x07".to_string(),
        BTreeMap::from([(
            "default".to_string(),
            vec![
                "http://policies.example/api/v1".to_string(),
                "http://backup.example/api/v1".to_string(),
            ],
        )]),
    );
    table.module_config.endpoints.insert(
        "lock_screen_icon_url".to_string(),
        BTreeMap::from([(
            "default".to_string(),
            vec!["http://policies.example/icon.png".to_string()],
        )]),
    );

    let mut base_rpcs = BTreeMap::new();
    let mut show = RpcPermissions::default();
    show.insert_hmi_level(HmiLevel::Full);
    show.insert_parameter(Parameter::MainField1);
    base_rpcs.insert("Show".to_string(), show);
    let mut status = RpcPermissions::default();
    status.insert_hmi_level(HmiLevel::Full);
    status.insert_hmi_level(HmiLevel::Limited);
    base_rpcs.insert("OnHMIStatus".to_string(), status);
    table.functional_groupings.insert(
        "Base-4".to_string(),
        FunctionalGroupRpcs {
            user_consent_prompt: Maybe::Unset,
            rpcs: Maybe::Set(base_rpcs),
        },
    );

    let mut location_rpcs = BTreeMap::new();
    let mut subscribe = RpcPermissions::default();
    subscribe.insert_hmi_level(HmiLevel::Full);
    subscribe.insert_parameter(Parameter::Gps);
    subscribe.insert_parameter(Parameter::Speed);
    location_rpcs.insert("SubscribeVehicleData".to_string(), subscribe);
    table.functional_groupings.insert(
        "Location-1".to_string(),
        FunctionalGroupRpcs {
            user_consent_prompt: Maybe::Set("Grant location access?".to_string()),
            rpcs: Maybe::Set(location_rpcs),
        },
    );

    table.app_policies_section.apps.insert(
        "default".to_string(),
        ApplicationPolicy::Params(ApplicationParams {
            priority: Maybe::Set(Priority::None),
            memory_kb: Maybe::Set(64),
            heart_beat_timeout_ms: Maybe::Set(3_000),
            groups: vec!["Base-4".to_string()],
            ..ApplicationParams::default()
        }),
    );
    table.app_policies_section.apps.insert(
        "app1".to_string(),
        ApplicationPolicy::Params(ApplicationParams {
            priority: Maybe::Set(Priority::Normal),
            memory_kb: Maybe::Set(128),
            heart_beat_timeout_ms: Maybe::Set(5_000),
            groups: vec!["Base-4".to_string(), "Location-1".to_string()],
            nicknames: Maybe::Set(vec!["Music App".to_string()]),
            app_hmi_types: Maybe::Set(vec![AppHmiType::Media]),
            request_types: Maybe::Set(vec![RequestType::Http]),
            ..ApplicationParams::default()
        }),
    );
    table.app_policies_section.device.priority = Maybe::Set(Priority::None);

    table.module_meta = Maybe::Set(ModuleMeta {
        pt_exchanged_at_odometer_x: Maybe::Set(0),
        pt_exchanged_x_days_after_epoch: Maybe::Set(0),
        ignition_cycles_since_last_exchange: Maybe::Set(0),
    });

    document
}

/// Builds a message catalog carrying one message type and language.
pub fn message_catalog(version: &str) -> Maybe<ConsumerFriendlyMessages> {
    let mut languages = BTreeMap::new();
    languages.insert("en-us".to_string(), MessageString::default());
    let mut messages = BTreeMap::new();
    messages.insert(
        "AppPermissions".to_string(),
        MessageLanguages { languages },
    );
    Maybe::Set(ConsumerFriendlyMessages {
        version: version.to_string(),
        messages: Maybe::Set(messages),
    })
}
