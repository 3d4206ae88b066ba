// policy-table-store-sqlite/tests/roundtrip.rs
// ============================================================================
// Module: Round-Trip Tests
// Description: Validate snapshot/save stability and save atomicity.
// Purpose: Ensure the persistence engine neither drifts nor half-writes.
// Dependencies: policy-table-store-sqlite, policy-table-core, rusqlite, tempfile
// ============================================================================

//! ## Overview
//! The load/save cycle must be a fixed point: saving a snapshot and
//! snapshotting again yields a structurally equal document. A failing
//! sub-save must leave the prior state untouched, and group identifiers
//! must survive a full schema refresh.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

mod common;

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_table_core::hashing::functional_group_id;
use policy_table_core::interfaces::PolicyTableRepository;
use policy_table_core::table::ApplicationParams;
use policy_table_core::table::ApplicationPolicy;
use policy_table_core::table::Maybe;
use policy_table_core::table::Priority;
use tempfile::TempDir;

use common::database_path;
use common::message_catalog;
use common::sample_document;
use common::store_for;

// ============================================================================
// SECTION: Round-Trip
// ============================================================================

#[test]
fn snapshot_of_a_saved_snapshot_is_identical() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    let first = store.generate_snapshot();
    store.save(&first).unwrap();
    let second = store.generate_snapshot();
    assert_eq!(second, first);
}

#[test]
fn snapshot_reflects_the_saved_document() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let document = sample_document();
    store.save(&document).unwrap();

    let snapshot = store.generate_snapshot();
    let table = &snapshot.policy_table;
    assert_eq!(table.module_config.exchange_after_x_ignition_cycles, 100);
    assert_eq!(table.module_config.seconds_between_retries, vec![1, 5, 25, 125, 625]);
    assert_eq!(
        table.functional_groupings.keys().collect::<Vec<_>>(),
        vec!["Base-4", "Location-1"]
    );
    let location = &table.functional_groupings["Location-1"];
    assert_eq!(
        location.user_consent_prompt.value().map(String::as_str),
        Some("Grant location access?")
    );
    match table.app_policies_section.apps.get("app1") {
        Some(ApplicationPolicy::Params(params)) => {
            assert_eq!(params.priority.value(), Some(&Priority::Normal));
            assert_eq!(params.memory_kb.value(), Some(&128));
            assert_eq!(params.heart_beat_timeout_ms.value(), Some(&5_000));
            assert_eq!(
                params.groups,
                vec!["Base-4".to_string(), "Location-1".to_string()]
            );
        }
        other => panic!("app1 should be a structured policy, got {other:?}"),
    }
}

#[test]
fn group_with_no_rpcs_snapshots_as_null() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let mut document = sample_document();
    document.policy_table.functional_groupings.insert(
        "EmptyGroup".to_string(),
        policy_table_core::table::FunctionalGroupRpcs {
            user_consent_prompt: Maybe::Unset,
            rpcs: Maybe::Unset,
        },
    );
    store.save(&document).unwrap();

    let snapshot = store.generate_snapshot();
    let group = &snapshot.policy_table.functional_groupings["EmptyGroup"];
    assert!(group.rpcs.is_null());
}

// ============================================================================
// SECTION: Atomicity
// ============================================================================

#[test]
fn failing_sub_save_rolls_back_the_whole_document() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    let before = store.generate_snapshot();

    let mut broken = sample_document();
    broken.policy_table.app_policies_section.apps.insert(
        "rogue".to_string(),
        ApplicationPolicy::Params(ApplicationParams {
            priority: Maybe::Set(Priority::Normal),
            groups: vec!["no-such-group".to_string()],
            ..ApplicationParams::default()
        }),
    );
    assert!(store.save(&broken).is_err());

    let after = store.generate_snapshot();
    assert_eq!(after, before);
}

// ============================================================================
// SECTION: Stable Group Identifiers
// ============================================================================

#[test]
fn group_ids_match_the_hash_and_survive_a_refresh() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    let id_query = "SELECT `id` FROM `functional_group` WHERE `name` = ?1";
    let connection = rusqlite::Connection::open(database_path(temp.path())).unwrap();
    let before: i64 = connection
        .query_row(id_query, rusqlite::params!["Base-4"], |row| row.get(0))
        .unwrap();
    assert_eq!(before, functional_group_id("Base-4"));

    store.refresh_db().unwrap();
    store.save(&sample_document()).unwrap();
    let after: i64 = connection
        .query_row(id_query, rusqlite::params!["Base-4"], |row| row.get(0))
        .unwrap();
    assert_eq!(after, before);
}

// ============================================================================
// SECTION: Message Preservation
// ============================================================================

#[test]
fn absent_message_container_preserves_stored_messages() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let mut document = sample_document();
    document.policy_table.consumer_friendly_messages = message_catalog("001.001.001");
    store.save(&document).unwrap();

    let connection = rusqlite::Connection::open(database_path(temp.path())).unwrap();
    let types_before: i64 = connection
        .query_row("SELECT COUNT(*) FROM `message_type`", [], |row| row.get(0))
        .unwrap();
    assert_eq!(types_before, 1);

    // A snapshot leaves the message container unset; saving it back must not
    // touch the stored version or the message tables.
    let mut snapshot = store.generate_snapshot();
    assert!(snapshot
        .policy_table
        .consumer_friendly_messages
        .value()
        .is_some_and(|catalog| catalog.messages.is_unset()));
    if let Maybe::Set(catalog) = &mut snapshot.policy_table.consumer_friendly_messages {
        catalog.version = "999.999.999".to_string();
    }
    store.save(&snapshot).unwrap();

    let reread = store.generate_snapshot();
    assert_eq!(
        reread
            .policy_table
            .consumer_friendly_messages
            .value()
            .map(|catalog| catalog.version.as_str()),
        Some("001.001.001")
    );
    let types_after: i64 = connection
        .query_row("SELECT COUNT(*) FROM `message_type`", [], |row| row.get(0))
        .unwrap();
    assert_eq!(types_after, types_before);
}

#[test]
fn present_message_container_rewrites_the_catalog() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let mut document = sample_document();
    document.policy_table.consumer_friendly_messages = message_catalog("002.000.000");
    store.save(&document).unwrap();

    let snapshot = store.generate_snapshot();
    assert_eq!(
        snapshot
            .policy_table
            .consumer_friendly_messages
            .value()
            .map(|catalog| catalog.version.as_str()),
        Some("002.000.000")
    );

    let connection = rusqlite::Connection::open(database_path(temp.path())).unwrap();
    let languages: i64 = connection
        .query_row("SELECT COUNT(*) FROM `language`", [], |row| row.get(0))
        .unwrap();
    assert_eq!(languages, 1);
}

// ============================================================================
// SECTION: Device Data
// ============================================================================

#[test]
fn device_identities_round_trip() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let mut document = sample_document();
    let mut devices = policy_table_core::table::DeviceData::new();
    devices.insert(
        "d4c2...aa90".to_string(),
        policy_table_core::table::DeviceParams::default(),
    );
    document.policy_table.device_data = Maybe::Set(devices);
    store.save(&document).unwrap();

    let snapshot = store.generate_snapshot();
    let device_data = snapshot.policy_table.device_data.value().unwrap();
    assert!(device_data.contains_key("d4c2...aa90"));

    // Device rows accumulate across saves rather than being replaced.
    store.save(&sample_document()).unwrap();
    let snapshot = store.generate_snapshot();
    assert!(snapshot
        .policy_table
        .device_data
        .value()
        .is_some_and(|devices| devices.contains_key("d4c2...aa90")));
}
