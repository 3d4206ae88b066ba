// policy-table-store-sqlite/tests/cadence.rs
// ============================================================================
// Module: Update Cadence Tests
// Description: Validate exchange countdown arithmetic and update lookups.
// Purpose: Ensure cadence counters clamp and count down correctly.
// Dependencies: policy-table-store-sqlite, policy-table-core, tempfile
// ============================================================================

//! ## Overview
//! The update cadence counts down ignition cycles, kilometers, and days
//! until the next mandatory policy exchange. All arithmetic clamps to zero
//! on negative or out-of-order counters, and lookups fall back to safe
//! defaults when the store is unreachable.

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

use policy_table_config::PolicySettings;
use policy_table_core::interfaces::PolicyTableRepository;
use policy_table_core::table::Maybe;
use policy_table_core::table::Priority;
use policy_table_store_sqlite::SqlitePolicyTable;
use tempfile::TempDir;

use common::sample_document;
use common::store_for;

// ============================================================================
// SECTION: Ignition Cycles
// ============================================================================

#[test]
fn ignition_cycles_count_down_and_reset() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    assert_eq!(store.ignition_cycles_before_exchange(), 100);
    let mut previous = 100;
    for _ in 0..3 {
        store.increment_ignition_cycles().unwrap();
        let remaining = store.ignition_cycles_before_exchange();
        assert!(remaining <= previous);
        previous = remaining;
    }
    assert_eq!(previous, 97);

    store.reset_ignition_cycles().unwrap();
    assert_eq!(store.ignition_cycles_before_exchange(), 100);
}

#[test]
fn consumed_cycles_beyond_the_limit_clamp_to_zero() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    let mut document = sample_document();
    document
        .policy_table
        .module_config
        .exchange_after_x_ignition_cycles = 2;
    store.save(&document).unwrap();

    for _ in 0..5 {
        store.increment_ignition_cycles().unwrap();
    }
    assert_eq!(store.ignition_cycles_before_exchange(), 0);
}

// ============================================================================
// SECTION: Kilometers
// ============================================================================

#[test]
fn kilometers_count_down_from_the_last_exchange() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    store
        .set_counters_passed_for_successful_update(1_000, 10)
        .unwrap();

    assert_eq!(store.kilometers_before_exchange(1_200), 300);
    assert_eq!(store.kilometers_before_exchange(1_000), 500);
}

#[test]
fn out_of_order_kilometers_clamp_to_zero() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    store
        .set_counters_passed_for_successful_update(1_000, 10)
        .unwrap();

    // Odometer behind the last exchange, negative, or past the limit.
    assert_eq!(store.kilometers_before_exchange(900), 0);
    assert_eq!(store.kilometers_before_exchange(-5), 0);
    assert_eq!(store.kilometers_before_exchange(1_700), 0);
}

// ============================================================================
// SECTION: Days
// ============================================================================

#[test]
fn days_before_any_exchange_short_circuit_to_the_limit() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    // No exchange has happened yet, so the full budget remains.
    assert_eq!(store.days_before_exchange(12_000), 30);
}

#[test]
fn days_count_down_after_an_exchange() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    store
        .set_counters_passed_for_successful_update(1_000, 10)
        .unwrap();

    assert_eq!(store.days_before_exchange(20), 20);
    assert_eq!(store.days_before_exchange(5), 0);
    assert_eq!(store.days_before_exchange(50), 0);
}

#[test]
fn successful_update_counters_land_in_module_meta() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    store
        .set_counters_passed_for_successful_update(1_000, 10)
        .unwrap();

    let snapshot = store.generate_snapshot();
    let meta = snapshot.policy_table.module_meta.value().unwrap();
    assert_eq!(meta.pt_exchanged_at_odometer_x.value(), Some(&1_000));
    assert_eq!(meta.pt_exchanged_x_days_after_epoch.value(), Some(&10));
}

// ============================================================================
// SECTION: Timeouts and Retries
// ============================================================================

#[test]
fn timeout_reads_the_stored_configuration() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    assert_eq!(store.timeout_response(), 60);
}

#[test]
fn timeout_falls_back_when_the_store_is_unreachable() {
    let temp = TempDir::new().unwrap();
    let store = SqlitePolicyTable::new(PolicySettings::new(temp.path()));
    assert_eq!(store.timeout_response(), 30);
}

#[test]
fn retry_schedule_round_trips_in_order() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();
    assert_eq!(
        store.seconds_between_retries().unwrap(),
        vec![1, 5, 25, 125, 625]
    );
}

// ============================================================================
// SECTION: Update Flag and Notifications
// ============================================================================

#[test]
fn update_required_flag_round_trips() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    assert!(!store.update_required());
    store.save_update_required(true).unwrap();
    assert!(store.update_required());
    store.save_update_required(false).unwrap();
    assert!(!store.update_required());
}

#[test]
fn notification_limits_are_read_per_priority() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    assert_eq!(store.get_notifications_number(Priority::Normal), 3);
    assert_eq!(store.get_notifications_number(Priority::Communication), 6);
    assert_eq!(store.get_notifications_number(Priority::Emergency), 0);
}

// ============================================================================
// SECTION: Endpoints
// ============================================================================

#[test]
fn update_urls_are_read_per_service() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    let urls = store.get_update_urls("0x07").unwrap();
    let pairs: Vec<(&str, Option<&str>)> = urls
        .iter()
        .map(|entry| (entry.url.as_str(), entry.app_id.as_deref()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("http://policies.example/api/v1", Some("default")),
            ("http://backup.example/api/v1", Some("default")),
        ]
    );
    assert!(store.get_update_urls("0x99").unwrap().is_empty());
}

#[test]
fn lock_screen_icon_is_a_fixed_key_lookup() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    store.save(&sample_document()).unwrap();

    assert_eq!(
        store.get_lock_screen_icon_url().unwrap().as_deref(),
        Some("http://policies.example/icon.png")
    );
}

// ============================================================================
// SECTION: Preloaded Flag
// ============================================================================

#[test]
fn preloaded_flag_follows_the_module_config() {
    let temp = TempDir::new().unwrap();
    let store = store_for(temp.path());
    assert!(!store.is_pt_preloaded());

    let mut document = sample_document();
    document.policy_table.module_config.preloaded_pt = Maybe::Set(true);
    store.save(&document).unwrap();
    assert!(store.is_pt_preloaded());
}
