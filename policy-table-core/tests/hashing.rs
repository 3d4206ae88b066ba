// policy-table-core/tests/hashing.rs
// ============================================================================
// Module: Hashing Tests
// Description: Validate the Djb2 hash and group id derivation.
// Purpose: Pin the on-disk identifier algorithm.
// Dependencies: policy-table-core
// ============================================================================

//! ## Overview
//! Group ids and the schema version identity are stored in policy databases
//! in the field, so the hash values here are compatibility vectors, not an
//! implementation detail.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_table_core::hashing::djb2_hash;
use policy_table_core::hashing::functional_group_id;

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn empty_string_hashes_to_seed() {
    assert_eq!(djb2_hash(""), 5381);
}

#[test]
fn known_vectors() {
    // hash = hash * 33 + byte, seeded with 5381.
    assert_eq!(djb2_hash("a"), 177_670);
    assert_eq!(djb2_hash("ab"), 5_863_208);
}

#[test]
fn hash_is_deterministic() {
    assert_eq!(djb2_hash("Base-4"), djb2_hash("Base-4"));
    assert_ne!(djb2_hash("Base-4"), djb2_hash("Base-6"));
}

#[test]
fn group_id_is_absolute() {
    for name in ["Base-4", "Location-1", "Notifications", ""] {
        let id = functional_group_id(name);
        assert!(id >= 0, "group id for {name} must be non-negative");
        assert_eq!(id, i64::from(djb2_hash(name)).abs());
    }
}

#[test]
fn group_id_is_stable_across_calls() {
    let first = functional_group_id("DrivingCharacteristics-3");
    let second = functional_group_id("DrivingCharacteristics-3");
    assert_eq!(first, second);
}
