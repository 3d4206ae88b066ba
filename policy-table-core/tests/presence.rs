// policy-table-core/tests/presence.rs
// ============================================================================
// Module: Presence Tests
// Description: Validate three-valued field presence round-trips.
// Purpose: Ensure unset, null, and set states survive JSON exactly.
// Dependencies: policy-table-core, serde, serde_json
// ============================================================================

//! ## Overview
//! The unset/null/set distinction drives the save path's preserve-on-absent
//! behavior, so these tests pin the exact JSON forms of all three states.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_table_core::table::Maybe;
use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Helpers
// ============================================================================

#[derive(Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
struct Probe {
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    field: Maybe<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn unset_field_is_omitted() {
    let probe = Probe {
        field: Maybe::Unset,
    };
    let json = serde_json::to_string(&probe).unwrap();
    assert_eq!(json, "{}");
}

#[test]
fn null_field_serializes_as_null() {
    let probe = Probe { field: Maybe::Null };
    let json = serde_json::to_string(&probe).unwrap();
    assert_eq!(json, r#"{"field":null}"#);
}

#[test]
fn set_field_serializes_as_value() {
    let probe = Probe {
        field: Maybe::Set("value".to_string()),
    };
    let json = serde_json::to_string(&probe).unwrap();
    assert_eq!(json, r#"{"field":"value"}"#);
}

#[test]
fn missing_field_deserializes_as_unset() {
    let probe: Probe = serde_json::from_str("{}").unwrap();
    assert!(probe.field.is_unset());
}

#[test]
fn null_field_deserializes_as_null() {
    let probe: Probe = serde_json::from_str(r#"{"field":null}"#).unwrap();
    assert!(probe.field.is_null());
}

#[test]
fn value_field_deserializes_as_set() {
    let probe: Probe = serde_json::from_str(r#"{"field":"value"}"#).unwrap();
    assert_eq!(probe.field.value().map(String::as_str), Some("value"));
}

#[test]
fn all_states_round_trip() {
    for probe in [
        Probe {
            field: Maybe::Unset,
        },
        Probe { field: Maybe::Null },
        Probe {
            field: Maybe::Set("value".to_string()),
        },
    ] {
        let json = serde_json::to_string(&probe).unwrap();
        let back: Probe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, probe);
    }
}

#[test]
fn accessors_reflect_state() {
    let mut field: Maybe<i32> = Maybe::Unset;
    assert!(field.is_unset());
    assert_eq!(field.value(), None);
    assert_eq!(field.value_or(7), 7);

    field = Maybe::Set(3);
    assert!(field.is_set());
    assert_eq!(field.value(), Some(&3));
    assert_eq!(field.value_or(7), 3);

    field.set_to_null();
    assert!(field.is_null());
    assert_eq!(field.into_option(), None);
}

#[test]
fn from_option_maps_none_to_unset() {
    assert!(Maybe::<i32>::from(None).is_unset());
    assert_eq!(Maybe::from(Some(5)).value(), Some(&5));
}
