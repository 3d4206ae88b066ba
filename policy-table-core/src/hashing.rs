// policy-table-core/src/hashing.rs
// ============================================================================
// Module: Policy Table Deterministic Hashing
// Description: Djb2 string hashing for group identifiers and schema identity.
// Purpose: Provide stable identifiers that survive drop-and-reinsert cycles.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Functional group identifiers and the schema version identity both derive
//! from the Djb2 string hash. The hash is an on-disk compatibility surface:
//! existing policy databases carry ids produced by exactly this function, so
//! the algorithm is fixed and must not be swapped for another hash.

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Djb2 seed value.
const DJB2_SEED: u32 = 5381;

// ============================================================================
// SECTION: Hashing
// ============================================================================

/// Returns the Djb2 hash of a string, truncated to a signed 32-bit value.
#[must_use]
pub fn djb2_hash(text: &str) -> i32 {
    let mut hash = DJB2_SEED;
    for byte in text.bytes() {
        // hash * 33 + byte, with wrapping arithmetic.
        hash = hash
            .wrapping_shl(5)
            .wrapping_add(hash)
            .wrapping_add(u32::from(byte));
    }
    hash as i32
}

/// Returns the stable surrogate key for a functional group name.
///
/// The id is the absolute value of the group's Djb2 hash. Group rows are
/// dropped and reinserted on every save while other tables keep references
/// to them, so the key must be deterministic rather than autoincremented.
#[must_use]
pub fn functional_group_id(name: &str) -> i64 {
    i64::from(djb2_hash(name)).abs()
}
