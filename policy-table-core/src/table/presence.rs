// policy-table-core/src/table/presence.rs
// ============================================================================
// Module: Three-Valued Field Presence
// Description: Unset / Null / Set wrapper for optional policy table fields.
// Purpose: Preserve the distinction between absent, cleared, and set fields.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Policy table fields carry three presence states: never touched (`Unset`),
//! explicitly cleared (`Null`), and carrying a value (`Set`). The distinction
//! is load-bearing: a save must not overwrite stored data for an absent
//! sub-document, while a cleared field must overwrite it with nothing.
//! JSON mapping: `Unset` is an omitted field, `Null` is a JSON `null`, and
//! `Set(v)` is the plain value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

// ============================================================================
// SECTION: Maybe
// ============================================================================

/// Three-valued presence wrapper for a policy table field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Maybe<T> {
    /// The field was never touched.
    #[default]
    Unset,
    /// The field was explicitly cleared.
    Null,
    /// The field carries a value.
    Set(T),
}

impl<T> Maybe<T> {
    /// Returns true when the field was never touched.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns true when the field was explicitly cleared.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true when the field carries a value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }

    /// Returns the carried value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Returns the carried value or the provided fallback.
    #[must_use]
    pub fn value_or(&self, fallback: T) -> T
    where
        T: Clone,
    {
        match self {
            Self::Set(value) => value.clone(),
            Self::Unset | Self::Null => fallback,
        }
    }

    /// Clears the field to the explicit null state.
    pub fn set_to_null(&mut self) {
        *self = Self::Null;
    }

    /// Converts into an `Option`, losing the unset/null distinction.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Set(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Unset, Self::Set)
    }
}

// ============================================================================
// SECTION: Serde
// ============================================================================

impl<T: Serialize> Serialize for Maybe<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Unset fields are skipped at the struct level; a stray unset
            // value degrades to null rather than inventing data.
            Self::Unset | Self::Null => serializer.serialize_none(),
            Self::Set(value) => serializer.serialize_some(value),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Maybe<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(|value| match value {
            None => Self::Null,
            Some(value) => Self::Set(value),
        })
    }
}
