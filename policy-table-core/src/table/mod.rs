// policy-table-core/src/table/mod.rs
// ============================================================================
// Module: Policy Table Document Model
// Description: Typed nested shape of the persisted policy document.
// Purpose: Model the policy table with explicit three-valued field presence.
// Dependencies: serde, serde_json, crate::table::{enums, presence}
// ============================================================================

//! ## Overview
//! The policy table is a deeply nested, partially-optional document: module
//! metadata, module configuration, functional permission groups, per-app
//! policies, consumer-friendly messages, known devices, and usage counters.
//! Every optional field distinguishes unset, null, and set states through
//! [`Maybe`], and application policies are a tagged variant covering
//! structured records, predefined-policy aliases, and revocation.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod enums;
mod presence;

pub use enums::AppHmiType;
pub use enums::HmiLevel;
pub use enums::Parameter;
pub use enums::Priority;
pub use enums::RequestType;
pub use presence::Maybe;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::de;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;

// ============================================================================
// SECTION: Predefined Identifiers
// ============================================================================

/// Reserved application identifier whose policy every unknown app inherits.
pub const DEFAULT_ID: &str = "default";
/// Reserved application identifier for apps awaiting data consent.
pub const PRE_DATA_CONSENT_ID: &str = "pre_DataConsent";
/// Reserved application identifier carrying the device policy row.
pub const DEVICE_ID: &str = "device";

/// Returns true for the reserved application identifiers.
#[must_use]
pub fn is_predefined_app(app_id: &str) -> bool {
    app_id == DEFAULT_ID || app_id == PRE_DATA_CONSENT_ID || app_id == DEVICE_ID
}

// ============================================================================
// SECTION: Container Aliases
// ============================================================================

/// Functional groupings keyed by group name.
pub type FunctionalGroupings = BTreeMap<String, FunctionalGroupRpcs>;
/// Application policies keyed by application identifier.
pub type ApplicationPolicies = BTreeMap<String, ApplicationPolicy>;
/// Known devices keyed by device identifier.
pub type DeviceData = BTreeMap<String, DeviceParams>;

// ============================================================================
// SECTION: Document Envelope
// ============================================================================

/// Top-level policy document with the canonical `policy_table` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyTableDocument {
    /// The policy table body.
    pub policy_table: PolicyTable,
}

/// The policy table body.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PolicyTable {
    /// Module configuration singleton.
    pub module_config: ModuleConfig,
    /// Functional permission groups keyed by name.
    pub functional_groupings: FunctionalGroupings,
    /// Per-application policy section.
    pub app_policies_section: ApplicationPoliciesSection,
    /// Module metadata singleton.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub module_meta: Maybe<ModuleMeta>,
    /// Consumer-friendly message catalog.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub consumer_friendly_messages: Maybe<ConsumerFriendlyMessages>,
    /// Known device identifiers.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub device_data: Maybe<DeviceData>,
    /// Usage and error counters.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub usage_and_error_counts: Maybe<UsageAndErrorCounts>,
}

// ============================================================================
// SECTION: Module Meta
// ============================================================================

/// Counters describing the last policy exchange.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleMeta {
    /// Odometer reading at the last exchange.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub pt_exchanged_at_odometer_x: Maybe<i32>,
    /// Days after epoch at the last exchange.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub pt_exchanged_x_days_after_epoch: Maybe<i32>,
    /// Ignition cycles counted since the last exchange.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub ignition_cycles_since_last_exchange: Maybe<i32>,
}

// ============================================================================
// SECTION: Module Config
// ============================================================================

/// Module configuration singleton.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Whether the current table came from the factory image.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub preloaded_pt: Maybe<bool>,
    /// Ignition cycles allowed between exchanges.
    pub exchange_after_x_ignition_cycles: i32,
    /// Kilometers allowed between exchanges.
    pub exchange_after_x_kilometers: i32,
    /// Days allowed between exchanges.
    pub exchange_after_x_days: i32,
    /// Response timeout for update requests, in seconds.
    pub timeout_after_x_seconds: i32,
    /// Retry backoff schedule, in seconds.
    pub seconds_between_retries: Vec<i32>,
    /// Notification rate limits keyed by priority.
    pub notifications_per_minute_by_priority: BTreeMap<Priority, i32>,
    /// Update endpoints: service type to application to ordered URLs.
    pub endpoints: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    /// Vehicle make.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub vehicle_make: Maybe<String>,
    /// Vehicle model.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub vehicle_model: Maybe<String>,
    /// Vehicle model year.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub vehicle_year: Maybe<String>,
    /// Date the preloaded table was built.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub preloaded_date: Maybe<String>,
    /// Module certificate.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub certificate: Maybe<String>,
}

// ============================================================================
// SECTION: Functional Groups
// ============================================================================

/// A named bundle of RPC permissions.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionalGroupRpcs {
    /// Consent prompt shown before the group is granted.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub user_consent_prompt: Maybe<String>,
    /// Permitted RPCs keyed by RPC name. Null for a group with no RPC rows.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub rpcs: Maybe<BTreeMap<String, RpcPermissions>>,
}

/// Permissions carried by a single RPC inside a functional group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RpcPermissions {
    /// HMI levels the RPC is permitted in, insertion-ordered and unique.
    pub hmi_levels: Vec<HmiLevel>,
    /// Permitted parameters, insertion-ordered and unique.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub parameters: Maybe<Vec<Parameter>>,
}

impl RpcPermissions {
    /// Records an HMI level, keeping insertion order and value uniqueness.
    pub fn insert_hmi_level(&mut self, level: HmiLevel) {
        if !self.hmi_levels.contains(&level) {
            self.hmi_levels.push(level);
        }
    }

    /// Records a parameter, keeping insertion order and value uniqueness.
    pub fn insert_parameter(&mut self, parameter: Parameter) {
        if let Maybe::Set(parameters) = &mut self.parameters {
            if !parameters.contains(&parameter) {
                parameters.push(parameter);
            }
            return;
        }
        self.parameters = Maybe::Set(vec![parameter]);
    }
}

// ============================================================================
// SECTION: Application Policies
// ============================================================================

/// Per-application policy section, with the device policy alongside.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationPoliciesSection {
    /// Application policies keyed by application identifier.
    pub apps: ApplicationPolicies,
    /// Device-level policy.
    #[serde(default)]
    pub device: DevicePolicy,
}

/// Device-level policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DevicePolicy {
    /// Device priority.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub priority: Maybe<Priority>,
}

/// Policy value for a single application.
///
/// JSON forms: `null` for a revoked app, the strings `"default"` /
/// `"pre_DataConsent"` for predefined-policy aliases, and an object for a
/// structured record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationPolicy {
    /// The application is revoked.
    Revoked,
    /// The application inherits the predefined default policy.
    Default,
    /// The application inherits the pre-data-consent policy.
    PreDataConsent,
    /// The application carries its own structured policy.
    Params(ApplicationParams),
}

impl ApplicationPolicy {
    /// Returns true when the policy is the revoked null.
    #[must_use]
    pub const fn is_revoked(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Returns the structured parameters, if any.
    #[must_use]
    pub const fn params(&self) -> Option<&ApplicationParams> {
        match self {
            Self::Params(params) => Some(params),
            Self::Revoked | Self::Default | Self::PreDataConsent => None,
        }
    }
}

impl Serialize for ApplicationPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Revoked => serializer.serialize_unit(),
            Self::Default => serializer.serialize_str(DEFAULT_ID),
            Self::PreDataConsent => serializer.serialize_str(PRE_DATA_CONSENT_ID),
            Self::Params(params) => params.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ApplicationPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value {
            serde_json::Value::Null => Ok(Self::Revoked),
            serde_json::Value::String(alias) if alias == DEFAULT_ID => Ok(Self::Default),
            serde_json::Value::String(alias) if alias == PRE_DATA_CONSENT_ID => {
                Ok(Self::PreDataConsent)
            }
            serde_json::Value::String(alias) => {
                Err(de::Error::custom(format!("unknown policy alias: {alias}")))
            }
            other => ApplicationParams::deserialize(other)
                .map(Self::Params)
                .map_err(de::Error::custom),
        }
    }
}

/// Structured policy record for a single application.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ApplicationParams {
    /// Application priority.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub priority: Maybe<Priority>,
    /// Memory quota in kilobytes.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub memory_kb: Maybe<i32>,
    /// Heartbeat timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub heart_beat_timeout_ms: Maybe<i64>,
    /// Application certificate.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub certificate: Maybe<String>,
    /// Functional group names granted to the application.
    pub groups: Vec<String>,
    /// Accepted application nicknames.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub nicknames: Maybe<Vec<String>>,
    /// Declared application HMI types.
    #[serde(default, rename = "AppHMIType", skip_serializing_if = "Maybe::is_unset")]
    pub app_hmi_types: Maybe<Vec<AppHmiType>>,
    /// Permitted system-request types.
    #[serde(default, rename = "RequestType", skip_serializing_if = "Maybe::is_unset")]
    pub request_types: Maybe<Vec<RequestType>>,
}

// ============================================================================
// SECTION: Consumer-Friendly Messages
// ============================================================================

/// Consumer-friendly message catalog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsumerFriendlyMessages {
    /// Catalog version.
    pub version: String,
    /// Message entries keyed by message type. Absent means preserve stored
    /// messages untouched on save.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub messages: Maybe<BTreeMap<String, MessageLanguages>>,
}

/// Per-language strings for one message type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageLanguages {
    /// Message strings keyed by language code.
    pub languages: BTreeMap<String, MessageString>,
}

/// The displayable strings of a single message.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MessageString {
    /// Text-to-speech string.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub tts: Maybe<String>,
    /// Label string.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub label: Maybe<String>,
    /// First display line.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub line1: Maybe<String>,
    /// Second display line.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub line2: Maybe<String>,
    /// Body text.
    #[serde(default, rename = "textBody", skip_serializing_if = "Maybe::is_unset")]
    pub text_body: Maybe<String>,
}

// ============================================================================
// SECTION: Devices and Counters
// ============================================================================

/// Per-device payload. The store records only device identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DeviceParams {}

/// Usage and error counters.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UsageAndErrorCounts {
    /// Per-application counters keyed by application identifier.
    #[serde(default, skip_serializing_if = "Maybe::is_unset")]
    pub app_level: Maybe<BTreeMap<String, AppLevel>>,
}

/// Per-application counter payload. The store records only app identity.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppLevel {}
