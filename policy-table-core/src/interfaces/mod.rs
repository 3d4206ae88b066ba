// policy-table-core/src/interfaces/mod.rs
// ============================================================================
// Module: Policy Table Interfaces
// Description: Backend-agnostic interface between the host and the store.
// Purpose: Define the repository contract and its result types.
// Dependencies: serde, thiserror, crate::table
// ============================================================================

//! ## Overview
//! The repository interface is the seam between the head-unit host process
//! and the persistent policy store. The host hands in decoded RPC names and
//! HMI-level strings and receives permission verdicts; it never sees SQL or
//! wire formats. Implementations must fail closed: a missing row is a denial,
//! not an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::table::PolicyTableDocument;
use crate::table::Priority;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Policy store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database could not be opened.
    #[error("policy store open error: {0}")]
    Open(String),
    /// Store I/O error.
    #[error("policy store io error: {0}")]
    Io(String),
    /// Database engine error.
    #[error("policy store db error: {0}")]
    Db(String),
    /// Integrity check failure.
    #[error("policy store integrity failure: {0}")]
    Integrity(String),
    /// The store lives on a read-only filesystem.
    #[error("policy store is read-only: {0}")]
    ReadOnly(String),
    /// Stored schema version does not match the current schema.
    #[error("policy store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid stored data.
    #[error("policy store invalid data: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Result Types
// ============================================================================

/// Verdict for a single RPC permission lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermitResult {
    /// The RPC is allowed at the queried HMI level.
    Allowed,
    /// The RPC is not allowed at the queried HMI level.
    Disallowed,
}

/// Result of a permission lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckPermissionResult {
    /// Whether the RPC is permitted at the queried HMI level.
    pub hmi_level_permitted: PermitResult,
    /// Parameters permitted for the RPC, in stored row order.
    pub list_of_allowed_params: Vec<String>,
}

impl CheckPermissionResult {
    /// Returns the fail-closed default verdict.
    #[must_use]
    pub const fn disallowed() -> Self {
        Self {
            hmi_level_permitted: PermitResult::Disallowed,
            list_of_allowed_params: Vec::new(),
        }
    }
}

impl Default for CheckPermissionResult {
    fn default() -> Self {
        Self::disallowed()
    }
}

/// A single update endpoint entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUrl {
    /// Endpoint URL.
    pub url: String,
    /// Owning application identifier, when one is recorded.
    pub app_id: Option<String>,
}

/// Outcome of opening and verifying the policy store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitResult {
    /// The store was created or booted for the first time.
    Success,
    /// An intact store already existed.
    Exists,
    /// The store could not be opened or failed verification.
    Fail,
}

/// Vehicle identity recorded in the module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleInfo {
    /// Vehicle make.
    pub vehicle_make: Option<String>,
    /// Vehicle model.
    pub vehicle_model: Option<String>,
    /// Vehicle model year.
    pub vehicle_year: Option<String>,
}

/// A consumer-friendly message referenced by code.
///
/// Message bodies are provisioned outside this component; only the code is
/// resolved here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFriendlyMessage {
    /// Message code.
    pub message_code: String,
}

// ============================================================================
// SECTION: Repository
// ============================================================================

/// Persistent policy table repository.
///
/// Snapshot and decision methods are cheap enough to run on every RPC;
/// `save` replaces the whole stored document under a single transaction.
pub trait PolicyTableRepository {
    /// Materializes the stored document. Sub-documents that cannot be read
    /// are left unset; the snapshot itself never fails.
    fn generate_snapshot(&self) -> PolicyTableDocument;

    /// Replaces the stored document atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when any sub-save fails; the transaction is
    /// rolled back and no partial state is visible.
    fn save(&self, document: &PolicyTableDocument) -> Result<(), StoreError>;

    /// Answers whether `app_id` may invoke `rpc` at `hmi_level`, together
    /// with the permitted parameters. Fails closed to a denial.
    fn check_permissions(&self, app_id: &str, hmi_level: &str, rpc: &str)
        -> CheckPermissionResult;

    /// Ignition cycles remaining before a policy exchange is due.
    fn ignition_cycles_before_exchange(&self) -> i32;

    /// Kilometers remaining before a policy exchange is due.
    fn kilometers_before_exchange(&self, current: i32) -> i32;

    /// Days remaining before a policy exchange is due.
    fn days_before_exchange(&self, current: i32) -> i32;

    /// Response timeout for update requests, in seconds.
    fn timeout_response(&self) -> i32;

    /// Retry backoff schedule, in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the schedule cannot be read.
    fn seconds_between_retries(&self) -> Result<Vec<i32>, StoreError>;

    /// Priority recorded for an application, when one is set.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails or the stored token is
    /// not a known priority.
    fn get_priority(&self, app_id: &str) -> Result<Option<Priority>, StoreError>;

    /// Update endpoints recorded for a service type.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the endpoint rows cannot be read.
    fn get_update_urls(&self, service: &str) -> Result<Vec<UpdateUrl>, StoreError>;

    /// URL of the lock screen icon, when one is recorded.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup fails.
    fn get_lock_screen_icon_url(&self) -> Result<Option<String>, StoreError>;

    /// Notifications allowed per minute for a priority.
    fn get_notifications_number(&self, priority: Priority) -> i32;

    /// Whether a policy update is currently required.
    fn update_required(&self) -> bool;

    /// Records whether a policy update is required.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the flag cannot be written.
    fn save_update_required(&self, value: bool) -> Result<(), StoreError>;

    /// Increments the ignition cycle counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the counter cannot be written.
    fn increment_ignition_cycles(&self) -> Result<(), StoreError>;

    /// Resets the ignition cycle counter.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the counter cannot be written.
    fn reset_ignition_cycles(&self) -> Result<(), StoreError>;

    /// Records the odometer and day counters after a successful update.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the counters cannot be written.
    fn set_counters_passed_for_successful_update(
        &self,
        kilometers: i32,
        days_after_epoch: i32,
    ) -> Result<(), StoreError>;

    /// Whether the stored table is the factory-preloaded one.
    fn is_pt_preloaded(&self) -> bool;
}
