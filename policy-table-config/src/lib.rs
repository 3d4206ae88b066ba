// policy-table-config/src/lib.rs
// ============================================================================
// Module: Policy Table Settings
// Description: Host-provided settings for the policy table store.
// Purpose: Provide strict, fail-closed settings validation.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The host process hands the store a small settings object: where the
//! database lives and how hard to retry opening it. Settings are validated
//! fail-closed before the store consumes them; an empty storage folder or an
//! overlong path is rejected up front rather than surfacing later as an
//! opaque open failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of attempts to open the policy database.
const DEFAULT_ATTEMPTS_TO_OPEN_POLICY_DB: u16 = 5;
/// Default timeout between open attempts in milliseconds.
const DEFAULT_OPEN_ATTEMPT_TIMEOUT_MS: u16 = 100;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Settings validation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// A settings value failed validation.
    #[error("invalid policy settings: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Host-provided settings consumed when the store is initialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PolicySettings {
    /// Folder holding the policy database file.
    pub app_storage_folder: PathBuf,
    /// Number of retry attempts when the database fails to open.
    #[serde(default = "default_attempts_to_open_policy_db")]
    pub attempts_to_open_policy_db: u16,
    /// Timeout between open attempts, in milliseconds.
    #[serde(default = "default_open_attempt_timeout_ms")]
    pub open_attempt_timeout_ms: u16,
}

/// Returns the default open attempt budget.
const fn default_attempts_to_open_policy_db() -> u16 {
    DEFAULT_ATTEMPTS_TO_OPEN_POLICY_DB
}

/// Returns the default open attempt timeout.
const fn default_open_attempt_timeout_ms() -> u16 {
    DEFAULT_OPEN_ATTEMPT_TIMEOUT_MS
}

impl PolicySettings {
    /// Creates settings with default retry behavior.
    #[must_use]
    pub fn new(app_storage_folder: impl Into<PathBuf>) -> Self {
        Self {
            app_storage_folder: app_storage_folder.into(),
            attempts_to_open_policy_db: DEFAULT_ATTEMPTS_TO_OPEN_POLICY_DB,
            open_attempt_timeout_ms: DEFAULT_OPEN_ATTEMPT_TIMEOUT_MS,
        }
    }

    /// Returns the folder holding the policy database file.
    #[must_use]
    pub fn app_storage_folder(&self) -> &Path {
        &self.app_storage_folder
    }

    /// Returns the number of retry attempts for opening the database.
    #[must_use]
    pub const fn attempts_to_open_policy_db(&self) -> u16 {
        self.attempts_to_open_policy_db
    }

    /// Returns the timeout between open attempts, in milliseconds.
    #[must_use]
    pub const fn open_attempt_timeout_ms(&self) -> u16 {
        self.open_attempt_timeout_ms
    }

    /// Validates the settings.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the storage folder is empty or exceeds
    /// path limits.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.app_storage_folder.as_os_str().is_empty() {
            return Err(SettingsError::Invalid(
                "app_storage_folder must not be empty".to_string(),
            ));
        }
        let path_string = self.app_storage_folder.display().to_string();
        if path_string.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(SettingsError::Invalid(
                "app_storage_folder exceeds length limit".to_string(),
            ));
        }
        for component in self.app_storage_folder.components() {
            let name = component.as_os_str().to_string_lossy();
            if name.len() > MAX_PATH_COMPONENT_LENGTH {
                return Err(SettingsError::Invalid(
                    "app_storage_folder contains an overlong component".to_string(),
                ));
            }
        }
        Ok(())
    }
}
