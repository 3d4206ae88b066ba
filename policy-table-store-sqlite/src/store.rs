// policy-table-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Policy Table Store
// Description: Lifecycle controller for the SQLite-backed policy table.
// Purpose: Open, verify, bootstrap, and version the persistent policy store.
// Dependencies: policy-table-core, policy-table-config, rusqlite, thiserror, tracing
// ============================================================================

//! ## Overview
//! The store owns one database handle and the open-with-retries, integrity
//! verification, first-run bootstrap, and version identity flows around it.
//! Document persistence lives in the gather and save modules; decision
//! lookups live in the decision module. All of them run against handles
//! produced by this store's driver.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::sync::atomic::AtomicU16;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use policy_table_config::PolicySettings;
use policy_table_core::interfaces::InitResult;
use policy_table_core::interfaces::StoreError;
use rusqlite::Connection;
use thiserror::Error;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::driver::PolicyDatabase;
use crate::driver::StorageProfile;
use crate::schema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fixed name of the policy database file.
pub const DATABASE_NAME: &str = "policy";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// SQLite policy store errors.
#[derive(Debug, Error)]
pub enum SqlitePolicyError {
    /// The database could not be opened.
    #[error("policy database open error: {0}")]
    Open(String),
    /// Filesystem I/O error.
    #[error("policy database io error: {0}")]
    Io(String),
    /// Database engine error.
    #[error("policy database error: {0}")]
    Db(String),
    /// Invalid stored data.
    #[error("policy database invalid data: {0}")]
    Invalid(String),
}

impl From<SqlitePolicyError> for StoreError {
    fn from(error: SqlitePolicyError) -> Self {
        match error {
            SqlitePolicyError::Open(message) => Self::Open(message),
            SqlitePolicyError::Io(message) => Self::Io(message),
            SqlitePolicyError::Db(message) => Self::Db(message),
            SqlitePolicyError::Invalid(message) => Self::Invalid(message),
        }
    }
}

/// Maps a database engine error into the store error domain.
pub(crate) fn db_err(err: rusqlite::Error) -> SqlitePolicyError {
    SqlitePolicyError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed policy table store.
///
/// Single-threaded with respect to its database handle: callers serialize
/// access externally, and every operation is synchronous.
#[derive(Debug)]
pub struct SqlitePolicyTable {
    /// Host-provided settings, consumed by `init`.
    settings: PolicySettings,
    /// Database driver.
    database: PolicyDatabase,
    /// Open attempts performed by the retry loop of the last `init`.
    open_attempts: AtomicU16,
}

impl SqlitePolicyTable {
    /// Creates a store over `<app_storage_folder>/policy` with the ordinary
    /// file profile.
    #[must_use]
    pub fn new(settings: PolicySettings) -> Self {
        let path = settings.app_storage_folder().join(DATABASE_NAME);
        Self::from_parts(settings, PolicyDatabase::new(path, StorageProfile::File))
    }

    /// Creates a store with an explicit storage profile. The shared-memory
    /// profile ignores the storage folder and uses the fixed database name.
    #[must_use]
    pub fn with_profile(settings: PolicySettings, profile: StorageProfile) -> Self {
        let path = match profile {
            StorageProfile::File => settings.app_storage_folder().join(DATABASE_NAME),
            StorageProfile::SharedMemory => PathBuf::from(DATABASE_NAME),
        };
        Self::from_parts(settings, PolicyDatabase::new(path, profile))
    }

    /// Assembles the store from its parts.
    fn from_parts(settings: PolicySettings, database: PolicyDatabase) -> Self {
        Self {
            settings,
            database,
            open_attempts: AtomicU16::new(0),
        }
    }

    /// Returns the database driver.
    #[must_use]
    pub const fn database(&self) -> &PolicyDatabase {
        &self.database
    }

    /// Returns the number of retry attempts performed by the last `init`.
    #[must_use]
    pub fn open_attempt_count(&self) -> u16 {
        self.open_attempts.load(Ordering::Relaxed)
    }

    /// Opens and verifies the store.
    ///
    /// Retries the open up to `attempts_to_open_policy_db` times, requires
    /// read/write capability on the file profile, verifies integrity of a
    /// non-empty file, consumes the first-run flag, and installs the schema
    /// plus seed data into an empty file.
    pub fn init(&self) -> InitResult {
        self.open_attempts.store(0, Ordering::Relaxed);
        if let Err(err) = self.database.open() {
            error!(error = %err, "failed opening policy database, starting retries");
            let attempts = self.settings.attempts_to_open_policy_db();
            let timeout_ms = self.settings.open_attempt_timeout_ms();
            let mut opened = false;
            for attempt in 1..=attempts {
                thread::sleep(Duration::from_micros(u64::from(timeout_ms) * 1000));
                debug!(attempt, "policy database open attempt");
                self.open_attempts.fetch_add(1, Ordering::Relaxed);
                if self.database.open().is_ok() {
                    opened = true;
                    break;
                }
            }
            if !opened {
                error!(
                    attempts,
                    timeout_ms, "open retry sequence failed for the policy database"
                );
                return InitResult::Fail;
            }
        }
        if self.database.profile() == StorageProfile::File && !self.database.is_read_write() {
            error!("no read/write permissions for the policy database");
            return InitResult::Fail;
        }
        match self.database.with_handle(|connection| Ok(verify_database(connection))) {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "policy database verification failed");
                InitResult::Fail
            }
        }
    }

    /// Closes the database handle.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the handle reports an error while
    /// closing.
    pub fn close(&self) -> Result<(), SqlitePolicyError> {
        self.database.close()
    }

    /// Drops the whole schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the drop fails.
    pub fn drop_schema(&self) -> Result<(), SqlitePolicyError> {
        self.database.with_handle(|connection| {
            connection
                .execute_batch(schema::DROP_SCHEMA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))
        })
    }

    /// Deletes all data and restores the empty-but-valid seed state.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when a batch fails.
    pub fn clear(&self) -> Result<(), SqlitePolicyError> {
        self.database.with_handle(|connection| {
            connection
                .execute_batch(schema::DELETE_DATA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
            connection
                .execute_batch(schema::INSERT_INIT_DATA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))
        })
    }

    /// Drops, recreates, and reseeds the schema.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when a batch fails.
    pub fn refresh_db(&self) -> Result<(), SqlitePolicyError> {
        self.database.with_handle(|connection| {
            connection
                .execute_batch(schema::DROP_SCHEMA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
            connection
                .execute_batch(schema::CREATE_SCHEMA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
            connection
                .execute_batch(schema::INSERT_INIT_DATA)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))
        })
    }

    /// Snapshots the database file.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the backup fails.
    pub fn write_db(&self) -> Result<(), SqlitePolicyError> {
        self.database.backup()
    }

    /// Removes the database file.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the file cannot be removed.
    pub fn remove_db(&self) -> Result<(), SqlitePolicyError> {
        self.database.delete_file()
    }

    /// Compares the stored schema version hash with the current one.
    #[must_use]
    pub fn is_db_version_actual(&self) -> bool {
        let stored = self.database.with_handle(|connection| {
            connection
                .query_row(crate::queries::SELECT_DB_VERSION, [], |row| {
                    row.get::<_, i32>(0)
                })
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))
        });
        match stored {
            Ok(stored) => stored == schema::db_schema_version(),
            Err(err) => {
                error!(error = %err, "failed to read the stored schema version");
                false
            }
        }
    }

    /// Writes the current schema version hash.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the write fails.
    pub fn update_db_version(&self) -> Result<(), SqlitePolicyError> {
        self.database.with_handle(|connection| {
            connection
                .execute(
                    crate::queries::UPDATE_DB_VERSION,
                    rusqlite::params![schema::db_schema_version()],
                )
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
            Ok(())
        })
    }
}

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Verifies an opened database and bootstraps an empty one.
fn verify_database(connection: &Connection) -> InitResult {
    let page_count = match connection.query_row(schema::CHECK_PG_NUMBER, [], |row| {
        row.get::<_, i64>(0)
    }) {
        Ok(pages) => Some(pages),
        Err(err) => {
            warn!(error = %err, "page count pragma failed");
            None
        }
    };
    if let Some(pages) = page_count {
        if pages > 0 {
            match integrity_ok(connection) {
                Ok(true) => return first_run_outcome(connection),
                Ok(false) => {
                    error!("existing policy table failed the integrity check");
                    return InitResult::Fail;
                }
                Err(err) => warn!(error = %err, "integrity check pragma failed"),
            }
        }
    }
    if let Err(err) = connection.execute_batch(schema::CREATE_SCHEMA) {
        error!(error = %err, "failed creating the policy schema");
        return InitResult::Fail;
    }
    if let Err(err) = connection.execute_batch(schema::INSERT_INIT_DATA) {
        error!(error = %err, "failed seeding the policy schema");
        return InitResult::Fail;
    }
    InitResult::Success
}

/// Runs the integrity check; every result row must read `ok`.
fn integrity_ok(connection: &Connection) -> Result<bool, SqlitePolicyError> {
    let mut statement = connection
        .prepare(schema::CHECK_DB_INTEGRITY)
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
    let mut rows = statement
        .query([])
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
    while let Some(row) = rows
        .next()
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))?
    {
        let status: String = row
            .get(0)
            .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
        if status != "ok" {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Consumes the first-run flag of a verified database.
fn first_run_outcome(connection: &Connection) -> InitResult {
    match connection.query_row(schema::IS_FIRST_RUN, [], |row| row.get::<_, bool>(0)) {
        Ok(true) => {
            debug!("first run detected, clearing the flag");
            if let Err(err) = connection.execute_batch(schema::SET_NOT_FIRST_RUN) {
                warn!(error = %err, "failed clearing the first-run flag");
            }
            InitResult::Success
        }
        Ok(false) => InitResult::Exists,
        Err(err) => {
            warn!(error = %err, "first-run flag could not be read");
            InitResult::Exists
        }
    }
}
