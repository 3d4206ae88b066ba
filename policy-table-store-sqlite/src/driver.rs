// policy-table-store-sqlite/src/driver.rs
// ============================================================================
// Module: Policy Database Driver
// Description: Capability layer over the embedded SQLite store.
// Purpose: Own the connection lifecycle and the handle factory seam.
// Dependencies: rusqlite
// ============================================================================

//! ## Overview
//! The driver owns the database handle and nothing else: open, close, probe
//! read/write capability, hand out handles, back the file up, delete it.
//! The handle factory is a deliberate seam: the ordinary file profile returns
//! the long-lived connection, while the shared-memory profile constructs a
//! fresh connection per call against a named in-memory database and closes it
//! when the handle goes out of scope.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use rusqlite::backup::Backup;
use rusqlite::Connection;
use rusqlite::OpenFlags;

use crate::store::SqlitePolicyError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Busy timeout applied to every connection.
const BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Pages copied per backup step.
const BACKUP_PAGES_PER_STEP: std::os::raw::c_int = 64;
/// Pause between backup steps.
const BACKUP_STEP_PAUSE: Duration = Duration::from_millis(5);

// ============================================================================
// SECTION: Storage Profile
// ============================================================================

/// Storage profile selecting how database handles are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageProfile {
    /// Ordinary file-backed database with one long-lived handle.
    #[default]
    File,
    /// Named shared in-memory database; a fresh handle is opened per call
    /// and closed when its scope ends.
    SharedMemory,
}

// ============================================================================
// SECTION: Database Handle
// ============================================================================

/// A scoped database handle produced by the driver.
pub struct DbHandle<'a> {
    /// Handle backing storage.
    inner: HandleInner<'a>,
}

/// Backing storage for a database handle.
enum HandleInner<'a> {
    /// The long-lived connection, held under the driver mutex.
    Shared(MutexGuard<'a, Option<Connection>>),
    /// A per-call connection, closed on drop.
    Transient(Connection),
}

impl DbHandle<'_> {
    /// Returns the underlying connection.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError::Open`] when the database is not opened.
    pub fn connection(&self) -> Result<&Connection, SqlitePolicyError> {
        match &self.inner {
            HandleInner::Shared(guard) => guard
                .as_ref()
                .ok_or_else(|| SqlitePolicyError::Open("database is not opened".to_string())),
            HandleInner::Transient(connection) => Ok(connection),
        }
    }
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Thin capability layer over the embedded database file.
#[derive(Debug)]
pub struct PolicyDatabase {
    /// Database file path. For the shared-memory profile this is only the
    /// backup target name.
    path: PathBuf,
    /// Handle production profile.
    profile: StorageProfile,
    /// Long-lived connection. Also anchors the shared in-memory database so
    /// per-call handles see the same data.
    connection: Mutex<Option<Connection>>,
}

impl PolicyDatabase {
    /// Creates a closed driver for the given path and profile.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, profile: StorageProfile) -> Self {
        Self {
            path: path.into(),
            profile,
            connection: Mutex::new(None),
        }
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the handle production profile.
    #[must_use]
    pub const fn profile(&self) -> StorageProfile {
        self.profile
    }

    /// Opens the long-lived connection. Opening an already-open database is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the database cannot be opened.
    pub fn open(&self) -> Result<(), SqlitePolicyError> {
        let mut guard = self.lock()?;
        if guard.is_some() {
            return Ok(());
        }
        let connection = self.open_connection()?;
        *guard = Some(connection);
        Ok(())
    }

    /// Closes the long-lived connection. Closing a closed database is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError::Db`] when the connection reports an
    /// error while closing.
    pub fn close(&self) -> Result<(), SqlitePolicyError> {
        let mut guard = self.lock()?;
        match guard.take() {
            None => Ok(()),
            Some(connection) => connection
                .close()
                .map_err(|(_, err)| SqlitePolicyError::Db(err.to_string())),
        }
    }

    /// Returns true when the long-lived connection is open.
    #[must_use]
    pub fn is_opened(&self) -> bool {
        self.lock().map(|guard| guard.is_some()).unwrap_or(false)
    }

    /// Probes read/write capability of the database file.
    #[must_use]
    pub fn is_read_write(&self) -> bool {
        match self.profile {
            StorageProfile::SharedMemory => true,
            StorageProfile::File => OpenOptions::new()
                .read(true)
                .write(true)
                .open(&self.path)
                .is_ok(),
        }
    }

    /// Produces a database handle according to the storage profile.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the database is not opened or a
    /// per-call handle cannot be constructed.
    pub fn handle(&self) -> Result<DbHandle<'_>, SqlitePolicyError> {
        match self.profile {
            StorageProfile::File => Ok(DbHandle {
                inner: HandleInner::Shared(self.lock()?),
            }),
            StorageProfile::SharedMemory => {
                if !self.is_opened() {
                    return Err(SqlitePolicyError::Open(
                        "database is not opened".to_string(),
                    ));
                }
                let connection = self.open_connection()?;
                Ok(DbHandle {
                    inner: HandleInner::Transient(connection),
                })
            }
        }
    }

    /// Runs an operation against a scoped database handle.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] from handle production or from the
    /// operation itself.
    pub fn with_handle<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, SqlitePolicyError>,
    ) -> Result<T, SqlitePolicyError> {
        let handle = self.handle()?;
        op(handle.connection()?)
    }

    /// Snapshots the database into `<path>.bak` using the online backup API.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the backup cannot be produced.
    pub fn backup(&self) -> Result<(), SqlitePolicyError> {
        let backup_path = self.path.with_extension("bak");
        self.with_handle(|connection| {
            let mut target = Connection::open(&backup_path)
                .map_err(|err| SqlitePolicyError::Io(err.to_string()))?;
            let backup = Backup::new(connection, &mut target)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
            backup
                .run_to_completion(BACKUP_PAGES_PER_STEP, BACKUP_STEP_PAUSE, None)
                .map_err(|err| SqlitePolicyError::Db(err.to_string()))
        })
    }

    /// Removes the database file.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError::Io`] when the file cannot be removed.
    pub fn delete_file(&self) -> Result<(), SqlitePolicyError> {
        fs::remove_file(&self.path).map_err(|err| SqlitePolicyError::Io(err.to_string()))
    }

    /// Locks the connection slot.
    fn lock(&self) -> Result<MutexGuard<'_, Option<Connection>>, SqlitePolicyError> {
        self.connection
            .lock()
            .map_err(|_| SqlitePolicyError::Db("database mutex poisoned".to_string()))
    }

    /// Opens a new connection for the configured profile.
    fn open_connection(&self) -> Result<Connection, SqlitePolicyError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let connection = match self.profile {
            StorageProfile::File => Connection::open_with_flags(&self.path, flags),
            StorageProfile::SharedMemory => {
                Connection::open_with_flags(self.memory_uri(), flags | OpenFlags::SQLITE_OPEN_URI)
            }
        }
        .map_err(|err| SqlitePolicyError::Open(err.to_string()))?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|err| SqlitePolicyError::Db(err.to_string()))?;
        Ok(connection)
    }

    /// Returns the URI of the named shared in-memory database.
    fn memory_uri(&self) -> String {
        format!(
            "file:{}?mode=memory&cache=shared",
            self.path.file_name().unwrap_or_default().to_string_lossy()
        )
    }
}

// ============================================================================
// SECTION: Transactions
// ============================================================================

/// Begins an immediate transaction.
///
/// # Errors
///
/// Returns [`SqlitePolicyError::Db`] when the statement fails.
pub fn begin_transaction(connection: &Connection) -> Result<(), SqlitePolicyError> {
    connection
        .execute_batch("BEGIN IMMEDIATE")
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))
}

/// Commits the open transaction.
///
/// # Errors
///
/// Returns [`SqlitePolicyError::Db`] when the statement fails.
pub fn commit_transaction(connection: &Connection) -> Result<(), SqlitePolicyError> {
    connection
        .execute_batch("COMMIT")
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))
}

/// Rolls back the open transaction.
///
/// # Errors
///
/// Returns [`SqlitePolicyError::Db`] when the statement fails.
pub fn rollback_transaction(connection: &Connection) -> Result<(), SqlitePolicyError> {
    connection
        .execute_batch("ROLLBACK")
        .map_err(|err| SqlitePolicyError::Db(err.to_string()))
}
