// policy-table-store-sqlite/src/decision.rs
// ============================================================================
// Module: Policy Decision Engine
// Description: Permission lookups and update-cadence arithmetic.
// Purpose: Implement the repository seam over the SQLite store.
// Dependencies: policy-table-core, rusqlite, tracing
// ============================================================================

//! ## Overview
//! Decision lookups run on every RPC, so each is a single prepared select.
//! Permission checks fail closed: a missing row, a failed prepare, or an
//! unopened database all read as a denial. Cadence arithmetic follows
//! `remaining = limit - consumed`, clamped to zero for negative or
//! out-of-order counters.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_table_core::interfaces::CheckPermissionResult;
use policy_table_core::interfaces::PermitResult;
use policy_table_core::interfaces::PolicyTableRepository;
use policy_table_core::interfaces::StoreError;
use policy_table_core::interfaces::UpdateUrl;
use policy_table_core::table::PolicyTableDocument;
use policy_table_core::table::Priority;
use policy_table_core::table::DEFAULT_ID;
use rusqlite::params;
use rusqlite::OptionalExtension;
use tracing::warn;

use crate::queries;
use crate::store::db_err;
use crate::store::SqlitePolicyError;
use crate::store::SqlitePolicyTable;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Fallback update-request timeout in seconds.
const DEFAULT_TIMEOUT_RESPONSE_SECONDS: i32 = 30;
/// Endpoint service key carrying the lock screen icon URL.
const LOCK_SCREEN_ICON_SERVICE: &str = "lock_screen_icon_url";

// ============================================================================
// SECTION: Repository Implementation
// ============================================================================

impl PolicyTableRepository for SqlitePolicyTable {
    fn generate_snapshot(&self) -> PolicyTableDocument {
        self.snapshot()
    }

    fn save(&self, document: &PolicyTableDocument) -> Result<(), StoreError> {
        self.save_document(document).map_err(StoreError::from)
    }

    fn check_permissions(
        &self,
        app_id: &str,
        hmi_level: &str,
        rpc: &str,
    ) -> CheckPermissionResult {
        let lookup = self.database().with_handle(|connection| {
            let mut statement = connection.prepare(queries::SELECT_RPC).map_err(db_err)?;
            let mut rows = statement
                .query(params![app_id, hmi_level, rpc])
                .map_err(db_err)?;
            let mut result = CheckPermissionResult::disallowed();
            while let Some(row) = rows.next().map_err(db_err)? {
                result.hmi_level_permitted = PermitResult::Allowed;
                if let Some(parameter) = row.get::<_, Option<String>>(0).map_err(db_err)? {
                    result.list_of_allowed_params.push(parameter);
                }
            }
            Ok(result)
        });
        match lookup {
            Ok(result) => result,
            Err(err) => {
                warn!(error = %err, "permission lookup failed, denying");
                CheckPermissionResult::disallowed()
            }
        }
    }

    fn ignition_cycles_before_exchange(&self) -> i32 {
        match self.exchange_counters(queries::SELECT_IGNITION_CYCLES) {
            Ok((limit, current)) => {
                if limit < 0 || current < 0 || current > limit {
                    0
                } else {
                    limit - current
                }
            }
            Err(err) => {
                warn!(error = %err, "cannot select ignition cycles");
                0
            }
        }
    }

    fn kilometers_before_exchange(&self, current: i32) -> i32 {
        match self.exchange_counters(queries::SELECT_KILOMETERS) {
            Ok((limit, last)) => remaining_until_limit(limit, last, current),
            Err(err) => {
                warn!(error = %err, "cannot select kilometers");
                0
            }
        }
    }

    fn days_before_exchange(&self, current: i32) -> i32 {
        match self.exchange_counters(queries::SELECT_DAYS) {
            Ok((limit, last)) => {
                // A zero day counter means no exchange has ever happened.
                if last == 0 {
                    return limit;
                }
                remaining_until_limit(limit, last, current)
            }
            Err(err) => {
                warn!(error = %err, "cannot select days");
                0
            }
        }
    }

    fn timeout_response(&self) -> i32 {
        let timeout = self.database().with_handle(|connection| {
            connection
                .query_row(queries::SELECT_TIMEOUT_RESPONSE, [], |row| row.get(0))
                .map_err(db_err)
        });
        match timeout {
            Ok(timeout) => timeout,
            Err(err) => {
                warn!(error = %err, "cannot select the update timeout, using the default");
                DEFAULT_TIMEOUT_RESPONSE_SECONDS
            }
        }
    }

    fn seconds_between_retries(&self) -> Result<Vec<i32>, StoreError> {
        self.database()
            .with_handle(|connection| {
                let mut statement = connection
                    .prepare(queries::SELECT_SECONDS_BETWEEN_RETRIES)
                    .map_err(db_err)?;
                let mut rows = statement.query([]).map_err(db_err)?;
                let mut seconds = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    seconds.push(row.get(0).map_err(db_err)?);
                }
                Ok(seconds)
            })
            .map_err(StoreError::from)
    }

    fn get_priority(&self, app_id: &str) -> Result<Option<Priority>, StoreError> {
        self.database()
            .with_handle(|connection| {
                let token: Option<Option<String>> = connection
                    .query_row(queries::SELECT_PRIORITY, params![app_id], |row| row.get(0))
                    .optional()
                    .map_err(db_err)?;
                match token.flatten() {
                    None => Ok(None),
                    Some(token) => Priority::from_json_token(&token).map(Some).ok_or_else(|| {
                        SqlitePolicyError::Invalid(format!("unknown priority token: {token}"))
                    }),
                }
            })
            .map_err(StoreError::from)
    }

    fn get_update_urls(&self, service: &str) -> Result<Vec<UpdateUrl>, StoreError> {
        self.database()
            .with_handle(|connection| {
                let mut statement = connection
                    .prepare(queries::SELECT_ENDPOINT)
                    .map_err(db_err)?;
                let mut rows = statement.query(params![service]).map_err(db_err)?;
                let mut urls = Vec::new();
                while let Some(row) = rows.next().map_err(db_err)? {
                    urls.push(UpdateUrl {
                        url: row.get(0).map_err(db_err)?,
                        app_id: row.get(1).map_err(db_err)?,
                    });
                }
                Ok(urls)
            })
            .map_err(StoreError::from)
    }

    fn get_lock_screen_icon_url(&self) -> Result<Option<String>, StoreError> {
        self.database()
            .with_handle(|connection| {
                let url: Option<String> = connection
                    .query_row(
                        queries::SELECT_LOCK_SCREEN_ICON,
                        params![LOCK_SCREEN_ICON_SERVICE, DEFAULT_ID],
                        |row| row.get(0),
                    )
                    .optional()
                    .map_err(db_err)?;
                Ok(url)
            })
            .map_err(StoreError::from)
    }

    fn get_notifications_number(&self, priority: Priority) -> i32 {
        let limit = self.database().with_handle(|connection| {
            let limit: Option<i32> = connection
                .query_row(
                    queries::SELECT_NOTIFICATIONS_PER_PRIORITY,
                    params![priority.json_token()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(db_err)?;
            Ok(limit)
        });
        match limit {
            Ok(limit) => limit.unwrap_or(0),
            Err(err) => {
                warn!(error = %err, "cannot select the notification limit");
                0
            }
        }
    }

    fn update_required(&self) -> bool {
        let flag = self.database().with_handle(|connection| {
            connection
                .query_row(queries::SELECT_FLAG_UPDATE_REQUIRED, [], |row| row.get(0))
                .map_err(db_err)
        });
        match flag {
            Ok(flag) => flag,
            Err(err) => {
                warn!(error = %err, "cannot select the update-required flag");
                false
            }
        }
    }

    fn save_update_required(&self, value: bool) -> Result<(), StoreError> {
        self.execute_update(queries::UPDATE_FLAG_UPDATE_REQUIRED, params![value])
    }

    fn increment_ignition_cycles(&self) -> Result<(), StoreError> {
        self.execute_update(queries::INCREMENT_IGNITION_CYCLES, params![])
    }

    fn reset_ignition_cycles(&self) -> Result<(), StoreError> {
        self.execute_update(queries::RESET_IGNITION_CYCLES, params![])
    }

    fn set_counters_passed_for_successful_update(
        &self,
        kilometers: i32,
        days_after_epoch: i32,
    ) -> Result<(), StoreError> {
        self.execute_update(
            queries::UPDATE_COUNTERS_SUCCESSFUL_UPDATE,
            params![kilometers, days_after_epoch],
        )
    }

    fn is_pt_preloaded(&self) -> bool {
        let preloaded = self.database().with_handle(|connection| {
            let row: Option<bool> = connection
                .query_row(queries::SELECT_PRELOADED, [], |row| row.get(0))
                .optional()
                .map_err(db_err)?;
            Ok(row.is_some())
        });
        match preloaded {
            Ok(preloaded) => preloaded,
            Err(err) => {
                warn!(error = %err, "cannot select the preloaded flag");
                false
            }
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

impl SqlitePolicyTable {
    /// Reads a (limit, consumed) counter pair.
    fn exchange_counters(&self, sql: &str) -> Result<(i32, i32), SqlitePolicyError> {
        self.database().with_handle(|connection| {
            connection
                .query_row(sql, [], |row| Ok((row.get(0)?, row.get(1)?)))
                .map_err(db_err)
        })
    }

    /// Runs a single parameterized update statement.
    fn execute_update(
        &self,
        sql: &str,
        parameters: impl rusqlite::Params,
    ) -> Result<(), StoreError> {
        self.database()
            .with_handle(|connection| {
                connection.execute(sql, parameters).map_err(db_err)?;
                Ok(())
            })
            .map_err(StoreError::from)
    }
}

/// Remaining distance to a limit, clamped to zero for negative or
/// out-of-order counters.
const fn remaining_until_limit(limit: i32, last: i32, current: i32) -> i32 {
    if limit < 0 || last < 0 || current < 0 || current < last || limit < current - last {
        0
    } else {
        limit - (current - last)
    }
}
