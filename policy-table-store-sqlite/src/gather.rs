// policy-table-store-sqlite/src/gather.rs
// ============================================================================
// Module: Policy Table Gather Path
// Description: Materializes the policy document from the relational store.
// Purpose: Build snapshots that tolerate missing or foreign data.
// Dependencies: policy-table-core, rusqlite, tracing
// ============================================================================

//! ## Overview
//! The gather path reads the stored policy table back into the document
//! model. It never aborts a snapshot: a sub-document whose select fails is
//! logged and left unset, and rows carrying unknown enum tokens are dropped
//! so tables written by newer backends remain loadable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_table_core::interfaces::UserFriendlyMessage;
use policy_table_core::interfaces::VehicleInfo;
use policy_table_core::table::ApplicationPoliciesSection;
use policy_table_core::table::ApplicationPolicy;
use policy_table_core::table::ApplicationParams;
use policy_table_core::table::AppHmiType;
use policy_table_core::table::AppLevel;
use policy_table_core::table::ConsumerFriendlyMessages;
use policy_table_core::table::DeviceData;
use policy_table_core::table::DeviceParams;
use policy_table_core::table::FunctionalGroupRpcs;
use policy_table_core::table::FunctionalGroupings;
use policy_table_core::table::HmiLevel;
use policy_table_core::table::Maybe;
use policy_table_core::table::ModuleConfig;
use policy_table_core::table::ModuleMeta;
use policy_table_core::table::Parameter;
use policy_table_core::table::PolicyTableDocument;
use policy_table_core::table::Priority;
use policy_table_core::table::RequestType;
use policy_table_core::table::RpcPermissions;
use policy_table_core::table::UsageAndErrorCounts;
use policy_table_core::table::DEVICE_ID;
use rusqlite::params;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use tracing::warn;

use crate::queries;
use crate::store::db_err;
use crate::store::SqlitePolicyError;
use crate::store::SqlitePolicyTable;

// ============================================================================
// SECTION: Snapshot
// ============================================================================

impl SqlitePolicyTable {
    /// Materializes the stored document. Sub-documents whose reads fail are
    /// logged and left unset; the snapshot itself never fails.
    pub(crate) fn snapshot(&self) -> PolicyTableDocument {
        let mut document = PolicyTableDocument::default();
        let table = &mut document.policy_table;
        let outcome = self.database().with_handle(|connection| {
            match gather_module_meta(connection) {
                Ok(meta) => table.module_meta = Maybe::Set(meta),
                Err(err) => warn!(error = %err, "module meta could not be gathered"),
            }
            match gather_module_config(connection) {
                Ok(config) => table.module_config = config,
                Err(err) => warn!(error = %err, "module config could not be gathered"),
            }
            match gather_usage_and_error_counts(connection) {
                Ok(counts) => table.usage_and_error_counts = Maybe::Set(counts),
                Err(err) => warn!(error = %err, "usage and error counts could not be gathered"),
            }
            match gather_device_data(connection) {
                Ok(devices) => table.device_data = Maybe::Set(devices),
                Err(err) => warn!(error = %err, "device data could not be gathered"),
            }
            match gather_functional_groupings(connection) {
                Ok(groups) => table.functional_groupings = groups,
                Err(err) => warn!(error = %err, "functional groupings could not be gathered"),
            }
            match gather_consumer_friendly_messages(connection) {
                Ok(messages) => table.consumer_friendly_messages = Maybe::Set(messages),
                Err(err) => {
                    warn!(error = %err, "consumer friendly messages could not be gathered");
                }
            }
            match gather_application_policies_section(connection) {
                Ok(section) => table.app_policies_section = section,
                Err(err) => warn!(error = %err, "application policies could not be gathered"),
            }
            Ok(())
        });
        if let Err(err) = outcome {
            warn!(error = %err, "policy snapshot produced without a database handle");
        }
        document
    }

    /// Returns the nicknames and declared HMI type tokens of an application.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when either select fails.
    pub fn get_initial_app_data(
        &self,
        app_id: &str,
    ) -> Result<(Vec<String>, Vec<String>), SqlitePolicyError> {
        self.database().with_handle(|connection| {
            let nicknames = string_rows(connection, queries::SELECT_NICKNAMES, app_id)?;
            let app_types = string_rows(connection, queries::SELECT_APP_TYPES, app_id)?;
            Ok((nicknames, app_types))
        })
    }

    /// Returns the stored functional groupings.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the group rows cannot be read.
    pub fn get_functional_groupings(&self) -> Result<FunctionalGroupings, SqlitePolicyError> {
        self.database().with_handle(gather_functional_groupings)
    }

    /// Returns the functional group names granted to an application.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the binding rows cannot be read.
    pub fn application_groups(&self, app_id: &str) -> Result<Vec<String>, SqlitePolicyError> {
        self.database()
            .with_handle(|connection| app_groups(connection, app_id))
    }

    /// Returns true when the application is revoked.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the flag cannot be read.
    pub fn is_application_revoked(&self, app_id: &str) -> Result<bool, SqlitePolicyError> {
        self.database()
            .with_handle(|connection| application_revoked(connection, app_id))
    }

    /// Returns true when an application row exists.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the lookup fails.
    pub fn is_application_represented(&self, app_id: &str) -> Result<bool, SqlitePolicyError> {
        self.database().with_handle(|connection| {
            let count: i64 = connection
                .query_row(
                    queries::SELECT_APPLICATION_REPRESENTED,
                    params![app_id],
                    |row| row.get(0),
                )
                .map_err(db_err)?;
            Ok(count != 0)
        })
    }

    /// Returns true when the application carries the default policy.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the flag cannot be read.
    pub fn is_default_policy(&self, app_id: &str) -> Result<bool, SqlitePolicyError> {
        self.database()
            .with_handle(|connection| application_is_default(connection, app_id))
    }

    /// Returns true when the application carries the pre-data-consent
    /// policy. The probe is pinned to false; the flag is only written, never
    /// consulted.
    #[must_use]
    pub fn is_predata_policy(&self, _app_id: &str) -> bool {
        false
    }

    /// Returns the vehicle identity from the module configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the configuration row cannot be
    /// read.
    pub fn get_vehicle_info(&self) -> Result<VehicleInfo, SqlitePolicyError> {
        self.database().with_handle(|connection| {
            let config = gather_module_config(connection)?;
            Ok(VehicleInfo {
                vehicle_make: config.vehicle_make.into_option(),
                vehicle_model: config.vehicle_model.into_option(),
                vehicle_year: config.vehicle_year.into_option(),
            })
        })
    }

    /// Resolves message codes into user-friendly message stubs. Message
    /// bodies are provisioned outside this component.
    #[must_use]
    pub fn get_user_friendly_messages(
        &self,
        message_codes: &[String],
        _language: &str,
    ) -> Vec<UserFriendlyMessage> {
        message_codes
            .iter()
            .map(|code| UserFriendlyMessage {
                message_code: code.clone(),
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Sub-Document Gathers
// ============================================================================

/// Reads the module metadata counters.
fn gather_module_meta(connection: &Connection) -> Result<ModuleMeta, SqlitePolicyError> {
    connection
        .query_row(queries::SELECT_MODULE_META, [], |row| {
            Ok(ModuleMeta {
                pt_exchanged_at_odometer_x: Maybe::Set(row.get(0)?),
                pt_exchanged_x_days_after_epoch: Maybe::Set(row.get(1)?),
                ignition_cycles_since_last_exchange: Maybe::Set(row.get(2)?),
            })
        })
        .map_err(db_err)
}

/// Reads the module configuration with its retry, notification, and
/// endpoint sub-tables.
fn gather_module_config(connection: &Connection) -> Result<ModuleConfig, SqlitePolicyError> {
    let mut config = connection
        .query_row(queries::SELECT_MODULE_CONFIG, [], |row| {
            Ok(ModuleConfig {
                preloaded_pt: Maybe::Set(row.get(0)?),
                exchange_after_x_ignition_cycles: row.get(1)?,
                exchange_after_x_kilometers: row.get(2)?,
                exchange_after_x_days: row.get(3)?,
                timeout_after_x_seconds: row.get(4)?,
                vehicle_make: Maybe::from(row.get::<_, Option<String>>(5)?),
                vehicle_model: Maybe::from(row.get::<_, Option<String>>(6)?),
                vehicle_year: Maybe::from(row.get::<_, Option<String>>(7)?),
                preloaded_date: Maybe::from(row.get::<_, Option<String>>(8)?),
                certificate: Maybe::from(row.get::<_, Option<String>>(9)?),
                ..ModuleConfig::default()
            })
        })
        .map_err(db_err)?;

    let mut endpoints = connection
        .prepare(queries::SELECT_ENDPOINTS)
        .map_err(db_err)?;
    let mut rows = endpoints.query([]).map_err(db_err)?;
    while let Some(row) = rows.next().map_err(db_err)? {
        let url: String = row.get(0).map_err(db_err)?;
        let service: String = row.get(1).map_err(db_err)?;
        let app_id: Option<String> = row.get(2).map_err(db_err)?;
        config
            .endpoints
            .entry(service)
            .or_default()
            .entry(app_id.unwrap_or_default())
            .or_default()
            .push(url);
    }

    let mut notifications = connection
        .prepare(queries::SELECT_NOTIFICATIONS_PER_MIN)
        .map_err(db_err)?;
    let mut rows = notifications.query([]).map_err(db_err)?;
    while let Some(row) = rows.next().map_err(db_err)? {
        let token: String = row.get(0).map_err(db_err)?;
        let limit: i32 = row.get(1).map_err(db_err)?;
        match Priority::from_json_token(&token) {
            Some(priority) => {
                config
                    .notifications_per_minute_by_priority
                    .insert(priority, limit);
            }
            None => warn!(token = %token, "unknown priority token in notification limits"),
        }
    }

    let mut seconds = connection
        .prepare(queries::SELECT_SECONDS_BETWEEN_RETRIES)
        .map_err(db_err)?;
    let mut rows = seconds.query([]).map_err(db_err)?;
    while let Some(row) = rows.next().map_err(db_err)? {
        config
            .seconds_between_retries
            .push(row.get(0).map_err(db_err)?);
    }
    Ok(config)
}

/// Reads the per-application counter identities.
fn gather_usage_and_error_counts(
    connection: &Connection,
) -> Result<UsageAndErrorCounts, SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::SELECT_APP_LEVELS)
        .map_err(db_err)?;
    let mut rows = statement.query([]).map_err(db_err)?;
    let mut app_level = BTreeMap::new();
    while let Some(row) = rows.next().map_err(db_err)? {
        let app_id: String = row.get(0).map_err(db_err)?;
        app_level.insert(app_id, AppLevel::default());
    }
    Ok(UsageAndErrorCounts {
        app_level: Maybe::Set(app_level),
    })
}

/// Reads the known device identities.
fn gather_device_data(connection: &Connection) -> Result<DeviceData, SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::SELECT_DEVICE_DATA)
        .map_err(db_err)?;
    let mut rows = statement.query([]).map_err(db_err)?;
    let mut devices = DeviceData::new();
    while let Some(row) = rows.next().map_err(db_err)? {
        let device_id: String = row.get(0).map_err(db_err)?;
        devices.insert(device_id, DeviceParams::default());
    }
    Ok(devices)
}

/// Reads every functional group with its RPC permission rows.
pub(crate) fn gather_functional_groupings(
    connection: &Connection,
) -> Result<FunctionalGroupings, SqlitePolicyError> {
    let mut group_statement = connection
        .prepare(queries::SELECT_FUNCTIONAL_GROUPS)
        .map_err(db_err)?;
    let mut rpc_statement = connection
        .prepare(queries::SELECT_ALL_RPCS)
        .map_err(db_err)?;
    let mut groups = FunctionalGroupings::new();
    let mut group_rows = group_statement.query([]).map_err(db_err)?;
    while let Some(group_row) = group_rows.next().map_err(db_err)? {
        let group_id: i64 = group_row.get(0).map_err(db_err)?;
        let name: String = group_row.get(1).map_err(db_err)?;
        let prompt: Option<String> = group_row.get(2).map_err(db_err)?;
        let mut group = FunctionalGroupRpcs {
            user_consent_prompt: Maybe::from(prompt),
            rpcs: Maybe::Unset,
        };
        let mut rpcs = BTreeMap::new();
        let mut rpc_rows = rpc_statement.query(params![group_id]).map_err(db_err)?;
        while let Some(rpc_row) = rpc_rows.next().map_err(db_err)? {
            let rpc_name: String = rpc_row.get(0).map_err(db_err)?;
            let level_token: Option<String> = rpc_row.get(1).map_err(db_err)?;
            let parameter_token: Option<String> = rpc_row.get(2).map_err(db_err)?;
            let permissions: &mut RpcPermissions = rpcs.entry(rpc_name).or_default();
            if let Some(level) = level_token.as_deref().and_then(HmiLevel::from_json_token) {
                permissions.insert_hmi_level(level);
            }
            if let Some(parameter) = parameter_token
                .as_deref()
                .and_then(Parameter::from_json_token)
            {
                permissions.insert_parameter(parameter);
            }
        }
        // A group with no RPC rows at all is recorded as explicitly null.
        group.rpcs = if rpcs.is_empty() {
            Maybe::Null
        } else {
            Maybe::Set(rpcs)
        };
        groups.insert(name, group);
    }
    Ok(groups)
}

/// Reads the message catalog version. The message bodies live elsewhere.
fn gather_consumer_friendly_messages(
    connection: &Connection,
) -> Result<ConsumerFriendlyMessages, SqlitePolicyError> {
    let version: String = connection
        .query_row(queries::SELECT_USER_MSGS_VERSION, [], |row| row.get(0))
        .map_err(db_err)?;
    Ok(ConsumerFriendlyMessages {
        version,
        messages: Maybe::Unset,
    })
}

/// Reads the application policy section, branching revoked and predefined
/// applications into their tagged variants.
fn gather_application_policies_section(
    connection: &Connection,
) -> Result<ApplicationPoliciesSection, SqlitePolicyError> {
    let mut section = ApplicationPoliciesSection::default();
    let mut statement = connection
        .prepare(queries::SELECT_APP_POLICIES)
        .map_err(db_err)?;
    let mut rows = statement.query([]).map_err(db_err)?;
    while let Some(row) = rows.next().map_err(db_err)? {
        let app_id: String = row.get(0).map_err(db_err)?;
        if application_revoked(connection, &app_id)? {
            section.apps.insert(app_id, ApplicationPolicy::Revoked);
            continue;
        }
        if application_is_default(connection, &app_id)? {
            section.apps.insert(app_id, ApplicationPolicy::Default);
            continue;
        }
        if application_is_predata(connection, &app_id)? {
            section
                .apps
                .insert(app_id, ApplicationPolicy::PreDataConsent);
            continue;
        }
        let priority_token: Option<String> = row.get(1).map_err(db_err)?;
        if app_id == DEVICE_ID {
            // Priority is the only device-specific policy item.
            match priority_token.as_deref().and_then(Priority::from_json_token) {
                Some(priority) => section.device.priority = Maybe::Set(priority),
                None => warn!("device row without a known priority token"),
            }
            continue;
        }
        let Some(priority) = priority_token.as_deref().and_then(Priority::from_json_token) else {
            warn!(app_id = %app_id, "application row with an unknown priority token, dropped");
            continue;
        };
        let mut params = ApplicationParams {
            priority: Maybe::Set(priority),
            memory_kb: Maybe::Set(row.get(2).map_err(db_err)?),
            heart_beat_timeout_ms: Maybe::Set(row.get(3).map_err(db_err)?),
            ..ApplicationParams::default()
        };
        if let Some(certificate) = row.get::<_, Option<String>>(4).map_err(db_err)? {
            params.certificate = Maybe::Set(certificate);
        }
        params.groups = app_groups(connection, &app_id)?;
        params.nicknames = Maybe::Set(string_rows(connection, queries::SELECT_NICKNAMES, &app_id)?);
        params.app_hmi_types = Maybe::Set(gather_app_types(connection, &app_id)?);
        params.request_types = Maybe::Set(gather_request_types(connection, &app_id)?);
        section
            .apps
            .insert(app_id, ApplicationPolicy::Params(params));
    }
    Ok(section)
}

// ============================================================================
// SECTION: Application Helpers
// ============================================================================

/// Reads the revocation flag of one application.
fn application_revoked(connection: &Connection, app_id: &str) -> Result<bool, SqlitePolicyError> {
    let revoked: Option<Option<bool>> = connection
        .query_row(queries::SELECT_APPLICATION_REVOKED, params![app_id], |row| {
            row.get(0)
        })
        .optional()
        .map_err(db_err)?;
    Ok(revoked.flatten().unwrap_or(false))
}

/// Reads the default-policy flag of one application.
fn application_is_default(
    connection: &Connection,
    app_id: &str,
) -> Result<bool, SqlitePolicyError> {
    let is_default: Option<Option<bool>> = connection
        .query_row(
            queries::SELECT_APPLICATION_IS_DEFAULT,
            params![app_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(db_err)?;
    Ok(is_default.flatten().unwrap_or(false))
}

/// Pre-data probe, pinned to false. The flag is written by
/// `save_application_custom_data` but never drives the gather branch.
fn application_is_predata(
    _connection: &Connection,
    _app_id: &str,
) -> Result<bool, SqlitePolicyError> {
    Ok(false)
}

/// Reads the functional group names granted to one application.
pub(crate) fn app_groups(
    connection: &Connection,
    app_id: &str,
) -> Result<Vec<String>, SqlitePolicyError> {
    string_rows(connection, queries::SELECT_APP_GROUPS, app_id)
}

/// Reads the declared HMI types of one application, dropping unknown tokens.
fn gather_app_types(
    connection: &Connection,
    app_id: &str,
) -> Result<Vec<AppHmiType>, SqlitePolicyError> {
    let tokens = string_rows(connection, queries::SELECT_APP_TYPES, app_id)?;
    Ok(tokens
        .iter()
        .filter_map(|token| AppHmiType::from_json_token(token))
        .collect())
}

/// Reads the permitted request types of one application, dropping unknown
/// tokens.
fn gather_request_types(
    connection: &Connection,
    app_id: &str,
) -> Result<Vec<RequestType>, SqlitePolicyError> {
    let tokens = string_rows(connection, queries::SELECT_REQUEST_TYPES, app_id)?;
    Ok(tokens
        .iter()
        .filter_map(|token| RequestType::from_json_token(token))
        .collect())
}

/// Collects the single string column of a one-parameter select.
fn string_rows(
    connection: &Connection,
    sql: &str,
    app_id: &str,
) -> Result<Vec<String>, SqlitePolicyError> {
    let mut statement = connection.prepare(sql).map_err(db_err)?;
    let mut rows = statement.query(params![app_id]).map_err(db_err)?;
    let mut values = Vec::new();
    while let Some(row) = rows.next().map_err(db_err)? {
        values.push(row.get(0).map_err(db_err)?);
    }
    Ok(values)
}
