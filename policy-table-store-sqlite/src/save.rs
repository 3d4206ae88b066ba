// policy-table-store-sqlite/src/save.rs
// ============================================================================
// Module: Policy Table Save Path
// Description: Replaces the stored policy document under one transaction.
// Purpose: Keep saves atomic and group identifiers stable across cycles.
// Dependencies: policy-table-core, rusqlite, tracing
// ============================================================================

//! ## Overview
//! A save replaces the stored document as a whole: functional groups first,
//! then applications, then the module singletons. Any sub-save failure rolls
//! the transaction back, leaving no partial state. Group rows are dropped
//! and reinserted with their deterministic Djb2-derived ids so references in
//! other tables survive the cycle, and predefined applications are written
//! before ordinary ones so default-policy inheritance finds its source rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use policy_table_core::hashing::functional_group_id;
use policy_table_core::table::is_predefined_app;
use policy_table_core::table::ApplicationPoliciesSection;
use policy_table_core::table::ApplicationPolicy;
use policy_table_core::table::AppHmiType;
use policy_table_core::table::ConsumerFriendlyMessages;
use policy_table_core::table::DeviceData;
use policy_table_core::table::DevicePolicy;
use policy_table_core::table::FunctionalGroupings;
use policy_table_core::table::Maybe;
use policy_table_core::table::MessageString;
use policy_table_core::table::ModuleConfig;
use policy_table_core::table::ModuleMeta;
use policy_table_core::table::PolicyTable;
use policy_table_core::table::PolicyTableDocument;
use policy_table_core::table::Priority;
use policy_table_core::table::RequestType;
use policy_table_core::table::RpcPermissions;
use policy_table_core::table::UsageAndErrorCounts;
use policy_table_core::table::DEFAULT_ID;
use policy_table_core::table::DEVICE_ID;
use policy_table_core::table::PRE_DATA_CONSENT_ID;
use rusqlite::params;
use rusqlite::Connection;
use tracing::debug;
use tracing::warn;

use crate::driver;
use crate::gather;
use crate::queries;
use crate::store::db_err;
use crate::store::SqlitePolicyError;
use crate::store::SqlitePolicyTable;

// ============================================================================
// SECTION: Save Entry Points
// ============================================================================

impl SqlitePolicyTable {
    /// Replaces the stored document atomically.
    pub(crate) fn save_document(
        &self,
        document: &PolicyTableDocument,
    ) -> Result<(), SqlitePolicyError> {
        self.database().with_handle(|connection| {
            driver::begin_transaction(connection)?;
            match save_policy_table(connection, &document.policy_table) {
                Ok(()) => driver::commit_transaction(connection),
                Err(err) => {
                    if let Err(rollback_err) = driver::rollback_transaction(connection) {
                        warn!(error = %rollback_err, "rollback failed after save error");
                    }
                    Err(err)
                }
            }
        })
    }

    /// Rebinds an application to the predefined default policy.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when any step of the copy chain fails.
    pub fn set_default_policy(&self, app_id: &str) -> Result<(), SqlitePolicyError> {
        self.database()
            .with_handle(|connection| set_default_policy(connection, app_id))
    }

    /// Writes the default-policy flag of one application.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the flag cannot be written.
    pub fn set_is_default(&self, app_id: &str, is_default: bool) -> Result<(), SqlitePolicyError> {
        self.database()
            .with_handle(|connection| set_is_default(connection, app_id, is_default))
    }

    /// Writes the revoked / default / pre-data flags of one application.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the flags cannot be written.
    pub fn save_application_custom_data(
        &self,
        app_id: &str,
        is_revoked: bool,
        is_default: bool,
        is_predata: bool,
    ) -> Result<(), SqlitePolicyError> {
        self.database().with_handle(|connection| {
            connection
                .execute(
                    queries::UPDATE_APPLICATION_CUSTOM_DATA,
                    params![is_revoked, is_default, is_predata, app_id],
                )
                .map_err(db_err)?;
            Ok(())
        })
    }

    /// Writes the factory-preloaded flag.
    ///
    /// # Errors
    ///
    /// Returns [`SqlitePolicyError`] when the flag cannot be written.
    pub fn set_preloaded(&self, value: bool) -> Result<(), SqlitePolicyError> {
        self.database()
            .with_handle(|connection| set_preloaded(connection, value))
    }

    /// Accepts a VIN value. The store does not record it.
    #[allow(clippy::unused_self)]
    pub fn set_vin_value(&self, _value: &str) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Sub-Saves
// ============================================================================

/// Runs every sub-save in dependency order.
fn save_policy_table(connection: &Connection, table: &PolicyTable) -> Result<(), SqlitePolicyError> {
    save_functional_groupings(connection, &table.functional_groupings)?;
    save_application_policies_section(connection, &table.app_policies_section)?;
    save_module_config(connection, &table.module_config)?;
    save_consumer_friendly_messages(connection, &table.consumer_friendly_messages)?;
    save_device_data(connection, &table.device_data)?;
    save_usage_and_error_counts(connection, &table.usage_and_error_counts)?;
    save_module_meta(connection, &table.module_meta)?;
    Ok(())
}

/// Drops and rewrites every functional group and its RPC rows.
fn save_functional_groupings(
    connection: &Connection,
    groups: &FunctionalGroupings,
) -> Result<(), SqlitePolicyError> {
    connection.execute(queries::DELETE_RPC, []).map_err(db_err)?;
    connection
        .execute(queries::DELETE_FUNCTIONAL_GROUP, [])
        .map_err(db_err)?;
    let mut statement = connection
        .prepare(queries::INSERT_FUNCTIONAL_GROUP)
        .map_err(db_err)?;
    for (name, group) in groups {
        // Other tables keep references to group rows across the
        // drop-and-reinsert cycle, so the key must be deterministic.
        let group_id = functional_group_id(name);
        statement
            .execute(params![group_id, name, group.user_consent_prompt.value()])
            .map_err(db_err)?;
        save_rpcs(connection, group_id, &group.rpcs)?;
    }
    Ok(())
}

/// Writes the RPC rows of one functional group: one row per (rpc, level)
/// when the parameter list is empty, one per (rpc, level, parameter)
/// otherwise.
fn save_rpcs(
    connection: &Connection,
    group_id: i64,
    rpcs: &Maybe<BTreeMap<String, RpcPermissions>>,
) -> Result<(), SqlitePolicyError> {
    let Maybe::Set(rpcs) = rpcs else {
        return Ok(());
    };
    let mut plain = connection.prepare(queries::INSERT_RPC).map_err(db_err)?;
    let mut with_parameter = connection
        .prepare(queries::INSERT_RPC_WITH_PARAMETER)
        .map_err(db_err)?;
    for (name, permissions) in rpcs {
        let parameters = permissions.parameters.value();
        for level in &permissions.hmi_levels {
            match parameters {
                Some(parameters) if !parameters.is_empty() => {
                    for parameter in parameters {
                        with_parameter
                            .execute(params![
                                name,
                                level.json_token(),
                                parameter.json_token(),
                                group_id
                            ])
                            .map_err(db_err)?;
                    }
                }
                _ => {
                    plain
                        .execute(params![name, level.json_token(), group_id])
                        .map_err(db_err)?;
                }
            }
        }
    }
    Ok(())
}

/// Clears and rewrites the application section. Predefined applications are
/// written first so that default-policy inheritance finds its source rows,
/// then the device row, then every ordinary application.
fn save_application_policies_section(
    connection: &Connection,
    section: &ApplicationPoliciesSection,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::DELETE_APP_GROUP, [])
        .map_err(db_err)?;
    connection
        .execute(queries::DELETE_APPLICATION, [])
        .map_err(db_err)?;
    connection
        .execute(queries::DELETE_REQUEST_TYPE, [])
        .map_err(db_err)?;
    if let Some(policy) = section.apps.get(DEFAULT_ID) {
        save_specific_app_policy(connection, DEFAULT_ID, policy)?;
    }
    if let Some(policy) = section.apps.get(PRE_DATA_CONSENT_ID) {
        save_specific_app_policy(connection, PRE_DATA_CONSENT_ID, policy)?;
    }
    save_device_policy(connection, &section.device)?;
    for (app_id, policy) in &section.apps {
        if is_predefined_app(app_id) {
            continue;
        }
        save_specific_app_policy(connection, app_id, policy)?;
    }
    Ok(())
}

/// Writes one application policy. A policy carrying the default alias
/// delegates to the default-policy copy chain and writes nothing else.
fn save_specific_app_policy(
    connection: &Connection,
    app_id: &str,
    policy: &ApplicationPolicy,
) -> Result<(), SqlitePolicyError> {
    match policy {
        ApplicationPolicy::Revoked => {
            insert_application_row(connection, app_id, None, true, 0, 0, None)
        }
        ApplicationPolicy::Default => {
            insert_application_row(connection, app_id, None, false, 0, 0, None)?;
            set_default_policy(connection, app_id)
        }
        ApplicationPolicy::PreDataConsent => {
            insert_application_row(connection, app_id, None, false, 0, 0, None)
        }
        ApplicationPolicy::Params(params) => {
            insert_application_row(
                connection,
                app_id,
                params.priority.value().copied(),
                false,
                params.memory_kb.value_or(0),
                params.heart_beat_timeout_ms.value_or(0),
                params.certificate.value(),
            )?;
            save_app_group(connection, app_id, &params.groups)?;
            if let Maybe::Set(nicknames) = &params.nicknames {
                save_nicknames(connection, app_id, nicknames)?;
            }
            if let Maybe::Set(app_hmi_types) = &params.app_hmi_types {
                save_app_types(connection, app_id, app_hmi_types)?;
            }
            if let Maybe::Set(request_types) = &params.request_types {
                save_request_types(connection, app_id, request_types)?;
            }
            Ok(())
        }
    }
}

/// Writes the device policy row.
fn save_device_policy(
    connection: &Connection,
    device: &DevicePolicy,
) -> Result<(), SqlitePolicyError> {
    insert_application_row(
        connection,
        DEVICE_ID,
        device.priority.value().copied(),
        false,
        0,
        0,
        None,
    )
}

/// Inserts one application row.
fn insert_application_row(
    connection: &Connection,
    app_id: &str,
    priority: Option<Priority>,
    is_revoked: bool,
    memory_kb: i32,
    heart_beat_timeout_ms: i64,
    certificate: Option<&String>,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(
            queries::INSERT_APPLICATION,
            params![
                app_id,
                priority.map(Priority::json_token),
                is_revoked,
                memory_kb,
                heart_beat_timeout_ms,
                certificate
            ],
        )
        .map_err(db_err)?;
    Ok(())
}

/// Binds an application to its functional groups by name.
fn save_app_group(
    connection: &Connection,
    app_id: &str,
    groups: &[String],
) -> Result<(), SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::INSERT_APP_GROUP)
        .map_err(db_err)?;
    for group in groups {
        statement.execute(params![app_id, group]).map_err(db_err)?;
    }
    Ok(())
}

/// Records the nicknames of one application.
fn save_nicknames(
    connection: &Connection,
    app_id: &str,
    nicknames: &[String],
) -> Result<(), SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::INSERT_NICKNAME)
        .map_err(db_err)?;
    for nickname in nicknames {
        statement
            .execute(params![app_id, nickname])
            .map_err(db_err)?;
    }
    Ok(())
}

/// Records the declared HMI types of one application.
fn save_app_types(
    connection: &Connection,
    app_id: &str,
    app_hmi_types: &[AppHmiType],
) -> Result<(), SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::INSERT_APP_TYPE)
        .map_err(db_err)?;
    for app_hmi_type in app_hmi_types {
        statement
            .execute(params![app_id, app_hmi_type.json_token()])
            .map_err(db_err)?;
    }
    Ok(())
}

/// Records the permitted request types of one application.
fn save_request_types(
    connection: &Connection,
    app_id: &str,
    request_types: &[RequestType],
) -> Result<(), SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::INSERT_REQUEST_TYPE)
        .map_err(db_err)?;
    for request_type in request_types {
        statement
            .execute(params![app_id, request_type.json_token()])
            .map_err(db_err)?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Module Singletons
// ============================================================================

/// Writes the module configuration row and its retry, notification, and
/// endpoint sub-tables.
fn save_module_config(
    connection: &Connection,
    config: &ModuleConfig,
) -> Result<(), SqlitePolicyError> {
    let is_preloaded = config.preloaded_pt.value_or(false);
    connection
        .execute(
            queries::UPDATE_MODULE_CONFIG,
            params![
                is_preloaded,
                config.exchange_after_x_ignition_cycles,
                config.exchange_after_x_kilometers,
                config.exchange_after_x_days,
                config.timeout_after_x_seconds,
                config.vehicle_make.value(),
                config.vehicle_model.value(),
                config.vehicle_year.value(),
                config.preloaded_date.value(),
                config.certificate.value()
            ],
        )
        .map_err(db_err)?;
    save_seconds_between_retries(connection, &config.seconds_between_retries)?;
    save_notifications_per_minute(connection, &config.notifications_per_minute_by_priority)?;
    save_service_endpoints(connection, &config.endpoints)?;
    Ok(())
}

/// Rewrites the retry backoff schedule.
fn save_seconds_between_retries(
    connection: &Connection,
    seconds: &[i32],
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::DELETE_SECONDS_BETWEEN_RETRIES, [])
        .map_err(db_err)?;
    let mut statement = connection
        .prepare(queries::INSERT_SECONDS_BETWEEN_RETRY)
        .map_err(db_err)?;
    for (index, value) in seconds.iter().enumerate() {
        let index = i64::try_from(index).unwrap_or(i64::MAX);
        statement.execute(params![index, value]).map_err(db_err)?;
    }
    Ok(())
}

/// Upserts the per-priority notification limits.
fn save_notifications_per_minute(
    connection: &Connection,
    notifications: &BTreeMap<Priority, i32>,
) -> Result<(), SqlitePolicyError> {
    let mut statement = connection
        .prepare(queries::INSERT_NOTIFICATIONS_BY_PRIORITY)
        .map_err(db_err)?;
    for (priority, limit) in notifications {
        statement
            .execute(params![priority.json_token(), limit])
            .map_err(db_err)?;
    }
    Ok(())
}

/// Rewrites the update endpoint rows.
fn save_service_endpoints(
    connection: &Connection,
    endpoints: &BTreeMap<String, BTreeMap<String, Vec<String>>>,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::DELETE_ENDPOINT, [])
        .map_err(db_err)?;
    let mut statement = connection
        .prepare(queries::INSERT_ENDPOINT)
        .map_err(db_err)?;
    for (service, apps) in endpoints {
        for (app_id, urls) in apps {
            for url in urls {
                statement
                    .execute(params![service, url, app_id])
                    .map_err(db_err)?;
            }
        }
    }
    Ok(())
}

/// Rewrites the message catalog. An absent message container preserves the
/// stored strings and version untouched.
fn save_consumer_friendly_messages(
    connection: &Connection,
    messages: &Maybe<ConsumerFriendlyMessages>,
) -> Result<(), SqlitePolicyError> {
    let Maybe::Set(catalog) = messages else {
        return Ok(());
    };
    let Maybe::Set(entries) = &catalog.messages else {
        debug!("message container absent, stored messages preserved");
        return Ok(());
    };
    connection
        .execute(queries::DELETE_MESSAGE_STRING, [])
        .map_err(db_err)?;
    connection
        .execute(queries::UPDATE_VERSION, params![catalog.version])
        .map_err(db_err)?;
    for (message_type, languages) in entries {
        save_message_type(connection, message_type)?;
        for (language, string) in &languages.languages {
            save_language(connection, language)?;
            save_message_string(connection, message_type, language, string)?;
        }
    }
    Ok(())
}

/// Records a message type.
fn save_message_type(connection: &Connection, name: &str) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::INSERT_MESSAGE_TYPE, params![name])
        .map_err(db_err)?;
    Ok(())
}

/// Records a language code.
fn save_language(connection: &Connection, code: &str) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::INSERT_LANGUAGE, params![code])
        .map_err(db_err)?;
    Ok(())
}

/// Message bodies are provisioned outside this component; the write is a
/// contract no-op.
fn save_message_string(
    _connection: &Connection,
    _message_type: &str,
    _language: &str,
    _string: &MessageString,
) -> Result<(), SqlitePolicyError> {
    Ok(())
}

/// Records the known device identities.
fn save_device_data(
    connection: &Connection,
    devices: &Maybe<DeviceData>,
) -> Result<(), SqlitePolicyError> {
    let Maybe::Set(devices) = devices else {
        return Ok(());
    };
    let mut statement = connection
        .prepare(queries::INSERT_DEVICE_DATA)
        .map_err(db_err)?;
    for device_id in devices.keys() {
        statement.execute(params![device_id]).map_err(db_err)?;
    }
    Ok(())
}

/// Rewrites the per-application counter identities.
fn save_usage_and_error_counts(
    connection: &Connection,
    counts: &Maybe<UsageAndErrorCounts>,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::DELETE_APP_LEVEL, [])
        .map_err(db_err)?;
    let Maybe::Set(counts) = counts else {
        return Ok(());
    };
    let Maybe::Set(app_level) = &counts.app_level else {
        return Ok(());
    };
    let mut statement = connection
        .prepare(queries::INSERT_APP_LEVEL)
        .map_err(db_err)?;
    for app_id in app_level.keys() {
        statement.execute(params![app_id]).map_err(db_err)?;
    }
    Ok(())
}

/// Writes the module metadata counters.
fn save_module_meta(
    connection: &Connection,
    meta: &Maybe<ModuleMeta>,
) -> Result<(), SqlitePolicyError> {
    let default = ModuleMeta::default();
    let meta = meta.value().unwrap_or(&default);
    connection
        .execute(
            queries::SAVE_MODULE_META,
            params![
                meta.pt_exchanged_at_odometer_x.value_or(0),
                meta.pt_exchanged_x_days_after_epoch.value_or(0),
                meta.ignition_cycles_since_last_exchange.value_or(0)
            ],
        )
        .map_err(db_err)?;
    Ok(())
}

// ============================================================================
// SECTION: Default Policy Inheritance
// ============================================================================

/// Rebinds an application to the predefined default policy: drop its group
/// bindings, copy the default application row, clear the preloaded flag,
/// re-insert the default group list, and mark the application as default.
pub(crate) fn set_default_policy(
    connection: &Connection,
    app_id: &str,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::DELETE_APP_GROUP_BY_APPLICATION_ID, params![app_id])
        .map_err(db_err)?;
    copy_application(connection, DEFAULT_ID, app_id)?;
    set_preloaded(connection, false)?;
    let default_groups = gather::app_groups(connection, DEFAULT_ID)?;
    save_app_group(connection, app_id, &default_groups)?;
    set_is_default(connection, app_id, true)
}

/// Writes the default-policy flag of one application.
fn set_is_default(
    connection: &Connection,
    app_id: &str,
    is_default: bool,
) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::UPDATE_IS_DEFAULT, params![is_default, app_id])
        .map_err(db_err)?;
    Ok(())
}

/// Copies the ten policy columns of one application row onto another id.
fn copy_application(
    connection: &Connection,
    source: &str,
    destination: &str,
) -> Result<(), SqlitePolicyError> {
    let row = connection
        .query_row(queries::SELECT_APPLICATION_FULL, params![source], |row| {
            Ok((
                row.get::<_, Option<bool>>(0)?,
                row.get::<_, Option<bool>>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<bool>>(4)?,
                row.get::<_, Option<bool>>(5)?,
                row.get::<_, Option<bool>>(6)?,
                row.get::<_, i32>(7)?,
                row.get::<_, i64>(8)?,
                row.get::<_, Option<String>>(9)?,
            ))
        })
        .map_err(db_err)?;
    let (
        keep_context,
        steal_focus,
        default_hmi,
        priority_value,
        is_revoked,
        is_default,
        is_predata,
        memory_kb,
        heart_beat_timeout_ms,
        certificate,
    ) = row;
    connection
        .execute(
            queries::INSERT_APPLICATION_FULL,
            params![
                destination,
                keep_context,
                steal_focus,
                default_hmi,
                priority_value,
                is_revoked,
                is_default,
                is_predata,
                memory_kb,
                heart_beat_timeout_ms,
                certificate
            ],
        )
        .map_err(db_err)?;
    Ok(())
}

/// Writes the factory-preloaded flag.
fn set_preloaded(connection: &Connection, value: bool) -> Result<(), SqlitePolicyError> {
    connection
        .execute(queries::UPDATE_PRELOADED, params![value])
        .map_err(db_err)?;
    Ok(())
}
