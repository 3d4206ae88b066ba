// policy-table-store-sqlite/src/queries.rs
// ============================================================================
// Module: Policy Table Query Catalog
// Description: Named SQL statements for every policy store operation.
// Purpose: Keep all CRUD statements addressable by symbolic name.
// Dependencies: none
// ============================================================================

//! ## Overview
//! A flat namespace of named SQL text. Statements are prepared fresh per
//! operation; the catalog keeps column order stable for the gather and save
//! code that binds against positional parameters.

// ============================================================================
// SECTION: Permission Lookups
// ============================================================================

/// Permission rows for (application, HMI level, RPC). The first row decides
/// the verdict; non-null parameters accumulate in row order.
pub const SELECT_RPC: &str = "\
SELECT `rpc`.`parameter` FROM `rpc`
  JOIN `app_group`
    ON `app_group`.`functional_group_id` = `rpc`.`functional_group_id`
  WHERE `app_group`.`application_id` = ?1
    AND `rpc`.`hmi_level_value` = ?2
    AND `rpc`.`name` = ?3";

/// Priority recorded for an application.
pub const SELECT_PRIORITY: &str =
    "SELECT `priority_value` FROM `application` WHERE `id` = ?1";

// ============================================================================
// SECTION: Update Cadence
// ============================================================================

/// Ignition-cycle limit and consumed count.
pub const SELECT_IGNITION_CYCLES: &str = "\
SELECT `exchange_after_x_ignition_cycles`, `ignition_cycles_since_last_exchange`
  FROM `module_config`, `module_meta` LIMIT 1";

/// Kilometer limit and odometer at last exchange.
pub const SELECT_KILOMETERS: &str = "\
SELECT `exchange_after_x_kilometers`, `pt_exchanged_at_odometer_x`
  FROM `module_config`, `module_meta` LIMIT 1";

/// Day limit and day counter at last exchange.
pub const SELECT_DAYS: &str = "\
SELECT `exchange_after_x_days`, `pt_exchanged_x_days_after_epoch`
  FROM `module_config`, `module_meta` LIMIT 1";

/// Response timeout for update requests.
pub const SELECT_TIMEOUT_RESPONSE: &str =
    "SELECT `timeout_after_x_seconds` FROM `module_config` LIMIT 1";

/// Retry backoff schedule in declaration order.
pub const SELECT_SECONDS_BETWEEN_RETRIES: &str =
    "SELECT `value` FROM `seconds_between_retry` ORDER BY `index`";

/// Writes both exchange counters after a successful update.
pub const UPDATE_COUNTERS_SUCCESSFUL_UPDATE: &str = "\
UPDATE `module_meta` SET `pt_exchanged_at_odometer_x` = ?1,
  `pt_exchanged_x_days_after_epoch` = ?2";

/// Advances the ignition cycle counter.
pub const INCREMENT_IGNITION_CYCLES: &str = "\
UPDATE `module_meta` SET `ignition_cycles_since_last_exchange` =
  `ignition_cycles_since_last_exchange` + 1";

/// Resets the ignition cycle counter.
pub const RESET_IGNITION_CYCLES: &str =
    "UPDATE `module_meta` SET `ignition_cycles_since_last_exchange` = 0";

/// Reads the update-required flag.
pub const SELECT_FLAG_UPDATE_REQUIRED: &str =
    "SELECT `flag_update_required` FROM `module_meta` LIMIT 1";

/// Writes the update-required flag.
pub const UPDATE_FLAG_UPDATE_REQUIRED: &str =
    "UPDATE `module_meta` SET `flag_update_required` = ?1";

// ============================================================================
// SECTION: Endpoints and Notifications
// ============================================================================

/// Endpoint rows for one service type.
pub const SELECT_ENDPOINT: &str =
    "SELECT `url`, `application_id` FROM `endpoint` WHERE `service` = ?1";

/// Every endpoint row.
pub const SELECT_ENDPOINTS: &str =
    "SELECT `url`, `service`, `application_id` FROM `endpoint`";

/// Endpoint row for a fixed (service, application) pair.
pub const SELECT_LOCK_SCREEN_ICON: &str = "\
SELECT `url` FROM `endpoint`
  WHERE `service` = ?1 AND `application_id` = ?2 LIMIT 1";

/// Notification limit for one priority.
pub const SELECT_NOTIFICATIONS_PER_PRIORITY: &str =
    "SELECT `value` FROM `notifications_by_priority` WHERE `priority_value` = ?1";

/// Every notification limit row.
pub const SELECT_NOTIFICATIONS_PER_MIN: &str =
    "SELECT `priority_value`, `value` FROM `notifications_by_priority`";

/// Replaces an endpoint row.
pub const INSERT_ENDPOINT: &str = "\
INSERT INTO `endpoint` (`service`, `url`, `application_id`)
  VALUES (?1, ?2, ?3)";

/// Clears the endpoint table.
pub const DELETE_ENDPOINT: &str = "DELETE FROM `endpoint`";

/// Upserts a notification limit row.
pub const INSERT_NOTIFICATIONS_BY_PRIORITY: &str = "\
INSERT OR REPLACE INTO `notifications_by_priority` (`priority_value`, `value`)
  VALUES (?1, ?2)";

/// Inserts one retry schedule entry.
pub const INSERT_SECONDS_BETWEEN_RETRY: &str =
    "INSERT INTO `seconds_between_retry` (`index`, `value`) VALUES (?1, ?2)";

/// Clears the retry schedule.
pub const DELETE_SECONDS_BETWEEN_RETRIES: &str = "DELETE FROM `seconds_between_retry`";

// ============================================================================
// SECTION: Module Singletons
// ============================================================================

/// Module metadata counters.
pub const SELECT_MODULE_META: &str = "\
SELECT `pt_exchanged_at_odometer_x`, `pt_exchanged_x_days_after_epoch`,
  `ignition_cycles_since_last_exchange` FROM `module_meta` LIMIT 1";

/// Writes the module metadata counters.
pub const SAVE_MODULE_META: &str = "\
UPDATE `module_meta` SET `pt_exchanged_at_odometer_x` = ?1,
  `pt_exchanged_x_days_after_epoch` = ?2,
  `ignition_cycles_since_last_exchange` = ?3";

/// Module configuration row.
pub const SELECT_MODULE_CONFIG: &str = "\
SELECT `preloaded_pt`, `exchange_after_x_ignition_cycles`,
  `exchange_after_x_kilometers`, `exchange_after_x_days`,
  `timeout_after_x_seconds`, `vehicle_make`, `vehicle_model`, `vehicle_year`,
  `preloaded_date`, `certificate` FROM `module_config` LIMIT 1";

/// Writes the module configuration row.
pub const UPDATE_MODULE_CONFIG: &str = "\
UPDATE `module_config` SET `preloaded_pt` = ?1,
  `exchange_after_x_ignition_cycles` = ?2, `exchange_after_x_kilometers` = ?3,
  `exchange_after_x_days` = ?4, `timeout_after_x_seconds` = ?5,
  `vehicle_make` = ?6, `vehicle_model` = ?7, `vehicle_year` = ?8,
  `preloaded_date` = ?9, `certificate` = ?10";

/// Reports whether the stored table is factory-preloaded.
pub const SELECT_PRELOADED: &str =
    "SELECT `preloaded_pt` FROM `module_config` WHERE `preloaded_pt` = 1 LIMIT 1";

/// Writes the preloaded flag.
pub const UPDATE_PRELOADED: &str = "UPDATE `module_config` SET `preloaded_pt` = ?1";

/// Reads the stored schema version hash.
pub const SELECT_DB_VERSION: &str =
    "SELECT `db_version_hash` FROM `_internal_data` LIMIT 1";

/// Writes the stored schema version hash.
pub const UPDATE_DB_VERSION: &str =
    "UPDATE `_internal_data` SET `db_version_hash` = ?1";

// ============================================================================
// SECTION: Functional Groups
// ============================================================================

/// Every functional group row.
pub const SELECT_FUNCTIONAL_GROUPS: &str =
    "SELECT `id`, `name`, `user_consent_prompt` FROM `functional_group`";

/// RPC rows of one functional group.
pub const SELECT_ALL_RPCS: &str = "\
SELECT `name`, `hmi_level_value`, `parameter` FROM `rpc`
  WHERE `functional_group_id` = ?1";

/// Inserts a functional group with its stable surrogate key.
pub const INSERT_FUNCTIONAL_GROUP: &str = "\
INSERT INTO `functional_group` (`id`, `name`, `user_consent_prompt`)
  VALUES (?1, ?2, ?3)";

/// Inserts an RPC permission row without a parameter.
pub const INSERT_RPC: &str = "\
INSERT INTO `rpc` (`name`, `hmi_level_value`, `functional_group_id`)
  VALUES (?1, ?2, ?3)";

/// Inserts an RPC permission row carrying a parameter.
pub const INSERT_RPC_WITH_PARAMETER: &str = "\
INSERT INTO `rpc` (`name`, `hmi_level_value`, `parameter`,
  `functional_group_id`) VALUES (?1, ?2, ?3, ?4)";

/// Clears the RPC table.
pub const DELETE_RPC: &str = "DELETE FROM `rpc`";

/// Clears the functional group table.
pub const DELETE_FUNCTIONAL_GROUP: &str = "DELETE FROM `functional_group`";

// ============================================================================
// SECTION: Applications
// ============================================================================

/// Every application policy row.
pub const SELECT_APP_POLICIES: &str = "\
SELECT `id`, `priority_value`, `memory_kb`, `heart_beat_timeout_ms`,
  `certificate` FROM `application`";

/// Functional group names granted to one application.
pub const SELECT_APP_GROUPS: &str = "\
SELECT `f`.`name` FROM `app_group` AS `a`
  JOIN `functional_group` AS `f` ON `f`.`id` = `a`.`functional_group_id`
  WHERE `a`.`application_id` = ?1";

/// Nicknames of one application.
pub const SELECT_NICKNAMES: &str =
    "SELECT `name` FROM `nickname` WHERE `application_id` = ?1";

/// Declared HMI types of one application.
pub const SELECT_APP_TYPES: &str =
    "SELECT `name` FROM `app_type` WHERE `application_id` = ?1";

/// Permitted request types of one application.
pub const SELECT_REQUEST_TYPES: &str =
    "SELECT `request_type` FROM `request_type` WHERE `application_id` = ?1";

/// Revocation flag of one application.
pub const SELECT_APPLICATION_REVOKED: &str =
    "SELECT `is_revoked` FROM `application` WHERE `id` = ?1";

/// Reports whether an application row exists.
pub const SELECT_APPLICATION_REPRESENTED: &str =
    "SELECT COUNT(`id`) FROM `application` WHERE `id` = ?1";

/// Default-policy flag of one application.
pub const SELECT_APPLICATION_IS_DEFAULT: &str =
    "SELECT `is_default` FROM `application` WHERE `id` = ?1";

/// The ten policy columns of one application row.
pub const SELECT_APPLICATION_FULL: &str = "\
SELECT `keep_context`, `steal_focus`, `default_hmi`, `priority_value`,
  `is_revoked`, `is_default`, `is_predata`, `memory_kb`,
  `heart_beat_timeout_ms`, `certificate` FROM `application` WHERE `id` = ?1";

/// Inserts an application policy row.
pub const INSERT_APPLICATION: &str = "\
INSERT INTO `application` (`id`, `priority_value`, `is_revoked`, `memory_kb`,
  `heart_beat_timeout_ms`, `certificate`) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

/// Replaces a full application row, all ten policy columns.
pub const INSERT_APPLICATION_FULL: &str = "\
INSERT OR REPLACE INTO `application` (`id`, `keep_context`, `steal_focus`,
  `default_hmi`, `priority_value`, `is_revoked`, `is_default`, `is_predata`,
  `memory_kb`, `heart_beat_timeout_ms`, `certificate`)
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

/// Binds an application to a functional group by group name.
pub const INSERT_APP_GROUP: &str = "\
INSERT INTO `app_group` (`application_id`, `functional_group_id`)
  VALUES (?1, (SELECT `id` FROM `functional_group` WHERE `name` = ?2))";

/// Records a nickname for an application.
pub const INSERT_NICKNAME: &str = "\
INSERT OR IGNORE INTO `nickname` (`application_id`, `name`) VALUES (?1, ?2)";

/// Records a declared HMI type for an application.
pub const INSERT_APP_TYPE: &str = "\
INSERT OR IGNORE INTO `app_type` (`application_id`, `name`) VALUES (?1, ?2)";

/// Records a permitted request type for an application.
pub const INSERT_REQUEST_TYPE: &str = "\
INSERT OR IGNORE INTO `request_type` (`application_id`, `request_type`)
  VALUES (?1, ?2)";

/// Clears the app-to-group binding table.
pub const DELETE_APP_GROUP: &str = "DELETE FROM `app_group`";

/// Clears the group bindings of one application.
pub const DELETE_APP_GROUP_BY_APPLICATION_ID: &str =
    "DELETE FROM `app_group` WHERE `application_id` = ?1";

/// Clears the application table.
pub const DELETE_APPLICATION: &str = "DELETE FROM `application`";

/// Clears the request type table.
pub const DELETE_REQUEST_TYPE: &str = "DELETE FROM `request_type`";

/// Writes the revoked / default / pre-data flags of one application.
pub const UPDATE_APPLICATION_CUSTOM_DATA: &str = "\
UPDATE `application` SET `is_revoked` = ?1, `is_default` = ?2,
  `is_predata` = ?3 WHERE `id` = ?4";

/// Writes the default-policy flag of one application.
pub const UPDATE_IS_DEFAULT: &str =
    "UPDATE `application` SET `is_default` = ?1 WHERE `id` = ?2";

// ============================================================================
// SECTION: Devices, Messages, Counters
// ============================================================================

/// Every known device identifier.
pub const SELECT_DEVICE_DATA: &str = "SELECT `id` FROM `device`";

/// Records a device identifier.
pub const INSERT_DEVICE_DATA: &str =
    "INSERT OR IGNORE INTO `device` (`id`) VALUES (?1)";

/// Consumer-friendly message catalog version.
pub const SELECT_USER_MSGS_VERSION: &str = "SELECT `number` FROM `version` LIMIT 1";

/// Writes the consumer-friendly message catalog version.
pub const UPDATE_VERSION: &str = "UPDATE `version` SET `number` = ?1";

/// Records a message type.
pub const INSERT_MESSAGE_TYPE: &str =
    "INSERT OR IGNORE INTO `message_type` (`name`) VALUES (?1)";

/// Records a language code.
pub const INSERT_LANGUAGE: &str =
    "INSERT OR IGNORE INTO `language` (`code`) VALUES (?1)";

/// Clears the message string table.
pub const DELETE_MESSAGE_STRING: &str = "DELETE FROM `message`";

/// Every per-application counter row.
pub const SELECT_APP_LEVELS: &str = "SELECT `application_id` FROM `app_level`";

/// Records a per-application counter row.
pub const INSERT_APP_LEVEL: &str =
    "INSERT INTO `app_level` (`application_id`) VALUES (?1)";

/// Clears the per-application counter table.
pub const DELETE_APP_LEVEL: &str = "DELETE FROM `app_level`";
