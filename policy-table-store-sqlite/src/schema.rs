// policy-table-store-sqlite/src/schema.rs
// ============================================================================
// Module: Policy Table Schema Catalog
// Description: DDL, seed data, and verification pragmas for the policy store.
// Purpose: Define the relational schema and its stable version identity.
// Dependencies: policy-table-core
// ============================================================================

//! ## Overview
//! The schema catalog holds the full DDL installing every table, index and
//! trigger, its inverse, and the seed insert that constitutes an empty but
//! valid policy table. The schema's version identity is the Djb2 hash of the
//! DDL text, so any edit to [`CREATE_SCHEMA`] changes the identity and
//! triggers a full refresh at a higher layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use policy_table_core::hashing::djb2_hash;

// ============================================================================
// SECTION: DDL
// ============================================================================

/// Full DDL installing every table, index and trigger.
pub const CREATE_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS `_internal_data`(
  `db_version_hash` INTEGER NOT NULL DEFAULT 0,
  `is_first_run` BOOLEAN NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS `module_meta`(
  `pt_exchanged_at_odometer_x` INTEGER NOT NULL DEFAULT 0,
  `pt_exchanged_x_days_after_epoch` INTEGER NOT NULL DEFAULT 0,
  `ignition_cycles_since_last_exchange` INTEGER NOT NULL DEFAULT 0,
  `flag_update_required` BOOLEAN NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS `module_config`(
  `preloaded_pt` BOOLEAN NOT NULL DEFAULT 0,
  `exchange_after_x_ignition_cycles` INTEGER NOT NULL DEFAULT 0,
  `exchange_after_x_kilometers` INTEGER NOT NULL DEFAULT 0,
  `exchange_after_x_days` INTEGER NOT NULL DEFAULT 0,
  `timeout_after_x_seconds` INTEGER NOT NULL DEFAULT 0,
  `vehicle_make` VARCHAR(45),
  `vehicle_model` VARCHAR(45),
  `vehicle_year` VARCHAR(4),
  `preloaded_date` VARCHAR(10),
  `certificate` TEXT
);
CREATE TABLE IF NOT EXISTS `priority`(
  `value` VARCHAR(16) PRIMARY KEY NOT NULL
);
CREATE TABLE IF NOT EXISTS `hmi_level`(
  `value` VARCHAR(16) PRIMARY KEY NOT NULL
);
CREATE TABLE IF NOT EXISTS `version`(
  `number` VARCHAR(45) NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS `functional_group`(
  `id` INTEGER PRIMARY KEY NOT NULL,
  `name` VARCHAR(100) NOT NULL,
  `user_consent_prompt` TEXT
);
CREATE TABLE IF NOT EXISTS `rpc`(
  `id` INTEGER PRIMARY KEY AUTOINCREMENT,
  `name` VARCHAR(45) NOT NULL,
  `hmi_level_value` VARCHAR(16) NOT NULL REFERENCES `hmi_level`(`value`),
  `parameter` VARCHAR(45),
  `functional_group_id` INTEGER NOT NULL REFERENCES `functional_group`(`id`)
);
CREATE INDEX IF NOT EXISTS `ix_rpc_functional_group_id`
  ON `rpc`(`functional_group_id`);
CREATE TABLE IF NOT EXISTS `application`(
  `id` VARCHAR(45) PRIMARY KEY NOT NULL,
  `keep_context` BOOLEAN,
  `steal_focus` BOOLEAN,
  `default_hmi` VARCHAR(16),
  `priority_value` VARCHAR(16) REFERENCES `priority`(`value`),
  `is_revoked` BOOLEAN,
  `is_default` BOOLEAN NOT NULL DEFAULT 0,
  `is_predata` BOOLEAN NOT NULL DEFAULT 0,
  `memory_kb` INTEGER NOT NULL DEFAULT 0,
  `heart_beat_timeout_ms` INTEGER NOT NULL DEFAULT 0,
  `certificate` TEXT
);
CREATE TABLE IF NOT EXISTS `app_group`(
  `application_id` VARCHAR(45) NOT NULL REFERENCES `application`(`id`),
  `functional_group_id` INTEGER NOT NULL REFERENCES `functional_group`(`id`),
  PRIMARY KEY(`application_id`, `functional_group_id`)
);
CREATE INDEX IF NOT EXISTS `ix_app_group_application_id`
  ON `app_group`(`application_id`);
CREATE TABLE IF NOT EXISTS `nickname`(
  `application_id` VARCHAR(45) NOT NULL REFERENCES `application`(`id`),
  `name` VARCHAR(100) NOT NULL,
  PRIMARY KEY(`application_id`, `name`)
);
CREATE TABLE IF NOT EXISTS `app_type`(
  `application_id` VARCHAR(45) NOT NULL REFERENCES `application`(`id`),
  `name` VARCHAR(50) NOT NULL,
  PRIMARY KEY(`application_id`, `name`)
);
CREATE TABLE IF NOT EXISTS `request_type`(
  `application_id` VARCHAR(45) NOT NULL REFERENCES `application`(`id`),
  `request_type` VARCHAR(50) NOT NULL,
  PRIMARY KEY(`application_id`, `request_type`)
);
CREATE TABLE IF NOT EXISTS `device`(
  `id` VARCHAR(100) PRIMARY KEY NOT NULL
);
CREATE TABLE IF NOT EXISTS `endpoint`(
  `service` VARCHAR(100) NOT NULL,
  `url` VARCHAR(100) NOT NULL,
  `application_id` VARCHAR(45) REFERENCES `application`(`id`)
);
CREATE TABLE IF NOT EXISTS `message_type`(
  `name` VARCHAR(45) PRIMARY KEY NOT NULL
);
CREATE TABLE IF NOT EXISTS `language`(
  `code` VARCHAR(25) PRIMARY KEY NOT NULL
);
CREATE TABLE IF NOT EXISTS `message`(
  `id` INTEGER PRIMARY KEY AUTOINCREMENT,
  `tts` TEXT,
  `label` TEXT,
  `line1` TEXT,
  `line2` TEXT,
  `textBody` TEXT,
  `language_code` VARCHAR(25) NOT NULL REFERENCES `language`(`code`),
  `message_type_name` VARCHAR(45) NOT NULL REFERENCES `message_type`(`name`)
);
CREATE TABLE IF NOT EXISTS `notifications_by_priority`(
  `priority_value` VARCHAR(16) PRIMARY KEY NOT NULL REFERENCES `priority`(`value`),
  `value` INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS `seconds_between_retry`(
  `index` INTEGER PRIMARY KEY NOT NULL,
  `value` INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS `app_level`(
  `application_id` VARCHAR(45) PRIMARY KEY NOT NULL REFERENCES `application`(`id`)
);
CREATE TRIGGER IF NOT EXISTS `tg_module_meta_singleton`
BEFORE INSERT ON `module_meta`
WHEN (SELECT COUNT(*) FROM `module_meta`) > 0
BEGIN
  SELECT RAISE(IGNORE);
END;
CREATE TRIGGER IF NOT EXISTS `tg_module_config_singleton`
BEFORE INSERT ON `module_config`
WHEN (SELECT COUNT(*) FROM `module_config`) > 0
BEGIN
  SELECT RAISE(IGNORE);
END;
CREATE TRIGGER IF NOT EXISTS `tg_internal_data_singleton`
BEFORE INSERT ON `_internal_data`
WHEN (SELECT COUNT(*) FROM `_internal_data`) > 0
BEGIN
  SELECT RAISE(IGNORE);
END;
CREATE TRIGGER IF NOT EXISTS `tg_version_singleton`
BEFORE INSERT ON `version`
WHEN (SELECT COUNT(*) FROM `version`) > 0
BEGIN
  SELECT RAISE(IGNORE);
END;";

/// Inverse of [`CREATE_SCHEMA`].
pub const DROP_SCHEMA: &str = "\
DROP TRIGGER IF EXISTS `tg_version_singleton`;
DROP TRIGGER IF EXISTS `tg_internal_data_singleton`;
DROP TRIGGER IF EXISTS `tg_module_config_singleton`;
DROP TRIGGER IF EXISTS `tg_module_meta_singleton`;
DROP INDEX IF EXISTS `ix_app_group_application_id`;
DROP INDEX IF EXISTS `ix_rpc_functional_group_id`;
DROP TABLE IF EXISTS `app_level`;
DROP TABLE IF EXISTS `seconds_between_retry`;
DROP TABLE IF EXISTS `notifications_by_priority`;
DROP TABLE IF EXISTS `message`;
DROP TABLE IF EXISTS `language`;
DROP TABLE IF EXISTS `message_type`;
DROP TABLE IF EXISTS `endpoint`;
DROP TABLE IF EXISTS `device`;
DROP TABLE IF EXISTS `request_type`;
DROP TABLE IF EXISTS `app_type`;
DROP TABLE IF EXISTS `nickname`;
DROP TABLE IF EXISTS `app_group`;
DROP TABLE IF EXISTS `application`;
DROP TABLE IF EXISTS `rpc`;
DROP TABLE IF EXISTS `functional_group`;
DROP TABLE IF EXISTS `version`;
DROP TABLE IF EXISTS `hmi_level`;
DROP TABLE IF EXISTS `priority`;
DROP TABLE IF EXISTS `module_config`;
DROP TABLE IF EXISTS `module_meta`;
DROP TABLE IF EXISTS `_internal_data`;";

// ============================================================================
// SECTION: Seed Data
// ============================================================================

/// Seed insert constituting an empty but valid policy table.
pub const INSERT_INIT_DATA: &str = "\
INSERT INTO `_internal_data` (`db_version_hash`, `is_first_run`) VALUES (0, 0);
INSERT INTO `module_meta` (`pt_exchanged_at_odometer_x`,
  `pt_exchanged_x_days_after_epoch`, `ignition_cycles_since_last_exchange`,
  `flag_update_required`) VALUES (0, 0, 0, 0);
INSERT INTO `module_config` (`preloaded_pt`,
  `exchange_after_x_ignition_cycles`, `exchange_after_x_kilometers`,
  `exchange_after_x_days`, `timeout_after_x_seconds`) VALUES (0, 0, 0, 0, 0);
INSERT INTO `version` (`number`) VALUES ('0');
INSERT OR IGNORE INTO `priority` (`value`) VALUES
  ('EMERGENCY'), ('NAVIGATION'), ('VOICECOM'), ('COMMUNICATION'),
  ('NORMAL'), ('NONE');
INSERT OR IGNORE INTO `hmi_level` (`value`) VALUES
  ('FULL'), ('LIMITED'), ('BACKGROUND'), ('NONE');";

/// Deletes every data row while keeping the schema, the token lookups, and
/// the version identity row.
pub const DELETE_DATA: &str = "\
DELETE FROM `app_level`;
DELETE FROM `seconds_between_retry`;
DELETE FROM `notifications_by_priority`;
DELETE FROM `message`;
DELETE FROM `language`;
DELETE FROM `message_type`;
DELETE FROM `endpoint`;
DELETE FROM `device`;
DELETE FROM `request_type`;
DELETE FROM `app_type`;
DELETE FROM `nickname`;
DELETE FROM `app_group`;
DELETE FROM `application`;
DELETE FROM `rpc`;
DELETE FROM `functional_group`;
DELETE FROM `version`;
DELETE FROM `module_config`;
DELETE FROM `module_meta`;";

// ============================================================================
// SECTION: Verification
// ============================================================================

/// Reports the page count; zero means the database file is empty.
pub const CHECK_PG_NUMBER: &str = "PRAGMA page_count";

/// Runs the storage integrity check; every result row must read `ok`.
pub const CHECK_DB_INTEGRITY: &str = "PRAGMA integrity_check";

/// Reads the first-run flag.
pub const IS_FIRST_RUN: &str = "SELECT `is_first_run` FROM `_internal_data` LIMIT 1";

/// Clears the first-run flag.
pub const SET_NOT_FIRST_RUN: &str = "UPDATE `_internal_data` SET `is_first_run` = 0";

// ============================================================================
// SECTION: Version Identity
// ============================================================================

/// Returns the schema version identity: the Djb2 hash of the DDL text.
#[must_use]
pub fn db_schema_version() -> i32 {
    djb2_hash(CREATE_SCHEMA)
}
