// policy-table-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Policy Table Store Library
// Description: Public API surface for the SQLite-backed policy store.
// Purpose: Expose the store, its driver, and the schema and query catalogs.
// Dependencies: crate::{decision, driver, gather, save, schema, queries, store}
// ============================================================================

//! ## Overview
//! This crate persists the policy table in an embedded `SQLite` database and
//! answers permission and update-cadence questions over it. The schema and
//! every named SQL statement live in dedicated catalogs; the store wires them
//! to the document model under a transactional load/save cycle.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod decision;
mod driver;
mod gather;
mod save;
mod store;

pub mod queries;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use driver::DbHandle;
pub use driver::PolicyDatabase;
pub use driver::StorageProfile;
pub use store::SqlitePolicyError;
pub use store::SqlitePolicyTable;
pub use store::DATABASE_NAME;
