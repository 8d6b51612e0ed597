// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the waste billing engine.
//!
//! This crate stores members, requests, collection records, invoices and
//! the audit trail in `SQLite` through Diesel. It persists the results
//! produced by the core crate and answers the read-side queries.
//!
//! ## Storage rules
//!
//! - Timestamps are stored as Unix seconds
//! - Weights, rates and amounts are stored as canonical decimal text
//! - Request and invoice totals are never stored; they are derived
//! - Request updates are guarded by the request version
//! - Every mutation and its audit event share one transaction
//!
//! ## Testing
//!
//! Tests run against unique shared in-memory databases created by
//! [`Persistence::new_in_memory`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use time::OffsetDateTime;
use tracing::info;
use waste_billing::{CollectionResult, InvoiceResult, MemberResult, TransitionResult};
use waste_billing_audit::{AuditEvent, SubjectKind};
use waste_billing_domain::{
    CollectionRecord, Invoice, InvoicePeriod, Member, Role, WasteRequest,
};

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

mod backend;
mod convert;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::StatusHistoryEntry;
pub use error::PersistenceError;
pub use mutations::Persisted;
pub use queries::analytics::{
    CategoryStatistic, CollectorWorkload, MonthlyRequestCount, RequestSummary,
};
pub use queries::collections::CollectionFilter;
pub use queries::requests::RequestFilter;

use backend::PersistenceBackend;

/// Type alias kept for callers that name the backend explicitly.
pub type SqlitePersistence = Persistence;

/// Persistence adapter over a single `SQLite` connection.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_billing_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        info!(path = path_str, "Opened file database");
        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Persists a registered member and its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_member(
        &mut self,
        result: &MemberResult,
        now: OffsetDateTime,
    ) -> Result<Persisted<Member>, PersistenceError> {
        mutations::persist_member(&mut self.conn, result, now)
    }

    /// Persists a request creation, update or deletion and its audit event.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::ConcurrentModification` if the request
    /// version changed since it was read, or another error if persistence
    /// fails.
    pub fn persist_request_transition(
        &mut self,
        result: &TransitionResult,
        now: OffsetDateTime,
    ) -> Result<Persisted<WasteRequest>, PersistenceError> {
        mutations::persist_request_transition(&mut self.conn, result, now)
    }

    /// Appends a collection record and its audit event.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_collection(
        &mut self,
        result: &CollectionResult,
        now: OffsetDateTime,
    ) -> Result<Persisted<CollectionRecord>, PersistenceError> {
        mutations::persist_collection(&mut self.conn, result, now)
    }

    /// Stores an invoice, replacing the previous one for the same period.
    ///
    /// # Errors
    ///
    /// Returns an error if persistence fails.
    pub fn persist_invoice(
        &mut self,
        result: &InvoiceResult,
        now: OffsetDateTime,
    ) -> Result<Persisted<Invoice>, PersistenceError> {
        mutations::persist_invoice(&mut self.conn, result, now)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Retrieves a member by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::MemberNotFound` if it does not exist.
    pub fn get_member(&mut self, member_id: i64) -> Result<Member, PersistenceError> {
        queries::members::get_member(&mut self.conn, member_id)
    }

    /// Retrieves whichever of the given members exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_members(&mut self, member_ids: &[i64]) -> Result<Vec<Member>, PersistenceError> {
        queries::members::find_members(&mut self.conn, member_ids)
    }

    /// Lists members, optionally filtered by role.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_members(&mut self, role: Option<Role>) -> Result<Vec<Member>, PersistenceError> {
        queries::members::list_members(&mut self.conn, role)
    }

    /// Counts registered members.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_members(&mut self) -> Result<i64, PersistenceError> {
        queries::members::count_members(&mut self.conn)
    }

    // ========================================================================
    // Requests
    // ========================================================================

    /// Retrieves a request with its items.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::RequestNotFound` if it does not exist.
    pub fn get_request(&mut self, request_id: i64) -> Result<WasteRequest, PersistenceError> {
        queries::requests::get_request(&mut self.conn, request_id)
    }

    /// Lists requests matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_requests(
        &mut self,
        filter: &RequestFilter,
    ) -> Result<Vec<WasteRequest>, PersistenceError> {
        queries::requests::list_requests(&mut self.conn, filter)
    }

    /// Retrieves the status history of a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_request_history(
        &mut self,
        request_id: i64,
    ) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
        queries::requests::get_request_history(&mut self.conn, request_id)
    }

    // ========================================================================
    // Collections & Invoices
    // ========================================================================

    /// Lists collection records matching a filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_collection_records(
        &mut self,
        filter: &CollectionFilter,
    ) -> Result<Vec<CollectionRecord>, PersistenceError> {
        queries::collections::list_collection_records(&mut self.conn, filter)
    }

    /// Retrieves an invoice by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::InvoiceNotFound` if it does not exist.
    pub fn get_invoice(&mut self, invoice_id: i64) -> Result<Invoice, PersistenceError> {
        queries::invoices::get_invoice(&mut self.conn, invoice_id)
    }

    /// Retrieves the stored invoice for a resident and period, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_invoice_for_period(
        &mut self,
        resident_id: i64,
        period: &InvoicePeriod,
    ) -> Result<Option<Invoice>, PersistenceError> {
        queries::invoices::find_invoice_for_period(&mut self.conn, resident_id, period)
    }

    /// Lists invoices, optionally for one resident.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_invoices(
        &mut self,
        resident_id: Option<i64>,
    ) -> Result<Vec<Invoice>, PersistenceError> {
        queries::invoices::list_invoices(&mut self.conn, resident_id)
    }

    // ========================================================================
    // Audit & Analytics
    // ========================================================================

    /// Retrieves an audit event by ID.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::EventNotFound` if it does not exist.
    pub fn get_audit_event(&mut self, event_id: i64) -> Result<AuditEvent, PersistenceError> {
        queries::audit::get_audit_event(&mut self.conn, event_id)
    }

    /// Counts audit events, optionally about one subject kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_audit_events(
        &mut self,
        kind: Option<SubjectKind>,
    ) -> Result<i64, PersistenceError> {
        queries::audit::count_audit_events(&mut self.conn, kind)
    }

    /// Request counts per status and total revenue.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn request_summary(&mut self) -> Result<RequestSummary, PersistenceError> {
        queries::analytics::request_summary(&mut self.conn)
    }

    /// Collected weight and amount per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn category_statistics(&mut self) -> Result<Vec<CategoryStatistic>, PersistenceError> {
        queries::analytics::category_statistics(&mut self.conn)
    }

    /// Requests created per calendar month.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn requests_per_month(&mut self) -> Result<Vec<MonthlyRequestCount>, PersistenceError> {
        queries::analytics::requests_per_month(&mut self.conn)
    }

    /// Assigned and completed requests per collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn collector_workload(&mut self) -> Result<Vec<CollectorWorkload>, PersistenceError> {
        queries::analytics::collector_workload(&mut self.conn)
    }
}
