// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Each public entry point persists one core transition result inside a
//! single database transaction: the entity change, any status history and
//! the audit event are written together or not at all.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event inserts
//! - `members`: Member directory inserts
//! - `requests`: Versioned request inserts, updates and deletes
//! - `collections`: Append-only collection records
//! - `invoices`: Invoice insert or replace

pub mod audit;
pub mod collections;
pub mod invoices;
pub mod members;
pub mod requests;

pub use collections::persist_collection;
pub use invoices::persist_invoice;
pub use members::persist_member;
pub use requests::persist_request_transition;

/// A stored entity together with the audit event that recorded it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persisted<T> {
    /// The entity with its database identifier filled in.
    pub value: T,
    /// The audit event ID.
    pub event_id: i64,
}
