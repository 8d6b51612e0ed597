// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `audit`: Audit event lookup
//! - `members`: Member directory
//! - `requests`: Requests, their items and status history
//! - `collections`: Collection records and their items
//! - `invoices`: Stored invoices
//! - `analytics`: Administrator dashboard aggregates

pub mod analytics;
pub mod audit;
pub mod collections;
pub mod invoices;
pub mod members;
pub mod requests;
