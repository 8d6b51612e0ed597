// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request lifecycle and billing transitions.
//!
//! Every function here is pure: it takes the current entity and a
//! [`Command`] and returns the changed entity together with the
//! [`AuditEvent`](waste_billing_audit::AuditEvent) describing the change.
//! Persisting both atomically is the caller's job.

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

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::{
    apply, apply_create_request, apply_generate_invoice, apply_record_collection,
    apply_register_member,
};
pub use command::Command;
pub use error::CoreError;
pub use state::{
    BillingContext, CollectionResult, InvoiceResult, MemberResult, RequestChange,
    TransitionResult,
};
