// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use waste_billing_domain::{InvoicePeriod, Role, WeightEntry};

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a member to the directory.
    RegisterMember {
        /// The member's display name.
        display_name: String,
        /// The member's role.
        role: Role,
    },
    /// Submit a new pickup request on behalf of a resident.
    CreateRequest {
        /// The requesting resident.
        resident_id: i64,
        /// Declared weights, in submission order.
        entries: Vec<WeightEntry>,
    },
    /// Assign a collector to a pending request.
    AssignCollector {
        /// The collector to assign.
        collector_id: i64,
    },
    /// Replace the collector of an assigned request.
    ReassignCollector {
        /// The new collector.
        collector_id: i64,
    },
    /// Mark an assigned request as completed.
    CompleteRequest,
    /// Cancel a pending or assigned request.
    CancelRequest,
    /// Remove a completed request.
    DeleteRequest,
    /// Record that the resident has paid for a request.
    ConfirmPayment {
        /// External payment reference, kept in the audit trail only.
        payment_reference: Option<String>,
    },
    /// Record waste actually collected from a resident.
    RecordCollection {
        /// The collecting collector.
        collector_id: i64,
        /// The resident the waste was collected from.
        resident_id: i64,
        /// Collected weights, in recording order.
        entries: Vec<WeightEntry>,
    },
    /// Generate (or regenerate) a resident's invoice for a period.
    GenerateInvoice {
        /// The billed resident.
        resident_id: i64,
        /// The billing period.
        period: InvoicePeriod,
    },
}

impl Command {
    /// Returns the action name recorded in audit events.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RegisterMember { .. } => "RegisterMember",
            Self::CreateRequest { .. } => "CreateRequest",
            Self::AssignCollector { .. } => "AssignCollector",
            Self::ReassignCollector { .. } => "ReassignCollector",
            Self::CompleteRequest => "CompleteRequest",
            Self::CancelRequest => "CancelRequest",
            Self::DeleteRequest => "DeleteRequest",
            Self::ConfirmPayment { .. } => "ConfirmPayment",
            Self::RecordCollection { .. } => "RecordCollection",
            Self::GenerateInvoice { .. } => "GenerateInvoice",
        }
    }
}
