// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use waste_billing_audit::AuditEvent;
use waste_billing_domain::{
    CollectionRecord, CompletionPolicy, DomainError, Invoice, Member, RateTable, Role,
    WasteRequest,
};

/// Everything a transition needs to know besides the entity it changes.
///
/// The member list only has to contain the members a command refers to;
/// callers typically load them by id before applying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingContext {
    /// Rates used to price newly submitted or collected items.
    pub rate_table: RateTable,
    /// Whether completion requires a confirmed payment.
    pub completion_policy: CompletionPolicy,
    /// Known members.
    pub members: Vec<Member>,
}

impl BillingContext {
    /// Creates a new context.
    ///
    /// # Arguments
    ///
    /// * `rate_table` - The active rate table
    /// * `completion_policy` - The completion policy
    /// * `members` - Members referenced by the commands to apply
    #[must_use]
    pub const fn new(
        rate_table: RateTable,
        completion_policy: CompletionPolicy,
        members: Vec<Member>,
    ) -> Self {
        Self {
            rate_table,
            completion_policy,
            members,
        }
    }

    /// Finds a member by id.
    #[must_use]
    pub fn find_member(&self, member_id: i64) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.member_id == Some(member_id))
    }

    /// Checks if a member exists with the given role.
    #[must_use]
    pub fn has_member_with_role(&self, member_id: i64, role: Role) -> bool {
        self.find_member(member_id)
            .is_some_and(|member| member.role == role)
    }

    /// Ensures the id refers to a collector.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CollectorNotFound` otherwise.
    pub fn require_collector(&self, collector_id: i64) -> Result<(), DomainError> {
        if self.has_member_with_role(collector_id, Role::Collector) {
            Ok(())
        } else {
            Err(DomainError::CollectorNotFound(collector_id))
        }
    }

    /// Ensures the id refers to a resident.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ResidentNotFound` otherwise.
    pub fn require_resident(&self, resident_id: i64) -> Result<(), DomainError> {
        if self.has_member_with_role(resident_id, Role::Resident) {
            Ok(())
        } else {
            Err(DomainError::ResidentNotFound(resident_id))
        }
    }
}

/// How a transition changed a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestChange {
    /// A new request, not yet persisted.
    Created(WasteRequest),
    /// An existing request moved to a new state.
    Updated {
        previous: WasteRequest,
        current: WasteRequest,
    },
    /// The request is to be removed.
    Deleted(WasteRequest),
}

impl RequestChange {
    /// Returns the request as it exists after the change, if it still exists.
    #[must_use]
    pub const fn current(&self) -> Option<&WasteRequest> {
        match self {
            Self::Created(request) | Self::Updated { current: request, .. } => Some(request),
            Self::Deleted(_) => None,
        }
    }

    /// Returns the request as it existed before the change, if it existed.
    #[must_use]
    pub const fn previous(&self) -> Option<&WasteRequest> {
        match self {
            Self::Created(_) => None,
            Self::Updated { previous: request, .. } | Self::Deleted(request) => Some(request),
        }
    }
}

/// The result of applying a request command.
///
/// Contains the change and the audit event that records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    pub change: RequestChange,
    pub audit_event: AuditEvent,
}

/// The result of registering a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberResult {
    pub member: Member,
    pub audit_event: AuditEvent,
}

/// The result of recording a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult {
    pub record: CollectionRecord,
    pub audit_event: AuditEvent,
}

/// The result of generating an invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceResult {
    pub invoice: Invoice,
    pub audit_event: AuditEvent,
}
