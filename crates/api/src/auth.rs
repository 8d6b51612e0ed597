// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is supplied by the caller as a member ID. The member directory
//! is the source of truth for the role; callers cannot claim one.

use tracing::warn;
use waste_billing_audit::Actor;
use waste_billing_domain::{Member, Role, WasteRequest};
use waste_billing_persistence::{Persistence, PersistenceError};

use crate::error::AuthError;

/// An authenticated member with the role recorded in the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The member ID of this actor.
    pub member_id: i64,
    /// The role assigned to this member.
    pub role: Role,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor.
    ///
    /// # Arguments
    ///
    /// * `member_id` - The member ID of this actor
    /// * `role` - The role assigned to this actor
    #[must_use]
    pub const fn new(member_id: i64, role: Role) -> Self {
        Self { member_id, role }
    }

    /// Converts this authenticated actor into an audit Actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.member_id.to_string(), self.role.as_str().to_string())
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

/// Authorization service for role and ownership checks.
///
/// Administrators may perform every operation. Residents act on their own
/// requests and invoices; collectors act on requests assigned to them.
pub struct AuthorizationService;

impl AuthorizationService {
    fn deny(action: &str, required_role: &str) -> AuthError {
        AuthError::Unauthorized {
            action: action.to_string(),
            required_role: required_role.to_string(),
        }
    }

    fn require_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(Self::deny(action, "admin role"))
        }
    }

    const fn is_owner(actor: &AuthenticatedActor, request: &WasteRequest) -> bool {
        matches!(actor.role, Role::Resident) && request.resident_id == actor.member_id
    }

    fn is_assignee(actor: &AuthenticatedActor, request: &WasteRequest) -> bool {
        actor.role == Role::Collector && request.assigned_collector_id == Some(actor.member_id)
    }

    /// Only administrators may register members.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_register_member(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "register_member")
    }

    /// Only administrators may browse the member directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_list_members(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "list_members")
    }

    /// Residents create requests for themselves; administrators for anyone.
    ///
    /// # Errors
    ///
    /// Returns an error if a resident files for someone else or the actor
    /// is a collector.
    pub fn authorize_create_request(
        actor: &AuthenticatedActor,
        resident_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Resident if actor.member_id == resident_id => Ok(()),
            Role::Resident | Role::Collector => {
                Err(Self::deny("create_request", "the requesting resident"))
            }
        }
    }

    /// Only administrators may assign or reassign collectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_assign(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "assign_collector")
    }

    /// Collectors complete the requests assigned to them.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an administrator or the
    /// assigned collector.
    pub fn authorize_complete(
        actor: &AuthenticatedActor,
        request: &WasteRequest,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || Self::is_assignee(actor, request) {
            Ok(())
        } else {
            Err(Self::deny("complete_request", "the assigned collector"))
        }
    }

    /// Residents cancel their own requests.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an administrator or the owner.
    pub fn authorize_cancel(
        actor: &AuthenticatedActor,
        request: &WasteRequest,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || Self::is_owner(actor, request) {
            Ok(())
        } else {
            Err(Self::deny("cancel_request", "the requesting resident"))
        }
    }

    /// Only administrators may delete requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_delete(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "delete_request")
    }

    /// Payment is confirmed by the paying resident or an administrator.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an administrator or the owner.
    pub fn authorize_confirm_payment(
        actor: &AuthenticatedActor,
        request: &WasteRequest,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || Self::is_owner(actor, request) {
            Ok(())
        } else {
            Err(Self::deny("confirm_payment", "the requesting resident"))
        }
    }

    /// A request is visible to its resident, its collector and administrators.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor has no relation to the request.
    pub fn authorize_view_request(
        actor: &AuthenticatedActor,
        request: &WasteRequest,
    ) -> Result<(), AuthError> {
        if actor.is_admin() || Self::is_owner(actor, request) || Self::is_assignee(actor, request)
        {
            Ok(())
        } else {
            Err(Self::deny("view_request", "a party to the request"))
        }
    }

    /// Collectors record their own collections; administrators record for
    /// any collector.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is a resident or records as another
    /// collector.
    pub fn authorize_record_collection(
        actor: &AuthenticatedActor,
        collector_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Collector if actor.member_id == collector_id => Ok(()),
            Role::Collector | Role::Resident => {
                Err(Self::deny("record_collection", "the collecting collector"))
            }
        }
    }

    /// Residents generate and read their own invoices.
    ///
    /// # Errors
    ///
    /// Returns an error unless the actor is an administrator or the billed
    /// resident.
    pub fn authorize_invoice_access(
        actor: &AuthenticatedActor,
        resident_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Resident if actor.member_id == resident_id => Ok(()),
            Role::Resident | Role::Collector => {
                Err(Self::deny("invoice_access", "the billed resident"))
            }
        }
    }

    /// Only administrators may read analytics.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_analytics(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "analytics")
    }

    /// Only administrators may read the audit trail.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an administrator.
    pub fn authorize_audit(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        Self::require_admin(actor, "audit")
    }
}

/// Resolves caller identities against the member directory.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Authenticates a member by ID.
    ///
    /// # Arguments
    ///
    /// * `persistence` - The persistence layer
    /// * `member_id` - The claimed member ID
    ///
    /// # Errors
    ///
    /// Returns an error if the member is not registered or the lookup fails.
    pub fn authenticate(
        persistence: &mut Persistence,
        member_id: i64,
    ) -> Result<AuthenticatedActor, AuthError> {
        let member: Member = persistence
            .get_member(member_id)
            .map_err(Self::map_persistence_error)?;

        Ok(AuthenticatedActor::new(member_id, member.role))
    }

    /// Authenticates a raw identity header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a member ID or the member is
    /// not registered.
    pub fn authenticate_header(
        persistence: &mut Persistence,
        raw: &str,
    ) -> Result<AuthenticatedActor, AuthError> {
        let member_id: i64 = raw.trim().parse().map_err(|_| {
            warn!(actor = raw, "Rejected malformed actor id");
            AuthError::AuthenticationFailed {
                reason: format!("Invalid actor id '{raw}'"),
            }
        })?;
        Self::authenticate(persistence, member_id)
    }

    /// Maps persistence errors to authentication errors.
    fn map_persistence_error(err: PersistenceError) -> AuthError {
        match err {
            PersistenceError::MemberNotFound(member_id) => {
                warn!(member_id, "Rejected unknown actor");
                AuthError::AuthenticationFailed {
                    reason: format!("Unknown member {member_id}"),
                }
            }
            _ => AuthError::AuthenticationFailed {
                reason: format!("Database error: {err}"),
            },
        }
    }
}
