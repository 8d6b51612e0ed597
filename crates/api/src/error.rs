// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tracing::error;
use waste_billing::CoreError;
use waste_billing_domain::DomainError;
use waste_billing_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// Who may perform the action.
        required_role: String,
    },
    /// A domain rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request status does not permit the action.
    InvalidTransition {
        /// A human-readable description of the rejected transition.
        message: String,
    },
    /// The request changed since it was read.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Stable machine-readable error kind.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Unauthorized { .. } => "unauthorized",
            Self::DomainRuleViolation { rule, .. } => rule,
            Self::InvalidInput { .. } => "invalid_input",
            Self::ResourceNotFound { .. } => "not_found",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::Conflict { .. } => "conflict",
            Self::Internal { .. } => "internal",
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::InvalidTransition { message } => write!(f, "Invalid transition: {message}"),
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn rule_violation(rule: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

fn not_found(resource_type: &str, err: &DomainError) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: resource_type.to_string(),
        message: err.to_string(),
    }
}

fn invalid_input(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InvalidTransition { .. } => ApiError::InvalidTransition {
            message: err.to_string(),
        },
        DomainError::UnknownCategory { .. } => rule_violation("unknown_category", &err),
        DomainError::InvalidWeight { .. } => rule_violation("invalid_weight", &err),
        DomainError::InvalidRate { .. } => rule_violation("invalid_rate", &err),
        DomainError::EmptyItems => rule_violation("empty_items", &err),
        DomainError::NoPositiveWeight => rule_violation("no_positive_weight", &err),
        DomainError::TooManyItems { .. } => rule_violation("too_many_items", &err),
        DomainError::AmountOverflow { .. } => rule_violation("amount_overflow", &err),
        DomainError::InvalidPeriod { .. } => rule_violation("invalid_period", &err),
        DomainError::PaymentRequired { .. } => rule_violation("payment_required", &err),
        DomainError::PaymentAlreadyConfirmed { .. } => {
            rule_violation("payment_already_confirmed", &err)
        }
        DomainError::PaymentNotAccepted { .. } => rule_violation("payment_not_accepted", &err),
        DomainError::RequestNotFound(_) => not_found("Request", &err),
        DomainError::MemberNotFound(_) => not_found("Member", &err),
        DomainError::CollectorNotFound(_) => not_found("Collector", &err),
        DomainError::ResidentNotFound(_) => not_found("Resident", &err),
        DomainError::InvalidRequestStatus { .. } => invalid_input("status", &err),
        DomainError::InvalidPaymentStatus { .. } => invalid_input("payment_status", &err),
        DomainError::InvalidCompletionPolicy { .. } => invalid_input("completion_policy", &err),
        DomainError::InvalidRole { .. } => invalid_input("role", &err),
        DomainError::InvalidName(_) => invalid_input("display_name", &err),
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::CommandNotApplicable { .. } | CoreError::SnapshotFailed(_) => {
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}

/// Translates a persistence error into an API error.
///
/// Lookups that miss become `ResourceNotFound`, a stale request version
/// becomes `Conflict`, and everything else is an internal error whose
/// message is passed through unchanged.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::RequestNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Request"),
            message: err.to_string(),
        },
        PersistenceError::MemberNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Member"),
            message: err.to_string(),
        },
        PersistenceError::InvoiceNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Invoice"),
            message: err.to_string(),
        },
        PersistenceError::EventNotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Audit event"),
            message: err.to_string(),
        },
        PersistenceError::NotFound(ref msg) => ApiError::ResourceNotFound {
            resource_type: String::from("Resource"),
            message: msg.clone(),
        },
        PersistenceError::ConcurrentModification { .. } => ApiError::Conflict {
            message: err.to_string(),
        },
        _ => {
            error!(error = %err, "Persistence failure");
            ApiError::Internal {
                message: err.to_string(),
            }
        }
    }
}
