// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A lifecycle action is not permitted from the current request status.
    InvalidTransition {
        /// The status the request is currently in.
        from: String,
        /// The action that was attempted.
        action: String,
        /// Why the action is rejected.
        reason: String,
    },
    /// The waste category is not known or has no rate configured.
    UnknownCategory {
        /// The category as supplied.
        category: String,
    },
    /// A weight is negative, non-finite or not a number.
    InvalidWeight {
        /// The offending value as supplied.
        value: String,
        /// Description of the validation error.
        reason: String,
    },
    /// A configured rate is negative or too large.
    InvalidRate {
        /// The category the rate belongs to.
        category: String,
        /// The offending rate.
        rate: String,
        /// Why the rate is rejected.
        reason: String,
    },
    /// A request or collection was submitted with no line items.
    EmptyItems,
    /// Every line item of a request has zero weight.
    NoPositiveWeight,
    /// A request or collection has more line items than allowed.
    TooManyItems {
        /// Number of items submitted.
        count: usize,
        /// The maximum allowed.
        max: usize,
    },
    /// A monetary or weight calculation exceeded the representable range.
    AmountOverflow {
        /// Description of the calculation that overflowed.
        operation: String,
    },
    /// An invoice period is empty, reversed or not on whole seconds.
    InvalidPeriod {
        /// The period start.
        start: OffsetDateTime,
        /// The period end.
        end: OffsetDateTime,
        /// Why the period is rejected.
        reason: String,
    },
    /// Request does not exist.
    RequestNotFound(i64),
    /// Member does not exist.
    MemberNotFound(i64),
    /// The referenced member is not a collector.
    CollectorNotFound(i64),
    /// The referenced member is not a resident.
    ResidentNotFound(i64),
    /// Completion requires confirmed payment under the active policy.
    PaymentRequired {
        /// The request that is still unpaid.
        request_id: i64,
    },
    /// Payment has already been confirmed for this request.
    PaymentAlreadyConfirmed {
        /// The request that is already paid.
        request_id: i64,
    },
    /// Payment cannot be confirmed for a request in this status.
    PaymentNotAccepted {
        /// The request.
        request_id: i64,
        /// The status the request is in.
        status: String,
    },
    /// Request status string could not be parsed.
    InvalidRequestStatus {
        /// The invalid status string.
        status: String,
    },
    /// Payment status string could not be parsed.
    InvalidPaymentStatus {
        /// The invalid status string.
        status: String,
    },
    /// Completion policy string could not be parsed.
    InvalidCompletionPolicy {
        /// The invalid policy string.
        policy: String,
    },
    /// Role string could not be parsed.
    InvalidRole {
        /// The invalid role string.
        role: String,
    },
    /// Member display name is empty or invalid.
    InvalidName(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition {
                from,
                action,
                reason,
            } => {
                write!(
                    f,
                    "Cannot {action} a request in status '{from}': {reason}"
                )
            }
            Self::UnknownCategory { category } => {
                write!(f, "Unknown waste category '{category}'")
            }
            Self::InvalidWeight { value, reason } => {
                write!(f, "Invalid weight '{value}': {reason}")
            }
            Self::InvalidRate {
                category,
                rate,
                reason,
            } => {
                write!(f, "Invalid rate {rate} for category '{category}': {reason}")
            }
            Self::EmptyItems => write!(f, "At least one waste item is required"),
            Self::NoPositiveWeight => {
                write!(f, "At least one waste item must have a weight above zero")
            }
            Self::TooManyItems { count, max } => {
                write!(f, "Too many waste items: {count} submitted, at most {max} allowed")
            }
            Self::AmountOverflow { operation } => {
                write!(f, "Amount overflow while {operation}")
            }
            Self::InvalidPeriod { start, end, reason } => {
                write!(f, "Invalid invoice period {start} to {end}: {reason}")
            }
            Self::RequestNotFound(id) => write!(f, "Request {id} not found"),
            Self::MemberNotFound(id) => write!(f, "Member {id} not found"),
            Self::CollectorNotFound(id) => write!(f, "Collector {id} not found"),
            Self::ResidentNotFound(id) => write!(f, "Resident {id} not found"),
            Self::PaymentRequired { request_id } => {
                write!(
                    f,
                    "Request {request_id} cannot be completed before payment is confirmed"
                )
            }
            Self::PaymentAlreadyConfirmed { request_id } => {
                write!(f, "Payment for request {request_id} is already confirmed")
            }
            Self::PaymentNotAccepted { request_id, status } => {
                write!(
                    f,
                    "Payment cannot be confirmed for request {request_id} in status '{status}'"
                )
            }
            Self::InvalidRequestStatus { status } => {
                write!(f, "Invalid request status: {status}")
            }
            Self::InvalidPaymentStatus { status } => {
                write!(f, "Invalid payment status: {status}")
            }
            Self::InvalidCompletionPolicy { policy } => {
                write!(f, "Invalid completion policy: {policy}")
            }
            Self::InvalidRole { role } => write!(f, "Invalid role: {role}"),
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
