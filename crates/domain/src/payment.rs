// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment status and the completion policy that may depend on it.
//!
//! Payment itself happens outside the engine. The engine only consumes a
//! "payment confirmed" signal and records it on the request.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Whether the external payment for a request has been confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

impl PaymentStatus {
    /// Returns the string representation of the payment status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            _ => Err(DomainError::InvalidPaymentStatus {
                status: s.to_string(),
            }),
        }
    }
}

/// Whether completing a request requires confirmed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPolicy {
    /// Requests may be completed regardless of payment
    #[default]
    AllowUnpaid,
    /// Requests may be completed only once paid
    RequirePayment,
}

impl CompletionPolicy {
    /// Returns the string representation of the policy.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllowUnpaid => "allow_unpaid",
            Self::RequirePayment => "require_payment",
        }
    }

    /// Checks whether a request with the given payment status may be completed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::PaymentRequired` if the policy demands payment
    /// and the request is unpaid.
    pub fn check_completion(
        &self,
        request_id: i64,
        payment_status: PaymentStatus,
    ) -> Result<(), DomainError> {
        match (self, payment_status) {
            (Self::RequirePayment, PaymentStatus::Pending) => {
                Err(DomainError::PaymentRequired { request_id })
            }
            _ => Ok(()),
        }
    }
}

impl FromStr for CompletionPolicy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "allow_unpaid" => Ok(Self::AllowUnpaid),
            "require_payment" => Ok(Self::RequirePayment),
            _ => Err(DomainError::InvalidCompletionPolicy {
                policy: s.to_string(),
            }),
        }
    }
}
