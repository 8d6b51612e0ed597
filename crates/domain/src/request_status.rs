// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request status tracking and transition logic.
//!
//! A request moves `pending → assigned → completed`, and may be cancelled
//! while `pending` or `assigned`. Only the named actions below change
//! status; nothing advances a request on its own.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a waste collection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted by the resident, waiting for a collector
    Pending,
    /// A collector has been assigned
    Assigned,
    /// The pickup has been carried out
    Completed,
    /// Withdrawn before completion
    Cancelled,
}

/// A lifecycle action that may change request status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestAction {
    Assign,
    Reassign,
    Complete,
    Cancel,
    Delete,
}

impl RequestAction {
    /// Returns the verb used in messages and audit records.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Assign => "assign",
            Self::Reassign => "reassign",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Delete => "delete",
        }
    }

    /// Describes the status the action requires.
    const fn precondition(self) -> &'static str {
        match self {
            Self::Assign => "only pending requests can be assigned",
            Self::Reassign => "only assigned requests can be reassigned",
            Self::Complete => "only assigned requests can be completed",
            Self::Cancel => "only pending or assigned requests can be cancelled",
            Self::Delete => "only completed requests can be deleted",
        }
    }
}

impl RequestStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::Assigned,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status from its string representation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRequestStatus` if the string is not a valid status.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "pending" => Ok(Self::Pending),
            "assigned" => Ok(Self::Assigned),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidRequestStatus {
                status: s.to_string(),
            }),
        }
    }

    /// Returns true if no further status change is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns the status reached by applying `action`, if the action is
    /// permitted from this status.
    ///
    /// `Delete` is permitted only from `Completed` and yields `Completed`;
    /// the caller removes the request.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTransition` if the action is not allowed.
    pub fn next_status(&self, action: RequestAction) -> Result<Self, DomainError> {
        let next: Option<Self> = match (self, action) {
            (Self::Pending, RequestAction::Assign)
            | (Self::Assigned, RequestAction::Reassign) => Some(Self::Assigned),
            (Self::Assigned, RequestAction::Complete)
            | (Self::Completed, RequestAction::Delete) => Some(Self::Completed),
            (Self::Pending | Self::Assigned, RequestAction::Cancel) => Some(Self::Cancelled),
            _ => None,
        };

        next.ok_or_else(|| DomainError::InvalidTransition {
            from: self.as_str().to_string(),
            action: action.as_str().to_string(),
            reason: action.precondition().to_string(),
        })
    }
}

impl FromStr for RequestStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
