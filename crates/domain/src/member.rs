// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The role a member plays in the collection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Requests pickups and receives invoices
    Resident,
    /// Performs pickups and records collected weights
    Collector,
    /// Assigns collectors and manages data
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Collector => "collector",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "resident" => Ok(Self::Resident),
            "collector" => Ok(Self::Collector),
            "admin" => Ok(Self::Admin),
            _ => Err(DomainError::InvalidRole {
                role: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A registered participant of the collection service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Database identifier. `None` until persisted.
    pub member_id: Option<i64>,
    pub display_name: String,
    pub role: Role,
}

impl Member {
    /// Creates a new, not yet persisted member.
    #[must_use]
    pub const fn new(display_name: String, role: Role) -> Self {
        Self {
            member_id: None,
            display_name,
            role,
        }
    }

    /// Creates a member with a known identifier.
    #[must_use]
    pub const fn with_id(member_id: i64, display_name: String, role: Role) -> Self {
        Self {
            member_id: Some(member_id),
            display_name,
            role,
        }
    }
}
