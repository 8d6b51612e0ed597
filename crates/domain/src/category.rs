// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Waste categories accepted for collection and billing.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A category of collected waste.
///
/// Every category is priced per kilogram through the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WasteCategory {
    Food,
    Cardboard,
    Polythene,
    Plastic,
    Glass,
    Metal,
    Paper,
    Organic,
}

impl WasteCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 8] = [
        Self::Food,
        Self::Cardboard,
        Self::Polythene,
        Self::Plastic,
        Self::Glass,
        Self::Metal,
        Self::Paper,
        Self::Organic,
    ];

    /// Returns the string representation of the category.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "food",
            Self::Cardboard => "cardboard",
            Self::Polythene => "polythene",
            Self::Plastic => "plastic",
            Self::Glass => "glass",
            Self::Metal => "metal",
            Self::Paper => "paper",
            Self::Organic => "organic",
        }
    }

    /// Parses a category from its string representation.
    ///
    /// Matching ignores surrounding whitespace and ASCII case.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownCategory` if the string names no category.
    fn parse_str(s: &str) -> Result<Self, DomainError> {
        let normalized: String = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownCategory {
                category: s.to_string(),
            })
    }
}

impl FromStr for WasteCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
