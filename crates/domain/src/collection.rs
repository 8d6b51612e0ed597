// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::category::WasteCategory;
use crate::error::DomainError;
use crate::validation::validate_collection_items;
use crate::valuation::WasteItem;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// An immutable record of waste collected from a resident.
///
/// Collection records are append-only and are the billing source for
/// invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionRecord {
    /// Database identifier. `None` until persisted.
    pub record_id: Option<i64>,
    pub collector_id: i64,
    pub resident_id: i64,
    pub items: Vec<WasteItem>,
    #[serde(with = "time::serde::rfc3339")]
    pub collected_at: OffsetDateTime,
}

impl CollectionRecord {
    /// Creates a new collection record.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no items or any item has zero weight.
    pub fn new(
        collector_id: i64,
        resident_id: i64,
        items: Vec<WasteItem>,
        collected_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        validate_collection_items(&items)?;
        Ok(Self {
            record_id: None,
            collector_id,
            resident_id,
            items,
            collected_at,
        })
    }

    /// Sum of all collected weights.
    ///
    /// Bounded by [`MAX_WEIGHT_KG`](crate::MAX_WEIGHT_KG) and [`MAX_ITEMS`](crate::MAX_ITEMS).
    #[must_use]
    pub fn total_weight_kg(&self) -> Decimal {
        self.items.iter().map(WasteItem::weight_kg).sum()
    }

    /// Sum of all line totals.
    ///
    /// Bounded by [`MAX_WEIGHT_KG`](crate::MAX_WEIGHT_KG),
    /// [`MAX_RATE_PER_KG`](crate::MAX_RATE_PER_KG) and [`MAX_ITEMS`](crate::MAX_ITEMS).
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(WasteItem::line_total).sum()
    }

    /// Returns true if any line is of the given category.
    #[must_use]
    pub fn contains_category(&self, category: WasteCategory) -> bool {
        self.items.iter().any(|item| item.category() == category)
    }
}
