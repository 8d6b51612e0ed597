// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::payment::PaymentStatus;
use crate::request_status::RequestStatus;
use crate::validation::validate_request_items;
use crate::valuation::WasteItem;
use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

/// Version assigned to a request when it is first stored.
pub const INITIAL_VERSION: i64 = 1;

/// A resident's request for a waste pickup.
///
/// `total_price` is never stored on the request; it is always the sum of
/// the line totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteRequest {
    /// Database identifier. `None` until persisted.
    pub request_id: Option<i64>,
    pub resident_id: i64,
    pub items: Vec<WasteItem>,
    pub status: RequestStatus,
    pub assigned_collector_id: Option<i64>,
    pub payment_status: PaymentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    /// Incremented by every successful mutation; guards concurrent updates.
    pub version: i64,
}

impl WasteRequest {
    /// Creates a new pending, unpaid request.
    ///
    /// # Arguments
    ///
    /// * `resident_id` - The requesting resident
    /// * `items` - Priced line items, in submission order
    /// * `created_at` - Creation timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the items are empty or none has positive weight.
    pub fn new(
        resident_id: i64,
        items: Vec<WasteItem>,
        created_at: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        validate_request_items(&items)?;
        Ok(Self {
            request_id: None,
            resident_id,
            items,
            status: RequestStatus::Pending,
            assigned_collector_id: None,
            payment_status: PaymentStatus::Pending,
            created_at,
            completed_at: None,
            version: INITIAL_VERSION,
        })
    }

    /// Sum of all line totals.
    ///
    /// Bounded by [`MAX_WEIGHT_KG`](crate::MAX_WEIGHT_KG),
    /// [`MAX_RATE_PER_KG`](crate::MAX_RATE_PER_KG) and [`MAX_ITEMS`](crate::MAX_ITEMS).
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(WasteItem::line_total).sum()
    }

    /// Sum of all line weights.
    #[must_use]
    pub fn total_weight_kg(&self) -> Decimal {
        self.items.iter().map(WasteItem::weight_kg).sum()
    }

    /// Returns the request identifier, or an error if not yet persisted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RequestNotFound` with id 0 for unsaved requests.
    pub fn id(&self) -> Result<i64, DomainError> {
        self.request_id.ok_or(DomainError::RequestNotFound(0))
    }
}
