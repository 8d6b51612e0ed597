// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Invoice aggregation.
//!
//! An invoice groups every collected line item of one resident within a
//! half-open period `[start, end)` by category. Aggregation is a pure
//! function of the records, so regenerating an invoice over unchanged
//! records yields identical lines and totals.

use crate::category::WasteCategory;
use crate::collection::CollectionRecord;
use crate::error::DomainError;
use crate::valuation::checked_add_amount;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use time::OffsetDateTime;

/// A half-open billing period `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoicePeriod {
    #[serde(with = "time::serde::rfc3339")]
    start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    end: OffsetDateTime,
}

impl InvoicePeriod {
    /// Creates a billing period.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPeriod` unless `start < end` and both
    /// bounds fall on whole seconds.
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Result<Self, DomainError> {
        // Stored timestamps have whole-second precision
        if start.nanosecond() != 0 || end.nanosecond() != 0 {
            return Err(DomainError::InvalidPeriod {
                start,
                end,
                reason: String::from("bounds must be whole seconds"),
            });
        }
        if start >= end {
            return Err(DomainError::InvalidPeriod {
                start,
                end,
                reason: String::from("start must be before end"),
            });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> OffsetDateTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> OffsetDateTime {
        self.end
    }

    /// Returns true if `timestamp` falls within `[start, end)`.
    #[must_use]
    pub fn contains(&self, timestamp: OffsetDateTime) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Per-category totals on an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLine {
    pub category: WasteCategory,
    pub total_weight_kg: Decimal,
    /// Rate snapshot of the latest collection in the period.
    pub rate_per_kg: Decimal,
    /// Sum of the line totals, each at its own snapshotted rate.
    pub amount: Decimal,
}

/// A resident's invoice for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invoice {
    /// Database identifier. `None` until persisted.
    pub invoice_id: Option<i64>,
    pub resident_id: i64,
    pub period: InvoicePeriod,
    pub waste_details: BTreeMap<WasteCategory, InvoiceLine>,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

impl Invoice {
    /// Sum of all category amounts.
    ///
    /// [`aggregate_invoice`] has already checked that this sum fits.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.waste_details.values().map(|line| line.amount).sum()
    }

    /// Returns true if nothing was collected in the period.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waste_details.is_empty()
    }
}

/// Aggregates collection records into an invoice.
///
/// Records belonging to other residents or falling outside the period are
/// ignored. Records are visited in `(collected_at, record_id)` order so the
/// displayed rate for each category is the one from the latest record
/// regardless of input order. No records yields an empty invoice with a
/// zero total.
///
/// # Arguments
///
/// * `resident_id` - The billed resident
/// * `period` - The billing period
/// * `records` - Candidate collection records
/// * `generated_at` - Generation timestamp
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if a category or grand total is
/// not representable.
pub fn aggregate_invoice(
    resident_id: i64,
    period: InvoicePeriod,
    records: &[CollectionRecord],
    generated_at: OffsetDateTime,
) -> Result<Invoice, DomainError> {
    let mut in_period: Vec<&CollectionRecord> = records
        .iter()
        .filter(|record| record.resident_id == resident_id)
        .filter(|record| period.contains(record.collected_at))
        .collect();
    in_period.sort_by_key(|record| (record.collected_at, record.record_id));

    let mut waste_details: BTreeMap<WasteCategory, InvoiceLine> = BTreeMap::new();
    for item in in_period.iter().flat_map(|record| record.items.iter()) {
        let line: &mut InvoiceLine =
            waste_details
                .entry(item.category())
                .or_insert_with(|| InvoiceLine {
                    category: item.category(),
                    total_weight_kg: Decimal::ZERO,
                    rate_per_kg: item.rate_per_kg(),
                    amount: Decimal::ZERO,
                });
        line.total_weight_kg = checked_add_amount(
            line.total_weight_kg,
            item.weight_kg(),
            "summing invoiced weight",
        )?;
        line.amount =
            checked_add_amount(line.amount, item.line_total(), "summing invoiced amount")?;
        line.rate_per_kg = item.rate_per_kg();
    }

    waste_details.values().try_fold(Decimal::ZERO, |total, line| {
        checked_add_amount(total, line.amount, "totalling the invoice")
    })?;

    Ok(Invoice {
        invoice_id: None,
        resident_id,
        period,
        waste_details,
        generated_at,
    })
}
