// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Waste item valuation.
//!
//! Pricing is pure: `line_total = weight_kg * rate(category)`. Amounts
//! keep full decimal precision everywhere in the engine and are rounded
//! only when presented, via [`round_for_display`].
//!
//! Weights are capped at [`MAX_WEIGHT_KG`] per line and rates at
//! [`MAX_RATE_PER_KG`](crate::MAX_RATE_PER_KG), so a line total never exceeds 10^12. With at most
//! [`MAX_ITEMS`](crate::MAX_ITEMS) lines per request or record, per-entity totals stay far
//! inside the `Decimal` range. Sums across records go through
//! [`checked_add_amount`].

use crate::category::WasteCategory;
use crate::error::DomainError;
use crate::rate_table::RateTable;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::str::FromStr;

/// Number of decimal places shown for monetary amounts.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Heaviest weight accepted on a single line, in kilograms.
pub const MAX_WEIGHT_KG: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// A category and weight as submitted, before pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightEntry {
    pub category: WasteCategory,
    pub weight_kg: Decimal,
}

impl WeightEntry {
    /// Creates a new weight entry.
    #[must_use]
    pub const fn new(category: WasteCategory, weight_kg: Decimal) -> Self {
        Self {
            category,
            weight_kg,
        }
    }
}

/// A priced line item.
///
/// The rate is snapshotted when the item is priced so later tariff changes
/// never alter an existing request or collection. The line total is always
/// derived from weight and rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteItem {
    category: WasteCategory,
    weight_kg: Decimal,
    rate_per_kg: Decimal,
}

impl WasteItem {
    /// Prices a weight of waste against the rate table.
    ///
    /// # Arguments
    ///
    /// * `table` - The rate table to snapshot the rate from
    /// * `category` - The waste category
    /// * `weight_kg` - The weight in kilograms
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The weight is negative
    /// - The category has no configured rate
    /// - The line total overflows
    pub fn priced(
        table: &RateTable,
        category: WasteCategory,
        weight_kg: Decimal,
    ) -> Result<Self, DomainError> {
        validate_weight(weight_kg)?;
        let rate_per_kg: Decimal = table.rate(category)?;
        Self::from_snapshot(category, weight_kg, rate_per_kg)
    }

    /// Rebuilds an item from a stored weight and rate snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight or rate is out of range, or the line
    /// total overflows.
    pub fn from_snapshot(
        category: WasteCategory,
        weight_kg: Decimal,
        rate_per_kg: Decimal,
    ) -> Result<Self, DomainError> {
        validate_weight(weight_kg)?;
        crate::rate_table::validate_rate(category, rate_per_kg)?;
        if weight_kg.checked_mul(rate_per_kg).is_none() {
            return Err(DomainError::AmountOverflow {
                operation: format!("pricing {weight_kg} kg of {category}"),
            });
        }
        Ok(Self {
            category,
            weight_kg,
            rate_per_kg,
        })
    }

    #[must_use]
    pub const fn category(&self) -> WasteCategory {
        self.category
    }

    #[must_use]
    pub const fn weight_kg(&self) -> Decimal {
        self.weight_kg
    }

    #[must_use]
    pub const fn rate_per_kg(&self) -> Decimal {
        self.rate_per_kg
    }

    /// Returns `weight_kg * rate_per_kg` at full precision.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.weight_kg * self.rate_per_kg
    }
}

/// Computes the price of a weight of waste.
///
/// # Errors
///
/// Returns `InvalidWeight` for negative weights, `UnknownCategory` when the
/// table has no rate for the category, and `AmountOverflow` if the product
/// is not representable.
pub fn price(
    table: &RateTable,
    category: WasteCategory,
    weight_kg: Decimal,
) -> Result<Decimal, DomainError> {
    WasteItem::priced(table, category, weight_kg).map(|item| item.line_total())
}

/// Prices every entry, preserving order.
///
/// # Errors
///
/// Returns the first pricing error encountered.
pub fn price_entries(
    table: &RateTable,
    entries: &[WeightEntry],
) -> Result<Vec<WasteItem>, DomainError> {
    entries
        .iter()
        .map(|entry| WasteItem::priced(table, entry.category, entry.weight_kg))
        .collect()
}

/// Rejects negative weights and weights above [`MAX_WEIGHT_KG`].
///
/// # Errors
///
/// Returns `DomainError::InvalidWeight` if the weight is out of range.
pub fn validate_weight(weight_kg: Decimal) -> Result<(), DomainError> {
    if weight_kg < Decimal::ZERO {
        return Err(DomainError::InvalidWeight {
            value: weight_kg.to_string(),
            reason: String::from("weight cannot be negative"),
        });
    }
    if weight_kg > MAX_WEIGHT_KG {
        return Err(DomainError::InvalidWeight {
            value: weight_kg.to_string(),
            reason: format!("weight cannot exceed {MAX_WEIGHT_KG} kg"),
        });
    }
    Ok(())
}

/// Adds two amounts, reporting overflow instead of panicking.
///
/// # Arguments
///
/// * `total` - The running total
/// * `amount` - The amount to add
/// * `operation` - What is being summed, for the error message
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if the sum is not representable.
pub fn checked_add_amount(
    total: Decimal,
    amount: Decimal,
    operation: &str,
) -> Result<Decimal, DomainError> {
    total
        .checked_add(amount)
        .ok_or_else(|| DomainError::AmountOverflow {
            operation: operation.to_string(),
        })
}

/// Parses a textual weight.
///
/// # Errors
///
/// Returns `DomainError::InvalidWeight` if the text is not a decimal number
/// or is negative.
pub fn parse_weight(raw: &str) -> Result<Decimal, DomainError> {
    let weight_kg: Decimal =
        Decimal::from_str(raw.trim()).map_err(|e| DomainError::InvalidWeight {
            value: raw.to_string(),
            reason: e.to_string(),
        })?;
    validate_weight(weight_kg)?;
    Ok(weight_kg)
}

/// Rounds an amount for presentation, half away from zero.
#[must_use]
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(
        DISPLAY_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_is_weight_times_rate() {
        let table: RateTable = RateTable::standard();
        assert_eq!(price(&table, WasteCategory::Food, dec!(3)), Ok(dec!(150)));
        assert_eq!(
            price(&table, WasteCategory::Paper, dec!(1.5)),
            Ok(dec!(37.5))
        );
        assert_eq!(price(&table, WasteCategory::Glass, dec!(0)), Ok(dec!(0)));
    }

    #[test]
    fn test_price_is_monotonic_in_weight() {
        let table: RateTable = RateTable::standard();
        let weights: [Decimal; 5] = [dec!(0), dec!(0.1), dec!(1), dec!(2.75), dec!(100)];
        for pair in weights.windows(2) {
            let lower: Decimal = price(&table, WasteCategory::Metal, pair[0]).unwrap();
            let upper: Decimal = price(&table, WasteCategory::Metal, pair[1]).unwrap();
            assert!(lower <= upper);
        }
    }

    #[test]
    fn test_negative_weight_rejected() {
        let table: RateTable = RateTable::standard();
        let result: Result<Decimal, DomainError> = price(&table, WasteCategory::Food, dec!(-1));
        assert!(matches!(result, Err(DomainError::InvalidWeight { .. })));
    }

    #[test]
    fn test_full_precision_retained_until_display() {
        let table: RateTable = RateTable::standard()
            .with_rate(WasteCategory::Plastic, dec!(33.333))
            .unwrap();
        let item: WasteItem =
            WasteItem::priced(&table, WasteCategory::Plastic, dec!(1.005)).unwrap();
        assert_eq!(item.line_total(), dec!(33.499665));
        assert_eq!(round_for_display(item.line_total()), dec!(33.50));
    }

    #[test]
    fn test_round_for_display_midpoint_away_from_zero() {
        assert_eq!(round_for_display(dec!(2.345)), dec!(2.35));
        assert_eq!(round_for_display(dec!(2.344)), dec!(2.34));
        assert_eq!(round_for_display(dec!(950)), dec!(950));
    }

    #[test]
    fn test_parse_weight() {
        assert_eq!(parse_weight(" 10.25 "), Ok(dec!(10.25)));
        assert!(matches!(
            parse_weight("ten"),
            Err(DomainError::InvalidWeight { .. })
        ));
        assert!(matches!(
            parse_weight("-3"),
            Err(DomainError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_weight_limit() {
        assert_eq!(validate_weight(MAX_WEIGHT_KG), Ok(()));
        assert!(matches!(
            validate_weight(MAX_WEIGHT_KG + dec!(0.001)),
            Err(DomainError::InvalidWeight { .. })
        ));
        assert!(matches!(
            parse_weight("1000000000000000000000000000"),
            Err(DomainError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_largest_line_total_is_representable() {
        let table: RateTable = RateTable::standard()
            .with_rate(WasteCategory::Metal, crate::rate_table::MAX_RATE_PER_KG)
            .unwrap();
        let item: WasteItem =
            WasteItem::priced(&table, WasteCategory::Metal, MAX_WEIGHT_KG).unwrap();
        assert_eq!(item.line_total(), dec!(1000000000000));
    }

    #[test]
    fn test_checked_add_amount_reports_overflow() {
        assert_eq!(checked_add_amount(dec!(1.5), dec!(2), "summing"), Ok(dec!(3.5)));
        assert_eq!(
            checked_add_amount(Decimal::MAX, Decimal::ONE, "summing invoice lines"),
            Err(DomainError::AmountOverflow {
                operation: String::from("summing invoice lines"),
            })
        );
    }

    #[test]
    fn test_price_entries_preserves_order() {
        let table: RateTable = RateTable::standard();
        let entries: Vec<WeightEntry> = vec![
            WeightEntry::new(WasteCategory::Glass, dec!(2)),
            WeightEntry::new(WasteCategory::Food, dec!(1)),
        ];
        let items: Vec<WasteItem> = price_entries(&table, &entries).unwrap();
        assert_eq!(items[0].category(), WasteCategory::Glass);
        assert_eq!(items[0].rate_per_kg(), dec!(40));
        assert_eq!(items[1].category(), WasteCategory::Food);
    }
}
