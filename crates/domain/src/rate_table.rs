// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Price-per-kilogram lookup by waste category.
//!
//! The rate table is loaded once at process start and never mutated.
//! Changing a rate means building a new table; line items keep the
//! rate that was current when they were priced.

use crate::category::WasteCategory;
use crate::error::DomainError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Highest accepted price per kilogram.
pub const MAX_RATE_PER_KG: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Rejects negative rates and rates above [`MAX_RATE_PER_KG`].
///
/// # Errors
///
/// Returns `DomainError::InvalidRate` if the rate is out of range.
pub fn validate_rate(category: WasteCategory, rate: Decimal) -> Result<(), DomainError> {
    let reason: &str = if rate < Decimal::ZERO {
        "rates cannot be negative"
    } else if rate > MAX_RATE_PER_KG {
        "rate exceeds the maximum of 1000000 per kg"
    } else {
        return Ok(());
    };
    Err(DomainError::InvalidRate {
        category: category.as_str().to_string(),
        rate: rate.to_string(),
        reason: reason.to_string(),
    })
}

/// Immutable mapping of waste category to price per kilogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTable {
    rates: BTreeMap<WasteCategory, Decimal>,
}

impl RateTable {
    /// Creates a rate table from explicit rates.
    ///
    /// Categories absent from `rates` are not billable; pricing them
    /// fails with `UnknownCategory`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRate` if any rate is negative or above
    /// [`MAX_RATE_PER_KG`].
    pub fn new(rates: BTreeMap<WasteCategory, Decimal>) -> Result<Self, DomainError> {
        for (category, rate) in &rates {
            validate_rate(*category, *rate)?;
        }
        Ok(Self { rates })
    }

    /// Creates a rate table from category names as they appear in
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is not a known category or a rate is negative.
    pub fn from_named_rates(named: BTreeMap<String, Decimal>) -> Result<Self, DomainError> {
        let mut rates: BTreeMap<WasteCategory, Decimal> = BTreeMap::new();
        for (name, rate) in named {
            let category: WasteCategory = WasteCategory::from_str(&name)?;
            rates.insert(category, rate);
        }
        Self::new(rates)
    }

    /// The standard tariff, in rupees per kilogram.
    #[must_use]
    pub fn standard() -> Self {
        let rates: BTreeMap<WasteCategory, Decimal> = [
            (WasteCategory::Food, 50),
            (WasteCategory::Cardboard, 30),
            (WasteCategory::Polythene, 80),
            (WasteCategory::Plastic, 60),
            (WasteCategory::Glass, 40),
            (WasteCategory::Metal, 70),
            (WasteCategory::Paper, 25),
            (WasteCategory::Organic, 45),
        ]
        .into_iter()
        .map(|(category, rate)| (category, Decimal::from(rate)))
        .collect();
        Self { rates }
    }

    /// Returns the rate for a category.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::UnknownCategory` if the table has no rate for it.
    pub fn rate(&self, category: WasteCategory) -> Result<Decimal, DomainError> {
        self.rates
            .get(&category)
            .copied()
            .ok_or_else(|| DomainError::UnknownCategory {
                category: category.as_str().to_string(),
            })
    }

    /// Returns a new table with one rate replaced or added.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRate` if the rate is out of range.
    pub fn with_rate(&self, category: WasteCategory, rate: Decimal) -> Result<Self, DomainError> {
        let mut rates: BTreeMap<WasteCategory, Decimal> = self.rates.clone();
        rates.insert(category, rate);
        Self::new(rates)
    }

    /// Iterates over all configured rates in category order.
    pub fn entries(&self) -> impl Iterator<Item = (WasteCategory, Decimal)> + '_ {
        self.rates.iter().map(|(category, rate)| (*category, *rate))
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_standard_rates() {
        let table: RateTable = RateTable::standard();
        assert_eq!(table.rate(WasteCategory::Food), Ok(dec!(50)));
        assert_eq!(table.rate(WasteCategory::Cardboard), Ok(dec!(30)));
        assert_eq!(table.rate(WasteCategory::Paper), Ok(dec!(25)));
        assert_eq!(table.entries().count(), WasteCategory::ALL.len());
    }

    #[test]
    fn test_missing_category_is_unknown() {
        let table: RateTable =
            RateTable::new(BTreeMap::from([(WasteCategory::Food, dec!(50))])).unwrap();
        assert_eq!(
            table.rate(WasteCategory::Metal),
            Err(DomainError::UnknownCategory {
                category: String::from("metal"),
            })
        );
    }

    #[test]
    fn test_negative_rate_rejected() {
        let result: Result<RateTable, DomainError> =
            RateTable::new(BTreeMap::from([(WasteCategory::Glass, dec!(-1))]));
        assert!(matches!(result, Err(DomainError::InvalidRate { .. })));
    }

    #[test]
    fn test_rate_above_maximum_rejected() {
        assert!(RateTable::standard().with_rate(WasteCategory::Metal, MAX_RATE_PER_KG).is_ok());
        let result: Result<RateTable, DomainError> = RateTable::standard()
            .with_rate(WasteCategory::Metal, MAX_RATE_PER_KG + dec!(0.01));
        assert!(matches!(
            result,
            Err(DomainError::InvalidRate { ref reason, .. }) if reason.contains("maximum")
        ));
    }

    #[test]
    fn test_with_rate_leaves_original_untouched() {
        let original: RateTable = RateTable::standard();
        let updated: RateTable = original.with_rate(WasteCategory::Food, dec!(60)).unwrap();
        assert_eq!(original.rate(WasteCategory::Food), Ok(dec!(50)));
        assert_eq!(updated.rate(WasteCategory::Food), Ok(dec!(60)));
    }

    #[test]
    fn test_from_named_rates() {
        let named: BTreeMap<String, Decimal> = BTreeMap::from([
            (String::from("food"), dec!(50)),
            (String::from("Cardboard"), dec!(100)),
        ]);
        let table: RateTable = RateTable::from_named_rates(named).unwrap();
        assert_eq!(table.rate(WasteCategory::Cardboard), Ok(dec!(100)));

        let bad: BTreeMap<String, Decimal> = BTreeMap::from([(String::from("tyres"), dec!(5))]);
        assert!(matches!(
            RateTable::from_named_rates(bad),
            Err(DomainError::UnknownCategory { .. })
        ));
    }
}
