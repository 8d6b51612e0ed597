// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Conversions between stored column values and domain values.

use rust_decimal::Decimal;
use std::str::FromStr;
use time::OffsetDateTime;
use waste_billing_domain::{WasteCategory, WasteItem};

use crate::data_models::ItemRow;
use crate::error::PersistenceError;

/// Seconds since the Unix epoch.
pub const fn to_unix(timestamp: OffsetDateTime) -> i64 {
    timestamp.unix_timestamp()
}

pub fn from_unix(seconds: i64) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::from_unix_timestamp(seconds)
        .map_err(|e| PersistenceError::ReconstructionError(format!("timestamp {seconds}: {e}")))
}

/// Canonical text form: trailing zeros removed.
pub fn decimal_to_text(value: Decimal) -> String {
    value.normalize().to_string()
}

pub fn decimal_from_text(text: &str) -> Result<Decimal, PersistenceError> {
    Decimal::from_str(text)
        .map_err(|e| PersistenceError::ReconstructionError(format!("decimal '{text}': {e}")))
}

/// Parses any stored enum column through its `FromStr` impl.
pub fn parse_column<T>(column: &str, text: &str) -> Result<T, PersistenceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    T::from_str(text)
        .map_err(|e| PersistenceError::ReconstructionError(format!("{column} '{text}': {e}")))
}

/// Flattens priced items into rows, numbering positions from zero.
pub fn items_to_rows(items: &[WasteItem]) -> Result<Vec<ItemRow>, PersistenceError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let position: i32 = i32::try_from(index).map_err(|_| {
                PersistenceError::SerializationError(format!("item position {index} too large"))
            })?;
            Ok(ItemRow {
                position,
                category: item.category().as_str().to_string(),
                weight_kg: decimal_to_text(item.weight_kg()),
                rate_per_kg: decimal_to_text(item.rate_per_kg()),
            })
        })
        .collect()
}

/// Rebuilds an item from its stored snapshot.
pub fn row_to_item(
    category: &str,
    weight_kg: &str,
    rate_per_kg: &str,
) -> Result<WasteItem, PersistenceError> {
    let category: WasteCategory = parse_column("category", category)?;
    WasteItem::from_snapshot(
        category,
        decimal_from_text(weight_kg)?,
        decimal_from_text(rate_per_kg)?,
    )
    .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}
