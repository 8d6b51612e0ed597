// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::valuation::WasteItem;
use rust_decimal::Decimal;

/// Maximum length of a member display name, in characters.
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Maximum number of line items on one request or collection record.
pub const MAX_ITEMS: usize = 1_000;

fn validate_item_count(items: &[WasteItem]) -> Result<(), DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyItems);
    }
    if items.len() > MAX_ITEMS {
        return Err(DomainError::TooManyItems {
            count: items.len(),
            max: MAX_ITEMS,
        });
    }
    Ok(())
}

/// Validates the line items of a new request.
///
/// # Arguments
///
/// * `items` - The priced items, in submission order
///
/// # Returns
///
/// * `Ok(())` if the items are acceptable
/// * `Err(DomainError)` otherwise
///
/// # Errors
///
/// Returns an error if:
/// - There are no items, or more than [`MAX_ITEMS`]
/// - No item has a weight above zero
pub fn validate_request_items(items: &[WasteItem]) -> Result<(), DomainError> {
    // Rule: a request must contain at least one line
    validate_item_count(items)?;

    // Rule: an all-zero request has nothing to collect
    if !items.iter().any(|item| item.weight_kg() > Decimal::ZERO) {
        return Err(DomainError::NoPositiveWeight);
    }

    Ok(())
}

/// Validates the line items of a collection record.
///
/// Collected weights are measured on pickup, so every line must carry
/// weight.
///
/// # Errors
///
/// Returns an error if:
/// - There are no items, or more than [`MAX_ITEMS`]
/// - Any item has zero weight
pub fn validate_collection_items(items: &[WasteItem]) -> Result<(), DomainError> {
    validate_item_count(items)?;

    if let Some(item) = items.iter().find(|item| item.weight_kg() <= Decimal::ZERO) {
        return Err(DomainError::InvalidWeight {
            value: item.weight_kg().to_string(),
            reason: format!(
                "collected {} weight must be greater than zero",
                item.category()
            ),
        });
    }

    Ok(())
}

/// Validates a member display name.
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is blank or too long.
pub fn validate_display_name(display_name: &str) -> Result<(), DomainError> {
    if display_name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Display name cannot be empty",
        )));
    }

    if display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
        return Err(DomainError::InvalidName(format!(
            "Display name cannot exceed {MAX_DISPLAY_NAME_LENGTH} characters"
        )));
    }

    Ok(())
}
