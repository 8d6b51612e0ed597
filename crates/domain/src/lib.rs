// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod category;
mod collection;
mod error;
mod invoice;
mod member;
mod payment;
mod rate_table;
mod request;
mod request_status;
mod timestamp;
mod validation;
mod valuation;

#[cfg(test)]
mod tests;

pub use category::WasteCategory;
pub use collection::CollectionRecord;
pub use error::DomainError;
pub use invoice::{Invoice, InvoiceLine, InvoicePeriod, aggregate_invoice};
pub use member::{Member, Role};
pub use payment::{CompletionPolicy, PaymentStatus};
pub use rate_table::{MAX_RATE_PER_KG, RateTable, validate_rate};
pub use request::{INITIAL_VERSION, WasteRequest};
pub use request_status::{RequestAction, RequestStatus};
pub use timestamp::{month_key, whole_seconds};
pub use validation::{
    MAX_DISPLAY_NAME_LENGTH, MAX_ITEMS, validate_collection_items, validate_display_name,
    validate_request_items,
};
pub use valuation::{
    DISPLAY_DECIMAL_PLACES, MAX_WEIGHT_KG, WasteItem, WeightEntry, checked_add_amount,
    parse_weight, price, price_entries, round_for_display, validate_weight,
};
