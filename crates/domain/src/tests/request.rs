// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CollectionRecord, DomainError, INITIAL_VERSION, PaymentStatus, RateTable, RequestStatus,
    WasteCategory, WasteItem, WasteRequest, WeightEntry, price_entries,
};
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use time::macros::datetime;

const CREATED_AT: OffsetDateTime = datetime!(2026-03-01 09:00 UTC);

#[test]
fn test_new_request_is_pending_and_unpaid() {
    let items: Vec<WasteItem> = price_entries(
        &RateTable::standard(),
        &[WeightEntry::new(WasteCategory::Food, dec!(3))],
    )
    .unwrap();
    let request: WasteRequest = WasteRequest::new(5, items, CREATED_AT).unwrap();

    assert_eq!(request.request_id, None);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.payment_status, PaymentStatus::Pending);
    assert_eq!(request.assigned_collector_id, None);
    assert_eq!(request.version, INITIAL_VERSION);
    assert_eq!(request.total_price(), dec!(150));
}

#[test]
fn test_total_price_is_sum_of_line_totals() {
    let entries: Vec<WeightEntry> = vec![
        WeightEntry::new(WasteCategory::Food, dec!(2)),
        WeightEntry::new(WasteCategory::Cardboard, dec!(1.5)),
        WeightEntry::new(WasteCategory::Plastic, dec!(0)),
    ];
    let items: Vec<WasteItem> = price_entries(&RateTable::standard(), &entries).unwrap();
    let request: WasteRequest = WasteRequest::new(5, items, CREATED_AT).unwrap();

    // 2 * 50 + 1.5 * 30 + 0 * 60
    assert_eq!(request.total_price(), dec!(145));
    assert_eq!(request.total_weight_kg(), dec!(3.5));
}

#[test]
fn test_rate_snapshot_survives_rate_change() {
    let table: RateTable = RateTable::standard();
    let items: Vec<WasteItem> =
        price_entries(&table, &[WeightEntry::new(WasteCategory::Food, dec!(3))]).unwrap();
    let request: WasteRequest = WasteRequest::new(5, items, CREATED_AT).unwrap();

    let _raised: RateTable = table.with_rate(WasteCategory::Food, dec!(60)).unwrap();

    assert_eq!(request.items[0].rate_per_kg(), dec!(50));
    assert_eq!(request.total_price(), dec!(150));
}

#[test]
fn test_unsaved_request_has_no_id() {
    let items: Vec<WasteItem> = price_entries(
        &RateTable::standard(),
        &[WeightEntry::new(WasteCategory::Glass, dec!(1))],
    )
    .unwrap();
    let request: WasteRequest = WasteRequest::new(5, items, CREATED_AT).unwrap();
    assert_eq!(request.id(), Err(DomainError::RequestNotFound(0)));
}

#[test]
fn test_collection_record_totals() {
    let entries: Vec<WeightEntry> = vec![
        WeightEntry::new(WasteCategory::Metal, dec!(1.25)),
        WeightEntry::new(WasteCategory::Paper, dec!(4)),
    ];
    let items: Vec<WasteItem> = price_entries(&RateTable::standard(), &entries).unwrap();
    let record: CollectionRecord = CollectionRecord::new(2, 5, items, CREATED_AT).unwrap();

    assert_eq!(record.total_weight_kg(), dec!(5.25));
    // 1.25 * 70 + 4 * 25
    assert_eq!(record.total_price(), dec!(187.5));
    assert!(record.contains_category(WasteCategory::Paper));
    assert!(!record.contains_category(WasteCategory::Food));
}
