// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collection record and invoice tests.

use serde_json::json;
use time::{Duration, OffsetDateTime};
use waste_billing_persistence::Persistence;

use crate::{
    ApiError, BillingSettings, GenerateInvoiceRequest, GenerateInvoiceResponse,
    ListCollectionsQuery, ListInvoicesQuery, RecordCollectionRequest, WeightEntryRequest,
    generate_invoice, get_invoice, list_collection_records, list_invoices, record_collection,
};

use super::helpers::{
    COLLECTOR_ID, OTHER_COLLECTOR_ID, OTHER_RESIDENT_ID, RESIDENT_ID, create_other_collector,
    create_other_resident, create_test_admin, create_test_cause, create_test_collector,
    create_test_resident, item, setup_test_persistence,
};

fn collect(
    persistence: &mut Persistence,
    collector_id: i64,
    resident_id: i64,
    items: Vec<WeightEntryRequest>,
) {
    record_collection(
        persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: Some(collector_id),
            resident_id,
            items,
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
}

fn current_period(resident_id: i64) -> GenerateInvoiceRequest {
    let now: OffsetDateTime = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
    GenerateInvoiceRequest {
        resident_id,
        period_start: now - Duration::days(1),
        period_end: now + Duration::days(1),
    }
}

fn generate(
    persistence: &mut Persistence,
    request: GenerateInvoiceRequest,
) -> Result<GenerateInvoiceResponse, ApiError> {
    generate_invoice(
        persistence,
        &BillingSettings::default(),
        request,
        &create_test_admin(),
        create_test_cause(),
    )
}

#[test]
fn test_collector_records_own_collection() {
    let mut persistence = setup_test_persistence();

    let response = record_collection(
        &mut persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![item("glass", json!(1.25)), item("metal", json!("0.5"))],
        },
        &create_test_collector(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.record.collector_id, COLLECTOR_ID);
    assert_eq!(response.record.resident_id, RESIDENT_ID);
    assert_eq!(response.record.total_weight_kg, "1.75");
    assert_eq!(response.record.total_price, "85.00");
    assert!(response.record.record_id.is_some());
}

#[test]
fn test_collection_rejects_zero_weight_and_empty_items() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();

    let zero = record_collection(
        &mut persistence,
        &settings,
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![item("glass", json!(1)), item("paper", json!(0))],
        },
        &create_test_collector(),
        create_test_cause(),
    );
    assert_eq!(zero.unwrap_err().kind(), "invalid_weight");

    let empty = record_collection(
        &mut persistence,
        &settings,
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: Vec::new(),
        },
        &create_test_collector(),
        create_test_cause(),
    );
    assert_eq!(empty.unwrap_err().kind(), "empty_items");
}

#[test]
fn test_collection_rejects_oversized_weights_before_persisting() {
    let mut persistence = setup_test_persistence();

    let result = record_collection(
        &mut persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![
                item("metal", json!("1000000000000000000000000000")),
                item("metal", json!("1000000000000000000000000000")),
            ],
        },
        &create_test_collector(),
        create_test_cause(),
    );
    assert_eq!(result.unwrap_err().kind(), "invalid_weight");

    let records = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery::default(),
        &create_test_admin(),
    )
    .unwrap();
    assert!(records.records.is_empty());
}

#[test]
fn test_collection_accepts_the_heaviest_allowed_lines() {
    let mut persistence = setup_test_persistence();

    let response = record_collection(
        &mut persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![
                item("metal", json!("1000000")),
                item("metal", json!("1000000")),
            ],
        },
        &create_test_collector(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(response.record.items.len(), 2);
}

#[test]
fn test_collection_rejects_too_many_items() {
    let mut persistence = setup_test_persistence();

    let result = record_collection(
        &mut persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![item("paper", json!(1)); waste_billing_domain::MAX_ITEMS + 1],
        },
        &create_test_collector(),
        create_test_cause(),
    );

    assert_eq!(result.unwrap_err().kind(), "too_many_items");
}

#[test]
fn test_collection_requires_known_resident() {
    let mut persistence = setup_test_persistence();

    let result = record_collection(
        &mut persistence,
        &BillingSettings::default(),
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: OTHER_COLLECTOR_ID,
            items: vec![item("glass", json!(1))],
        },
        &create_test_collector(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(ApiError::ResourceNotFound { ref resource_type, .. }) if resource_type == "Resident"
    ));
}

#[test]
fn test_list_collection_records_scopes_by_role() {
    let mut persistence = setup_test_persistence();
    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("food", json!(2))],
    );
    collect(
        &mut persistence,
        OTHER_COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("metal", json!(1))],
    );
    collect(
        &mut persistence,
        COLLECTOR_ID,
        OTHER_RESIDENT_ID,
        vec![item("paper", json!(3))],
    );

    let all = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery::default(),
        &create_test_admin(),
    )
    .unwrap();
    assert_eq!(all.records.len(), 3);

    let collector = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery::default(),
        &create_test_collector(),
    )
    .unwrap();
    assert_eq!(collector.records.len(), 2);
    assert!(collector.records.iter().all(|r| r.collector_id == COLLECTOR_ID));

    let resident = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery::default(),
        &create_test_resident(),
    )
    .unwrap();
    assert_eq!(resident.records.len(), 2);

    let metal = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery {
            category: Some(String::from("metal")),
            ..ListCollectionsQuery::default()
        },
        &create_test_admin(),
    )
    .unwrap();
    assert_eq!(metal.records.len(), 1);
    assert_eq!(metal.records[0].collector_id, OTHER_COLLECTOR_ID);

    let foreign = list_collection_records(
        &mut persistence,
        &ListCollectionsQuery {
            collector_id: Some(COLLECTOR_ID),
            ..ListCollectionsQuery::default()
        },
        &create_other_collector(),
    );
    assert!(matches!(foreign, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_invoice_aggregates_resident_collections() {
    let mut persistence = setup_test_persistence();
    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("glass", json!(1)), item("food", json!(2))],
    );
    collect(
        &mut persistence,
        OTHER_COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("food", json!(1))],
    );
    collect(
        &mut persistence,
        COLLECTOR_ID,
        OTHER_RESIDENT_ID,
        vec![item("metal", json!(5))],
    );

    let response = generate(&mut persistence, current_period(RESIDENT_ID)).unwrap();

    assert!(!response.replaced);
    assert_eq!(response.invoice.resident_id, RESIDENT_ID);
    assert_eq!(response.invoice.total_amount, "190.00");
    let lines: Vec<(&str, &str, &str)> = response
        .invoice
        .waste_details
        .iter()
        .map(|line| {
            (
                line.category.as_str(),
                line.total_weight_kg.as_str(),
                line.amount.as_str(),
            )
        })
        .collect();
    assert_eq!(
        lines,
        vec![("food", "3", "150.00"), ("glass", "1", "40.00")]
    );
}

#[test]
fn test_regenerating_invoice_replaces_previous() {
    let mut persistence = setup_test_persistence();
    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("food", json!(2))],
    );
    let period: GenerateInvoiceRequest = current_period(RESIDENT_ID);

    let first = generate(&mut persistence, period).unwrap();
    assert_eq!(first.invoice.total_amount, "100.00");

    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("paper", json!(2))],
    );
    let second = generate(&mut persistence, period).unwrap();

    assert!(second.replaced);
    assert_eq!(second.invoice.invoice_id, first.invoice.invoice_id);
    assert_eq!(second.invoice.total_amount, "150.00");

    let stored = list_invoices(
        &mut persistence,
        ListInvoicesQuery {
            resident_id: Some(RESIDENT_ID),
        },
        &create_test_admin(),
    )
    .unwrap();
    assert_eq!(stored.invoices.len(), 1);
}

#[test]
fn test_invoice_for_quiet_period_is_empty() {
    let mut persistence = setup_test_persistence();
    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("food", json!(2))],
    );
    let now: OffsetDateTime = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

    let response = generate(
        &mut persistence,
        GenerateInvoiceRequest {
            resident_id: RESIDENT_ID,
            period_start: now - Duration::days(60),
            period_end: now - Duration::days(30),
        },
    )
    .unwrap();

    assert!(response.invoice.waste_details.is_empty());
    assert_eq!(response.invoice.total_amount, "0.00");
}

#[test]
fn test_invoice_rejects_reversed_period() {
    let mut persistence = setup_test_persistence();
    let now: OffsetDateTime = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

    let result = generate(
        &mut persistence,
        GenerateInvoiceRequest {
            resident_id: RESIDENT_ID,
            period_start: now,
            period_end: now - Duration::days(1),
        },
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_period");
}

#[test]
fn test_invoice_rejects_sub_second_bounds() {
    let mut persistence = setup_test_persistence();
    let now: OffsetDateTime = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();

    let result = generate(
        &mut persistence,
        GenerateInvoiceRequest {
            resident_id: RESIDENT_ID,
            period_start: now - Duration::days(1) + Duration::milliseconds(500),
            period_end: now + Duration::days(1),
        },
    );

    assert_eq!(result.unwrap_err().kind(), "invalid_period");
}

#[test]
fn test_resident_generates_and_reads_own_invoice() {
    let mut persistence = setup_test_persistence();
    collect(
        &mut persistence,
        COLLECTOR_ID,
        RESIDENT_ID,
        vec![item("organic", json!(2))],
    );

    let response = generate_invoice(
        &mut persistence,
        &BillingSettings::default(),
        current_period(RESIDENT_ID),
        &create_test_resident(),
        create_test_cause(),
    )
    .unwrap();
    let invoice_id = response.invoice.invoice_id.unwrap();

    let own = get_invoice(&mut persistence, invoice_id, &create_test_resident()).unwrap();
    assert_eq!(own.total_amount, "90.00");

    let listed = list_invoices(
        &mut persistence,
        ListInvoicesQuery::default(),
        &create_test_resident(),
    )
    .unwrap();
    assert_eq!(listed.invoices.len(), 1);

    let foreign = get_invoice(&mut persistence, invoice_id, &create_other_resident());
    assert!(matches!(foreign, Err(ApiError::Unauthorized { .. })));

    let missing = get_invoice(&mut persistence, 999, &create_test_admin());
    assert!(matches!(missing, Err(ApiError::ResourceNotFound { .. })));
}
