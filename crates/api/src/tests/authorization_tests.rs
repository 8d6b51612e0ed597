// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authorization failure tests.
//!
//! Residents act on their own requests, collectors on the requests assigned
//! to them, and administrators on everything.

use serde_json::json;

use crate::{
    ApiError, AssignCollectorRequest, BillingSettings, ConfirmPaymentRequest,
    CreateRequestRequest, ListInvoicesQuery, ListRequestsQuery, RecordCollectionRequest,
    RegisterMemberRequest, assign_collector, cancel_request, category_statistics,
    complete_request, confirm_payment, create_request, delete_request, get_audit_event,
    get_request, get_request_history, list_invoices, list_requests, record_collection,
    register_member, request_summary,
};

use super::helpers::{
    COLLECTOR_ID, OTHER_COLLECTOR_ID, RESIDENT_ID, create_other_collector, create_other_resident,
    create_test_admin, create_test_cause, create_test_collector, create_test_request,
    create_test_resident, item, request_id_of, setup_test_persistence,
};

fn assigned_request(
    persistence: &mut waste_billing_persistence::Persistence,
    settings: &BillingSettings,
) -> i64 {
    let request_id = request_id_of(&create_test_request(persistence, settings));
    assign_collector(
        persistence,
        settings,
        request_id,
        AssignCollectorRequest {
            collector_id: COLLECTOR_ID,
        },
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    request_id
}

#[test]
fn test_register_member_rejects_non_admin() {
    let mut persistence = setup_test_persistence();

    for actor in [create_test_resident(), create_test_collector()] {
        let result = register_member(
            &mut persistence,
            RegisterMemberRequest {
                display_name: String::from("Mallory"),
                role: String::from("admin"),
            },
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }
    assert_eq!(persistence.count_members().unwrap(), 5);
}

#[test]
fn test_resident_cannot_file_for_someone_else() {
    let mut persistence = setup_test_persistence();

    let result = create_request(
        &mut persistence,
        &BillingSettings::default(),
        &CreateRequestRequest {
            resident_id: Some(RESIDENT_ID),
            items: vec![item("food", json!(1))],
        },
        &create_other_resident(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_collector_cannot_create_request() {
    let mut persistence = setup_test_persistence();

    let result = create_request(
        &mut persistence,
        &BillingSettings::default(),
        &CreateRequestRequest {
            resident_id: Some(RESIDENT_ID),
            items: vec![item("food", json!(1))],
        },
        &create_test_collector(),
        create_test_cause(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_only_admin_assigns() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = request_id_of(&create_test_request(&mut persistence, &settings));

    for actor in [create_test_resident(), create_test_collector()] {
        let result = assign_collector(
            &mut persistence,
            &settings,
            request_id,
            AssignCollectorRequest {
                collector_id: COLLECTOR_ID,
            },
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }

    let current = get_request(&mut persistence, request_id, &create_test_admin()).unwrap();
    assert_eq!(current.status, "pending");
}

#[test]
fn test_only_assigned_collector_completes() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = assigned_request(&mut persistence, &settings);

    for actor in [create_other_collector(), create_test_resident()] {
        let result = complete_request(
            &mut persistence,
            &settings,
            request_id,
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }

    let completed = complete_request(
        &mut persistence,
        &settings,
        request_id,
        &create_test_collector(),
        create_test_cause(),
    );
    assert!(completed.is_ok());
}

#[test]
fn test_only_owner_or_admin_cancels() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = assigned_request(&mut persistence, &settings);

    for actor in [create_other_resident(), create_test_collector()] {
        let result = cancel_request(
            &mut persistence,
            &settings,
            request_id,
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }

    let cancelled = cancel_request(
        &mut persistence,
        &settings,
        request_id,
        &create_test_admin(),
        create_test_cause(),
    )
    .unwrap();
    assert_eq!(cancelled.request.status, "cancelled");
}

#[test]
fn test_only_owner_or_admin_confirms_payment() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = assigned_request(&mut persistence, &settings);

    for actor in [create_other_resident(), create_test_collector()] {
        let result = confirm_payment(
            &mut persistence,
            &settings,
            request_id,
            ConfirmPaymentRequest::default(),
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }
}

#[test]
fn test_only_admin_deletes() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = assigned_request(&mut persistence, &settings);
    complete_request(
        &mut persistence,
        &settings,
        request_id,
        &create_test_collector(),
        create_test_cause(),
    )
    .unwrap();

    for actor in [create_test_resident(), create_test_collector()] {
        let result = delete_request(
            &mut persistence,
            &settings,
            request_id,
            &actor,
            create_test_cause(),
        );
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    }
}

#[test]
fn test_request_visibility() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();
    let request_id = assigned_request(&mut persistence, &settings);

    for actor in [
        create_test_admin(),
        create_test_resident(),
        create_test_collector(),
    ] {
        assert!(get_request(&mut persistence, request_id, &actor).is_ok());
        assert!(get_request_history(&mut persistence, request_id, &actor).is_ok());
    }

    for actor in [create_other_resident(), create_other_collector()] {
        let result = get_request(&mut persistence, request_id, &actor);
        assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
        let history = get_request_history(&mut persistence, request_id, &actor);
        assert!(matches!(history, Err(ApiError::Unauthorized { .. })));
    }
}

#[test]
fn test_list_requests_rejects_foreign_filters() {
    let mut persistence = setup_test_persistence();

    let resident = list_requests(
        &mut persistence,
        &ListRequestsQuery {
            resident_id: Some(RESIDENT_ID),
            ..ListRequestsQuery::default()
        },
        &create_other_resident(),
    );
    assert!(matches!(resident, Err(ApiError::Unauthorized { .. })));

    let collector = list_requests(
        &mut persistence,
        &ListRequestsQuery {
            collector_id: Some(OTHER_COLLECTOR_ID),
            ..ListRequestsQuery::default()
        },
        &create_test_collector(),
    );
    assert!(matches!(collector, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_collection_recording_rules() {
    let mut persistence = setup_test_persistence();
    let settings = BillingSettings::default();

    let as_other = record_collection(
        &mut persistence,
        &settings,
        &RecordCollectionRequest {
            collector_id: Some(OTHER_COLLECTOR_ID),
            resident_id: RESIDENT_ID,
            items: vec![item("glass", json!(1))],
        },
        &create_test_collector(),
        create_test_cause(),
    );
    assert!(matches!(as_other, Err(ApiError::Unauthorized { .. })));

    let as_resident = record_collection(
        &mut persistence,
        &settings,
        &RecordCollectionRequest {
            collector_id: None,
            resident_id: RESIDENT_ID,
            items: vec![item("glass", json!(1))],
        },
        &create_test_resident(),
        create_test_cause(),
    );
    assert!(matches!(as_resident, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_invoices_are_private_to_their_resident() {
    let mut persistence = setup_test_persistence();

    let foreign = list_invoices(
        &mut persistence,
        ListInvoicesQuery {
            resident_id: Some(RESIDENT_ID),
        },
        &create_other_resident(),
    );
    assert!(matches!(foreign, Err(ApiError::Unauthorized { .. })));

    let collector = list_invoices(
        &mut persistence,
        ListInvoicesQuery::default(),
        &create_test_collector(),
    );
    assert!(matches!(collector, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_analytics_and_audit_require_admin() {
    let mut persistence = setup_test_persistence();

    for actor in [create_test_resident(), create_test_collector()] {
        assert!(matches!(
            request_summary(&mut persistence, &actor),
            Err(ApiError::Unauthorized { .. })
        ));
        assert!(matches!(
            category_statistics(&mut persistence, &actor),
            Err(ApiError::Unauthorized { .. })
        ));
        assert!(matches!(
            get_audit_event(&mut persistence, 1, &actor),
            Err(ApiError::Unauthorized { .. })
        ));
    }
}
