// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route tests for the HTTP server.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tower::ServiceExt;
use waste_billing_api::{BillingSettings, bootstrap_admin};
use waste_billing_persistence::SqlitePersistence;

use crate::AppState;
use crate::identity::{ACTOR_HEADER, REQUEST_ID_HEADER};
use crate::routes::build_router;

const ADMIN_ID: i64 = 1;
const RESIDENT_ID: i64 = 2;
const COLLECTOR_ID: i64 = 3;
const OTHER_COLLECTOR_ID: i64 = 4;

/// Helper to create test app state with in-memory persistence and a
/// bootstrapped administrator.
fn create_test_app_state() -> AppState {
    let mut persistence: SqlitePersistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    bootstrap_admin(&mut persistence, "admin").expect("Failed to bootstrap admin");
    AppState::new(persistence, BillingSettings::default())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    actor: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(actor) = actor {
        builder = builder.header(ACTOR_HEADER, actor.to_string());
    }
    let request: Request<Body> = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status: StatusCode = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value: Value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers resident 2, collectors 3 and 4, and resident 5.
async fn create_test_app() -> Router {
    let app: Router = build_router(create_test_app_state());
    for (name, role) in [
        ("Nimal Perera", "resident"),
        ("Kamal Silva", "collector"),
        ("Sunil Fernando", "collector"),
        ("Amara Jayasinghe", "resident"),
    ] {
        let (status, _) = send(
            &app,
            "POST",
            "/members",
            Some(ADMIN_ID),
            Some(json!({ "display_name": name, "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    app
}

async fn create_test_request(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/requests",
        Some(RESIDENT_ID),
        Some(json!({
            "items": [
                { "category": "food", "weight_kg": 2 },
                { "category": "cardboard", "weight_kg": "1.5" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["request"]["request_id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_missing_actor_header_is_unauthenticated() {
    let app: Router = create_test_app().await;

    let (status, body) = send(&app, "GET", "/requests", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["kind"], json!("authentication_failed"));
}

#[tokio::test]
async fn test_unknown_actor_is_unauthenticated() {
    let app: Router = create_test_app().await;

    let (status, _) = send(&app, "GET", "/requests", Some(42), None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cause_uses_request_id_header() {
    let app: Router = create_test_app().await;

    let request: Request<Body> = Request::builder()
        .method("POST")
        .uri("/requests")
        .header(ACTOR_HEADER, RESIDENT_ID.to_string())
        .header(REQUEST_ID_HEADER, "req-abc")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "items": [{ "category": "paper", "weight_kg": 4 }] }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let created: Value = serde_json::from_slice(&bytes).unwrap();
    let event_id: i64 = created["audit_event_id"].as_i64().unwrap();

    let (status, event) = send(
        &app,
        "GET",
        &format!("/audit/event/{event_id}"),
        Some(ADMIN_ID),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(event["cause_id"], json!("req-abc"));
    assert_eq!(event["cause_description"], json!("POST /requests"));
    assert_eq!(event["actor_id"], json!("2"));
}

#[tokio::test]
async fn test_members_listing_is_admin_only() {
    let app: Router = create_test_app().await;

    let (status, body) = send(&app, "GET", "/members?role=collector", Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["members"].as_array().unwrap().len(), 2);

    let (status, body) = send(&app, "GET", "/members", Some(RESIDENT_ID), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["kind"], json!("unauthorized"));
}

#[tokio::test]
async fn test_request_lifecycle_over_http() {
    let app: Router = create_test_app().await;
    let request_id: i64 = create_test_request(&app).await;
    let base: String = format!("/requests/{request_id}");

    let (status, body) = send(&app, "GET", &base, Some(RESIDENT_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_price"], json!("145.00"));
    assert_eq!(body["total_weight_kg"], json!("3.5"));
    assert_eq!(body["status"], json!("pending"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("{base}/assign"),
        Some(ADMIN_ID),
        Some(json!({ "collector_id": COLLECTOR_ID })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], json!("assigned"));

    let (status, _) = send(
        &app,
        "POST",
        &format!("{base}/complete"),
        Some(OTHER_COLLECTOR_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "POST",
        &format!("{base}/complete"),
        Some(COLLECTOR_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["status"], json!("completed"));

    let (status, body) = send(&app, "POST", &format!("{base}/cancel"), Some(RESIDENT_ID), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["kind"], json!("invalid_transition"));

    let (status, _) = send(&app, "DELETE", &base, Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &base, Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["kind"], json!("not_found"));

    let (status, body) = send(&app, "GET", &format!("{base}/history"), Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_concurrent_assignment_has_one_winner() {
    let app: Router = create_test_app().await;
    let request_id: i64 = create_test_request(&app).await;
    let uri: String = format!("/requests/{request_id}/assign");

    let (first, second) = tokio::join!(
        send(
            &app,
            "POST",
            &uri,
            Some(ADMIN_ID),
            Some(json!({ "collector_id": COLLECTOR_ID })),
        ),
        send(
            &app,
            "POST",
            &uri,
            Some(ADMIN_ID),
            Some(json!({ "collector_id": OTHER_COLLECTOR_ID })),
        ),
    );

    let mut statuses: Vec<u16> = vec![first.0.as_u16(), second.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 409]);

    let loser: &Value = if first.0 == StatusCode::CONFLICT {
        &first.1
    } else {
        &second.1
    };
    assert_eq!(loser["kind"], json!("invalid_transition"));
}

#[tokio::test]
async fn test_validation_errors_map_to_status_codes() {
    let app: Router = create_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/requests",
        Some(RESIDENT_ID),
        Some(json!({ "items": [{ "category": "food", "weight_kg": -2 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("invalid_weight"));

    let (status, body) = send(
        &app,
        "POST",
        "/requests",
        Some(RESIDENT_ID),
        Some(json!({ "items": [{ "category": "food", "weight_kg": 0 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("no_positive_weight"));

    let (status, body) = send(
        &app,
        "GET",
        "/requests?status=finished",
        Some(ADMIN_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("invalid_input"));
}

#[tokio::test]
async fn test_collection_and_invoice_flow() {
    let app: Router = create_test_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/collections",
        Some(COLLECTOR_ID),
        Some(json!({
            "resident_id": RESIDENT_ID,
            "items": [
                { "category": "food", "weight_kg": 10 },
                { "category": "food", "weight_kg": 5 },
                { "category": "cardboard", "weight_kg": 2 }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["record"]["total_price"], json!("810.00"));

    let (status, body) = send(
        &app,
        "GET",
        "/collections?category=cardboard",
        Some(RESIDENT_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"].as_array().unwrap().len(), 1);

    let now: OffsetDateTime = OffsetDateTime::now_utc().replace_nanosecond(0).unwrap();
    let period: Value = json!({
        "resident_id": RESIDENT_ID,
        "period_start": (now - Duration::days(1)).format(&Rfc3339).unwrap(),
        "period_end": (now + Duration::days(1)).format(&Rfc3339).unwrap(),
    });

    let (status, body) = send(&app, "POST", "/invoices", Some(ADMIN_ID), Some(period.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], json!(false));
    assert_eq!(body["invoice"]["total_amount"], json!("810.00"));
    assert_eq!(
        body["invoice"]["waste_details"],
        json!([
            { "category": "food", "total_weight_kg": "15", "rate_per_kg": "50.00", "amount": "750.00" },
            { "category": "cardboard", "total_weight_kg": "2", "rate_per_kg": "30.00", "amount": "60.00" }
        ])
    );
    let invoice_id: i64 = body["invoice"]["invoice_id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/invoices", Some(ADMIN_ID), Some(period)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced"], json!(true));
    assert_eq!(body["invoice"]["invoice_id"], json!(invoice_id));

    let (status, _) = send(
        &app,
        "GET",
        &format!("/invoices/{invoice_id}"),
        Some(RESIDENT_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/invoices/{invoice_id}"),
        Some(COLLECTOR_ID),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_rates_and_analytics() {
    let app: Router = create_test_app().await;
    create_test_request(&app).await;

    let (status, body) = send(&app, "GET", "/rates", Some(RESIDENT_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rates"].as_array().unwrap().len(), 8);
    assert_eq!(body["completion_policy"], json!("allow_unpaid"));

    let (status, body) = send(&app, "GET", "/analytics/requests", Some(ADMIN_ID), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pending"], json!(1));
    assert_eq!(body["total_revenue"], json!("145.00"));

    for uri in [
        "/analytics/requests",
        "/analytics/categories",
        "/analytics/monthly",
        "/analytics/collectors",
    ] {
        let (status, _) = send(&app, "GET", uri, Some(COLLECTOR_ID), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri} should be admin-only");
        let (status, _) = send(&app, "GET", uri, Some(ADMIN_ID), None).await;
        assert_eq!(status, StatusCode::OK, "{uri} should succeed for admin");
    }
}

#[tokio::test]
async fn test_require_payment_policy_over_http() {
    let mut persistence: SqlitePersistence = SqlitePersistence::new_in_memory().unwrap();
    bootstrap_admin(&mut persistence, "admin").unwrap();
    let settings: BillingSettings = BillingSettings::new(
        waste_billing_domain::RateTable::standard(),
        waste_billing_domain::CompletionPolicy::RequirePayment,
    );
    let app: Router = build_router(AppState::new(persistence, settings));
    for (name, role) in [("Nimal Perera", "resident"), ("Kamal Silva", "collector")] {
        send(
            &app,
            "POST",
            "/members",
            Some(ADMIN_ID),
            Some(json!({ "display_name": name, "role": role })),
        )
        .await;
    }
    let request_id: i64 = create_test_request(&app).await;
    let base: String = format!("/requests/{request_id}");
    send(
        &app,
        "POST",
        &format!("{base}/assign"),
        Some(ADMIN_ID),
        Some(json!({ "collector_id": COLLECTOR_ID })),
    )
    .await;

    let (status, body) = send(&app, "POST", &format!("{base}/complete"), Some(COLLECTOR_ID), None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("payment_required"));

    let (status, body) = send(
        &app,
        "POST",
        &format!("{base}/payment"),
        Some(RESIDENT_ID),
        Some(json!({ "payment_reference": "PAY-77" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["request"]["payment_status"], json!("paid"));

    let (status, _) = send(&app, "POST", &format!("{base}/complete"), Some(COLLECTOR_ID), None).await;
    assert_eq!(status, StatusCode::OK);
}
