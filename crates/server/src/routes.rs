// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP handlers and the application router.
//!
//! Each handler locks the shared persistence for the duration of one API
//! call, so operations on the database are serialized.

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    routing::{get, post},
};
use tracing::info;
use waste_billing_api::{
    AssignCollectorRequest, AuditEventInfo, CategoryStatisticsResponse, CollectorWorkloadResponse,
    ConfirmPaymentRequest, CreateRequestRequest, DeleteRequestResponse, GenerateInvoiceRequest,
    GenerateInvoiceResponse, InvoiceInfo, ListCollectionRecordsResponse, ListCollectionsQuery,
    ListInvoicesQuery, ListInvoicesResponse, ListMembersQuery, ListMembersResponse,
    ListRequestsQuery, ListRequestsResponse, RateTableResponse, RecordCollectionRequest,
    RecordCollectionResponse, RegisterMemberRequest, RegisterMemberResponse,
    RequestHistoryResponse, RequestInfo, RequestSummaryResponse, RequestTransitionResponse,
    RequestsPerMonthResponse, assign_collector, cancel_request, category_statistics,
    collector_workload, complete_request, confirm_payment, create_request, delete_request,
    generate_invoice, get_audit_event, get_invoice, get_rate_table, get_request,
    get_request_history, list_collection_records, list_invoices, list_members, list_requests,
    reassign_collector, record_collection, register_member, request_summary, requests_per_month,
};

use crate::AppState;
use crate::error::HttpError;
use crate::identity::Identity;

type Created<T> = (StatusCode, Json<T>);

// ============================================================================
// Members
// ============================================================================

/// Handler for POST `/members`.
async fn handle_register_member(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Json(req): Json<RegisterMemberRequest>,
) -> Result<Created<RegisterMemberResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RegisterMemberResponse = register_member(&mut persistence, req, &actor, cause)?;
    drop(persistence);

    info!(
        member_id = ?response.member.member_id,
        role = %response.member.role,
        event_id = response.audit_event_id,
        "Registered member"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/members`.
async fn handle_list_members(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Query(query): Query<ListMembersQuery>,
) -> Result<Json<ListMembersResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListMembersResponse = list_members(&mut persistence, &query, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

// ============================================================================
// Requests
// ============================================================================

/// Handler for POST `/requests`.
async fn handle_create_request(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Json(req): Json<CreateRequestRequest>,
) -> Result<Created<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse =
        create_request(&mut persistence, &app_state.settings, &req, &actor, cause)?;
    drop(persistence);

    info!(
        request_id = ?response.request.request_id,
        resident_id = response.request.resident_id,
        total_price = %response.request.total_price,
        "Created request"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/requests`.
async fn handle_list_requests(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<ListRequestsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListRequestsResponse = list_requests(&mut persistence, &query, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/requests/{id}`.
async fn handle_get_request(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestInfo = get_request(&mut persistence, request_id, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/requests/{id}/history`.
async fn handle_get_request_history(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestHistoryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestHistoryResponse =
        get_request_history(&mut persistence, request_id, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

fn log_transition(response: &RequestTransitionResponse) {
    info!(
        request_id = ?response.request.request_id,
        status = %response.request.status,
        version = response.request.version,
        event_id = response.audit_event_id,
        "{}",
        response.message
    );
}

/// Handler for POST `/requests/{id}/assign`.
async fn handle_assign_collector(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
    Json(req): Json<AssignCollectorRequest>,
) -> Result<Json<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse = assign_collector(
        &mut persistence,
        &app_state.settings,
        request_id,
        req,
        &actor,
        cause,
    )?;
    drop(persistence);

    log_transition(&response);
    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/reassign`.
async fn handle_reassign_collector(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
    Json(req): Json<AssignCollectorRequest>,
) -> Result<Json<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse = reassign_collector(
        &mut persistence,
        &app_state.settings,
        request_id,
        req,
        &actor,
        cause,
    )?;
    drop(persistence);

    log_transition(&response);
    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/complete`.
async fn handle_complete_request(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse = complete_request(
        &mut persistence,
        &app_state.settings,
        request_id,
        &actor,
        cause,
    )?;
    drop(persistence);

    log_transition(&response);
    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/cancel`.
async fn handle_cancel_request(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
) -> Result<Json<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse = cancel_request(
        &mut persistence,
        &app_state.settings,
        request_id,
        &actor,
        cause,
    )?;
    drop(persistence);

    log_transition(&response);
    Ok(Json(response))
}

/// Handler for POST `/requests/{id}/payment`.
async fn handle_confirm_payment(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<RequestTransitionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestTransitionResponse = confirm_payment(
        &mut persistence,
        &app_state.settings,
        request_id,
        req,
        &actor,
        cause,
    )?;
    drop(persistence);

    log_transition(&response);
    Ok(Json(response))
}

/// Handler for DELETE `/requests/{id}`.
async fn handle_delete_request(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Path(request_id): Path<i64>,
) -> Result<Json<DeleteRequestResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: DeleteRequestResponse = delete_request(
        &mut persistence,
        &app_state.settings,
        request_id,
        &actor,
        cause,
    )?;
    drop(persistence);

    info!(
        request_id,
        event_id = response.audit_event_id,
        "Deleted request"
    );
    Ok(Json(response))
}

// ============================================================================
// Collections & invoices
// ============================================================================

/// Handler for POST `/collections`.
async fn handle_record_collection(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Json(req): Json<RecordCollectionRequest>,
) -> Result<Created<RecordCollectionResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RecordCollectionResponse =
        record_collection(&mut persistence, &app_state.settings, &req, &actor, cause)?;
    drop(persistence);

    info!(
        record_id = ?response.record.record_id,
        collector_id = response.record.collector_id,
        resident_id = response.record.resident_id,
        total_weight_kg = %response.record.total_weight_kg,
        "Recorded collection"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for GET `/collections`.
async fn handle_list_collections(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Query(query): Query<ListCollectionsQuery>,
) -> Result<Json<ListCollectionRecordsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListCollectionRecordsResponse =
        list_collection_records(&mut persistence, &query, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for POST `/invoices`.
async fn handle_generate_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, cause }: Identity,
    Json(req): Json<GenerateInvoiceRequest>,
) -> Result<Json<GenerateInvoiceResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: GenerateInvoiceResponse =
        generate_invoice(&mut persistence, &app_state.settings, req, &actor, cause)?;
    drop(persistence);

    info!(
        invoice_id = ?response.invoice.invoice_id,
        resident_id = response.invoice.resident_id,
        total_amount = %response.invoice.total_amount,
        replaced = response.replaced,
        "Generated invoice"
    );
    Ok(Json(response))
}

/// Handler for GET `/invoices`.
async fn handle_list_invoices(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Query(query): Query<ListInvoicesQuery>,
) -> Result<Json<ListInvoicesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListInvoicesResponse = list_invoices(&mut persistence, query, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/invoices/{id}`.
async fn handle_get_invoice(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Path(invoice_id): Path<i64>,
) -> Result<Json<InvoiceInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: InvoiceInfo = get_invoice(&mut persistence, invoice_id, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

// ============================================================================
// Rates, analytics & audit
// ============================================================================

/// Handler for GET `/rates`. Open to any registered member.
async fn handle_get_rates(
    AxumState(app_state): AxumState<AppState>,
    _identity: Identity,
) -> Json<RateTableResponse> {
    Json(get_rate_table(&app_state.settings))
}

/// Handler for GET `/analytics/requests`.
async fn handle_request_summary(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
) -> Result<Json<RequestSummaryResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestSummaryResponse = request_summary(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/analytics/categories`.
async fn handle_category_statistics(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
) -> Result<Json<CategoryStatisticsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CategoryStatisticsResponse = category_statistics(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/analytics/monthly`.
async fn handle_requests_per_month(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
) -> Result<Json<RequestsPerMonthResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: RequestsPerMonthResponse = requests_per_month(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/analytics/collectors`.
async fn handle_collector_workload(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
) -> Result<Json<CollectorWorkloadResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CollectorWorkloadResponse = collector_workload(&mut persistence, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Handler for GET `/audit/event/{event_id}`.
async fn handle_get_audit_event(
    AxumState(app_state): AxumState<AppState>,
    Identity { actor, .. }: Identity,
    Path(event_id): Path<i64>,
) -> Result<Json<AuditEventInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: AuditEventInfo = get_audit_event(&mut persistence, event_id, &actor)?;
    drop(persistence);
    Ok(Json(response))
}

/// Builds the application router with all endpoints.
pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/members",
            post(handle_register_member).get(handle_list_members),
        )
        .route(
            "/requests",
            post(handle_create_request).get(handle_list_requests),
        )
        .route(
            "/requests/{id}",
            get(handle_get_request).delete(handle_delete_request),
        )
        .route("/requests/{id}/history", get(handle_get_request_history))
        .route("/requests/{id}/assign", post(handle_assign_collector))
        .route("/requests/{id}/reassign", post(handle_reassign_collector))
        .route("/requests/{id}/complete", post(handle_complete_request))
        .route("/requests/{id}/cancel", post(handle_cancel_request))
        .route("/requests/{id}/payment", post(handle_confirm_payment))
        .route(
            "/collections",
            post(handle_record_collection).get(handle_list_collections),
        )
        .route(
            "/invoices",
            post(handle_generate_invoice).get(handle_list_invoices),
        )
        .route("/invoices/{id}", get(handle_get_invoice))
        .route("/rates", get(handle_get_rates))
        .route("/analytics/requests", get(handle_request_summary))
        .route("/analytics/categories", get(handle_category_statistics))
        .route("/analytics/monthly", get(handle_requests_per_month))
        .route("/analytics/collectors", get(handle_collector_workload))
        .route("/audit/event/{event_id}", get(handle_get_audit_event))
        .with_state(app_state)
}
