// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API layer for the waste billing engine.
//!
//! This crate sits between transports and the core. It authenticates and
//! authorizes members, translates request DTOs into core commands, drives
//! persistence, and translates every lower-level error into [`ApiError`].
//!
//! Handlers are plain functions over a `&mut Persistence`; transports are
//! responsible for serializing access to it.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod request_response;
mod settings;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    assign_collector, bootstrap_admin, cancel_request, category_statistics, collector_workload,
    complete_request, confirm_payment, create_request, delete_request, generate_invoice,
    get_audit_event, get_invoice, get_rate_table, get_request, get_request_history,
    list_collection_records, list_invoices, list_members, list_requests, parse_entries,
    reassign_collector, record_collection, register_member, request_summary, requests_per_month,
};
pub use request_response::{
    AssignCollectorRequest, AuditEventInfo, CategoryStatisticInfo, CategoryStatisticsResponse,
    CollectionRecordInfo, CollectorWorkloadResponse, ConfirmPaymentRequest, CreateRequestRequest,
    DeleteRequestResponse, GenerateInvoiceRequest, GenerateInvoiceResponse, InvoiceInfo,
    InvoiceLineInfo, ListCollectionRecordsResponse, ListCollectionsQuery, ListInvoicesQuery,
    ListInvoicesResponse, ListMembersQuery, ListMembersResponse, ListRequestsQuery,
    ListRequestsResponse, MemberInfo, RateInfo, RateTableResponse, RecordCollectionRequest,
    RecordCollectionResponse, RegisterMemberRequest, RegisterMemberResponse,
    RequestHistoryResponse, RequestInfo, RequestSummaryResponse, RequestTransitionResponse,
    RequestsPerMonthResponse, WasteItemInfo, WeightEntryRequest, format_amount, format_weight,
};
pub use settings::BillingSettings;
