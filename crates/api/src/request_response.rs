// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Money amounts are rendered as decimal strings rounded to two places.
//! Weights are rendered at full precision.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use waste_billing_audit::AuditEvent;
use waste_billing_domain::{
    CollectionRecord, Invoice, InvoiceLine, Member, WasteItem, WasteRequest, round_for_display,
};
use waste_billing_persistence::{
    CategoryStatistic, CollectorWorkload, MonthlyRequestCount, StatusHistoryEntry,
};

/// Renders an amount for output.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_for_display(amount))
}

/// Renders a weight for output.
#[must_use]
pub fn format_weight(weight_kg: Decimal) -> String {
    weight_kg.normalize().to_string()
}

// ============================================================================
// Requests (inbound)
// ============================================================================

/// API request to register a member.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterMemberRequest {
    /// The member's display name.
    pub display_name: String,
    /// `resident`, `collector` or `admin`.
    pub role: String,
}

/// One category and weight as submitted by a client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WeightEntryRequest {
    /// The waste category name.
    pub category: String,
    /// A JSON number or a decimal string.
    pub weight_kg: serde_json::Value,
}

/// API request to create a pickup request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateRequestRequest {
    /// The requesting resident. Defaults to the caller.
    #[serde(default)]
    pub resident_id: Option<i64>,
    /// Line items in submission order.
    pub items: Vec<WeightEntryRequest>,
}

/// API request to assign or reassign a collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AssignCollectorRequest {
    /// The collector to assign.
    pub collector_id: i64,
}

/// API request carrying the external payment signal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ConfirmPaymentRequest {
    /// Reference issued by the payment provider, if any.
    #[serde(default)]
    pub payment_reference: Option<String>,
}

/// API request to record a collection.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordCollectionRequest {
    /// The collecting collector. Defaults to the caller.
    #[serde(default)]
    pub collector_id: Option<i64>,
    /// The resident the waste was collected from.
    pub resident_id: i64,
    /// Collected items; every weight must be above zero.
    pub items: Vec<WeightEntryRequest>,
}

/// API request to generate an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GenerateInvoiceRequest {
    /// The billed resident.
    pub resident_id: i64,
    /// Inclusive period start.
    #[serde(with = "time::serde::rfc3339")]
    pub period_start: OffsetDateTime,
    /// Exclusive period end.
    #[serde(with = "time::serde::rfc3339")]
    pub period_end: OffsetDateTime,
}

/// Query parameters for listing members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListMembersQuery {
    #[serde(default)]
    pub role: Option<String>,
}

/// Query parameters for listing requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListRequestsQuery {
    #[serde(default)]
    pub resident_id: Option<i64>,
    #[serde(default)]
    pub collector_id: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Query parameters for listing collection records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListCollectionsQuery {
    #[serde(default)]
    pub collector_id: Option<i64>,
    #[serde(default)]
    pub resident_id: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub from: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub to: Option<OffsetDateTime>,
}

/// Query parameters for listing invoices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ListInvoicesQuery {
    #[serde(default)]
    pub resident_id: Option<i64>,
}

// ============================================================================
// Entities (outbound)
// ============================================================================

/// A member of the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberInfo {
    pub member_id: Option<i64>,
    pub display_name: String,
    pub role: String,
}

impl From<&Member> for MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            member_id: member.member_id,
            display_name: member.display_name.clone(),
            role: member.role.as_str().to_string(),
        }
    }
}

/// A priced line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WasteItemInfo {
    pub category: String,
    pub weight_kg: String,
    pub rate_per_kg: String,
    pub line_total: String,
}

impl From<&WasteItem> for WasteItemInfo {
    fn from(item: &WasteItem) -> Self {
        Self {
            category: item.category().as_str().to_string(),
            weight_kg: format_weight(item.weight_kg()),
            rate_per_kg: format_amount(item.rate_per_kg()),
            line_total: format_amount(item.line_total()),
        }
    }
}

/// A pickup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestInfo {
    pub request_id: Option<i64>,
    pub resident_id: i64,
    pub items: Vec<WasteItemInfo>,
    pub total_weight_kg: String,
    pub total_price: String,
    pub status: String,
    pub assigned_collector_id: Option<i64>,
    pub payment_status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
    pub version: i64,
}

impl From<&WasteRequest> for RequestInfo {
    fn from(request: &WasteRequest) -> Self {
        Self {
            request_id: request.request_id,
            resident_id: request.resident_id,
            items: request.items.iter().map(WasteItemInfo::from).collect(),
            total_weight_kg: format_weight(request.total_weight_kg()),
            total_price: format_amount(request.total_price()),
            status: request.status.as_str().to_string(),
            assigned_collector_id: request.assigned_collector_id,
            payment_status: request.payment_status.as_str().to_string(),
            created_at: request.created_at,
            completed_at: request.completed_at,
            version: request.version,
        }
    }
}

/// An immutable collection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionRecordInfo {
    pub record_id: Option<i64>,
    pub collector_id: i64,
    pub resident_id: i64,
    pub items: Vec<WasteItemInfo>,
    pub total_weight_kg: String,
    pub total_price: String,
    #[serde(with = "time::serde::rfc3339")]
    pub collected_at: OffsetDateTime,
}

impl From<&CollectionRecord> for CollectionRecordInfo {
    fn from(record: &CollectionRecord) -> Self {
        Self {
            record_id: record.record_id,
            collector_id: record.collector_id,
            resident_id: record.resident_id,
            items: record.items.iter().map(WasteItemInfo::from).collect(),
            total_weight_kg: format_weight(record.total_weight_kg()),
            total_price: format_amount(record.total_price()),
            collected_at: record.collected_at,
        }
    }
}

/// Per-category invoice line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLineInfo {
    pub category: String,
    pub total_weight_kg: String,
    pub rate_per_kg: String,
    pub amount: String,
}

impl From<&InvoiceLine> for InvoiceLineInfo {
    fn from(line: &InvoiceLine) -> Self {
        Self {
            category: line.category.as_str().to_string(),
            total_weight_kg: format_weight(line.total_weight_kg),
            rate_per_kg: format_amount(line.rate_per_kg),
            amount: format_amount(line.amount),
        }
    }
}

/// A resident's invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceInfo {
    pub invoice_id: Option<i64>,
    pub resident_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub period_start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub period_end: OffsetDateTime,
    /// Lines in category order.
    pub waste_details: Vec<InvoiceLineInfo>,
    pub total_amount: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

impl From<&Invoice> for InvoiceInfo {
    fn from(invoice: &Invoice) -> Self {
        Self {
            invoice_id: invoice.invoice_id,
            resident_id: invoice.resident_id,
            period_start: invoice.period.start(),
            period_end: invoice.period.end(),
            waste_details: invoice
                .waste_details
                .values()
                .map(InvoiceLineInfo::from)
                .collect(),
            total_amount: format_amount(invoice.total_amount()),
            generated_at: invoice.generated_at,
        }
    }
}

/// A stored audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEventInfo {
    pub event_id: Option<i64>,
    pub subject_kind: String,
    pub subject_id: Option<i64>,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action: String,
    pub details: Option<String>,
    /// JSON snapshot, empty when the subject did not exist.
    pub before: String,
    /// JSON snapshot, empty when the subject no longer exists.
    pub after: String,
}

impl From<&AuditEvent> for AuditEventInfo {
    fn from(event: &AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            subject_kind: event.subject.kind.as_str().to_string(),
            subject_id: event.subject.id,
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.clone(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            before: event.before.data.clone(),
            after: event.after.data.clone(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// API response for a member registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterMemberResponse {
    pub member: MemberInfo,
    pub audit_event_id: i64,
    pub message: String,
}

/// API response listing members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListMembersResponse {
    pub members: Vec<MemberInfo>,
}

/// API response for any request creation or transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestTransitionResponse {
    pub request: RequestInfo,
    pub audit_event_id: i64,
    pub message: String,
}

/// API response for a request deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteRequestResponse {
    pub request_id: i64,
    pub audit_event_id: i64,
    pub message: String,
}

/// API response listing requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListRequestsResponse {
    pub requests: Vec<RequestInfo>,
}

/// API response with a request's status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestHistoryResponse {
    pub request_id: i64,
    pub history: Vec<StatusHistoryEntry>,
}

/// API response for a recorded collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordCollectionResponse {
    pub record: CollectionRecordInfo,
    pub audit_event_id: i64,
    pub message: String,
}

/// API response listing collection records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListCollectionRecordsResponse {
    pub records: Vec<CollectionRecordInfo>,
}

/// API response for a generated invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateInvoiceResponse {
    pub invoice: InvoiceInfo,
    /// True if an invoice for the same period was replaced.
    pub replaced: bool,
    pub audit_event_id: i64,
    pub message: String,
}

/// API response listing invoices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListInvoicesResponse {
    pub invoices: Vec<InvoiceInfo>,
}

/// One configured rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateInfo {
    pub category: String,
    pub rate_per_kg: String,
}

/// API response describing the active tariff and completion policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateTableResponse {
    pub rates: Vec<RateInfo>,
    pub completion_policy: String,
}

/// API response with request counts per status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestSummaryResponse {
    pub pending: u64,
    pub assigned: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total: u64,
    pub total_revenue: String,
}

/// Collected totals for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatisticInfo {
    pub category: String,
    pub item_count: u64,
    pub total_weight_kg: String,
    pub total_amount: String,
}

impl From<&CategoryStatistic> for CategoryStatisticInfo {
    fn from(statistic: &CategoryStatistic) -> Self {
        Self {
            category: statistic.category.as_str().to_string(),
            item_count: statistic.item_count,
            total_weight_kg: format_weight(statistic.total_weight_kg),
            total_amount: format_amount(statistic.total_amount),
        }
    }
}

/// API response with per-category collection totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatisticsResponse {
    pub categories: Vec<CategoryStatisticInfo>,
}

/// API response with requests per month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestsPerMonthResponse {
    pub months: Vec<MonthlyRequestCount>,
}

/// API response with per-collector workload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorWorkloadResponse {
    pub collectors: Vec<CollectorWorkload>,
}
