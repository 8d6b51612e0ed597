// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every state-changing handler follows the same sequence: authenticate
//! (done by the caller), authorize, load the current state, apply the core
//! transition, persist the result together with its audit event, and
//! translate the outcome into a response.

use rust_decimal::Decimal;
use std::str::FromStr;
use time::OffsetDateTime;
use tracing::debug;
use waste_billing::{
    BillingContext, CollectionResult, Command, InvoiceResult, MemberResult, TransitionResult,
    apply, apply_create_request, apply_generate_invoice, apply_record_collection,
    apply_register_member,
};
use waste_billing_audit::{Actor, AuditEvent, Cause};
use waste_billing_domain::{
    CollectionRecord, DomainError, Invoice, InvoicePeriod, Member, RequestStatus, Role,
    WasteCategory, WasteRequest, WeightEntry, parse_weight, whole_seconds,
};
use waste_billing_persistence::{
    CollectionFilter, Persisted, Persistence, PersistenceError, RequestFilter, RequestSummary,
    StatusHistoryEntry,
};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AssignCollectorRequest, AuditEventInfo, CategoryStatisticInfo, CategoryStatisticsResponse,
    CollectionRecordInfo, CollectorWorkloadResponse, ConfirmPaymentRequest, CreateRequestRequest,
    DeleteRequestResponse, GenerateInvoiceRequest, GenerateInvoiceResponse, InvoiceInfo,
    ListCollectionRecordsResponse, ListCollectionsQuery, ListInvoicesQuery, ListInvoicesResponse,
    ListMembersQuery, ListMembersResponse, ListRequestsQuery, ListRequestsResponse, MemberInfo,
    RateInfo, RateTableResponse, RecordCollectionRequest, RecordCollectionResponse,
    RegisterMemberRequest, RegisterMemberResponse, RequestHistoryResponse, RequestInfo,
    RequestSummaryResponse, RequestTransitionResponse, RequestsPerMonthResponse,
    WeightEntryRequest, format_amount,
};
use crate::settings::BillingSettings;

fn now() -> OffsetDateTime {
    whole_seconds(OffsetDateTime::now_utc())
}

fn message_of(event: &AuditEvent) -> String {
    event
        .action
        .details
        .clone()
        .unwrap_or_else(|| event.action.name.clone())
}

/// Builds the core context holding the members a command refers to.
fn load_context(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    member_ids: &[i64],
) -> Result<BillingContext, ApiError> {
    let members: Vec<Member> = persistence
        .find_members(member_ids)
        .map_err(translate_persistence_error)?;
    Ok(BillingContext::new(
        settings.rate_table.clone(),
        settings.completion_policy,
        members,
    ))
}

/// Translates submitted items into weight entries.
///
/// Weights may be JSON numbers or decimal strings. Anything else is an
/// invalid weight.
///
/// # Errors
///
/// Returns `UnknownCategory` or `InvalidWeight` violations.
pub fn parse_entries(items: &[WeightEntryRequest]) -> Result<Vec<WeightEntry>, ApiError> {
    items
        .iter()
        .map(|item| {
            let category: WasteCategory =
                WasteCategory::from_str(&item.category).map_err(translate_domain_error)?;
            let weight_kg: Decimal = match &item.weight_kg {
                serde_json::Value::Number(number) => parse_weight(&number.to_string()),
                serde_json::Value::String(text) => parse_weight(text),
                other => Err(DomainError::InvalidWeight {
                    value: other.to_string(),
                    reason: String::from("weight must be a number"),
                }),
            }
            .map_err(translate_domain_error)?;
            Ok(WeightEntry::new(category, weight_kg))
        })
        .collect()
}

fn parse_optional<T>(raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    raw.map(T::from_str)
        .transpose()
        .map_err(translate_domain_error)
}

fn load_request(persistence: &mut Persistence, request_id: i64) -> Result<WasteRequest, ApiError> {
    persistence
        .get_request(request_id)
        .map_err(translate_persistence_error)
}

/// Applies a lifecycle command to a stored request and persists it.
///
/// `authorize` sees the request as currently stored.
fn transition_request<F>(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    command: Command,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
    authorize: F,
) -> Result<Persisted<WasteRequest>, ApiError>
where
    F: FnOnce(&AuthenticatedActor, &WasteRequest) -> Result<(), AuthError>,
{
    let request: WasteRequest = load_request(persistence, request_id)?;
    authorize(authenticated_actor, &request)?;

    let mut member_ids: Vec<i64> = vec![request.resident_id];
    if let Command::AssignCollector { collector_id } | Command::ReassignCollector { collector_id } =
        &command
    {
        member_ids.push(*collector_id);
    }
    let context: BillingContext = load_context(persistence, settings, &member_ids)?;

    let timestamp: OffsetDateTime = now();
    let result: TransitionResult = apply(
        &context,
        &request,
        command,
        authenticated_actor.to_audit_actor(),
        cause,
        timestamp,
    )
    .map_err(translate_core_error)?;

    persistence
        .persist_request_transition(&result, timestamp)
        .map_err(translate_persistence_error)
}

fn transition_response(
    persisted: &Persisted<WasteRequest>,
    message: String,
) -> RequestTransitionResponse {
    RequestTransitionResponse {
        request: RequestInfo::from(&persisted.value),
        audit_event_id: persisted.event_id,
        message,
    }
}

// ============================================================================
// Members
// ============================================================================

/// Registers the initial administrator when the directory is empty.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `display_name` - Display name of the administrator
///
/// # Returns
///
/// The new administrator, or `None` if members already exist.
///
/// # Errors
///
/// Returns an error if the name is invalid or persistence fails.
pub fn bootstrap_admin(
    persistence: &mut Persistence,
    display_name: &str,
) -> Result<Option<MemberInfo>, ApiError> {
    let existing: i64 = persistence
        .count_members()
        .map_err(translate_persistence_error)?;
    if existing > 0 {
        debug!(existing, "Member directory already populated");
        return Ok(None);
    }

    let result: MemberResult = apply_register_member(
        Command::RegisterMember {
            display_name: display_name.to_string(),
            role: Role::Admin,
        },
        Actor::system(),
        Cause::new(String::from("startup"), String::from("Bootstrap administrator")),
    )
    .map_err(translate_core_error)?;

    let persisted: Persisted<Member> = persistence
        .persist_member(&result, now())
        .map_err(translate_persistence_error)?;
    Ok(Some(MemberInfo::from(&persisted.value)))
}

/// Registers a new member.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `request` - The registration request
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `cause` - The cause for this action
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - The role or display name is invalid
/// - Database operations fail
pub fn register_member(
    persistence: &mut Persistence,
    request: RegisterMemberRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RegisterMemberResponse, ApiError> {
    AuthorizationService::authorize_register_member(authenticated_actor)?;

    let role: Role = Role::from_str(&request.role).map_err(translate_domain_error)?;
    let result: MemberResult = apply_register_member(
        Command::RegisterMember {
            display_name: request.display_name,
            role,
        },
        authenticated_actor.to_audit_actor(),
        cause,
    )
    .map_err(translate_core_error)?;

    let persisted: Persisted<Member> = persistence
        .persist_member(&result, now())
        .map_err(translate_persistence_error)?;

    Ok(RegisterMemberResponse {
        message: format!(
            "Registered {} '{}'",
            persisted.value.role, persisted.value.display_name
        ),
        member: MemberInfo::from(&persisted.value),
        audit_event_id: persisted.event_id,
    })
}

/// Lists members, optionally by role.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator, the role filter
/// is invalid, or the query fails.
pub fn list_members(
    persistence: &mut Persistence,
    query: &ListMembersQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListMembersResponse, ApiError> {
    AuthorizationService::authorize_list_members(authenticated_actor)?;

    let role: Option<Role> = parse_optional(query.role.as_deref())?;
    let members: Vec<Member> = persistence
        .list_members(role)
        .map_err(translate_persistence_error)?;

    Ok(ListMembersResponse {
        members: members.iter().map(MemberInfo::from).collect(),
    })
}

// ============================================================================
// Request lifecycle
// ============================================================================

/// Creates a pickup request.
///
/// Residents file for themselves; administrators must name the resident.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not file for this resident
/// - The resident does not exist
/// - Any item is invalid, or no item has a positive weight
/// - Database operations fail
pub fn create_request(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request: &CreateRequestRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let resident_id: i64 = request.resident_id.unwrap_or(authenticated_actor.member_id);
    AuthorizationService::authorize_create_request(authenticated_actor, resident_id)?;

    let entries: Vec<WeightEntry> = parse_entries(&request.items)?;
    let context: BillingContext = load_context(persistence, settings, &[resident_id])?;

    let timestamp: OffsetDateTime = now();
    let result: TransitionResult = apply_create_request(
        &context,
        Command::CreateRequest {
            resident_id,
            entries,
        },
        authenticated_actor.to_audit_actor(),
        cause,
        timestamp,
    )
    .map_err(translate_core_error)?;

    let message: String = message_of(&result.audit_event);
    let persisted: Persisted<WasteRequest> = persistence
        .persist_request_transition(&result, timestamp)
        .map_err(translate_persistence_error)?;
    Ok(transition_response(&persisted, message))
}

/// Assigns a collector to a pending request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - The request or collector does not exist
/// - The request is not pending
/// - The request changed concurrently
pub fn assign_collector(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    request: AssignCollectorRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::AssignCollector {
            collector_id: request.collector_id,
        },
        authenticated_actor,
        cause,
        |actor, _| AuthorizationService::authorize_assign(actor),
    )?;
    Ok(transition_response(
        &persisted,
        format!(
            "Assigned collector {} to request {request_id}",
            request.collector_id
        ),
    ))
}

/// Replaces the collector of an assigned request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - The request or collector does not exist
/// - The request is not assigned
/// - The request changed concurrently
pub fn reassign_collector(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    request: AssignCollectorRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::ReassignCollector {
            collector_id: request.collector_id,
        },
        authenticated_actor,
        cause,
        |actor, _| AuthorizationService::authorize_assign(actor),
    )?;
    Ok(transition_response(
        &persisted,
        format!(
            "Reassigned request {request_id} to collector {}",
            request.collector_id
        ),
    ))
}

/// Completes an assigned request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither an administrator nor the assigned collector
/// - The request is not assigned
/// - Payment is required by policy and not confirmed
/// - The request changed concurrently
pub fn complete_request(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::CompleteRequest,
        authenticated_actor,
        cause,
        AuthorizationService::authorize_complete,
    )?;
    Ok(transition_response(
        &persisted,
        format!("Completed request {request_id}"),
    ))
}

/// Cancels a pending or assigned request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither an administrator nor the owning resident
/// - The request is already completed or cancelled
/// - The request changed concurrently
pub fn cancel_request(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::CancelRequest,
        authenticated_actor,
        cause,
        AuthorizationService::authorize_cancel,
    )?;
    Ok(transition_response(
        &persisted,
        format!("Cancelled request {request_id}"),
    ))
}

/// Records the external payment confirmation for a request.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither an administrator nor the owning resident
/// - Payment is already confirmed or the request is cancelled
/// - The request changed concurrently
pub fn confirm_payment(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    request: ConfirmPaymentRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RequestTransitionResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::ConfirmPayment {
            payment_reference: request.payment_reference,
        },
        authenticated_actor,
        cause,
        AuthorizationService::authorize_confirm_payment,
    )?;
    Ok(transition_response(
        &persisted,
        format!("Confirmed payment for request {request_id}"),
    ))
}

/// Deletes a completed request. Its status history is kept.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an administrator
/// - The request is not completed
/// - The request changed concurrently
pub fn delete_request(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<DeleteRequestResponse, ApiError> {
    let persisted: Persisted<WasteRequest> = transition_request(
        persistence,
        settings,
        request_id,
        Command::DeleteRequest,
        authenticated_actor,
        cause,
        |actor, _| AuthorizationService::authorize_delete(actor),
    )?;
    Ok(DeleteRequestResponse {
        request_id,
        audit_event_id: persisted.event_id,
        message: format!("Deleted request {request_id}"),
    })
}

// ============================================================================
// Request queries
// ============================================================================

/// Retrieves a request.
///
/// # Errors
///
/// Returns an error if the request does not exist or is not visible to
/// the actor.
pub fn get_request(
    persistence: &mut Persistence,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RequestInfo, ApiError> {
    let request: WasteRequest = load_request(persistence, request_id)?;
    AuthorizationService::authorize_view_request(authenticated_actor, &request)?;
    Ok(RequestInfo::from(&request))
}

/// Lists requests.
///
/// Residents see only their own requests and collectors only those
/// assigned to them; asking for anyone else's is rejected.
///
/// # Errors
///
/// Returns an error if the filter is outside the actor's scope, the status
/// filter is invalid, or the query fails.
pub fn list_requests(
    persistence: &mut Persistence,
    query: &ListRequestsQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListRequestsResponse, ApiError> {
    let mut filter: RequestFilter = RequestFilter {
        resident_id: query.resident_id,
        collector_id: query.collector_id,
        status: parse_optional::<RequestStatus>(query.status.as_deref())?,
    };

    match authenticated_actor.role {
        Role::Admin => {}
        Role::Resident => {
            if filter.resident_id.is_some_and(|id| id != authenticated_actor.member_id) {
                return Err(AuthError::Unauthorized {
                    action: String::from("list_requests"),
                    required_role: String::from("the requesting resident"),
                }
                .into());
            }
            filter.resident_id = Some(authenticated_actor.member_id);
        }
        Role::Collector => {
            if filter.collector_id.is_some_and(|id| id != authenticated_actor.member_id) {
                return Err(AuthError::Unauthorized {
                    action: String::from("list_requests"),
                    required_role: String::from("the assigned collector"),
                }
                .into());
            }
            filter.collector_id = Some(authenticated_actor.member_id);
        }
    }

    let requests: Vec<WasteRequest> = persistence
        .list_requests(&filter)
        .map_err(translate_persistence_error)?;
    Ok(ListRequestsResponse {
        requests: requests.iter().map(RequestInfo::from).collect(),
    })
}

/// Retrieves the status history of a request.
///
/// History survives deletion; the history of a deleted request is visible
/// to administrators only.
///
/// # Errors
///
/// Returns an error if the request never existed or the actor may not see it.
pub fn get_request_history(
    persistence: &mut Persistence,
    request_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RequestHistoryResponse, ApiError> {
    match persistence.get_request(request_id) {
        Ok(request) => AuthorizationService::authorize_view_request(authenticated_actor, &request)?,
        Err(PersistenceError::RequestNotFound(_)) => {
            AuthorizationService::authorize_audit(authenticated_actor)?;
        }
        Err(err) => return Err(translate_persistence_error(err)),
    }

    let history: Vec<StatusHistoryEntry> = persistence
        .get_request_history(request_id)
        .map_err(translate_persistence_error)?;
    if history.is_empty() {
        return Err(translate_persistence_error(
            PersistenceError::RequestNotFound(request_id),
        ));
    }

    Ok(RequestHistoryResponse {
        request_id,
        history,
    })
}

// ============================================================================
// Collections
// ============================================================================

/// Records an ad-hoc collection.
///
/// Collectors record as themselves; administrators must name the collector.
///
/// # Errors
///
/// Returns an error if:
/// - The actor may not record for this collector
/// - The collector or resident does not exist
/// - There are no items or any weight is not above zero
/// - Database operations fail
pub fn record_collection(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request: &RecordCollectionRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<RecordCollectionResponse, ApiError> {
    let collector_id: i64 = request.collector_id.unwrap_or(authenticated_actor.member_id);
    AuthorizationService::authorize_record_collection(authenticated_actor, collector_id)?;

    let entries: Vec<WeightEntry> = parse_entries(&request.items)?;
    let context: BillingContext =
        load_context(persistence, settings, &[collector_id, request.resident_id])?;

    let timestamp: OffsetDateTime = now();
    let result: CollectionResult = apply_record_collection(
        &context,
        Command::RecordCollection {
            collector_id,
            resident_id: request.resident_id,
            entries,
        },
        authenticated_actor.to_audit_actor(),
        cause,
        timestamp,
    )
    .map_err(translate_core_error)?;

    let message: String = message_of(&result.audit_event);
    let persisted: Persisted<CollectionRecord> = persistence
        .persist_collection(&result, timestamp)
        .map_err(translate_persistence_error)?;

    Ok(RecordCollectionResponse {
        record: CollectionRecordInfo::from(&persisted.value),
        audit_event_id: persisted.event_id,
        message,
    })
}

/// Lists collection records.
///
/// Collectors see their own records and residents the records collected
/// from them.
///
/// # Errors
///
/// Returns an error if the filter is outside the actor's scope, the
/// category is unknown, or the query fails.
pub fn list_collection_records(
    persistence: &mut Persistence,
    query: &ListCollectionsQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListCollectionRecordsResponse, ApiError> {
    let mut filter: CollectionFilter = CollectionFilter {
        collector_id: query.collector_id,
        resident_id: query.resident_id,
        category: parse_optional::<WasteCategory>(query.category.as_deref())?,
        from: query.from,
        to: query.to,
    };

    match authenticated_actor.role {
        Role::Admin => {}
        Role::Collector => {
            if filter.collector_id.is_some_and(|id| id != authenticated_actor.member_id) {
                return Err(AuthError::Unauthorized {
                    action: String::from("list_collections"),
                    required_role: String::from("the collecting collector"),
                }
                .into());
            }
            filter.collector_id = Some(authenticated_actor.member_id);
        }
        Role::Resident => {
            if filter.resident_id.is_some_and(|id| id != authenticated_actor.member_id) {
                return Err(AuthError::Unauthorized {
                    action: String::from("list_collections"),
                    required_role: String::from("the resident collected from"),
                }
                .into());
            }
            filter.resident_id = Some(authenticated_actor.member_id);
        }
    }

    let records: Vec<CollectionRecord> = persistence
        .list_collection_records(&filter)
        .map_err(translate_persistence_error)?;
    Ok(ListCollectionRecordsResponse {
        records: records.iter().map(CollectionRecordInfo::from).collect(),
    })
}

// ============================================================================
// Invoices
// ============================================================================

/// Generates, or regenerates, a resident's invoice for a period.
///
/// The invoice is built from the resident's collection records within
/// `[period_start, period_end)` and replaces any earlier invoice for the
/// same period.
///
/// # Errors
///
/// Returns an error if:
/// - The actor is neither an administrator nor the billed resident
/// - The period is empty, reversed or has sub-second bounds
/// - The resident does not exist
/// - Database operations fail
pub fn generate_invoice(
    persistence: &mut Persistence,
    settings: &BillingSettings,
    request: GenerateInvoiceRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: Cause,
) -> Result<GenerateInvoiceResponse, ApiError> {
    AuthorizationService::authorize_invoice_access(authenticated_actor, request.resident_id)?;

    let period: InvoicePeriod = InvoicePeriod::new(request.period_start, request.period_end)
        .map_err(translate_domain_error)?;
    let context: BillingContext = load_context(persistence, settings, &[request.resident_id])?;

    let records: Vec<CollectionRecord> = persistence
        .list_collection_records(&CollectionFilter {
            resident_id: Some(request.resident_id),
            from: Some(period.start()),
            to: Some(period.end()),
            ..CollectionFilter::default()
        })
        .map_err(translate_persistence_error)?;
    let previous: Option<Invoice> = persistence
        .find_invoice_for_period(request.resident_id, &period)
        .map_err(translate_persistence_error)?;

    let timestamp: OffsetDateTime = now();
    let result: InvoiceResult = apply_generate_invoice(
        &context,
        &records,
        previous.as_ref(),
        Command::GenerateInvoice {
            resident_id: request.resident_id,
            period,
        },
        authenticated_actor.to_audit_actor(),
        cause,
        timestamp,
    )
    .map_err(translate_core_error)?;

    let message: String = message_of(&result.audit_event);
    let persisted: Persisted<Invoice> = persistence
        .persist_invoice(&result, timestamp)
        .map_err(translate_persistence_error)?;

    Ok(GenerateInvoiceResponse {
        invoice: InvoiceInfo::from(&persisted.value),
        replaced: previous.is_some(),
        audit_event_id: persisted.event_id,
        message,
    })
}

/// Lists invoices.
///
/// Residents see their own invoices; collectors see none.
///
/// # Errors
///
/// Returns an error if the filter is outside the actor's scope or the
/// query fails.
pub fn list_invoices(
    persistence: &mut Persistence,
    query: ListInvoicesQuery,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListInvoicesResponse, ApiError> {
    let resident_id: Option<i64> = if authenticated_actor.is_admin() {
        query.resident_id
    } else {
        let resident_id: i64 = query.resident_id.unwrap_or(authenticated_actor.member_id);
        AuthorizationService::authorize_invoice_access(authenticated_actor, resident_id)?;
        Some(resident_id)
    };

    let invoices: Vec<Invoice> = persistence
        .list_invoices(resident_id)
        .map_err(translate_persistence_error)?;
    Ok(ListInvoicesResponse {
        invoices: invoices.iter().map(InvoiceInfo::from).collect(),
    })
}

/// Retrieves an invoice.
///
/// # Errors
///
/// Returns an error if the invoice does not exist or belongs to someone
/// else.
pub fn get_invoice(
    persistence: &mut Persistence,
    invoice_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<InvoiceInfo, ApiError> {
    let invoice: Invoice = persistence
        .get_invoice(invoice_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_invoice_access(authenticated_actor, invoice.resident_id)?;
    Ok(InvoiceInfo::from(&invoice))
}

// ============================================================================
// Rates, analytics & audit
// ============================================================================

/// Describes the active tariff and completion policy.
#[must_use]
pub fn get_rate_table(settings: &BillingSettings) -> RateTableResponse {
    RateTableResponse {
        rates: settings
            .rate_table
            .entries()
            .map(|(category, rate)| RateInfo {
                category: category.as_str().to_string(),
                rate_per_kg: format_amount(rate),
            })
            .collect(),
        completion_policy: settings.completion_policy.as_str().to_string(),
    }
}

/// Request counts per status and revenue of non-cancelled requests.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the query fails.
pub fn request_summary(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RequestSummaryResponse, ApiError> {
    AuthorizationService::authorize_analytics(authenticated_actor)?;

    let summary: RequestSummary = persistence
        .request_summary()
        .map_err(translate_persistence_error)?;
    Ok(RequestSummaryResponse {
        pending: summary.pending,
        assigned: summary.assigned,
        completed: summary.completed,
        cancelled: summary.cancelled,
        total: summary.total,
        total_revenue: format_amount(summary.total_revenue),
    })
}

/// Collected weight and amount per category.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the query fails.
pub fn category_statistics(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CategoryStatisticsResponse, ApiError> {
    AuthorizationService::authorize_analytics(authenticated_actor)?;

    let categories: Vec<CategoryStatisticInfo> = persistence
        .category_statistics()
        .map_err(translate_persistence_error)?
        .iter()
        .map(CategoryStatisticInfo::from)
        .collect();
    Ok(CategoryStatisticsResponse { categories })
}

/// Requests created per calendar month.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the query fails.
pub fn requests_per_month(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RequestsPerMonthResponse, ApiError> {
    AuthorizationService::authorize_analytics(authenticated_actor)?;

    Ok(RequestsPerMonthResponse {
        months: persistence
            .requests_per_month()
            .map_err(translate_persistence_error)?,
    })
}

/// Assigned and completed requests per collector.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the query fails.
pub fn collector_workload(
    persistence: &mut Persistence,
    authenticated_actor: &AuthenticatedActor,
) -> Result<CollectorWorkloadResponse, ApiError> {
    AuthorizationService::authorize_analytics(authenticated_actor)?;

    Ok(CollectorWorkloadResponse {
        collectors: persistence
            .collector_workload()
            .map_err(translate_persistence_error)?,
    })
}

/// Retrieves an audit event.
///
/// # Errors
///
/// Returns an error if the actor is not an administrator or the event
/// does not exist.
pub fn get_audit_event(
    persistence: &mut Persistence,
    event_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<AuditEventInfo, ApiError> {
    AuthorizationService::authorize_audit(authenticated_actor)?;

    let event: AuditEvent = persistence
        .get_audit_event(event_id)
        .map_err(translate_persistence_error)?;
    Ok(AuditEventInfo::from(&event))
}
