// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{
    BillingContext, CollectionResult, InvoiceResult, MemberResult, RequestChange,
    TransitionResult,
};
use serde::Serialize;
use time::OffsetDateTime;
use waste_billing_audit::{
    Action, Actor, AuditEvent, AuditSubject, Cause, StateSnapshot, SubjectKind,
};
use waste_billing_domain::{
    CollectionRecord, DomainError, Invoice, Member, PaymentStatus, RequestAction, RequestStatus,
    WasteItem, WasteRequest, aggregate_invoice, price_entries, validate_display_name,
    whole_seconds,
};

/// Serializes an entity for the audit trail.
fn snapshot_of<T: Serialize>(entity: &T) -> Result<StateSnapshot, CoreError> {
    serde_json::to_string(entity)
        .map(StateSnapshot::new)
        .map_err(|e| CoreError::SnapshotFailed(e.to_string()))
}

fn not_applicable(command: &Command, handler: &str) -> CoreError {
    CoreError::CommandNotApplicable {
        command: command.name().to_string(),
        handler: handler.to_string(),
    }
}

/// Applies a `RegisterMember` command.
///
/// # Arguments
///
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the display name is invalid or the command is not
/// `RegisterMember`.
pub fn apply_register_member(
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<MemberResult, CoreError> {
    let Command::RegisterMember { display_name, role } = command else {
        return Err(not_applicable(&command, "apply_register_member"));
    };

    let display_name: String = display_name.trim().to_string();
    validate_display_name(&display_name)?;

    let member: Member = Member::new(display_name, role);
    let action: Action = Action::new(
        String::from("RegisterMember"),
        Some(format!(
            "Registered {} '{}'",
            member.role, member.display_name
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::absent(),
        snapshot_of(&member)?,
        AuditSubject::new(SubjectKind::Member, None),
    );

    Ok(MemberResult {
        member,
        audit_event,
    })
}

/// Applies a `CreateRequest` command.
///
/// Items are priced against the context's rate table and the rates are
/// snapshotted onto the request.
///
/// # Arguments
///
/// * `context` - Rates, policy and the referenced members
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The creation time
///
/// # Errors
///
/// Returns an error if:
/// - The resident does not exist
/// - Any item has an unknown category or negative weight
/// - There are no items or no item has a positive weight
pub fn apply_create_request(
    context: &BillingContext,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let Command::CreateRequest {
        resident_id,
        entries,
    } = command
    else {
        return Err(not_applicable(&command, "apply_create_request"));
    };

    context.require_resident(resident_id)?;
    let items: Vec<WasteItem> = price_entries(&context.rate_table, &entries)?;
    let request: WasteRequest = WasteRequest::new(resident_id, items, whole_seconds(now))?;

    let action: Action = Action::new(
        String::from("CreateRequest"),
        Some(format!(
            "Created request for resident {resident_id} with {} item(s) totalling {}",
            request.items.len(),
            request.total_price()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::absent(),
        snapshot_of(&request)?,
        AuditSubject::new(SubjectKind::Request, None),
    );

    Ok(TransitionResult {
        change: RequestChange::Created(request),
        audit_event,
    })
}

/// Applies a lifecycle command to an existing request.
///
/// Handles `AssignCollector`, `ReassignCollector`, `CompleteRequest`,
/// `CancelRequest`, `DeleteRequest` and `ConfirmPayment`. Every update
/// increments the request version by one.
///
/// # Arguments
///
/// * `context` - Rates, policy and the referenced members
/// * `request` - The current request (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The transition time
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the change and audit event
/// * `Err(CoreError)` if the command is invalid for the request
///
/// # Errors
///
/// Returns an error if:
/// - The request status does not permit the action
/// - The target collector does not exist
/// - The completion policy requires payment and the request is unpaid
/// - Payment was already confirmed or the request is cancelled
#[allow(clippy::too_many_lines)]
pub fn apply(
    context: &BillingContext,
    request: &WasteRequest,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let request_id: i64 = request.id()?;
    let mut updated: WasteRequest = request.clone();

    let details: String = match &command {
        Command::AssignCollector { collector_id } => {
            updated.status = request.status.next_status(RequestAction::Assign)?;
            context.require_collector(*collector_id)?;
            updated.assigned_collector_id = Some(*collector_id);
            format!("Assigned collector {collector_id} to request {request_id}")
        }
        Command::ReassignCollector { collector_id } => {
            updated.status = request.status.next_status(RequestAction::Reassign)?;
            context.require_collector(*collector_id)?;
            updated.assigned_collector_id = Some(*collector_id);
            match request.assigned_collector_id {
                Some(previous) => format!(
                    "Reassigned request {request_id} from collector {previous} to collector {collector_id}"
                ),
                None => format!("Reassigned request {request_id} to collector {collector_id}"),
            }
        }
        Command::CompleteRequest => {
            updated.status = request.status.next_status(RequestAction::Complete)?;
            context
                .completion_policy
                .check_completion(request_id, request.payment_status)?;
            updated.completed_at = Some(whole_seconds(now));
            format!("Completed request {request_id}")
        }
        Command::CancelRequest => {
            updated.status = request.status.next_status(RequestAction::Cancel)?;
            format!("Cancelled request {request_id}")
        }
        Command::DeleteRequest => {
            request.status.next_status(RequestAction::Delete)?;
            let action: Action = Action::new(
                String::from("DeleteRequest"),
                Some(format!("Deleted completed request {request_id}")),
            );
            let audit_event: AuditEvent = AuditEvent::new(
                actor,
                cause,
                action,
                snapshot_of(request)?,
                StateSnapshot::absent(),
                AuditSubject::new(SubjectKind::Request, Some(request_id)),
            );
            return Ok(TransitionResult {
                change: RequestChange::Deleted(request.clone()),
                audit_event,
            });
        }
        Command::ConfirmPayment { payment_reference } => {
            if request.status == RequestStatus::Cancelled {
                return Err(DomainError::PaymentNotAccepted {
                    request_id,
                    status: request.status.to_string(),
                }
                .into());
            }
            if request.payment_status == PaymentStatus::Paid {
                return Err(DomainError::PaymentAlreadyConfirmed { request_id }.into());
            }
            updated.payment_status = PaymentStatus::Paid;
            match payment_reference {
                Some(reference) => {
                    format!("Confirmed payment for request {request_id} (reference {reference})")
                }
                None => format!("Confirmed payment for request {request_id}"),
            }
        }
        _ => return Err(not_applicable(&command, "apply")),
    };

    updated.version = request.version + 1;

    let action: Action = Action::new(command.name().to_string(), Some(details));
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        snapshot_of(request)?,
        snapshot_of(&updated)?,
        AuditSubject::new(SubjectKind::Request, Some(request_id)),
    );

    Ok(TransitionResult {
        change: RequestChange::Updated {
            previous: request.clone(),
            current: updated,
        },
        audit_event,
    })
}

/// Applies a `RecordCollection` command.
///
/// # Arguments
///
/// * `context` - Rates, policy and the referenced members
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The collection time
///
/// # Errors
///
/// Returns an error if:
/// - The collector or resident does not exist
/// - There are no items, or any item has an unknown category or a
///   weight that is not positive
pub fn apply_record_collection(
    context: &BillingContext,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CollectionResult, CoreError> {
    let Command::RecordCollection {
        collector_id,
        resident_id,
        entries,
    } = command
    else {
        return Err(not_applicable(&command, "apply_record_collection"));
    };

    context.require_collector(collector_id)?;
    context.require_resident(resident_id)?;
    let items: Vec<WasteItem> = price_entries(&context.rate_table, &entries)?;
    let record: CollectionRecord =
        CollectionRecord::new(collector_id, resident_id, items, whole_seconds(now))?;

    let action: Action = Action::new(
        String::from("RecordCollection"),
        Some(format!(
            "Collector {collector_id} collected {} kg from resident {resident_id}",
            record.total_weight_kg()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::absent(),
        snapshot_of(&record)?,
        AuditSubject::new(SubjectKind::CollectionRecord, None),
    );

    Ok(CollectionResult {
        record,
        audit_event,
    })
}

/// Applies a `GenerateInvoice` command.
///
/// The invoice is aggregated from the given collection records; records of
/// other residents or outside the period are ignored. Regenerating over the
/// same records yields the same lines and totals.
///
/// # Arguments
///
/// * `context` - Rates, policy and the referenced members
/// * `records` - Candidate collection records
/// * `previous` - The invoice this one replaces, if any
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The generation time
///
/// # Errors
///
/// Returns an error if the resident does not exist or the invoice totals
/// overflow.
pub fn apply_generate_invoice(
    context: &BillingContext,
    records: &[CollectionRecord],
    previous: Option<&Invoice>,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<InvoiceResult, CoreError> {
    let Command::GenerateInvoice {
        resident_id,
        period,
    } = command
    else {
        return Err(not_applicable(&command, "apply_generate_invoice"));
    };

    context.require_resident(resident_id)?;
    let mut invoice: Invoice =
        aggregate_invoice(resident_id, period, records, whole_seconds(now))?;
    invoice.invoice_id = previous.and_then(|existing| existing.invoice_id);

    let before: StateSnapshot = match previous {
        Some(existing) => snapshot_of(existing)?,
        None => StateSnapshot::absent(),
    };
    let action: Action = Action::new(
        String::from("GenerateInvoice"),
        Some(format!(
            "Generated invoice for resident {resident_id} with {} categor(ies) totalling {}",
            invoice.waste_details.len(),
            invoice.total_amount()
        )),
    );
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        before,
        snapshot_of(&invoice)?,
        AuditSubject::new(SubjectKind::Invoice, invoice.invoice_id),
    );

    Ok(InvoiceResult {
        invoice,
        audit_event,
    })
}
