// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request persistence.
//!
//! Updates and deletes are guarded by the version the caller read:
//! `WHERE request_id = ? AND version = ?`. Zero affected rows means the
//! request changed underneath the caller.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::{info, warn};
use waste_billing::{RequestChange, TransitionResult};
use waste_billing_audit::AuditEvent;
use waste_billing_domain::{RequestStatus, WasteRequest};

use crate::backend::PersistenceBackend;
use crate::convert::{items_to_rows, to_unix};
use crate::data_models::{ItemRow, NewRequestItem, NewRequestStatusHistory};
use crate::diesel_schema::{request_items, request_status_history, waste_requests};
use crate::error::PersistenceError;
use crate::mutations::Persisted;
use crate::mutations::audit::persist_audit_event;

/// Persists a request transition and its audit event atomically.
///
/// # Arguments
///
/// * `conn` - The active database connection
/// * `result` - The transition produced by the core
/// * `now` - Storage timestamp for the audit event and status history
///
/// # Returns
///
/// The request as stored (for deletions, the request as it was before
/// removal) and the audit event ID.
///
/// # Errors
///
/// Returns `PersistenceError::ConcurrentModification` if the stored version
/// no longer matches, `PersistenceError::RequestNotFound` if the request is
/// gone, or a database error. Nothing is written on error.
pub fn persist_request_transition(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    now: OffsetDateTime,
) -> Result<Persisted<WasteRequest>, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| match &result.change {
        RequestChange::Created(request) => insert_request(conn, request, &result.audit_event, now),
        RequestChange::Updated { previous, current } => {
            update_request(conn, previous, current, &result.audit_event, now)
        }
        RequestChange::Deleted(request) => {
            delete_request(conn, request, &result.audit_event, now)
        }
    })
}

fn insert_request(
    conn: &mut SqliteConnection,
    request: &WasteRequest,
    audit_event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Persisted<WasteRequest>, PersistenceError> {
    diesel::insert_into(waste_requests::table)
        .values((
            waste_requests::resident_id.eq(request.resident_id),
            waste_requests::status.eq(request.status.as_str()),
            waste_requests::assigned_collector_id.eq(request.assigned_collector_id),
            waste_requests::payment_status.eq(request.payment_status.as_str()),
            waste_requests::created_at.eq(to_unix(request.created_at)),
            waste_requests::completed_at.eq(request.completed_at.map(to_unix)),
            waste_requests::version.eq(request.version),
        ))
        .execute(conn)?;
    let request_id: i64 = conn.get_last_insert_rowid()?;

    let rows: Vec<ItemRow> = items_to_rows(&request.items)?;
    let new_items: Vec<NewRequestItem> = rows
        .into_iter()
        .map(|row| NewRequestItem {
            request_id,
            position: row.position,
            category: row.category,
            weight_kg: row.weight_kg,
            rate_per_kg: row.rate_per_kg,
        })
        .collect();
    diesel::insert_into(request_items::table)
        .values(&new_items)
        .execute(conn)?;

    let event: AuditEvent = audit_event.clone().for_subject_id(request_id);
    let event_id: i64 = persist_audit_event(conn, &event, now)?;
    insert_status_history(conn, request_id, event_id, None, request.status, &event, now)?;

    info!(
        request_id,
        resident_id = request.resident_id,
        items = request.items.len(),
        event_id,
        "Created request"
    );

    let mut stored: WasteRequest = request.clone();
    stored.request_id = Some(request_id);
    Ok(Persisted {
        value: stored,
        event_id,
    })
}

fn update_request(
    conn: &mut SqliteConnection,
    previous: &WasteRequest,
    current: &WasteRequest,
    audit_event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Persisted<WasteRequest>, PersistenceError> {
    let request_id: i64 = stored_id(previous)?;

    let updated: usize = diesel::update(
        waste_requests::table
            .filter(waste_requests::request_id.eq(request_id))
            .filter(waste_requests::version.eq(previous.version)),
    )
    .set((
        waste_requests::status.eq(current.status.as_str()),
        waste_requests::assigned_collector_id.eq(current.assigned_collector_id),
        waste_requests::payment_status.eq(current.payment_status.as_str()),
        waste_requests::completed_at.eq(current.completed_at.map(to_unix)),
        waste_requests::version.eq(current.version),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(version_mismatch(conn, request_id, previous.version));
    }

    let event_id: i64 = persist_audit_event(conn, audit_event, now)?;
    if previous.status != current.status {
        insert_status_history(
            conn,
            request_id,
            event_id,
            Some(previous.status),
            current.status,
            audit_event,
            now,
        )?;
    }

    info!(
        request_id,
        action = %audit_event.action.name,
        from = previous.status.as_str(),
        to = current.status.as_str(),
        version = current.version,
        event_id,
        "Updated request"
    );

    Ok(Persisted {
        value: current.clone(),
        event_id,
    })
}

fn delete_request(
    conn: &mut SqliteConnection,
    request: &WasteRequest,
    audit_event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<Persisted<WasteRequest>, PersistenceError> {
    let request_id: i64 = stored_id(request)?;

    let deleted: usize = diesel::delete(
        waste_requests::table
            .filter(waste_requests::request_id.eq(request_id))
            .filter(waste_requests::version.eq(request.version)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(version_mismatch(conn, request_id, request.version));
    }

    let event_id: i64 = persist_audit_event(conn, audit_event, now)?;
    info!(request_id, event_id, "Deleted request");

    Ok(Persisted {
        value: request.clone(),
        event_id,
    })
}

fn stored_id(request: &WasteRequest) -> Result<i64, PersistenceError> {
    request.request_id.ok_or_else(|| {
        PersistenceError::InitializationError(String::from("request has not been stored"))
    })
}

/// Distinguishes a vanished request from a stale version.
fn version_mismatch(
    conn: &mut SqliteConnection,
    request_id: i64,
    expected_version: i64,
) -> PersistenceError {
    let exists: Result<i64, diesel::result::Error> = waste_requests::table
        .filter(waste_requests::request_id.eq(request_id))
        .count()
        .get_result(conn);

    match exists {
        Ok(0) => PersistenceError::RequestNotFound(request_id),
        Ok(_) => {
            warn!(request_id, expected_version, "Rejected stale request update");
            PersistenceError::ConcurrentModification {
                request_id,
                expected_version,
            }
        }
        Err(e) => PersistenceError::from(e),
    }
}

fn insert_status_history(
    conn: &mut SqliteConnection,
    request_id: i64,
    audit_event_id: i64,
    previous_status: Option<RequestStatus>,
    new_status: RequestStatus,
    audit_event: &AuditEvent,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    let record: NewRequestStatusHistory = NewRequestStatusHistory {
        request_id,
        audit_event_id,
        previous_status: previous_status.map(|status| status.as_str().to_string()),
        new_status: new_status.as_str().to_string(),
        transitioned_at: to_unix(now),
        transitioned_by: audit_event.actor.id.clone(),
    };

    diesel::insert_into(request_status_history::table)
        .values(&record)
        .execute(conn)?;
    Ok(())
}
