// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;
use waste_billing_domain::{PaymentStatus, RequestStatus, WasteItem, WasteRequest};

use crate::convert::{from_unix, parse_column, row_to_item};
use crate::data_models::StatusHistoryEntry;
use crate::diesel_schema::{request_items, request_status_history, waste_requests};
use crate::error::PersistenceError;

/// Filter for listing requests. Unset fields match everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub resident_id: Option<i64>,
    pub collector_id: Option<i64>,
    pub status: Option<RequestStatus>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = waste_requests)]
struct RequestRow {
    request_id: i64,
    resident_id: i64,
    status: String,
    assigned_collector_id: Option<i64>,
    payment_status: String,
    created_at: i64,
    completed_at: Option<i64>,
    version: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = request_items)]
struct RequestItemRow {
    request_id: i64,
    category: String,
    weight_kg: String,
    rate_per_kg: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = request_status_history)]
struct StatusHistoryRow {
    history_id: i64,
    request_id: i64,
    audit_event_id: i64,
    previous_status: Option<String>,
    new_status: String,
    transitioned_at: i64,
    transitioned_by: String,
}

fn build_request(row: RequestRow, items: Vec<WasteItem>) -> Result<WasteRequest, PersistenceError> {
    let status: RequestStatus = parse_column("status", &row.status)?;
    let payment_status: PaymentStatus = parse_column("payment_status", &row.payment_status)?;
    Ok(WasteRequest {
        request_id: Some(row.request_id),
        resident_id: row.resident_id,
        items,
        status,
        assigned_collector_id: row.assigned_collector_id,
        payment_status,
        created_at: from_unix(row.created_at)?,
        completed_at: row.completed_at.map(from_unix).transpose()?,
        version: row.version,
    })
}

/// Loads the items of every listed request, keyed by request, in position
/// order.
fn load_items(
    conn: &mut SqliteConnection,
    request_ids: &[i64],
) -> Result<BTreeMap<i64, Vec<WasteItem>>, PersistenceError> {
    let rows: Vec<RequestItemRow> = request_items::table
        .filter(request_items::request_id.eq_any(request_ids))
        .order((request_items::request_id.asc(), request_items::position.asc()))
        .select(RequestItemRow::as_select())
        .load::<RequestItemRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("load_request_items: {e}")))?;

    let mut items: BTreeMap<i64, Vec<WasteItem>> = BTreeMap::new();
    for row in rows {
        let item: WasteItem = row_to_item(&row.category, &row.weight_kg, &row.rate_per_kg)?;
        items.entry(row.request_id).or_default().push(item);
    }
    Ok(items)
}

fn attach_items(
    conn: &mut SqliteConnection,
    rows: Vec<RequestRow>,
) -> Result<Vec<WasteRequest>, PersistenceError> {
    let request_ids: Vec<i64> = rows.iter().map(|row| row.request_id).collect();
    let mut items: BTreeMap<i64, Vec<WasteItem>> = load_items(conn, &request_ids)?;

    rows.into_iter()
        .map(|row| {
            let request_items: Vec<WasteItem> = items.remove(&row.request_id).unwrap_or_default();
            build_request(row, request_items)
        })
        .collect()
}

/// Retrieves a request with its items.
///
/// # Errors
///
/// Returns `PersistenceError::RequestNotFound` if no such request exists.
pub fn get_request(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<WasteRequest, PersistenceError> {
    let row: RequestRow = waste_requests::table
        .filter(waste_requests::request_id.eq(request_id))
        .select(RequestRow::as_select())
        .first::<RequestRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_request: {e}")))?
        .ok_or(PersistenceError::RequestNotFound(request_id))?;

    attach_items(conn, vec![row])?
        .pop()
        .ok_or(PersistenceError::RequestNotFound(request_id))
}

/// Lists requests matching every set filter field, ordered by creation
/// time then ID.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_requests(
    conn: &mut SqliteConnection,
    filter: &RequestFilter,
) -> Result<Vec<WasteRequest>, PersistenceError> {
    let mut query = waste_requests::table.into_boxed();
    if let Some(resident_id) = filter.resident_id {
        query = query.filter(waste_requests::resident_id.eq(resident_id));
    }
    if let Some(collector_id) = filter.collector_id {
        query = query.filter(waste_requests::assigned_collector_id.eq(collector_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(waste_requests::status.eq(status.as_str()));
    }

    let rows: Vec<RequestRow> = query
        .order((
            waste_requests::created_at.asc(),
            waste_requests::request_id.asc(),
        ))
        .select(RequestRow::as_select())
        .load::<RequestRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_requests: {e}")))?;

    debug!(?filter, count = rows.len(), "Listed requests");
    attach_items(conn, rows)
}

/// Retrieves the status history of a request, oldest first.
///
/// History outlives the request, so a deleted request still has one.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_request_history(
    conn: &mut SqliteConnection,
    request_id: i64,
) -> Result<Vec<StatusHistoryEntry>, PersistenceError> {
    request_status_history::table
        .filter(request_status_history::request_id.eq(request_id))
        .order(request_status_history::history_id.asc())
        .select(StatusHistoryRow::as_select())
        .load::<StatusHistoryRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("get_request_history: {e}")))?
        .into_iter()
        .map(|row| {
            Ok(StatusHistoryEntry {
                history_id: row.history_id,
                request_id: row.request_id,
                audit_event_id: row.audit_event_id,
                previous_status: row.previous_status,
                new_status: row.new_status,
                transitioned_at: from_unix(row.transitioned_at)?,
                transitioned_by: row.transitioned_by,
            })
        })
        .collect()
}
