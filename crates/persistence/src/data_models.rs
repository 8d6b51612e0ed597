// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    collection_items, invoice_lines, members, request_items, request_status_history,
};

/// Serializable representation of an Actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorData {
    pub id: String,
    pub actor_type: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

#[derive(Insertable)]
#[diesel(table_name = members)]
pub struct NewMember<'a> {
    pub display_name: &'a str,
    pub role: &'a str,
    pub created_at: i64,
}

/// A priced line belonging to a request or a collection record.
///
/// Decimals are stored as canonical text.
pub struct ItemRow {
    pub position: i32,
    pub category: String,
    pub weight_kg: String,
    pub rate_per_kg: String,
}

#[derive(Insertable)]
#[diesel(table_name = request_items)]
pub struct NewRequestItem {
    pub request_id: i64,
    pub position: i32,
    pub category: String,
    pub weight_kg: String,
    pub rate_per_kg: String,
}

#[derive(Insertable)]
#[diesel(table_name = collection_items)]
pub struct NewCollectionItem {
    pub record_id: i64,
    pub position: i32,
    pub category: String,
    pub weight_kg: String,
    pub rate_per_kg: String,
}

#[derive(Insertable)]
#[diesel(table_name = invoice_lines)]
pub struct NewInvoiceLine {
    pub invoice_id: i64,
    pub category: String,
    pub total_weight_kg: String,
    pub rate_per_kg: String,
    pub amount: String,
}

#[derive(Insertable)]
#[diesel(table_name = request_status_history)]
pub struct NewRequestStatusHistory {
    pub request_id: i64,
    pub audit_event_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub transitioned_at: i64,
    pub transitioned_by: String,
}

/// One recorded status change of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusHistoryEntry {
    pub history_id: i64,
    pub request_id: i64,
    pub audit_event_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub transitioned_at: time::OffsetDateTime,
    pub transitioned_by: String,
}
