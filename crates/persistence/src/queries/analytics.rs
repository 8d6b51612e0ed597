// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Administrator dashboard aggregates.
//!
//! Counts are grouped in SQL. Money and weights are stored as decimal text,
//! so their sums are computed here rather than by the database.

use diesel::SqliteConnection;
use diesel::dsl::count_star;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use waste_billing_domain::{RequestStatus, WasteCategory, WasteItem, checked_add_amount, month_key};

use crate::convert::{from_unix, parse_column, row_to_item};
use crate::diesel_schema::{collection_items, request_items, waste_requests};
use crate::error::PersistenceError;

/// Request counts per status and revenue of non-cancelled requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestSummary {
    pub pending: u64,
    pub assigned: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total: u64,
    pub total_revenue: Decimal,
}

/// Collected weight and amount for one category across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryStatistic {
    pub category: WasteCategory,
    pub item_count: u64,
    pub total_weight_kg: Decimal,
    pub total_amount: Decimal,
}

/// Requests created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRequestCount {
    /// `YYYY-MM`.
    pub month: String,
    pub requests: u64,
}

/// A collector's current and finished assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectorWorkload {
    pub collector_id: i64,
    pub assigned: u64,
    pub completed: u64,
}

fn to_count(value: i64) -> Result<u64, PersistenceError> {
    value
        .to_u64()
        .ok_or_else(|| PersistenceError::DatabaseError("Count conversion failed".to_string()))
}

/// Summarizes requests by status.
///
/// # Errors
///
/// Returns an error if a query fails or a stored value cannot be parsed.
pub fn request_summary(conn: &mut SqliteConnection) -> Result<RequestSummary, PersistenceError> {
    let counts: Vec<(String, i64)> = waste_requests::table
        .group_by(waste_requests::status)
        .select((waste_requests::status, count_star()))
        .load::<(String, i64)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("request_summary: {e}")))?;

    let mut summary: RequestSummary = RequestSummary::default();
    for (status, count) in counts {
        let count: u64 = to_count(count)?;
        match parse_column::<RequestStatus>("status", &status)? {
            RequestStatus::Pending => summary.pending = count,
            RequestStatus::Assigned => summary.assigned = count,
            RequestStatus::Completed => summary.completed = count,
            RequestStatus::Cancelled => summary.cancelled = count,
        }
        summary.total += count;
    }

    let priced: Vec<(String, String, String)> = request_items::table
        .inner_join(waste_requests::table)
        .filter(waste_requests::status.ne(RequestStatus::Cancelled.as_str()))
        .select((
            request_items::category,
            request_items::weight_kg,
            request_items::rate_per_kg,
        ))
        .load::<(String, String, String)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("request_revenue: {e}")))?;

    for (category, weight_kg, rate_per_kg) in priced {
        let item: WasteItem = row_to_item(&category, &weight_kg, &rate_per_kg)?;
        summary.total_revenue =
            accumulate(summary.total_revenue, item.line_total(), "summing revenue")?;
    }

    Ok(summary)
}

fn accumulate(
    total: Decimal,
    amount: Decimal,
    operation: &str,
) -> Result<Decimal, PersistenceError> {
    checked_add_amount(total, amount, operation)
        .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))
}

/// Totals collected weight and amount per category, in category order.
/// Categories never collected are omitted.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be parsed.
pub fn category_statistics(
    conn: &mut SqliteConnection,
) -> Result<Vec<CategoryStatistic>, PersistenceError> {
    let rows: Vec<(String, String, String)> = collection_items::table
        .select((
            collection_items::category,
            collection_items::weight_kg,
            collection_items::rate_per_kg,
        ))
        .load::<(String, String, String)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("category_statistics: {e}")))?;

    let mut statistics: BTreeMap<WasteCategory, CategoryStatistic> = BTreeMap::new();
    for (category, weight_kg, rate_per_kg) in rows {
        let item: WasteItem = row_to_item(&category, &weight_kg, &rate_per_kg)?;
        let entry: &mut CategoryStatistic =
            statistics
                .entry(item.category())
                .or_insert_with(|| CategoryStatistic {
                    category: item.category(),
                    item_count: 0,
                    total_weight_kg: Decimal::ZERO,
                    total_amount: Decimal::ZERO,
                });
        entry.item_count += 1;
        entry.total_weight_kg =
            accumulate(entry.total_weight_kg, item.weight_kg(), "summing weight")?;
        entry.total_amount =
            accumulate(entry.total_amount, item.line_total(), "summing amount")?;
    }

    Ok(statistics.into_values().collect())
}

/// Counts requests per creation month, ascending. Deleted requests are
/// not counted.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn requests_per_month(
    conn: &mut SqliteConnection,
) -> Result<Vec<MonthlyRequestCount>, PersistenceError> {
    let created: Vec<i64> = waste_requests::table
        .select(waste_requests::created_at)
        .load::<i64>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("requests_per_month: {e}")))?;

    let mut months: BTreeMap<String, u64> = BTreeMap::new();
    for seconds in created {
        *months.entry(month_key(from_unix(seconds)?)).or_insert(0) += 1;
    }

    Ok(months
        .into_iter()
        .map(|(month, requests)| MonthlyRequestCount { month, requests })
        .collect())
}

/// Counts assigned and completed requests per collector, by collector ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn collector_workload(
    conn: &mut SqliteConnection,
) -> Result<Vec<CollectorWorkload>, PersistenceError> {
    let rows: Vec<(Option<i64>, String, i64)> = waste_requests::table
        .filter(waste_requests::assigned_collector_id.is_not_null())
        .filter(waste_requests::status.eq_any([
            RequestStatus::Assigned.as_str(),
            RequestStatus::Completed.as_str(),
        ]))
        .group_by((waste_requests::assigned_collector_id, waste_requests::status))
        .select((
            waste_requests::assigned_collector_id,
            waste_requests::status,
            count_star(),
        ))
        .load::<(Option<i64>, String, i64)>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("collector_workload: {e}")))?;

    let mut workload: BTreeMap<i64, CollectorWorkload> = BTreeMap::new();
    for (collector_id, status, count) in rows {
        let Some(collector_id) = collector_id else {
            continue;
        };
        let entry: &mut CollectorWorkload =
            workload
                .entry(collector_id)
                .or_insert_with(|| CollectorWorkload {
                    collector_id,
                    assigned: 0,
                    completed: 0,
                });
        match parse_column::<RequestStatus>("status", &status)? {
            RequestStatus::Assigned => entry.assigned = to_count(count)?,
            RequestStatus::Completed => entry.completed = to_count(count)?,
            RequestStatus::Pending | RequestStatus::Cancelled => {}
        }
    }

    Ok(workload.into_values().collect())
}
