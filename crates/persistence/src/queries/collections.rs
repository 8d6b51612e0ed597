// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use tracing::debug;
use waste_billing_domain::{CollectionRecord, WasteCategory, WasteItem};

use crate::convert::{from_unix, row_to_item, to_unix};
use crate::diesel_schema::{collection_items, collection_records};
use crate::error::PersistenceError;

/// Filter for listing collection records. Unset fields match everything.
///
/// The date range is half-open: `from <= collected_at < to`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    pub collector_id: Option<i64>,
    pub resident_id: Option<i64>,
    /// Matches records with at least one item of this category.
    pub category: Option<WasteCategory>,
    pub from: Option<OffsetDateTime>,
    pub to: Option<OffsetDateTime>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = collection_records)]
struct CollectionRecordRow {
    record_id: i64,
    collector_id: i64,
    resident_id: i64,
    collected_at: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = collection_items)]
struct CollectionItemRow {
    record_id: i64,
    category: String,
    weight_kg: String,
    rate_per_kg: String,
}

/// Lists collection records matching every set filter field, ordered by
/// collection time then ID. Each record carries all of its items.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be reconstructed.
pub fn list_collection_records(
    conn: &mut SqliteConnection,
    filter: &CollectionFilter,
) -> Result<Vec<CollectionRecord>, PersistenceError> {
    let mut query = collection_records::table.into_boxed();
    if let Some(collector_id) = filter.collector_id {
        query = query.filter(collection_records::collector_id.eq(collector_id));
    }
    if let Some(resident_id) = filter.resident_id {
        query = query.filter(collection_records::resident_id.eq(resident_id));
    }
    if let Some(category) = filter.category {
        query = query.filter(
            collection_records::record_id.eq_any(
                collection_items::table
                    .filter(collection_items::category.eq(category.as_str()))
                    .select(collection_items::record_id),
            ),
        );
    }
    if let Some(from) = filter.from {
        query = query.filter(collection_records::collected_at.ge(to_unix(from)));
    }
    if let Some(to) = filter.to {
        query = query.filter(collection_records::collected_at.lt(to_unix(to)));
    }

    let rows: Vec<CollectionRecordRow> = query
        .order((
            collection_records::collected_at.asc(),
            collection_records::record_id.asc(),
        ))
        .select(CollectionRecordRow::as_select())
        .load::<CollectionRecordRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_collection_records: {e}")))?;

    debug!(?filter, count = rows.len(), "Listed collection records");

    let record_ids: Vec<i64> = rows.iter().map(|row| row.record_id).collect();
    let mut items: BTreeMap<i64, Vec<WasteItem>> = load_items(conn, &record_ids)?;

    rows.into_iter()
        .map(|row| {
            Ok(CollectionRecord {
                record_id: Some(row.record_id),
                collector_id: row.collector_id,
                resident_id: row.resident_id,
                items: items.remove(&row.record_id).unwrap_or_default(),
                collected_at: from_unix(row.collected_at)?,
            })
        })
        .collect()
}

fn load_items(
    conn: &mut SqliteConnection,
    record_ids: &[i64],
) -> Result<BTreeMap<i64, Vec<WasteItem>>, PersistenceError> {
    let rows: Vec<CollectionItemRow> = collection_items::table
        .filter(collection_items::record_id.eq_any(record_ids))
        .order((
            collection_items::record_id.asc(),
            collection_items::position.asc(),
        ))
        .select(CollectionItemRow::as_select())
        .load::<CollectionItemRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("load_collection_items: {e}")))?;

    let mut items: BTreeMap<i64, Vec<WasteItem>> = BTreeMap::new();
    for row in rows {
        let item: WasteItem = row_to_item(&row.category, &row.weight_kg, &row.rate_per_kg)?;
        items.entry(row.record_id).or_default().push(item);
    }
    Ok(items)
}
