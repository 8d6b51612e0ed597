// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::info;
use waste_billing::CollectionResult;
use waste_billing_audit::AuditEvent;
use waste_billing_domain::CollectionRecord;

use crate::backend::PersistenceBackend;
use crate::convert::{items_to_rows, to_unix};
use crate::data_models::NewCollectionItem;
use crate::diesel_schema::{collection_items, collection_records};
use crate::error::PersistenceError;
use crate::mutations::Persisted;
use crate::mutations::audit::persist_audit_event;

/// Appends a collection record with its items and audit event.
///
/// Records are never updated or deleted.
///
/// # Errors
///
/// Returns an error if any insert fails; nothing is written in that case.
pub fn persist_collection(
    conn: &mut SqliteConnection,
    result: &CollectionResult,
    now: OffsetDateTime,
) -> Result<Persisted<CollectionRecord>, PersistenceError> {
    let record: &CollectionRecord = &result.record;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(collection_records::table)
            .values((
                collection_records::collector_id.eq(record.collector_id),
                collection_records::resident_id.eq(record.resident_id),
                collection_records::collected_at.eq(to_unix(record.collected_at)),
            ))
            .execute(conn)?;
        let record_id: i64 = conn.get_last_insert_rowid()?;

        let new_items: Vec<NewCollectionItem> = items_to_rows(&record.items)?
            .into_iter()
            .map(|row| NewCollectionItem {
                record_id,
                position: row.position,
                category: row.category,
                weight_kg: row.weight_kg,
                rate_per_kg: row.rate_per_kg,
            })
            .collect();
        diesel::insert_into(collection_items::table)
            .values(&new_items)
            .execute(conn)?;

        let event: AuditEvent = result.audit_event.clone().for_subject_id(record_id);
        let event_id: i64 = persist_audit_event(conn, &event, now)?;

        info!(
            record_id,
            collector_id = record.collector_id,
            resident_id = record.resident_id,
            event_id,
            "Recorded collection"
        );

        let mut stored: CollectionRecord = record.clone();
        stored.record_id = Some(record_id);
        Ok(Persisted {
            value: stored,
            event_id,
        })
    })
}
