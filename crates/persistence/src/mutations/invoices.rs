// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use time::OffsetDateTime;
use tracing::info;
use waste_billing::InvoiceResult;
use waste_billing_audit::AuditEvent;
use waste_billing_domain::Invoice;

use crate::backend::PersistenceBackend;
use crate::convert::{decimal_to_text, to_unix};
use crate::data_models::NewInvoiceLine;
use crate::diesel_schema::{invoice_lines, invoices};
use crate::error::PersistenceError;
use crate::mutations::Persisted;
use crate::mutations::audit::persist_audit_event;

/// Stores a generated invoice, replacing any previous invoice for the same
/// resident and period.
///
/// A replaced invoice keeps its identifier; its lines are rewritten.
///
/// # Errors
///
/// Returns an error if any write fails; nothing is written in that case.
pub fn persist_invoice(
    conn: &mut SqliteConnection,
    result: &InvoiceResult,
    now: OffsetDateTime,
) -> Result<Persisted<Invoice>, PersistenceError> {
    let invoice: &Invoice = &result.invoice;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let period_start: i64 = to_unix(invoice.period.start());
        let period_end: i64 = to_unix(invoice.period.end());

        let existing: Option<i64> = invoices::table
            .filter(invoices::resident_id.eq(invoice.resident_id))
            .filter(invoices::period_start.eq(period_start))
            .filter(invoices::period_end.eq(period_end))
            .select(invoices::invoice_id)
            .first::<i64>(conn)
            .optional()?;

        let invoice_id: i64 = if let Some(invoice_id) = existing {
            diesel::update(invoices::table.filter(invoices::invoice_id.eq(invoice_id)))
                .set(invoices::generated_at.eq(to_unix(invoice.generated_at)))
                .execute(conn)?;
            diesel::delete(invoice_lines::table.filter(invoice_lines::invoice_id.eq(invoice_id)))
                .execute(conn)?;
            invoice_id
        } else {
            diesel::insert_into(invoices::table)
                .values((
                    invoices::resident_id.eq(invoice.resident_id),
                    invoices::period_start.eq(period_start),
                    invoices::period_end.eq(period_end),
                    invoices::generated_at.eq(to_unix(invoice.generated_at)),
                ))
                .execute(conn)?;
            conn.get_last_insert_rowid()?
        };

        let lines: Vec<NewInvoiceLine> = invoice
            .waste_details
            .values()
            .map(|line| NewInvoiceLine {
                invoice_id,
                category: line.category.as_str().to_string(),
                total_weight_kg: decimal_to_text(line.total_weight_kg),
                rate_per_kg: decimal_to_text(line.rate_per_kg),
                amount: decimal_to_text(line.amount),
            })
            .collect();
        if !lines.is_empty() {
            diesel::insert_into(invoice_lines::table)
                .values(&lines)
                .execute(conn)?;
        }

        let event: AuditEvent = result.audit_event.clone().for_subject_id(invoice_id);
        let event_id: i64 = persist_audit_event(conn, &event, now)?;

        info!(
            invoice_id,
            resident_id = invoice.resident_id,
            replaced = existing.is_some(),
            categories = lines.len(),
            event_id,
            "Stored invoice"
        );

        let mut stored: Invoice = invoice.clone();
        stored.invoice_id = Some(invoice_id);
        Ok(Persisted {
            value: stored,
            event_id,
        })
    })
}
