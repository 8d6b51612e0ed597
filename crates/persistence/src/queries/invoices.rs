// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::SqliteConnection;
use diesel::prelude::*;
use std::collections::BTreeMap;
use waste_billing_domain::{Invoice, InvoiceLine, InvoicePeriod, WasteCategory};

use crate::convert::{decimal_from_text, from_unix, parse_column, to_unix};
use crate::diesel_schema::{invoice_lines, invoices};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoices)]
struct InvoiceRow {
    invoice_id: i64,
    resident_id: i64,
    period_start: i64,
    period_end: i64,
    generated_at: i64,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = invoice_lines)]
struct InvoiceLineRow {
    invoice_id: i64,
    category: String,
    total_weight_kg: String,
    rate_per_kg: String,
    amount: String,
}

fn build_invoices(
    conn: &mut SqliteConnection,
    rows: Vec<InvoiceRow>,
) -> Result<Vec<Invoice>, PersistenceError> {
    let invoice_ids: Vec<i64> = rows.iter().map(|row| row.invoice_id).collect();
    let line_rows: Vec<InvoiceLineRow> = invoice_lines::table
        .filter(invoice_lines::invoice_id.eq_any(&invoice_ids))
        .select(InvoiceLineRow::as_select())
        .load::<InvoiceLineRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("load_invoice_lines: {e}")))?;

    let mut lines: BTreeMap<i64, BTreeMap<WasteCategory, InvoiceLine>> = BTreeMap::new();
    for row in line_rows {
        let category: WasteCategory = parse_column("category", &row.category)?;
        let line: InvoiceLine = InvoiceLine {
            category,
            total_weight_kg: decimal_from_text(&row.total_weight_kg)?,
            rate_per_kg: decimal_from_text(&row.rate_per_kg)?,
            amount: decimal_from_text(&row.amount)?,
        };
        lines.entry(row.invoice_id).or_default().insert(category, line);
    }

    rows.into_iter()
        .map(|row| {
            let period: InvoicePeriod =
                InvoicePeriod::new(from_unix(row.period_start)?, from_unix(row.period_end)?)
                    .map_err(|e| PersistenceError::ReconstructionError(e.to_string()))?;
            Ok(Invoice {
                invoice_id: Some(row.invoice_id),
                resident_id: row.resident_id,
                period,
                waste_details: lines.remove(&row.invoice_id).unwrap_or_default(),
                generated_at: from_unix(row.generated_at)?,
            })
        })
        .collect()
}

/// Retrieves an invoice with its lines.
///
/// # Errors
///
/// Returns `PersistenceError::InvoiceNotFound` if no such invoice exists.
pub fn get_invoice(
    conn: &mut SqliteConnection,
    invoice_id: i64,
) -> Result<Invoice, PersistenceError> {
    let row: InvoiceRow = invoices::table
        .filter(invoices::invoice_id.eq(invoice_id))
        .select(InvoiceRow::as_select())
        .first::<InvoiceRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("get_invoice: {e}")))?
        .ok_or(PersistenceError::InvoiceNotFound(invoice_id))?;

    build_invoices(conn, vec![row])?
        .pop()
        .ok_or(PersistenceError::InvoiceNotFound(invoice_id))
}

/// Retrieves the stored invoice for a resident and period, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_invoice_for_period(
    conn: &mut SqliteConnection,
    resident_id: i64,
    period: &InvoicePeriod,
) -> Result<Option<Invoice>, PersistenceError> {
    let row: Option<InvoiceRow> = invoices::table
        .filter(invoices::resident_id.eq(resident_id))
        .filter(invoices::period_start.eq(to_unix(period.start())))
        .filter(invoices::period_end.eq(to_unix(period.end())))
        .select(InvoiceRow::as_select())
        .first::<InvoiceRow>(conn)
        .optional()
        .map_err(|e| PersistenceError::QueryFailed(format!("find_invoice_for_period: {e}")))?;

    match row {
        Some(row) => Ok(build_invoices(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

/// Lists invoices, optionally for one resident, by period start then ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_invoices(
    conn: &mut SqliteConnection,
    resident_id: Option<i64>,
) -> Result<Vec<Invoice>, PersistenceError> {
    let mut query = invoices::table.into_boxed();
    if let Some(resident_id) = resident_id {
        query = query.filter(invoices::resident_id.eq(resident_id));
    }

    let rows: Vec<InvoiceRow> = query
        .order((invoices::period_start.asc(), invoices::invoice_id.asc()))
        .select(InvoiceRow::as_select())
        .load::<InvoiceRow>(conn)
        .map_err(|e| PersistenceError::QueryFailed(format!("list_invoices: {e}")))?;

    build_invoices(conn, rows)
}
