//! Map parsed [`Table`]s onto typed records through a column mapping.

use chrono::{NaiveDate, NaiveDateTime};

use crate::config::{BookingColumns, ColumnRef, CountColumns, LedgerColumns};
use crate::error::ReconError;
use crate::model::{BookingRecord, CountRecord, LedgerRecord, Table};

/// Resolve a column reference to an index into `table.headers`.
fn column_index(input: &str, table: &Table, col: &ColumnRef) -> Result<usize, ReconError> {
    let found = match col {
        ColumnRef::Position(idx) => (*idx < table.headers.len()).then_some(*idx),
        ColumnRef::Name(name) => table.headers.iter().position(|h| h.trim() == name.trim()),
    };
    found.ok_or_else(|| ReconError::MissingColumn {
        input: input.into(),
        column: col.to_string(),
    })
}

fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Parse a date using the first format that matches. Formats carrying a time
/// of day are parsed as datetimes and truncated to the date.
pub fn parse_date(value: &str, formats: &[&str]) -> Option<NaiveDate> {
    let value = value.trim();
    formats.iter().find_map(|fmt| {
        NaiveDate::parse_from_str(value, fmt)
            .ok()
            .or_else(|| NaiveDateTime::parse_from_str(value, fmt).ok().map(|dt| dt.date()))
    })
}

/// Parse a numeric quantity. Blank cells are `Some(0.0)`.
pub fn parse_quantity(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    value.parse::<f64>().ok().filter(|q| q.is_finite())
}

fn quantity(input: &str, row: usize, value: &str) -> Result<f64, ReconError> {
    parse_quantity(value).ok_or_else(|| ReconError::QuantityParse {
        input: input.into(),
        row,
        value: value.into(),
    })
}

fn date(input: &str, row: usize, value: &str, formats: &[&str]) -> Result<NaiveDate, ReconError> {
    parse_date(value, formats).ok_or_else(|| ReconError::DateParse {
        input: input.into(),
        row,
        value: value.into(),
    })
}

pub fn bookings(
    input: &str,
    table: &Table,
    columns: &BookingColumns,
    formats: &[&str],
) -> Result<Vec<BookingRecord>, ReconError> {
    let start_idx = column_index(input, table, &columns.start)?;
    let end_idx = column_index(input, table, &columns.end)?;
    let asset_idx = column_index(input, table, &columns.asset)?;
    let quantity_idx = column_index(input, table, &columns.quantity)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        if is_blank(row) {
            continue;
        }
        let row_no = i + 1;
        let (start, end) = (cell(row, start_idx), cell(row, end_idx));
        // Open-ended bookings are never active
        if start.is_empty() || end.is_empty() {
            log::debug!("{input}: row {row_no} has no start or end date, skipped");
            continue;
        }
        records.push(BookingRecord {
            start: date(input, row_no, start, formats)?,
            end: date(input, row_no, end, formats)?,
            asset: cell(row, asset_idx).to_string(),
            quantity: quantity(input, row_no, cell(row, quantity_idx))?,
        });
    }

    log::debug!("{input}: loaded {} booking(s)", records.len());
    Ok(records)
}

pub fn counts(
    input: &str,
    table: &Table,
    columns: &CountColumns,
) -> Result<Vec<CountRecord>, ReconError> {
    let category_idx = column_index(input, table, &columns.category)?;
    let asset_idx = column_index(input, table, &columns.asset)?;
    let count_idx = column_index(input, table, &columns.count)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let asset = cell(row, asset_idx);
        if asset.is_empty() {
            continue;
        }
        records.push(CountRecord {
            category: cell(row, category_idx).to_string(),
            asset: asset.to_string(),
            count: quantity(input, i + 1, cell(row, count_idx))?,
        });
    }

    log::debug!("{input}: loaded {} count row(s)", records.len());
    Ok(records)
}

pub fn ledger(
    input: &str,
    table: &Table,
    columns: &LedgerColumns,
) -> Result<Vec<LedgerRecord>, ReconError> {
    let category_idx = column_index(input, table, &columns.category)?;
    let asset_idx = column_index(input, table, &columns.asset)?;
    let current_idx = column_index(input, table, &columns.current)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for (i, row) in table.rows.iter().enumerate() {
        let asset = cell(row, asset_idx);
        if asset.is_empty() {
            continue;
        }
        records.push(LedgerRecord {
            category: cell(row, category_idx).to_string(),
            asset: asset.to_string(),
            current: quantity(input, i + 1, cell(row, current_idx))?,
        });
    }

    log::debug!("{input}: loaded {} ledger row(s)", records.len());
    Ok(records)
}
