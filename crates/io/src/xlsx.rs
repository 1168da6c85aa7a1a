// Excel import (xlsx, xlsm, xls, xlsb, ods) through calamine

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveTime;
use invdelta_recon::Table;

use crate::error::IoError;

/// Import the first worksheet.
pub fn import(path: &Path) -> Result<Table, IoError> {
    import_sheet(path, None)
}

/// Import a named worksheet, or the first one when `sheet` is `None`.
/// The first used row becomes the header row.
pub fn import_sheet(path: &Path, sheet: Option<&str>) -> Result<Table, IoError> {
    let excel_err = |message: String| IoError::Excel {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path)
        .map_err(|e| excel_err(format!("failed to open Excel file: {e}")))?;

    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| excel_err("Excel file contains no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| excel_err(format!("failed to read sheet '{sheet_name}': {e}")))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect::<Vec<String>>());

    let headers: Vec<String> = rows
        .next()
        .map(|h| h.into_iter().map(|s| s.trim().to_string()).collect())
        .unwrap_or_default();
    let mut data: Vec<Vec<String>> = rows.collect();

    // Trailing formatted-but-empty rows show up in the used range
    while data
        .last()
        .is_some_and(|r| r.iter().all(|c| c.is_empty()))
    {
        data.pop();
    }

    log::debug!(
        "{}: sheet '{sheet_name}', {} column(s), {} row(s)",
        path.display(),
        headers.len(),
        data.len()
    );

    Ok(Table::new(crate::table_name(path), headers, data))
}

/// Render a cell the way it would read in a CSV export.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(n) => {
            // Integers without decimals
            if n.fract() == 0.0 && n.abs() < 1e15 {
                format!("{}", *n as i64)
            } else {
                format!("{n}")
            }
        }
        Data::Int(n) => n.to_string(),
        Data::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Data::Error(e) => format!("#{e:?}"),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ndt) if ndt.time() == NaiveTime::MIN => ndt.format("%Y-%m-%d").to_string(),
            Some(ndt) => ndt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => format!("{}", dt.as_f64()),
        },
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}
