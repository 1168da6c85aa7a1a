// File I/O: tabular input import and CSV report export

pub mod csv;
pub mod error;
pub mod report;
pub mod xlsx;

use std::path::Path;

use invdelta_recon::Table;

pub use error::IoError;

/// Load a tabular file, choosing the reader from its extension.
pub fn load_table(path: &Path) -> Result<Table, IoError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    log::debug!("loading {}", path.display());
    match ext.as_str() {
        "csv" | "txt" => self::csv::import(path),
        "tsv" => self::csv::import_tsv(path),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => self::xlsx::import(path),
        _ => Err(IoError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Table name used in diagnostics: the file name as given.
pub(crate) fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
