use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {message}", .path.display())]
    Csv { path: PathBuf, message: String },
    #[error("{}: {message}", .path.display())]
    Excel { path: PathBuf, message: String },
    #[error(
        "{}: unsupported file type (expected .csv, .tsv, .txt, .xlsx, .xlsm, .xls, .xlsb or .ods)",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf },
    #[error("cannot write {}: {message}", .path.display())]
    Write { path: PathBuf, message: String },
}
