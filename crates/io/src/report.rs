// CSV report export

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::IoError;

/// Write `headers` then one record per row. The header line is written even
/// when `rows` is empty.
pub fn write_rows<W: Write, T: Serialize>(
    writer: W,
    headers: &[&str],
    rows: &[T],
) -> Result<W, String> {
    let mut csv_writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv_writer
        .write_record(headers)
        .map_err(|e| format!("CSV write error: {e}"))?;
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|e| format!("CSV write error: {e}"))?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| format!("CSV write error: {}", e.error()))
}

/// Write a set of rendered reports into `dir` as one unit.
///
/// Each report is staged in a temp file next to its target and the temp
/// files are renamed only once all of them are written. A failure leaves
/// none of the targets created by this call behind.
pub fn write_report_set(dir: &Path, reports: &[(&str, Vec<u8>)]) -> Result<Vec<PathBuf>, IoError> {
    let mut staged = Vec::with_capacity(reports.len());
    for (file, bytes) in reports {
        let path = dir.join(file);
        let write_err = |message: String| IoError::Write {
            path: path.clone(),
            message,
        };
        if path.is_dir() {
            return Err(write_err("target is a directory".to_string()));
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".invdelta-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| write_err(e.to_string()))?;
        tmp.write_all(bytes)
            .and_then(|()| tmp.flush())
            .map_err(|e| write_err(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o644))
                .map_err(|e| write_err(e.to_string()))?;
        }
        staged.push((tmp, path));
    }

    let mut written: Vec<PathBuf> = Vec::with_capacity(staged.len());
    for (tmp, path) in staged {
        if let Err(e) = tmp.persist(&path) {
            for done in &written {
                if let Err(rm) = std::fs::remove_file(done) {
                    log::warn!("cannot remove partial report {}: {rm}", done.display());
                }
            }
            return Err(IoError::Write {
                path,
                message: e.error.to_string(),
            });
        }
        log::debug!("wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}
