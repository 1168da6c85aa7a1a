// CSV/TSV import

use std::io::Read;
use std::path::Path;

use invdelta_recon::Table;

use crate::error::IoError;

pub fn import(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(path, &content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<Table, IoError> {
    let content = read_file_as_utf8(path)?;
    import_from_string(path, &content, b'\t')
}

const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Number of fields `line` splits into under `delimiter`, quotes respected.
fn field_count(line: &str, delimiter: u8) -> usize {
    ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(1, |record| record.len())
}

/// Pick the delimiter under which the header line splits into more than one
/// field and the most non-blank lines of the first ten share that width.
/// Ties keep the earlier candidate; no match falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let lines: Vec<&str> = content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    let Some((header, body)) = lines.split_first() else {
        return b',';
    };

    DELIMITERS
        .iter()
        .filter_map(|&delimiter| {
            let width = field_count(header, delimiter);
            if width < 2 {
                return None;
            }
            let agreeing = 1 + body
                .iter()
                .filter(|line| field_count(line, delimiter) == width)
                .count();
            Some((agreeing * width, delimiter))
        })
        .fold(None, |best: Option<(usize, u8)>, (score, delimiter)| match best {
            Some((top, _)) if top >= score => best,
            _ => Some((score, delimiter)),
        })
        .map_or(b',', |(_, delimiter)| delimiter)
}

/// Read file and convert to UTF-8 if needed (Excel exports are often Windows-1252).
pub fn read_file_as_utf8(path: &Path) -> Result<String, IoError> {
    let read_err = |source| IoError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut bytes = Vec::new();
    std::fs::File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(read_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            log::debug!("{}: not UTF-8, decoding as Windows-1252", path.display());
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            Ok(decoded.into_owned())
        }
    }
}

/// Parse CSV text. The first record becomes the header row.
pub fn import_from_string(path: &Path, content: &str, delimiter: u8) -> Result<Table, IoError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(first) => first
            .map_err(|e| IoError::Csv {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|e| IoError::Csv {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        rows.push(record.iter().map(String::from).collect());
    }

    Ok(Table::new(crate::table_name(path), headers, rows))
}
