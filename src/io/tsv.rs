//! Tab-delimited table reading shared by the three loaders.
//!
//! Design goals:
//! - **Strict schema** for required columns (fatal `LoadError`)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (rows come back in file order)

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::LoadError;

/// A row-level problem encountered while loading. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Loader output: parsed rows plus the rows that had to be skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    pub rows: Vec<T>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl<T> Table<T> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Normalized header name → column index.
pub type HeaderMap = HashMap<String, usize>;

/// Outcome of parsing one record.
pub enum RowOutcome<T> {
    Keep(T),
    /// Valid row excluded by a filter.
    Skip,
}

/// Read `path` as TSV, check `required` columns, and parse every record with `parse_row`.
///
/// Records that fail to parse are collected as `RowError`s; only file-level
/// problems (open failure, unreadable header, missing column) abort the load.
pub fn read_table<T, F>(path: &Path, required: &[&str], mut parse_row: F) -> Result<Table<T>, LoadError>
where
    F: FnMut(&StringRecord, &HeaderMap) -> Result<RowOutcome<T>, String>,
{
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        // Published TSVs are unquoted; a stray `"` in a title must not swallow rows.
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_columns_exist(path, &header_map, required)?;

    let mut rows = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("TSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(RowOutcome::Keep(row)) => rows.push(row),
            Ok(RowOutcome::Skip) => {}
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    log_row_errors(path, &row_errors);
    log::info!(
        "loaded '{}': {} rows read, {} kept, {} skipped with errors",
        path.display(),
        rows_read,
        rows.len(),
        row_errors.len()
    );

    Ok(Table {
        rows,
        row_errors,
        rows_read,
    })
}

/// Fail with `MissingColumn` for the first of `columns` absent from the header.
pub fn ensure_columns_exist(path: &Path, header_map: &HeaderMap, columns: &[&str]) -> Result<(), LoadError> {
    match columns.iter().find(|c| !header_map.contains_key(**c)) {
        Some(column) => Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: column.to_string(),
        }),
        None => Ok(()),
    }
}

fn build_header_map(headers: &StringRecord) -> HeaderMap {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Files re-saved from spreadsheets may carry a BOM on the first header.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn log_row_errors(path: &Path, row_errors: &[RowError]) {
    if row_errors.is_empty() {
        return;
    }
    for err in row_errors {
        log::debug!("{}:{}: {}", path.display(), err.line, err.message);
    }
    log::warn!(
        "'{}': skipped {} row(s) that could not be parsed",
        path.display(),
        row_errors.len()
    );
}

/// Trimmed, non-empty value of a required column.
pub fn get_required<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

pub fn get_optional<'a>(record: &'a StringRecord, header_map: &HeaderMap, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Lenient float parse: anything non-numeric or non-finite is missing.
pub fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

/// Parse a year column, accepting `2020` as well as float renderings like `2020.0`.
pub fn parse_year(s: &str) -> Option<i32> {
    let s = s.trim();
    if let Ok(y) = s.parse::<i32>() {
        return Some(y);
    }
    let v = s.parse::<f64>().ok()?;
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i32::MAX as f64 {
        Some(v as i32)
    } else {
        None
    }
}
