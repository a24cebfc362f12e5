//! Series catalog loading (`ap.series`-style TSV).

use std::collections::HashSet;
use std::path::Path;

use crate::domain::SeriesDescriptor;
use crate::error::LoadError;
use crate::io::tsv::{self, RowOutcome, Table};

const COL_ID: &str = "series_id";
const COL_TITLE: &str = "series_title";
const COL_END_YEAR: &str = "end_year";

/// Load the series catalog.
///
/// - duplicate `(id, title)` pairs keep their first occurrence
/// - `title_filter` keeps titles containing it (case-insensitive)
/// - `min_end_year` keeps series whose `end_year` parses and is `>=` the bound
/// - output is stable-sorted by title
pub fn load_catalog(
    path: &Path,
    title_filter: Option<&str>,
    min_end_year: Option<i32>,
) -> Result<Table<SeriesDescriptor>, LoadError> {
    let mut required = vec![COL_ID, COL_TITLE];
    if min_end_year.is_some() {
        required.push(COL_END_YEAR);
    }

    let needle = title_filter.map(str::to_lowercase).filter(|s| !s.is_empty());
    let mut seen: HashSet<(String, String)> = HashSet::new();

    let mut table = tsv::read_table(path, &required, |record, header_map| {
        let id = tsv::get_required(record, header_map, COL_ID)?;
        let title = tsv::get_required(record, header_map, COL_TITLE)?;

        if !seen.insert((id.to_string(), title.to_string())) {
            return Ok(RowOutcome::Skip);
        }

        if let Some(needle) = &needle {
            if !title.to_lowercase().contains(needle.as_str()) {
                return Ok(RowOutcome::Skip);
            }
        }

        if let Some(min) = min_end_year {
            let end_year = tsv::get_optional(record, header_map, COL_END_YEAR).and_then(tsv::parse_year);
            if !end_year.is_some_and(|y| y >= min) {
                return Ok(RowOutcome::Skip);
            }
        }

        Ok(RowOutcome::Keep(SeriesDescriptor {
            id: id.to_string(),
            title: title.to_string(),
        }))
    })?;

    // `sort_by` is stable, so equal titles keep file order.
    table.rows.sort_by(|a, b| a.title.cmp(&b.title));
    Ok(table)
}

/// Find a catalog entry by id.
pub fn find_series<'a>(catalog: &'a [SeriesDescriptor], series_id: &str) -> Option<&'a SeriesDescriptor> {
    let series_id = series_id.trim();
    catalog.iter().find(|s| s.id == series_id)
}
