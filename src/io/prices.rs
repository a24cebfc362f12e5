//! Observation tables: CPI prices (`ap.data.*`) and BTC/USD reference prices.
//!
//! Values are converted to `Option<f64>` here, once. A value that does not
//! parse is kept as `None` so the row still counts toward the table, while a
//! row without a usable year is skipped with a `RowError`.

use std::path::Path;

use crate::domain::{Observation, ReferenceObservation};
use crate::error::LoadError;
use crate::io::tsv::{self, RowOutcome, Table};
use crate::pricing::sanitize_reference_value;

const COL_SERIES_ID: &str = "series_id";
const COL_YEAR: &str = "year";
const COL_PERIOD: &str = "period";
const COL_VALUE: &str = "value";

/// Load CPI observations, dropping years before `min_year`.
pub fn load_prices(path: &Path, min_year: Option<i32>) -> Result<Table<Observation>, LoadError> {
    tsv::read_table(
        path,
        &[COL_SERIES_ID, COL_YEAR, COL_PERIOD, COL_VALUE],
        |record, header_map| {
            let series_id = tsv::get_required(record, header_map, COL_SERIES_ID)?;
            let year = parse_year_field(tsv::get_required(record, header_map, COL_YEAR)?)?;
            if min_year.is_some_and(|min| year < min) {
                return Ok(RowOutcome::Skip);
            }
            let period = tsv::get_required(record, header_map, COL_PERIOD)?;
            let value = tsv::parse_opt_f64(tsv::get_optional(record, header_map, COL_VALUE));

            Ok(RowOutcome::Keep(Observation {
                series_id: series_id.to_string(),
                year,
                period: period.to_string(),
                value,
            }))
        },
    )
}

/// Load BTC/USD reference prices, sanitizing currency-formatted values.
pub fn load_reference_prices(path: &Path, min_year: Option<i32>) -> Result<Table<ReferenceObservation>, LoadError> {
    tsv::read_table(path, &[COL_YEAR, COL_PERIOD, COL_VALUE], |record, header_map| {
        let year = parse_year_field(tsv::get_required(record, header_map, COL_YEAR)?)?;
        if min_year.is_some_and(|min| year < min) {
            return Ok(RowOutcome::Skip);
        }
        let period = tsv::get_optional(record, header_map, COL_PERIOD).unwrap_or_default();
        let raw = tsv::get_optional(record, header_map, COL_VALUE);
        let value = raw.and_then(sanitize_reference_value);
        if let (Some(raw), None) = (raw, value) {
            log::debug!("'{}': unparsable reference value {raw:?} for {year}", path.display());
        }

        Ok(RowOutcome::Keep(ReferenceObservation {
            year,
            period: period.to_string(),
            value,
        }))
    })
}

fn parse_year_field(s: &str) -> Result<i32, String> {
    tsv::parse_year(s).ok_or_else(|| format!("Invalid year '{s}'."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(name: &str, body: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        (dir, path)
    }

    #[test]
    fn prices_keep_missing_values_and_drop_bad_years() {
        let (_dir, path) = write(
            "ap.data.0.Current",
            concat!(
                "series_id        \tyear\tperiod\t       value\tfootnote_codes\n",
                "APU0000701111    \t2020\tM01\t      0.512\t\n",
                "APU0000701111    \t2020\tM02\t          -\t\n",
                "APU0000701111    \tyear\tM03\t      0.530\t\n",
                "APU0000701111    \t2016\tM01\t      0.400\t\n",
            ),
        );

        let table = load_prices(&path, Some(2017)).unwrap();
        assert_eq!(table.rows_read, 4);
        assert_eq!(table.len(), 2);
        assert_eq!(table.row_errors.len(), 1);
        assert_eq!(table.rows[0].series_id, "APU0000701111");
        assert_eq!(table.rows[0].value, Some(0.512));
        assert_eq!(table.rows[1].period, "M02");
        assert_eq!(table.rows[1].value, None);
    }

    #[test]
    fn prices_require_value_column() {
        let (_dir, path) = write("p.tsv", "series_id\tyear\tperiod\nA\t2020\tM01\n");
        let err = load_prices(&path, None).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { ref column, .. } if column == "value"));
    }

    #[test]
    fn reference_values_are_sanitized_at_load() {
        let (_dir, path) = write(
            "bitcoin.price.period",
            concat!(
                "year\tperiod\tvalue\n",
                "2020\tP1\t$20,000.00\n",
                "2020\tP2\t$\u{00a0}22,000.00\n",
                "2021\tP1\tn/a\n",
            ),
        );

        let table = load_reference_prices(&path, None).unwrap();
        let values: Vec<Option<f64>> = table.rows.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(20_000.0), Some(22_000.0), None]);
        assert!(table.row_errors.is_empty());
    }
}
