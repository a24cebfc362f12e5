//! Export converted annual prices to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts:
//! full-precision numbers, empty cells for values that could not be computed.

use std::path::Path;

use crate::domain::ConvertedAnnualPrice;
use crate::error::AppError;

const HEADER: [&str; 7] = [
    "year",
    "avg_price_usd",
    "months",
    "method",
    "btc_usd",
    "price_btc",
    "price_sats",
];

/// Write converted rows to a CSV file.
pub fn write_results_csv(path: &Path, rows: &[ConvertedAnnualPrice]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(HEADER)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        writer
            .write_record([
                r.annual.year.to_string(),
                r.annual.avg_price.to_string(),
                r.annual.months.to_string(),
                r.annual.method(),
                opt_cell(r.reference_unit_price),
                opt_cell(r.price_in_reference_units),
                opt_cell(r.price_in_sub_units),
            ])
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV '{}': {e}", path.display())))?;
    log::info!("wrote {} row(s) to '{}'", rows.len(), path.display());
    Ok(())
}

fn opt_cell(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}
