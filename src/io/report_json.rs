//! Read/write report JSON files.
//!
//! Report JSON is the "portable" representation of one selection:
//! - the series descriptor
//! - full-precision converted rows
//! - the two chart series, ready for replotting
//!
//! The schema is defined by `domain::ReportFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;

use crate::domain::{ConvertedAnnualPrice, ReportFile, SeriesDescriptor};
use crate::error::AppError;
use crate::report::chart_data;

/// Write a report JSON file.
pub fn write_report_json(path: &Path, series: &SeriesDescriptor, rows: &[ConvertedAnnualPrice]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;

    let report = ReportFile {
        tool: env!("CARGO_PKG_NAME").to_string(),
        generated_at: Local::now().fixed_offset(),
        series: series.clone(),
        rows: rows.to_vec(),
        charts: chart_data(rows),
    };

    serde_json::to_writer_pretty(file, &report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;

    log::info!("wrote report JSON to '{}'", path.display());
    Ok(())
}

/// Read a report JSON file.
pub fn read_report_json(path: &Path) -> Result<ReportFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: ReportFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}
