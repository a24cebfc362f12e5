//! Shared "selection pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! observations -> annual resolution -> bitcoin conversion -> display report
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use crate::app::session::Session;
use crate::domain::{ConvertedAnnualPrice, Observation, ReferenceObservation, SeriesDescriptor};
use crate::error::AppError;
use crate::io::find_series;
use crate::pricing::{convert, resolve_annual};
use crate::report::{PriceReport, build_report};

/// All computed outputs for one selected series.
#[derive(Debug, Clone)]
pub struct SelectionOutput {
    pub series: SeriesDescriptor,
    pub converted: Vec<ConvertedAnnualPrice>,
    pub report: PriceReport,
}

/// Run resolution, conversion and formatting for `series` over loaded rows.
pub fn run_selection(
    prices: &[Observation],
    reference: &[ReferenceObservation],
    series: &SeriesDescriptor,
    min_year: Option<i32>,
) -> SelectionOutput {
    let annual = resolve_annual(prices, &series.id, min_year);
    if annual.is_empty() {
        log::info!("{}: no annual prices resolved", series.id);
    }

    let converted = convert(&annual, reference);
    let gaps = converted.iter().filter(|r| r.reference_unit_price.is_none()).count();
    if gaps > 0 {
        log::info!("{}: {gaps} year(s) without a bitcoin price", series.id);
    }

    let report = build_report(series, &converted);
    SelectionOutput {
        series: series.clone(),
        converted,
        report,
    }
}

/// Load (or reuse) the session tables and run the pipeline for `series_id`.
///
/// Fails with exit code 3 when the id is not in the (filtered) catalog.
pub fn run_for_id(session: &mut Session, series_id: &str) -> Result<SelectionOutput, AppError> {
    let tables = session.tables()?;

    let series = find_series(&tables.catalog.rows, series_id).ok_or_else(|| {
        AppError::new(
            3,
            format!(
                "Series '{}' is not in the catalog (after filters). Try `cpi list`, `--any-title`, or `--all-years`.",
                series_id.trim()
            ),
        )
    })?;

    Ok(run_selection(
        &tables.prices.rows,
        &tables.reference.rows,
        series,
        session.config().min_year,
    ))
}
