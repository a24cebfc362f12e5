//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - shared read-only across selections once loaded
//! - exported to JSON/CSV
//! - compared directly in tests

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Period code carrying the published annual average.
pub const ANNUAL_PERIOD: &str = "M13";

/// Months represented by an annual-code observation.
pub const MONTHS_PER_YEAR: u32 = 12;

/// Satoshis per bitcoin.
pub const SATS_PER_BTC: f64 = 100_000_000.0;

/// One entry of the series catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesDescriptor {
    pub id: String,
    pub title: String,
}

/// A single CPI observation row.
///
/// `(series_id, year, period)` is not unique in the published files.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub series_id: String,
    pub year: i32,
    /// `M01`..`M12` for monthly values, `M13` for the annual average.
    pub period: String,
    pub value: Option<f64>,
}

/// One BTC/USD price sample. Several samples per year are normal.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceObservation {
    pub year: i32,
    pub period: String,
    pub value: Option<f64>,
}

/// How an annual price was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    /// Taken verbatim from the `M13` row.
    AnnualCode,
    /// Mean of the `M01`..`M12` rows present for the year.
    MonthlyAverage,
}

/// Resolved annual price for one year of one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualPrice {
    pub year: i32,
    pub avg_price: f64,
    /// Monthly samples behind `avg_price` (12 for the annual code).
    pub months: u32,
    pub source: PriceSource,
}

impl AnnualPrice {
    /// Human-readable derivation tag (`"annual code"`, `"7 mo avg"`).
    pub fn method(&self) -> String {
        match self.source {
            PriceSource::AnnualCode => "annual code".to_string(),
            PriceSource::MonthlyAverage => format!("{} mo avg", self.months),
        }
    }
}

/// Annual price re-expressed in bitcoin terms.
///
/// All values are full precision; rounding is a presentation concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedAnnualPrice {
    #[serde(flatten)]
    pub annual: AnnualPrice,
    /// Mean BTC/USD price for the year.
    pub reference_unit_price: Option<f64>,
    pub price_in_reference_units: Option<f64>,
    pub price_in_sub_units: Option<f64>,
}

/// Input files and filters for a session.
///
/// This is derived from CLI flags / environment (plus defaults).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub series_path: PathBuf,
    pub price_path: PathBuf,
    pub reference_path: PathBuf,
    /// Case-insensitive substring the catalog title must contain.
    pub title_filter: Option<String>,
    /// Minimum catalog `end_year` for a series to be listed.
    pub min_end_year: Option<i32>,
    /// Observations before this year are ignored.
    pub min_year: Option<i32>,
}

/// Full-precision series for line charts (year → value).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    pub usd: Vec<(i32, f64)>,
    /// Years without a bitcoin price are absent here.
    pub sats: Vec<(i32, f64)>,
}

/// A saved report file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFile {
    pub tool: String,
    pub generated_at: DateTime<FixedOffset>,
    pub series: SeriesDescriptor,
    pub rows: Vec<ConvertedAnnualPrice>,
    pub charts: ChartData,
}
