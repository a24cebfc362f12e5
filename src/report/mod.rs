//! Presentation of converted prices: display rows and chart series.
//!
//! Nothing here touches a terminal. Front-ends (printing, TUI) consume a
//! `PriceReport` and decide how to draw it.

use crate::domain::{ChartData, ConvertedAnnualPrice, SeriesDescriptor};

pub mod format;

pub use format::*;

/// Column headings of the price table, in display order.
pub const COLUMNS: [&str; 7] = [
    "Year",
    "Price (USD)",
    "Price (Bitcoin)",
    "Price (Sats)",
    "BTC/USD Avg",
    "Months Used",
    "Method",
];

/// Placeholder for values that could not be computed.
pub const NOT_AVAILABLE: &str = "n/a";

/// One formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub year: String,
    pub price_usd: String,
    pub price_btc: String,
    pub price_sats: String,
    pub btc_usd: String,
    pub months: String,
    pub method: String,
}

impl DisplayRow {
    pub fn cells(&self) -> [&str; 7] {
        [
            &self.year,
            &self.price_usd,
            &self.price_btc,
            &self.price_sats,
            &self.btc_usd,
            &self.months,
            &self.method,
        ]
    }
}

/// Everything a front-end needs to show one selected series.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceReport {
    pub series: SeriesDescriptor,
    pub rows: Vec<DisplayRow>,
    pub charts: ChartData,
}

impl PriceReport {
    /// `true` when the series has no usable observations.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn no_data_message(&self) -> String {
        format!("No price data available for series {}.", self.series.id)
    }
}

/// Format converted rows for display and extract the chart series.
pub fn build_report(series: &SeriesDescriptor, rows: &[ConvertedAnnualPrice]) -> PriceReport {
    PriceReport {
        series: series.clone(),
        rows: rows.iter().map(display_row).collect(),
        charts: chart_data(rows),
    }
}

pub fn chart_data(rows: &[ConvertedAnnualPrice]) -> ChartData {
    ChartData {
        usd: rows.iter().map(|r| (r.annual.year, r.annual.avg_price)).collect(),
        sats: rows
            .iter()
            .filter_map(|r| r.price_in_sub_units.map(|s| (r.annual.year, s)))
            .collect(),
    }
}

fn display_row(row: &ConvertedAnnualPrice) -> DisplayRow {
    DisplayRow {
        year: row.annual.year.to_string(),
        price_usd: fmt_usd(row.annual.avg_price),
        price_btc: fmt_or_na(row.price_in_reference_units, fmt_btc),
        price_sats: fmt_or_na(row.price_in_sub_units, fmt_sats),
        btc_usd: fmt_or_na(row.reference_unit_price, fmt_usd),
        months: row.annual.months.to_string(),
        method: row.annual.method(),
    }
}

fn fmt_or_na(v: Option<f64>, f: fn(f64) -> String) -> String {
    v.map(f).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AnnualPrice, PriceSource};

    fn series() -> SeriesDescriptor {
        SeriesDescriptor {
            id: "CUUR0000SA0".to_string(),
            title: "All items, U.S. City Average".to_string(),
        }
    }

    fn converted(year: i32, avg_price: f64, btc_usd: Option<f64>) -> ConvertedAnnualPrice {
        let btc = btc_usd.map(|p| avg_price / p);
        ConvertedAnnualPrice {
            annual: AnnualPrice {
                year,
                avg_price,
                months: 3,
                source: PriceSource::MonthlyAverage,
            },
            reference_unit_price: btc_usd,
            price_in_reference_units: btc,
            price_in_sub_units: btc.map(|b| b * 100_000_000.0),
        }
    }

    #[test]
    fn formats_end_to_end_row() {
        let report = build_report(&series(), &[converted(2020, 102.0, Some(21_000.0))]);
        assert_eq!(
            report.rows[0],
            DisplayRow {
                year: "2020".to_string(),
                price_usd: "$ 102.00".to_string(),
                price_btc: "0.00485714 ₿".to_string(),
                price_sats: "485,714.29 sats".to_string(),
                btc_usd: "$ 21,000.00".to_string(),
                months: "3".to_string(),
                method: "3 mo avg".to_string(),
            }
        );
    }

    #[test]
    fn missing_conversion_renders_placeholder_and_skips_chart_point() {
        let report = build_report(
            &series(),
            &[converted(2019, 100.0, None), converted(2020, 102.0, Some(21_000.0))],
        );
        assert_eq!(report.rows[0].price_sats, NOT_AVAILABLE);
        assert_eq!(report.rows[0].btc_usd, NOT_AVAILABLE);
        assert_eq!(report.rows[0].price_usd, "$ 100.00");
        assert_eq!(report.charts.usd, vec![(2019, 100.0), (2020, 102.0)]);
        assert_eq!(report.charts.sats.len(), 1);
        assert_eq!(report.charts.sats[0].0, 2020);
        // Chart data keeps full precision.
        assert!((report.charts.sats[0].1 - 485_714.285_714_285_7).abs() < 1e-6);
    }

    #[test]
    fn empty_report_has_no_data_message() {
        let report = build_report(&series(), &[]);
        assert!(report.is_empty());
        assert_eq!(report.no_data_message(), "No price data available for series CUUR0000SA0.");
    }
}
