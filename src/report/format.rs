//! Number formatting and fixed-width terminal output.
//!
//! We keep formatting code in one place so output changes stay localized.

use crate::domain::SeriesDescriptor;
use crate::report::{COLUMNS, PriceReport};

/// `1234.5` → `"$ 1,234.50"`.
pub fn fmt_usd(v: f64) -> String {
    format!("$ {}", fmt_grouped(v, 2))
}

/// Bitcoin amount with satoshi precision.
pub fn fmt_btc(v: f64) -> String {
    format!("{} ₿", fmt_grouped(v, 8))
}

pub fn fmt_sats(v: f64) -> String {
    format!("{} sats", fmt_grouped(v, 2))
}

/// Fixed decimals with `,` between thousands groups.
pub fn fmt_grouped(v: f64, decimals: usize) -> String {
    if !v.is_finite() {
        return v.to_string();
    }

    let s = format!("{:.*}", decimals, v.abs());
    let (int_part, frac_part) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s.as_str(), None),
    };

    let mut out = String::with_capacity(s.len() + int_part.len() / 3 + 1);
    // "-0.00" reads oddly; only keep the sign when a non-zero digit survives.
    if v < 0.0 && s.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    let n = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (n - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format the selected series header.
pub fn format_series_header(series: &SeriesDescriptor) -> String {
    format!("Selected CPI series: {}\n{}\n", series.id, series.title)
}

/// Format the annual price table, or the no-data line when there are no rows.
pub fn format_report(report: &PriceReport) -> String {
    let mut out = String::new();
    out.push_str(&format_series_header(&report.series));
    out.push('\n');

    if report.is_empty() {
        out.push_str(&report.no_data_message());
        out.push('\n');
        return out;
    }

    out.push_str("Annual average price (USD and Bitcoin)\n");

    let mut widths: Vec<usize> = COLUMNS.iter().map(|c| c.chars().count()).collect();
    for row in &report.rows {
        for (w, cell) in widths.iter_mut().zip(row.cells()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    push_line(&mut out, &COLUMNS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    push_line(&mut out, &rule, &widths);
    for row in &report.rows {
        push_line(&mut out, &row.cells(), &widths);
    }

    out
}

/// Titles longer than this are clipped in the catalog listing.
pub const CATALOG_TITLE_WIDTH: usize = 72;

/// Format the catalog as `id  title` lines, one series per line.
pub fn format_catalog(catalog: &[SeriesDescriptor]) -> String {
    let id_width = catalog.iter().map(|s| s.id.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for s in catalog {
        let title = truncate(&s.title, CATALOG_TITLE_WIDTH);
        out.push_str(&format!("{:<id_width$}  {title}\n", s.id));
    }
    out
}

/// Numeric columns are right-aligned; the trailing method column is left-aligned.
fn push_line(out: &mut String, cells: &[&str], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    let mut line = String::new();
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let pad = width.saturating_sub(cell.chars().count());
        if i == last {
            line.push_str(cell);
            line.push_str(&" ".repeat(pad));
        } else {
            line.push_str(&" ".repeat(pad));
            line.push_str(cell);
        }
    }
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Shorten `s` to at most `max` chars, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ChartData;
    use crate::report::DisplayRow;

    #[test]
    fn grouped_numbers() {
        assert_eq!(fmt_grouped(0.0, 2), "0.00");
        assert_eq!(fmt_grouped(999.999, 2), "1,000.00");
        assert_eq!(fmt_grouped(1_234_567.891, 2), "1,234,567.89");
        assert_eq!(fmt_grouped(-1234.5, 1), "-1,234.5");
        assert_eq!(fmt_grouped(-0.001, 2), "0.00");
        assert_eq!(fmt_grouped(123.0, 0), "123");
    }

    #[test]
    fn unit_formats() {
        assert_eq!(fmt_usd(21_000.0), "$ 21,000.00");
        assert_eq!(fmt_btc(0.004_857_142_857), "0.00485714 ₿");
        assert_eq!(fmt_sats(485_714.285_714), "485,714.29 sats");
    }

    #[test]
    fn report_table_layout() {
        let report = PriceReport {
            series: SeriesDescriptor {
                id: "S1".to_string(),
                title: "Eggs".to_string(),
            },
            rows: vec![DisplayRow {
                year: "2020".to_string(),
                price_usd: "$ 1.00".to_string(),
                price_btc: "0.00010000 ₿".to_string(),
                price_sats: "10,000.00 sats".to_string(),
                btc_usd: "$ 10,000.00".to_string(),
                months: "12".to_string(),
                method: "annual code".to_string(),
            }],
            charts: ChartData::default(),
        };

        let txt = format_report(&report);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines[0], "Selected CPI series: S1");
        assert_eq!(lines[1], "Eggs");
        assert_eq!(lines[3], "Annual average price (USD and Bitcoin)");
        assert_eq!(
            lines[4],
            "Year  Price (USD)  Price (Bitcoin)    Price (Sats)  BTC/USD Avg  Months Used  Method"
        );
        assert_eq!(
            lines[6],
            "2020       $ 1.00     0.00010000 ₿  10,000.00 sats  $ 10,000.00           12  annual code"
        );
    }

    #[test]
    fn empty_report_says_so() {
        let report = PriceReport {
            series: SeriesDescriptor {
                id: "S1".to_string(),
                title: "Eggs".to_string(),
            },
            rows: Vec::new(),
            charts: ChartData::default(),
        };
        assert!(format_report(&report).ends_with("No price data available for series S1.\n"));
    }

    #[test]
    fn catalog_is_aligned() {
        let catalog = vec![
            SeriesDescriptor {
                id: "A".to_string(),
                title: "Short id".to_string(),
            },
            SeriesDescriptor {
                id: "ABC".to_string(),
                title: "Long id".to_string(),
            },
        ];
        assert_eq!(format_catalog(&catalog), "A    Short id\nABC  Long id\n");
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 4), "abc…");
    }

    #[test]
    fn long_catalog_titles_are_clipped() {
        let long = "x".repeat(CATALOG_TITLE_WIDTH + 10);
        let catalog = vec![SeriesDescriptor {
            id: "S1".to_string(),
            title: long,
        }];
        let line = format_catalog(&catalog);
        let title = line.trim_end().strip_prefix("S1  ").unwrap();
        assert_eq!(title.chars().count(), CATALOG_TITLE_WIDTH);
        assert!(title.ends_with('…'));
    }
}
