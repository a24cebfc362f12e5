//! Re-expressing annual USD prices in bitcoin and satoshis.

use std::collections::BTreeMap;

use crate::domain::{AnnualPrice, ConvertedAnnualPrice, ReferenceObservation, SATS_PER_BTC};

/// Symbols stripped wherever they appear in a reference price.
const CURRENCY_SYMBOLS: [char; 5] = ['$', '€', '£', '¥', '₿'];

/// Currency codes accepted as a separate leading or trailing word.
const CURRENCY_CODES: [&str; 3] = ["USD", "BTC", "XBT"];

/// Parse a currency-formatted reference price such as `"$ 21,000.00"`.
///
/// Accepted noise: currency symbols, any whitespace (including U+00A0 and
/// U+202F), a currency code set off by whitespace (`"USD 42"`), and `,`
/// thousands separators in groups of three. Any other letter (`"21k"`,
/// `"1.5M"`), anything embedded in the number, or a comma that is not a
/// thousands separator (`"1234,50"`) yields `None`.
pub fn sanitize_reference_value(raw: &str) -> Option<f64> {
    let mut words: Vec<String> = raw
        .split_whitespace()
        .map(|w| w.chars().filter(|c| !CURRENCY_SYMBOLS.contains(c)).collect::<String>())
        .filter(|w| !w.is_empty())
        .collect();

    if words.len() > 1 && is_currency_code(&words[0]) {
        words.remove(0);
    }
    if words.len() > 1 && words.last().is_some_and(|w| is_currency_code(w)) {
        words.pop();
    }

    let body = words.concat();
    if body.is_empty() || !body.chars().all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ',')) {
        return None;
    }

    let number = strip_thousands_separators(&body)?;
    let value = number.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

fn is_currency_code(word: &str) -> bool {
    CURRENCY_CODES.iter().any(|code| code.eq_ignore_ascii_case(word))
}

fn strip_thousands_separators(body: &str) -> Option<String> {
    if !body.contains(',') {
        return Some(body.to_string());
    }

    let (int_part, frac_part) = match body.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (body, None),
    };
    if frac_part.is_some_and(|f| f.contains(',')) {
        return None;
    }

    let unsigned = int_part.strip_prefix('-').unwrap_or(int_part);
    let mut groups = unsigned.split(',');
    let lead = groups.next()?;
    if lead.is_empty() || lead.len() > 3 || !groups.all(|g| g.len() == 3) {
        return None;
    }

    Some(body.replace(',', ""))
}

/// Mean reference price per year over the samples that carry a value.
pub fn reference_by_year(reference: &[ReferenceObservation]) -> BTreeMap<i32, f64> {
    let mut acc: BTreeMap<i32, (f64, u32)> = BTreeMap::new();
    for obs in reference {
        if let Some(v) = obs.value {
            let e = acc.entry(obs.year).or_insert((0.0, 0));
            e.0 += v;
            e.1 += 1;
        }
    }
    acc.into_iter().map(|(year, (sum, n))| (year, sum / n as f64)).collect()
}

/// Left-join annual prices with the yearly reference price and derive BTC / sats prices.
///
/// Every input year is kept. Years without a usable (present, non-zero)
/// reference price carry `None` conversions.
pub fn convert(annual: &[AnnualPrice], reference: &[ReferenceObservation]) -> Vec<ConvertedAnnualPrice> {
    let yearly = reference_by_year(reference);

    annual
        .iter()
        .map(|a| {
            let reference_unit_price = yearly.get(&a.year).copied();
            let price_in_reference_units = reference_unit_price.and_then(|unit| divide(a.avg_price, unit));
            ConvertedAnnualPrice {
                annual: a.clone(),
                reference_unit_price,
                price_in_reference_units,
                price_in_sub_units: price_in_reference_units.map(|btc| btc * SATS_PER_BTC),
            }
        })
        .collect()
}

fn divide(price: f64, unit_price: f64) -> Option<f64> {
    if unit_price == 0.0 {
        return None;
    }
    let v = price / unit_price;
    v.is_finite().then_some(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceSource;

    fn annual(year: i32, avg_price: f64) -> AnnualPrice {
        AnnualPrice {
            year,
            avg_price,
            months: 12,
            source: PriceSource::AnnualCode,
        }
    }

    fn reference(year: i32, value: Option<f64>) -> ReferenceObservation {
        ReferenceObservation {
            year,
            period: "P1".to_string(),
            value,
        }
    }

    #[test]
    fn sanitize_currency_formats() {
        assert_eq!(sanitize_reference_value("$ 1,234.50"), Some(1234.50));
        assert_eq!(sanitize_reference_value("$20,000.00"), Some(20_000.0));
        assert_eq!(sanitize_reference_value("21\u{202f}000.5"), Some(21_000.5));
        assert_eq!(sanitize_reference_value("\u{00a0}$\u{00a0}9,876,543.21 "), Some(9_876_543.21));
        assert_eq!(sanitize_reference_value("USD 42"), Some(42.0));
        assert_eq!(sanitize_reference_value("21,000 usd"), Some(21_000.0));
        assert_eq!(sanitize_reference_value("-$5.25"), Some(-5.25));
        assert_eq!(sanitize_reference_value("₿1"), Some(1.0));
    }

    #[test]
    fn sanitize_never_guesses_magnitude() {
        assert_eq!(sanitize_reference_value("1 234,?50"), None);
        assert_eq!(sanitize_reference_value("1234,50"), None);
        assert_eq!(sanitize_reference_value("1,23"), None);
        assert_eq!(sanitize_reference_value("1,234,5"), None);
        assert_eq!(sanitize_reference_value("1.234,50"), None);
        assert_eq!(sanitize_reference_value(",123"), None);
        assert_eq!(sanitize_reference_value("21k"), None);
        assert_eq!(sanitize_reference_value("1.5M"), None);
        assert_eq!(sanitize_reference_value("12e"), None);
        assert_eq!(sanitize_reference_value("USD42"), None);
        assert_eq!(sanitize_reference_value("42 EUR"), None);
    }

    #[test]
    fn sanitize_rejects_non_numbers() {
        for raw in ["", "   ", "$", "n/a", "NaN", "inf", "1.2.3", "--5", "12e3"] {
            assert_eq!(sanitize_reference_value(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn reference_mean_per_year_skips_missing() {
        let rows = vec![
            reference(2020, Some(20_000.0)),
            reference(2020, None),
            reference(2020, Some(22_000.0)),
            reference(2021, None),
        ];
        let yearly = reference_by_year(&rows);
        assert_eq!(yearly.len(), 1);
        assert!((yearly[&2020] - 21_000.0).abs() < 1e-9);
    }

    #[test]
    fn end_to_end_conversion() {
        let rows = convert(
            &[AnnualPrice {
                year: 2020,
                avg_price: 102.0,
                months: 3,
                source: PriceSource::MonthlyAverage,
            }],
            &[
                reference(2020, sanitize_reference_value("$20,000.00")),
                reference(2020, sanitize_reference_value("$22,000.00")),
            ],
        );
        assert_eq!(rows.len(), 1);
        let r = &rows[0];
        assert!((r.reference_unit_price.unwrap() - 21_000.0).abs() < 1e-9);
        assert!((r.price_in_reference_units.unwrap() - 0.004_857_142_857).abs() < 1e-12);
        assert!((r.price_in_sub_units.unwrap() - 485_714.285_714).abs() < 1e-3);
    }

    #[test]
    fn zero_or_missing_reference_yields_none() {
        let rows = convert(
            &[annual(2019, 10.0), annual(2020, 10.0)],
            &[reference(2019, Some(0.0)), reference(2020, None)],
        );
        for r in &rows {
            assert_eq!(r.price_in_reference_units, None);
            assert_eq!(r.price_in_sub_units, None);
        }
        assert_eq!(rows[0].reference_unit_price, Some(0.0));
        assert_eq!(rows[1].reference_unit_price, None);
    }

    #[test]
    fn left_join_keeps_every_year() {
        let rows = convert(
            &[annual(2018, 1.0), annual(2019, 2.0), annual(2020, 3.0)],
            &[reference(2019, Some(4.0)), reference(2025, Some(9.0))],
        );
        let years: Vec<i32> = rows.iter().map(|r| r.annual.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020]);
        assert_eq!(rows[0].reference_unit_price, None);
        assert!((rows[1].price_in_reference_units.unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(rows[2].price_in_sub_units, None);
        assert!((rows[2].annual.avg_price - 3.0).abs() < 1e-12);
    }

    #[test]
    fn convert_is_idempotent() {
        let a = vec![annual(2020, 102.0), annual(2021, 110.0)];
        let r = vec![reference(2020, Some(21_000.0)), reference(2021, Some(47_000.0))];
        assert_eq!(convert(&a, &r), convert(&a, &r));
    }
}
