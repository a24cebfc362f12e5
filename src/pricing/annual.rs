//! Annual price resolution for one CPI series.
//!
//! Two candidate values exist per year:
//! - the published annual average (`M13`), taken as-is
//! - the mean of whatever monthly rows (`M01`..`M12`) are present
//!
//! The `M13` value wins whenever it exists; the monthly mean is only a fallback.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ANNUAL_PERIOD, AnnualPrice, MONTHS_PER_YEAR, Observation, PriceSource};

#[derive(Debug, Default, Clone, Copy)]
struct MonthlyAccumulator {
    sum: f64,
    count: u32,
}

impl MonthlyAccumulator {
    fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Resolve one `AnnualPrice` per year for `series_id`, ascending by year.
///
/// Observations with a missing value are ignored. Years where neither the
/// annual code nor any monthly row carries a value are omitted.
pub fn resolve_annual(observations: &[Observation], series_id: &str, min_year: Option<i32>) -> Vec<AnnualPrice> {
    let series_id = series_id.trim();

    let mut annual_code: BTreeMap<i32, f64> = BTreeMap::new();
    let mut monthly: BTreeMap<i32, MonthlyAccumulator> = BTreeMap::new();

    let rows = observations
        .iter()
        .filter(|o| o.series_id == series_id)
        .filter(|o| min_year.is_none_or(|min| o.year >= min));

    for obs in rows {
        let Some(value) = obs.value else { continue };

        if obs.period == ANNUAL_PERIOD {
            match annual_code.entry(obs.year) {
                Entry::Vacant(e) => {
                    e.insert(value);
                }
                Entry::Occupied(e) => {
                    // First row in file order is kept.
                    log::warn!(
                        "{series_id}: duplicate {ANNUAL_PERIOD} row for {} (kept {}, ignored {value})",
                        obs.year,
                        e.get()
                    );
                }
            }
        } else if is_monthly_period(&obs.period) {
            monthly.entry(obs.year).or_default().push(value);
        }
    }

    let years: BTreeSet<i32> = annual_code.keys().chain(monthly.keys()).copied().collect();

    years
        .into_iter()
        .filter_map(|year| {
            if let Some(&avg_price) = annual_code.get(&year) {
                return Some(AnnualPrice {
                    year,
                    avg_price,
                    months: MONTHS_PER_YEAR,
                    source: PriceSource::AnnualCode,
                });
            }
            let acc = monthly.get(&year)?;
            Some(AnnualPrice {
                year,
                avg_price: acc.mean()?,
                months: acc.count,
                source: PriceSource::MonthlyAverage,
            })
        })
        .collect()
}

/// `true` for exactly `M01`..`M12`.
pub fn is_monthly_period(period: &str) -> bool {
    let Some(digits) = period.strip_prefix('M') else {
        return false;
    };
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    matches!(digits.parse::<u8>(), Ok(1..=12))
}
