//! 7-day incidence and its trend for one country.
//!
//! Records are first added up per calendar date. For each backlook `b` in `0..days` the
//! window is the `days` most recent dates after skipping the `b` newest ones, so `days`
//! windows need `2 * days - 1` distinct dates in total.
//! Window sums are converted to cases per 100,000 inhabitants and reported oldest first.
//!
//! The trend compares the *average* of those values against the *oldest* one:
//! `change = average / oldest * 100 - 100`. Downstream consumers depend on that baseline.

use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

use std::cmp::Reverse;

use crate::error::ComputationFault;
use crate::records::CaseRecord;

const PER_INHABITANTS: f64 = 100_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Up,
    Down,
    Flat,
}

impl Direction {
    pub fn of(change_percent: f64) -> Direction {
        if change_percent > 0.0 {
            Direction::Up
        } else if change_percent < 0.0 {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Incidence values, oldest to newest.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IncidenceSeries(Vec<f64>);

impl IncidenceSeries {
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn oldest(&self) -> f64 {
        self.0.first().copied().unwrap_or(0.0)
    }

    pub fn latest(&self) -> f64 {
        self.0.last().copied().unwrap_or(0.0)
    }

    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().sum::<f64>() / self.0.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendResult {
    pub country_code: String,
    pub series: IncidenceSeries,
    pub latest: f64,
    pub average: f64,
    pub change_percent: f64,
    pub direction: Direction,
}

/// One total per calendar date, most recent first.
///
/// Several records on one date (an alias and its canonical code both reporting, or a
/// repeated row) are added up, so every window spans distinct days.
pub fn daily_totals(cases: &[CaseRecord]) -> Vec<u64> {
    cases
        .iter()
        .into_group_map_by(|r| r.date)
        .into_iter()
        .sorted_by_key(|(date, _)| Reverse(*date))
        .map(|(date, recs)| {
            if recs.len() > 1 {
                warn!(
                    country = %recs[0].country_code,
                    %date,
                    records = recs.len(),
                    "Adding up several case records for one date"
                );
            }
            recs.iter().fold(0u64, |acc, r| acc.saturating_add(r.cases))
        })
        .collect()
}

/// `days` sums of `window` consecutive days, oldest window first.
///
/// A window that runs past the oldest date only sums what is there; callers that need
/// complete windows check the number of dates first (see [`required_records`]).
pub fn rolling_sums(cases: &[CaseRecord], days: usize, window: usize) -> Vec<u64> {
    let totals = daily_totals(cases);
    let mut sums: Vec<u64> = (0..days)
        .map(|backlook| {
            totals
                .iter()
                .skip(backlook)
                .take(window)
                .fold(0u64, |acc, n| acc.saturating_add(*n))
        })
        .collect();
    sums.reverse();
    sums
}

/// Distinct dates needed for `days` complete windows of `window` days.
pub fn required_records(days: usize, window: usize) -> usize {
    (days + window).saturating_sub(1)
}

/// Cases per 100,000 inhabitants.
///
/// Multiplies before dividing: whole-number incidences then come out exact, which keeps
/// equal windows equal and a constant series FLAT.
pub fn incidence(cases_sum: u64, population: u64) -> f64 {
    cases_sum as f64 * PER_INHABITANTS / population as f64
}

/// Computes the incidence series and trend of one country over `days` windows of `days` days.
pub fn compute_trend(
    country_code: &str,
    cases: &[CaseRecord],
    population: u64,
    days: usize,
) -> Result<TrendResult, ComputationFault> {
    let required = required_records(days, days);
    let available = cases.iter().map(|r| r.date).unique().count();
    if available < required {
        return Err(ComputationFault::InsufficientHistory {
            country: country_code.to_string(),
            available,
            required,
        });
    }

    let series = IncidenceSeries(
        rolling_sums(cases, days, days)
            .into_iter()
            .map(|sum| incidence(sum, population))
            .collect(),
    );

    let oldest = series.oldest();
    if oldest == 0.0 {
        return Err(ComputationFault::ZeroBaseline {
            country: country_code.to_string(),
        });
    }
    let latest = series.latest();
    let average = series.mean();
    let change_percent = average / oldest * 100.0 - 100.0;

    Ok(TrendResult {
        country_code: country_code.to_string(),
        series,
        latest,
        average,
        change_percent,
        direction: Direction::of(change_percent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    /// Daily counts given oldest first, dated backwards from 2021-03-31.
    fn series(code: &str, daily: &[u64]) -> Vec<CaseRecord> {
        let last = NaiveDate::from_ymd_opt(2021, 3, 31).unwrap();
        daily
            .iter()
            .rev()
            .enumerate()
            .map(|(age, &cases)| CaseRecord {
                country_code: code.to_string(),
                date: last - Duration::days(age as i64),
                cases,
            })
            .collect()
    }

    fn ramp() -> Vec<u64> {
        vec![1, 1, 1, 1, 1, 1, 1, 8, 8, 15, 15, 8, 8]
    }

    #[test]
    fn rolling_sums_are_oldest_first() {
        let cases = series("Y", &ramp());
        assert_eq!(rolling_sums(&cases, 7, 7), vec![7, 14, 21, 35, 49, 56, 63]);
    }

    #[test]
    fn rolling_sums_ignore_input_order() {
        let mut cases = series("Y", &ramp());
        let sorted = rolling_sums(&cases, 7, 7);
        cases.reverse();
        cases.swap(2, 9);
        assert_eq!(rolling_sums(&cases, 7, 7), sorted);
    }

    #[test]
    fn rolling_sums_only_use_the_latest_records() {
        let mut daily = vec![1000; 5];
        daily.extend(ramp());
        let cases = series("Y", &daily);
        assert_eq!(rolling_sums(&cases, 7, 7), vec![7, 14, 21, 35, 49, 56, 63]);
    }

    #[test]
    fn short_history_still_yields_days_values() {
        let cases = series("Y", &[1, 2, 3]);
        let sums = rolling_sums(&cases, 7, 7);
        assert_eq!(sums.len(), 7);
        assert_eq!(sums, vec![0, 0, 0, 0, 1, 3, 6]);
    }

    #[test]
    fn constant_cases_are_flat() {
        let cases = series("X", &[100; 13]);
        let trend = compute_trend("X", &cases, 1_000_000, 7).unwrap();
        assert_eq!(trend.series.values(), &[70.0; 7]);
        assert_eq!(trend.latest, 70.0);
        assert_eq!(trend.average, 70.0);
        assert_eq!(trend.change_percent, 0.0);
        assert_eq!(trend.direction, Direction::Flat);
    }

    #[test]
    fn change_is_relative_to_oldest_value() {
        let cases = series("Y", &ramp());
        let trend = compute_trend("Y", &cases, 100_000, 7).unwrap();
        assert_eq!(trend.series.oldest(), 7.0);
        assert_eq!(trend.latest, 63.0);
        assert!((trend.average - 35.0).abs() < 1e-9);
        assert!((trend.change_percent - 400.0).abs() < 1e-9);
        assert_eq!(trend.direction, Direction::Up);
    }

    #[test]
    fn falling_cases_point_down() {
        let mut daily = ramp();
        daily.reverse();
        let cases = series("Y", &daily);
        let trend = compute_trend("Y", &cases, 100_000, 7).unwrap();
        assert!(trend.change_percent < 0.0);
        assert_eq!(trend.direction, Direction::Down);
    }

    #[test]
    fn insufficient_history_is_a_fault() {
        let cases = series("Y", &[5; 12]);
        assert_eq!(
            compute_trend("Y", &cases, 100_000, 7),
            Err(ComputationFault::InsufficientHistory {
                country: "Y".to_string(),
                available: 12,
                required: 13,
            })
        );
    }

    #[test]
    fn zero_baseline_is_a_fault() {
        let mut daily = vec![0; 7];
        daily.extend([3; 6]);
        let cases = series("Y", &daily);
        assert_eq!(
            compute_trend("Y", &cases, 100_000, 7),
            Err(ComputationFault::ZeroBaseline {
                country: "Y".to_string()
            })
        );
    }

    #[test]
    fn identical_inputs_give_identical_bits() {
        let cases = series("A", &[13, 7, 99, 1, 0, 4, 18, 22, 5, 61, 3, 8, 17]);
        let a = compute_trend("A", &cases, 8_901_064, 7).unwrap();
        let b = compute_trend("A", &cases, 8_901_064, 7).unwrap();
        assert_eq!(a.change_percent.to_bits(), b.change_percent.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn same_date_records_are_added_up() {
        let mut cases = series("GR", &ramp());
        cases.push(CaseRecord {
            country_code: "EL".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 3, 31).unwrap(),
            cases: 0,
        });
        assert_eq!(rolling_sums(&cases, 7, 7), vec![7, 14, 21, 35, 49, 56, 63]);

        cases.push(CaseRecord {
            country_code: "EL".to_string(),
            date: NaiveDate::from_ymd_opt(2021, 3, 28).unwrap(),
            cases: 2,
        });
        assert_eq!(rolling_sums(&cases, 7, 7), vec![7, 14, 21, 37, 51, 58, 65]);
    }

    #[test]
    fn history_is_counted_in_distinct_dates() {
        let mut cases = series("GR", &[5; 12]);
        cases.extend(series("EL", &[5; 3]));
        assert_eq!(
            compute_trend("GR", &cases, 100_000, 7),
            Err(ComputationFault::InsufficientHistory {
                country: "GR".to_string(),
                available: 12,
                required: 13,
            })
        );
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let cases = series("Y", &[u64::MAX, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1]);
        let sums = rolling_sums(&cases, 7, 7);
        assert_eq!(sums[0], u64::MAX);
        assert_eq!(sums[6], 7);
    }
}
