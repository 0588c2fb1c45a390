//! Year-against-year monthly comparisons.
//!
//! Used to line up the same months across several years (e.g. the first
//! four months of each administration year) and to total those windows.

use std::collections::{BTreeMap, BTreeSet};

use queimadas_analytics_models::{MonthlyTotal, YearTotal};
use queimadas_dataset_models::{Dimension, DimensionValue, Measure, Row, Table};

use crate::AnalyticsError;
use crate::aggregate::sum_by;

/// Sums `measure` per `(year, month)` for every year `>= from_year`,
/// ordered by year then month.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a row lacks a year or month, or a key does
/// not fit the target integer types.
pub fn monthly_totals<R: Row>(
    table: &Table<R>,
    measure: Measure,
    from_year: i32,
) -> Result<Vec<MonthlyTotal>, AnalyticsError> {
    let rows = sum_by(table, &[Dimension::Year, Dimension::Month], measure)?;
    let mut totals = Vec::with_capacity(rows.len());

    for row in rows {
        let conversion = || AnalyticsError::Conversion {
            message: format!("invalid year/month key {}", row.label()),
        };
        let year = row
            .key
            .first()
            .and_then(DimensionValue::as_int)
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(conversion)?;
        let month = row
            .key
            .get(1)
            .and_then(DimensionValue::as_int)
            .and_then(|m| u32::try_from(m).ok())
            .ok_or_else(conversion)?;

        if year >= from_year {
            totals.push(MonthlyTotal {
                year,
                month,
                value: row.value,
            });
        }
    }

    Ok(totals)
}

/// Keeps only the points whose month is in `months`.
#[must_use]
pub fn months_window(points: &[MonthlyTotal], months: &[u32]) -> Vec<MonthlyTotal> {
    points
        .iter()
        .filter(|p| months.contains(&p.month))
        .copied()
        .collect()
}

/// Months `1..=last`, the "first N months of the year" window.
#[must_use]
pub fn leading_months(last: u32) -> Vec<u32> {
    (1..=last.min(12)).collect()
}

/// Drops the points of `year` whose month is `>= month`, e.g. a partially
/// observed current month.
#[must_use]
pub fn drop_from(points: &[MonthlyTotal], year: i32, month: u32) -> Vec<MonthlyTotal> {
    points
        .iter()
        .filter(|p| p.year != year || p.month < month)
        .copied()
        .collect()
}

/// Totals the points per year, ordered by year.
#[must_use]
pub fn cumulative_by_year(points: &[MonthlyTotal]) -> Vec<YearTotal> {
    let mut totals: BTreeMap<i32, f64> = BTreeMap::new();
    for point in points {
        *totals.entry(point.year).or_default() += point.value;
    }
    totals
        .into_iter()
        .map(|(year, value)| YearTotal { year, value })
        .collect()
}

/// Distinct years present in `points`, ascending.
#[must_use]
pub fn years(points: &[MonthlyTotal]) -> Vec<i32> {
    points
        .iter()
        .map(|p| p.year)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// The latest `(year, month)` present in `points`.
#[must_use]
pub fn latest_period(points: &[MonthlyTotal]) -> Option<(i32, u32)> {
    points.iter().map(|p| (p.year, p.month)).max()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use queimadas_dataset_models::FireRecord;

    use super::*;

    fn fire(year: i32, month: u32, day: u32, focuses: f64) -> FireRecord {
        FireRecord {
            state: "PA".to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
            year,
            month,
            focuses: Some(focuses),
        }
    }

    fn table() -> Table<FireRecord> {
        Table::new(vec![
            fire(2019, 1, 1, 999.0),
            fire(2020, 1, 1, 10.0),
            fire(2020, 1, 15, 5.0),
            fire(2020, 2, 1, 20.0),
            fire(2020, 9, 1, 900.0),
            fire(2023, 1, 1, 8.0),
            fire(2023, 5, 1, 3.0),
        ])
    }

    #[test]
    fn monthly_totals_skip_earlier_years() {
        let points = monthly_totals(&table(), Measure::Focuses, 2020).unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(
            points[0],
            MonthlyTotal {
                year: 2020,
                month: 1,
                value: 15.0
            }
        );
        assert!(points.iter().all(|p| p.year >= 2020));
    }

    #[test]
    fn early_year_window_and_cumulative_totals() {
        let points = monthly_totals(&table(), Measure::Focuses, 2020).unwrap();
        let window = months_window(&points, &leading_months(4));
        assert_eq!(window.len(), 3);
        let cumulative = cumulative_by_year(&window);
        assert_eq!(
            cumulative,
            vec![
                YearTotal {
                    year: 2020,
                    value: 35.0
                },
                YearTotal {
                    year: 2023,
                    value: 8.0
                },
            ]
        );
    }

    #[test]
    fn drops_partial_months_of_one_year_only() {
        let points = monthly_totals(&table(), Measure::Focuses, 2020).unwrap();
        let trimmed = drop_from(&points, 2023, 5);
        assert_eq!(trimmed.len(), 4);
        assert!(!trimmed.iter().any(|p| p.year == 2023 && p.month == 5));
        assert!(trimmed.iter().any(|p| p.year == 2020 && p.month == 9));
    }

    #[test]
    fn lists_years_and_latest_period() {
        let points = monthly_totals(&table(), Measure::Focuses, 2019).unwrap();
        assert_eq!(years(&points), vec![2019, 2020, 2023]);
        assert_eq!(latest_period(&points), Some((2023, 5)));
        assert_eq!(latest_period(&[]), None);
    }

    #[test]
    fn leading_months_caps_at_december() {
        assert_eq!(leading_months(4), vec![1, 2, 3, 4]);
        assert_eq!(leading_months(20).len(), 12);
        assert!(leading_months(0).is_empty());
    }
}
