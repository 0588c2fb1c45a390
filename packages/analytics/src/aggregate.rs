//! Grouped sums and means.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use queimadas_analytics_models::{AggregateRow, GroupRow, Reducer};
use queimadas_dataset_models::{Dimension, DimensionValue, Measure, Row, Table};

use crate::AnalyticsError;

/// Extracts the group key of `row` for `dimensions`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDimension`] if the row lacks one of the
/// dimensions.
pub fn group_key<R: Row>(
    row: &R,
    index: usize,
    dimensions: &[Dimension],
) -> Result<Vec<DimensionValue>, AnalyticsError> {
    dimensions
        .iter()
        .map(|&dimension| {
            row.dimension(dimension)
                .ok_or(AnalyticsError::MissingDimension {
                    dimension,
                    row: index,
                })
        })
        .collect()
}

#[derive(Default)]
struct Accumulator {
    sum: f64,
    present: usize,
}

impl Accumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.present += 1;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn reduce(&self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Sum => Some(self.sum),
            Reducer::Mean => (self.present > 0).then(|| self.sum / self.present as f64),
        }
    }
}

/// Aggregates several measures in one pass.
///
/// Returns one row per distinct key, ordered by the natural sort of the key
/// values. `values[i]` holds the reduction of `measures[i]`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDimension`] if a row lacks a grouping
/// dimension.
pub fn aggregate<R: Row>(
    table: &Table<R>,
    group_keys: &[Dimension],
    measures: &[(Measure, Reducer)],
) -> Result<Vec<AggregateRow>, AnalyticsError> {
    let mut groups: BTreeMap<Vec<DimensionValue>, (usize, Vec<Accumulator>)> = BTreeMap::new();

    for (index, row) in table.iter().enumerate() {
        let key = group_key(row, index, group_keys)?;
        let (count, accumulators) = groups.entry(key).or_insert_with(|| {
            (
                0,
                measures.iter().map(|_| Accumulator::default()).collect(),
            )
        });
        *count += 1;
        for ((measure, _), accumulator) in measures.iter().zip(accumulators.iter_mut()) {
            accumulator.push(row.measure(*measure));
        }
    }

    Ok(groups
        .into_iter()
        .map(|(key, (count, accumulators))| AggregateRow {
            key,
            values: measures
                .iter()
                .zip(&accumulators)
                .map(|((_, reducer), accumulator)| accumulator.reduce(*reducer))
                .collect(),
            count,
        })
        .collect())
}

/// Sums `measure` per distinct combination of `group_keys`.
///
/// Missing measures count as zero; groups are ordered by the natural sort of
/// their keys.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDimension`] if a row lacks a grouping
/// dimension.
pub fn sum_by<R: Row>(
    table: &Table<R>,
    group_keys: &[Dimension],
    measure: Measure,
) -> Result<Vec<GroupRow>, AnalyticsError> {
    let rows = aggregate(table, group_keys, &[(measure, Reducer::Sum)])?
        .into_iter()
        .map(|row| GroupRow {
            value: row.values.first().copied().flatten().unwrap_or_default(),
            key: row.key,
            count: row.count,
        })
        .collect::<Vec<_>>();
    log::debug!(
        "sum_by({group_keys:?}, {measure}) produced {} groups from {} rows",
        rows.len(),
        table.len()
    );
    Ok(rows)
}

/// Averages `measure` per distinct combination of `group_keys`, ignoring
/// rows where it is missing. A group with no present values is `None`.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDimension`] if a row lacks a grouping
/// dimension.
pub fn mean_by<R: Row>(
    table: &Table<R>,
    group_keys: &[Dimension],
    measure: Measure,
) -> Result<Vec<(Vec<DimensionValue>, Option<f64>)>, AnalyticsError> {
    Ok(aggregate(table, group_keys, &[(measure, Reducer::Mean)])?
        .into_iter()
        .map(|row| (row.key, row.values.first().copied().flatten()))
        .collect())
}

/// Ungrouped sum of `measure`, missing values counting as zero.
#[must_use]
pub fn total<R: Row>(table: &Table<R>, measure: Measure) -> f64 {
    table
        .iter()
        .filter_map(|row| row.measure(measure))
        .sum()
}

/// Orders aggregate rows by value, breaking ties by key.
#[must_use]
pub fn sort_by_value(mut rows: Vec<GroupRow>, ascending: bool) -> Vec<GroupRow> {
    rows.sort_by(|a, b| {
        let by_value = a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal);
        let by_value = if ascending { by_value } else { by_value.reverse() };
        by_value.then_with(|| a.key.cmp(&b.key))
    });
    rows
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use queimadas_dataset_models::{DeforestationRecord, FireRecord, WeatherRecord};

    use super::*;

    fn fire(state: &str, year: i32, month: u32, focuses: Option<f64>) -> FireRecord {
        FireRecord {
            state: state.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, 1).unwrap(),
            year,
            month,
            focuses,
        }
    }

    fn fires() -> Table<FireRecord> {
        Table::new(vec![
            fire("PA", 2022, 9, Some(300.0)),
            fire("AC", 2022, 9, Some(50.0)),
            fire("PA", 2022, 3, Some(20.0)),
            fire("MT", 2023, 3, None),
            fire("AC", 2023, 9, Some(70.0)),
        ])
    }

    fn deforestation(year: i32, area: f64) -> DeforestationRecord {
        DeforestationRecord {
            state: "PA".to_string(),
            municipality: "Altamira".to_string(),
            geocode: "1500602".to_string(),
            year,
            area: Some(area),
        }
    }

    #[test]
    fn sums_per_group_in_key_order() {
        let rows = sum_by(&fires(), &[Dimension::State], Measure::Focuses).unwrap();
        let labels: Vec<String> = rows.iter().map(GroupRow::label).collect();
        assert_eq!(labels, vec!["AC", "MT", "PA"]);
        assert!((rows[0].value - 120.0).abs() < f64::EPSILON);
        assert!(rows[1].value.abs() < f64::EPSILON);
        assert_eq!(rows[1].count, 1);
        assert!((rows[2].value - 320.0).abs() < f64::EPSILON);
    }

    #[test]
    fn group_sums_add_up_to_total() {
        let table = fires();
        let expected = total(&table, Measure::Focuses);
        for keys in [
            vec![Dimension::State],
            vec![Dimension::Month],
            vec![Dimension::Year, Dimension::Month],
            vec![Dimension::Government],
            vec![Dimension::State, Dimension::Date],
        ] {
            let rows = sum_by(&table, &keys, Measure::Focuses).unwrap();
            let sum: f64 = rows.iter().map(|r| r.value).sum();
            assert!((sum - expected).abs() < 1e-9, "{keys:?}: {sum} != {expected}");
            let count: usize = rows.iter().map(|r| r.count).sum();
            assert_eq!(count, table.len());
        }
    }

    #[test]
    fn multi_key_groups_sort_naturally() {
        let rows =
            sum_by(&fires(), &[Dimension::Year, Dimension::Month], Measure::Focuses).unwrap();
        let keys: Vec<(i64, i64)> = rows
            .iter()
            .map(|r| (r.key[0].as_int().unwrap(), r.key[1].as_int().unwrap()))
            .collect();
        assert_eq!(keys, vec![(2022, 3), (2022, 9), (2023, 3), (2023, 9)]);
    }

    #[test]
    fn government_aggregate_only_counts_its_years() {
        let table = Table::new(vec![
            deforestation(2020, 100.0),
            deforestation(2021, 120.0),
            deforestation(2022, 90.0),
            deforestation(2023, 80.0),
        ]);
        let rows = sum_by(&table, &[Dimension::Government], Measure::Area).unwrap();
        let bolsonaro = rows
            .iter()
            .find(|r| r.label() == "Bolsonaro")
            .unwrap();
        assert!((bolsonaro.value - 310.0).abs() < f64::EPSILON);
        assert_eq!(bolsonaro.count, 3);
        let lula = rows.iter().find(|r| r.label() == "Lula").unwrap();
        assert!((lula.value - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_grouping_dimension_is_an_error() {
        let table = Table::new(vec![WeatherRecord {
            state: None,
            date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            year: 2023,
            month: 1,
            focuses: Some(1.0),
            temperature_max: None,
            temperature_mean: None,
            precipitation: None,
        }]);
        assert!(matches!(
            sum_by(&table, &[Dimension::State], Measure::Focuses),
            Err(AnalyticsError::MissingDimension {
                dimension: Dimension::State,
                row: 0
            })
        ));
    }

    #[test]
    fn mean_ignores_missing_values() {
        let rows = mean_by(&fires(), &[Dimension::Year], Measure::Focuses).unwrap();
        assert_eq!(rows.len(), 2);
        assert!((rows[0].1.unwrap() - 370.0 / 3.0).abs() < 1e-9);
        assert!((rows[1].1.unwrap() - 70.0).abs() < f64::EPSILON);

        let none = mean_by(&fires(), &[Dimension::Year], Measure::Precipitation).unwrap();
        assert!(none.iter().all(|(_, mean)| mean.is_none()));
    }

    #[test]
    fn sorts_by_value_both_ways() {
        let rows = sum_by(&fires(), &[Dimension::State], Measure::Focuses).unwrap();
        let ascending: Vec<String> = sort_by_value(rows.clone(), true)
            .iter()
            .map(GroupRow::label)
            .collect();
        assert_eq!(ascending, vec!["MT", "AC", "PA"]);
        let descending: Vec<String> = sort_by_value(rows, false)
            .iter()
            .map(GroupRow::label)
            .collect();
        assert_eq!(descending, vec!["PA", "AC", "MT"]);
    }

    #[test]
    fn empty_table_has_no_groups() {
        let table: Table<FireRecord> = Table::default();
        assert!(sum_by(&table, &[Dimension::State], Measure::Focuses).unwrap().is_empty());
        assert!(total(&table, Measure::Focuses).abs() < f64::EPSILON);
    }
}
