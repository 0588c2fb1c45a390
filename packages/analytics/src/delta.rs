//! Year-over-year deltas of cumulative measures.

use std::collections::BTreeMap;

use queimadas_analytics_models::{DeltaRow, YearTotal};
use queimadas_dataset_models::{Dimension, DimensionValue, Measure, Row, Table};

use crate::AnalyticsError;
use crate::aggregate::group_key;

/// Computes the consecutive difference of `measure` per entity.
///
/// Rows are grouped by `entity_keys`, sorted by `year_key` ascending within
/// each entity (stable, so duplicate years keep load order), and differenced.
/// The first observation of every entity has a delta of exactly zero.
/// Missing measures count as zero. Output is ordered by entity, then year.
///
/// # Errors
///
/// Returns [`AnalyticsError::MissingDimension`] if a row lacks an entity
/// dimension or the year, and [`AnalyticsError::Conversion`] if the year
/// dimension is not an integer.
pub fn delta_by_year<R: Row>(
    table: &Table<R>,
    entity_keys: &[Dimension],
    year_key: Dimension,
    measure: Measure,
) -> Result<Vec<DeltaRow>, AnalyticsError> {
    let mut entities: BTreeMap<Vec<DimensionValue>, Vec<(i64, f64)>> = BTreeMap::new();

    for (index, row) in table.iter().enumerate() {
        let entity = group_key(row, index, entity_keys)?;
        let year = row
            .dimension(year_key)
            .ok_or(AnalyticsError::MissingDimension {
                dimension: year_key,
                row: index,
            })?;
        let year = year.as_int().ok_or_else(|| AnalyticsError::Conversion {
            message: format!("{year_key} value '{year}' in row {index} is not an integer"),
        })?;
        entities
            .entry(entity)
            .or_default()
            .push((year, row.measure(measure).unwrap_or_default()));
    }

    let mut rows = Vec::with_capacity(table.len());
    for (entity, mut observations) in entities {
        observations.sort_by_key(|(year, _)| *year);
        let mut previous: Option<f64> = None;
        for (year, value) in observations {
            rows.push(DeltaRow {
                entity: entity.clone(),
                year,
                value,
                delta: previous.map_or(0.0, |p| value - p),
            });
            previous = Some(value);
        }
    }

    log::debug!(
        "delta_by_year({entity_keys:?}, {year_key}, {measure}) produced {} rows",
        rows.len()
    );

    Ok(rows)
}

/// Sums per-entity deltas into one value per year.
///
/// # Errors
///
/// Returns [`AnalyticsError::Conversion`] if a year does not fit in `i32`.
pub fn yearly_delta_totals(deltas: &[DeltaRow]) -> Result<Vec<YearTotal>, AnalyticsError> {
    let mut totals: BTreeMap<i64, f64> = BTreeMap::new();
    for row in deltas {
        *totals.entry(row.year).or_default() += row.delta;
    }
    totals
        .into_iter()
        .map(|(year, value)| {
            let year = i32::try_from(year).map_err(|_| AnalyticsError::Conversion {
                message: format!("year {year} out of range"),
            })?;
            Ok(YearTotal { year, value })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use queimadas_dataset_models::{DeforestationRecord, LOCALITY_KEY};

    use super::*;

    fn record(
        municipality: &str,
        geocode: &str,
        year: i32,
        area: Option<f64>,
    ) -> DeforestationRecord {
        DeforestationRecord {
            state: "PA".to_string(),
            municipality: municipality.to_string(),
            geocode: geocode.to_string(),
            year,
            area,
        }
    }

    fn deltas_of(rows: &[DeltaRow]) -> Vec<f64> {
        rows.iter().map(|r| r.delta).collect()
    }

    #[test]
    fn consecutive_differences_within_locality() {
        let table = Table::new(vec![
            record("Altamira", "1500602", 2020, Some(100.0)),
            record("Altamira", "1500602", 2021, Some(120.0)),
            record("Altamira", "1500602", 2022, Some(90.0)),
            record("Altamira", "1500602", 2023, Some(80.0)),
        ]);
        let rows = delta_by_year(&table, LOCALITY_KEY, Dimension::Year, Measure::Area).unwrap();
        assert_eq!(deltas_of(&rows), vec![0.0, 20.0, -30.0, -10.0]);
    }

    #[test]
    fn unsorted_input_is_sorted_by_year() {
        let table = Table::new(vec![
            record("Altamira", "1500602", 2022, Some(90.0)),
            record("Altamira", "1500602", 2020, Some(100.0)),
            record("Altamira", "1500602", 2021, Some(120.0)),
        ]);
        let rows = delta_by_year(&table, LOCALITY_KEY, Dimension::Year, Measure::Area).unwrap();
        let years: Vec<i64> = rows.iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022]);
        assert_eq!(deltas_of(&rows), vec![0.0, 20.0, -30.0]);
    }

    #[test]
    fn first_year_of_every_locality_is_zero() {
        let table = Table::new(vec![
            record("Altamira", "1500602", 2019, Some(50.0)),
            record("Novo Progresso", "1505031", 2021, Some(70.0)),
            record("Altamira", "1500602", 2020, Some(65.0)),
            record("Novo Progresso", "1505031", 2022, Some(72.0)),
            record("Novo Progresso", "1505031", 2020, Some(60.0)),
        ]);
        let rows = delta_by_year(&table, LOCALITY_KEY, Dimension::Year, Measure::Area).unwrap();
        assert_eq!(rows.len(), table.len());

        let mut first_years: BTreeMap<Vec<DimensionValue>, i64> = BTreeMap::new();
        for row in &rows {
            first_years.entry(row.entity.clone()).or_insert(row.year);
        }
        for row in &rows {
            if first_years[&row.entity] == row.year {
                assert!(row.delta.abs() < f64::EPSILON, "{row:?}");
            }
        }
        assert_eq!(deltas_of(&rows), vec![0.0, 15.0, 0.0, 10.0, 2.0]);
    }

    #[test]
    fn missing_area_counts_as_zero() {
        let table = Table::new(vec![
            record("Altamira", "1500602", 2020, Some(10.0)),
            record("Altamira", "1500602", 2021, None),
        ]);
        let rows = delta_by_year(&table, LOCALITY_KEY, Dimension::Year, Measure::Area).unwrap();
        assert_eq!(deltas_of(&rows), vec![0.0, -10.0]);
    }

    #[test]
    fn non_integer_year_key_is_rejected() {
        let table = Table::new(vec![record("Altamira", "1500602", 2020, Some(10.0))]);
        assert!(matches!(
            delta_by_year(&table, LOCALITY_KEY, Dimension::Government, Measure::Area),
            Err(AnalyticsError::Conversion { .. })
        ));
    }

    #[test]
    fn yearly_totals_sum_entity_deltas() {
        let table = Table::new(vec![
            record("Altamira", "1500602", 2020, Some(100.0)),
            record("Altamira", "1500602", 2021, Some(120.0)),
            record("Novo Progresso", "1505031", 2020, Some(10.0)),
            record("Novo Progresso", "1505031", 2021, Some(15.0)),
        ]);
        let rows = delta_by_year(&table, LOCALITY_KEY, Dimension::Year, Measure::Area).unwrap();
        let totals = yearly_delta_totals(&rows).unwrap();
        assert_eq!(
            totals,
            vec![
                YearTotal {
                    year: 2020,
                    value: 0.0
                },
                YearTotal {
                    year: 2021,
                    value: 25.0
                },
            ]
        );
    }
}
