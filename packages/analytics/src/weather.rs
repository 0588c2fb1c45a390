//! Fire focuses against a weather covariate.

use queimadas_analytics_models::{Reducer, WeatherPoint};
use queimadas_dataset_models::{Dimension, DimensionValue, Measure, Row, Table, WeatherVariable};

use crate::AnalyticsError;
use crate::aggregate::aggregate;

/// Builds the per-date series of summed focuses and the selected covariate.
///
/// Temperatures are averaged across the locations reporting on a date;
/// precipitation is summed.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if a row lacks a date.
pub fn weather_series<R: Row>(
    table: &Table<R>,
    variable: WeatherVariable,
) -> Result<Vec<WeatherPoint>, AnalyticsError> {
    let reducer = if variable.is_averaged() {
        Reducer::Mean
    } else {
        Reducer::Sum
    };
    let rows = aggregate(
        table,
        &[Dimension::Date],
        &[(Measure::Focuses, Reducer::Sum), (variable.measure(), reducer)],
    )?;

    rows.into_iter()
        .map(|row| {
            let date = row
                .key
                .first()
                .and_then(DimensionValue::as_date)
                .ok_or_else(|| AnalyticsError::Conversion {
                    message: "weather series keyed by a non-date value".to_string(),
                })?;
            Ok(WeatherPoint {
                date,
                focuses: row.values.first().copied().flatten().unwrap_or_default(),
                covariate: row.values.get(1).copied().flatten(),
            })
        })
        .collect()
}

/// Pearson correlation between focuses and the covariate over the points
/// where the covariate is present. `None` with fewer than two such points or
/// zero variance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn correlation(points: &[WeatherPoint]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = points
        .iter()
        .filter_map(|p| p.covariate.map(|c| (p.focuses, c)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use queimadas_dataset_models::WeatherRecord;

    use super::*;

    fn record(month: u32, state: &str, focuses: f64, t_max: f64, rain: f64) -> WeatherRecord {
        WeatherRecord {
            state: Some(state.to_string()),
            date: NaiveDate::from_ymd_opt(2022, month, 1).unwrap(),
            year: 2022,
            month,
            focuses: Some(focuses),
            temperature_max: Some(t_max),
            temperature_mean: None,
            precipitation: Some(rain),
        }
    }

    fn table() -> Table<WeatherRecord> {
        Table::new(vec![
            record(3, "AC", 10.0, 30.0, 200.0),
            record(3, "PA", 20.0, 32.0, 150.0),
            record(9, "AC", 400.0, 36.0, 10.0),
            record(9, "PA", 600.0, 38.0, 5.0),
        ])
    }

    #[test]
    fn temperatures_are_averaged_per_date() {
        let points = weather_series(&table(), WeatherVariable::TemperatureMax).unwrap();
        assert_eq!(points.len(), 2);
        assert!((points[0].focuses - 30.0).abs() < f64::EPSILON);
        assert!((points[0].covariate.unwrap() - 31.0).abs() < f64::EPSILON);
        assert!((points[1].covariate.unwrap() - 37.0).abs() < f64::EPSILON);
    }

    #[test]
    fn precipitation_is_summed_per_date() {
        let points = weather_series(&table(), WeatherVariable::Precipitation).unwrap();
        assert!((points[0].covariate.unwrap() - 350.0).abs() < f64::EPSILON);
        assert!((points[1].covariate.unwrap() - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn absent_covariate_stays_none() {
        let points = weather_series(&table(), WeatherVariable::TemperatureMean).unwrap();
        assert!(points.iter().all(|p| p.covariate.is_none()));
        assert_eq!(correlation(&points), None);
    }

    #[test]
    fn correlation_signs_follow_the_data() {
        let heat = weather_series(&table(), WeatherVariable::TemperatureMax).unwrap();
        assert!(correlation(&heat).unwrap() > 0.99);
        let rain = weather_series(&table(), WeatherVariable::Precipitation).unwrap();
        assert!(correlation(&rain).unwrap() < -0.99);
    }
}
