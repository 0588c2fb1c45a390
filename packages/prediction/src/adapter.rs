//! Runs a model over a projection table and lines the result up with
//! observed history.

use std::collections::BTreeMap;

use queimadas_analytics_models::{ComparisonPoint, MonthlyTotal, SeriesKind, YearTotal};
use queimadas_dataset_models::ProjectionTable;
use serde::{Deserialize, Serialize};

use crate::PredictionError;
use crate::model::Predictor;
use crate::schema::encode;

/// One model output, keyed by the period of its projection row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    /// Year projected onto.
    pub year: i32,
    /// Month of the row, when the projection table has one.
    pub month: Option<u32>,
    /// Model output.
    pub value: f64,
}

/// Encodes `projection`, runs `model` on it and pairs each prediction with
/// its row's period. With `year_override`, every row is projected onto that
/// year.
///
/// # Errors
///
/// * [`PredictionError::SchemaMismatch`] if encoding fails
/// * [`PredictionError::Integrity`] if the model does not return exactly one
///   prediction per row
pub fn project(
    projection: &ProjectionTable,
    model: &dyn Predictor,
    year_override: Option<i32>,
) -> Result<Vec<Projection>, PredictionError> {
    let features = encode(projection, model.schema(), year_override)?;
    let predictions = model.predict(&features)?;

    if predictions.len() != projection.len() {
        return Err(PredictionError::Integrity {
            message: format!(
                "model returned {} predictions for {} rows",
                predictions.len(),
                projection.len()
            ),
        });
    }

    log::info!("Projected {} rows", predictions.len());

    Ok(projection
        .rows
        .iter()
        .zip(predictions)
        .map(|(row, value)| Projection {
            year: year_override.unwrap_or(row.year),
            month: row.month,
            value,
        })
        .collect())
}

/// Observed monthly totals as comparison points.
#[must_use]
pub fn observed_monthly(points: &[MonthlyTotal]) -> Vec<ComparisonPoint> {
    points
        .iter()
        .map(|p| ComparisonPoint {
            year: p.year,
            month: Some(p.month),
            value: p.value,
            kind: SeriesKind::Observed,
        })
        .collect()
}

/// Observed yearly totals as comparison points.
#[must_use]
pub fn observed_yearly(points: &[YearTotal]) -> Vec<ComparisonPoint> {
    points
        .iter()
        .map(|p| ComparisonPoint {
            year: p.year,
            month: None,
            value: p.value,
            kind: SeriesKind::Observed,
        })
        .collect()
}

/// Merges projections into the observed series.
///
/// Projections are summed per period. For every projected year, observed
/// points from its first projected period onward are replaced by the
/// projection. When the projection is monthly, every year is cut to the
/// months up to the last projected month so the years stay comparable.
/// The result is ordered by period, observed before projected.
#[must_use]
pub fn merge_comparison(
    historical: &[ComparisonPoint],
    projected: &[Projection],
) -> Vec<ComparisonPoint> {
    let mut totals: BTreeMap<(i32, Option<u32>), f64> = BTreeMap::new();
    for projection in projected {
        *totals
            .entry((projection.year, projection.month))
            .or_default() += projection.value;
    }

    let mut first_projected: BTreeMap<i32, Option<u32>> = BTreeMap::new();
    for &(year, month) in totals.keys() {
        first_projected.entry(year).or_insert(month);
    }
    let last_month = totals.keys().filter_map(|(_, month)| *month).max();

    let mut merged: Vec<ComparisonPoint> = historical
        .iter()
        .filter(|p| {
            first_projected
                .get(&p.year)
                .is_none_or(|&first| p.month < first)
        })
        .copied()
        .chain(totals.into_iter().map(|((year, month), value)| ComparisonPoint {
            year,
            month,
            value,
            kind: SeriesKind::Projected,
        }))
        .filter(|p| match (p.month, last_month) {
            (Some(month), Some(last)) => month <= last,
            _ => true,
        })
        .collect();

    merged.sort_by_key(|p| (p.year, p.month, p.kind == SeriesKind::Projected));
    merged
}
