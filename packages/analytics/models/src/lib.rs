#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate rows and comparison series.
//!
//! These are ephemeral, derived views: recomputed for every selection and
//! never written back to the source tables.

use chrono::NaiveDate;
use queimadas_dataset_models::DimensionValue;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// How a measure is reduced within a group.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reducer {
    /// Sum, treating missing values as zero.
    Sum,
    /// Mean over the values that are present.
    Mean,
}

/// One group of a single-measure aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRow {
    /// Group key, one value per grouping dimension.
    pub key: Vec<DimensionValue>,
    /// Aggregated measure.
    pub value: f64,
    /// Number of source rows in the group.
    pub count: usize,
}

impl GroupRow {
    /// Human-readable key (`"PA / 2020"`).
    #[must_use]
    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// One group of a multi-measure aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    /// Group key, one value per grouping dimension.
    pub key: Vec<DimensionValue>,
    /// One value per requested `(measure, reducer)` pair, in request order.
    /// A mean over a group with no present values is `None`.
    pub values: Vec<Option<f64>>,
    /// Number of source rows in the group.
    pub count: usize,
}

/// Year-over-year change for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaRow {
    /// Entity key (e.g. state, municipality, geocode).
    pub entity: Vec<DimensionValue>,
    /// Year of the observation.
    pub year: i64,
    /// Measure in this year.
    pub value: f64,
    /// Difference from the entity's previous observed year; zero for the
    /// first one.
    pub delta: f64,
}

/// A per-year total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTotal {
    /// Calendar year.
    pub year: i32,
    /// Total for the year.
    pub value: f64,
}

/// A per-(year, month) total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyTotal {
    /// Calendar year.
    pub year: i32,
    /// Calendar month (1-12).
    pub month: u32,
    /// Total for the month.
    pub value: f64,
}

/// Fire focuses and one weather covariate on a date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherPoint {
    /// Observation date.
    pub date: NaiveDate,
    /// Summed focuses across locations.
    pub focuses: f64,
    /// Covariate (mean temperature or summed precipitation).
    pub covariate: Option<f64>,
}

/// Whether a comparison point was observed or predicted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SeriesKind {
    /// Historical data.
    Observed,
    /// Model output.
    Projected,
}

/// One point of a historical-vs-projected comparison series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPoint {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, for monthly series.
    pub month: Option<u32>,
    /// Observed or projected total.
    pub value: f64,
    /// Rendering style selector.
    pub kind: SeriesKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_label_joins_key_parts() {
        let row = GroupRow {
            key: vec!["PA".into(), 2020_i32.into()],
            value: 1.0,
            count: 1,
        };
        assert_eq!(row.label(), "PA / 2020");
    }
}
