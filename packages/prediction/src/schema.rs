//! Feature schema and projection-table encoding.

use std::collections::{BTreeMap, BTreeSet};

use queimadas_dataset_models::{ProjectionRow, ProjectionTable};
use queimadas_government::{Government, government_for_year};
use serde::{Deserialize, Serialize};

use crate::PredictionError;

/// Header aliases resolved against the row's (possibly overridden) year
/// instead of the raw cell.
const YEAR_COLUMNS: &[&str] = &["ano", "year"];

fn is_year_column(column: &str) -> bool {
    YEAR_COLUMNS.iter().any(|year| year.eq_ignore_ascii_case(column))
}

/// One input feature of a trained model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feature {
    /// A numeric column copied as-is.
    Numeric {
        /// Source column.
        column: String,
    },
    /// `1.0` when `column` equals `value`, `0.0` otherwise.
    OneHot {
        /// Source column.
        column: String,
        /// Category this indicator stands for.
        value: String,
    },
    /// `1.0` when the row's year is attributed to `government`.
    Administration {
        /// Government this indicator stands for.
        government: Government,
    },
}

impl Feature {
    /// The column name the model was trained with.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Numeric { column } => column.clone(),
            Self::OneHot { column, value } => format!("{column}_{value}"),
            Self::Administration { government } => format!("governo_{government}"),
        }
    }
}

/// Ordered list of the features a model expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Features in model input order.
    pub features: Vec<Feature>,
}

impl FeatureSchema {
    /// Wraps features already in model input order.
    #[must_use]
    pub const fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    /// Number of model inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the model takes no inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Projection columns read as cells. Year columns are excluded since
    /// they come from the row's year.
    #[must_use]
    pub fn source_columns(&self) -> BTreeSet<&str> {
        self.features
            .iter()
            .filter_map(|feature| match feature {
                Feature::Numeric { column } if is_year_column(column) => None,
                Feature::Numeric { column } | Feature::OneHot { column, .. } => {
                    Some(column.as_str())
                }
                Feature::Administration { .. } => None,
            })
            .collect()
    }

    /// Feature names in model input order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.features.iter().map(Feature::name).collect()
    }

    /// Categories seen in training, per categorical column.
    #[must_use]
    pub fn categories(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut categories: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for feature in &self.features {
            if let Feature::OneHot { column, value } = feature {
                categories
                    .entry(column.as_str())
                    .or_default()
                    .insert(value.as_str());
            }
        }
        categories
    }
}

/// Dense, row-major model input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureMatrix {
    /// Feature names, one per column.
    pub columns: Vec<String>,
    /// One vector of `columns.len()` values per projection row.
    pub rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn mismatch(message: String) -> PredictionError {
    PredictionError::SchemaMismatch { message }
}

fn cell<'a>(row: &'a ProjectionRow, column: &str) -> Result<&'a str, PredictionError> {
    row.get(column).ok_or_else(|| {
        mismatch(format!(
            "line {}: column '{column}' is missing",
            row.line
        ))
    })
}

fn encode_row(
    row: &ProjectionRow,
    schema: &FeatureSchema,
    year: i32,
) -> Result<Vec<f64>, PredictionError> {
    let government = government_for_year(year);

    schema
        .features
        .iter()
        .map(|feature| match feature {
            Feature::Numeric { column } if is_year_column(column) => Ok(f64::from(year)),
            Feature::Numeric { column } => {
                let value = cell(row, column)?;
                value.parse::<f64>().map_err(|_| {
                    mismatch(format!(
                        "line {}: '{value}' in column '{column}' is not numeric",
                        row.line
                    ))
                })
            }
            Feature::OneHot { column, value } => {
                let actual = cell(row, column)?;
                Ok(if actual.eq_ignore_ascii_case(value) {
                    1.0
                } else {
                    0.0
                })
            }
            Feature::Administration { government: flag } => {
                Ok(if *flag == government { 1.0 } else { 0.0 })
            }
        })
        .collect()
}

/// Encodes a projection table into the model's feature matrix.
///
/// Categorical columns are expanded to the one-hot indicators listed in the
/// schema; `year_override`, when given, replaces every row's year (and thus
/// its administration flags).
///
/// # Errors
///
/// Returns [`PredictionError::SchemaMismatch`] if the table header or a row
/// lacks a column the schema needs, a numeric cell does not parse, or a categorical value
/// was never seen in training.
pub fn encode(
    projection: &ProjectionTable,
    schema: &FeatureSchema,
    year_override: Option<i32>,
) -> Result<FeatureMatrix, PredictionError> {
    if let Some(missing) = schema
        .source_columns()
        .into_iter()
        .find(|column| !projection.columns.iter().any(|c| c == column))
    {
        return Err(mismatch(format!(
            "projection table has no column '{missing}'"
        )));
    }

    let categories = schema.categories();
    for row in &projection.rows {
        for (column, known) in &categories {
            let value = cell(row, column)?;
            if !known.iter().any(|k| k.eq_ignore_ascii_case(value)) {
                return Err(mismatch(format!(
                    "line {}: category '{value}' in column '{column}' was not seen in training",
                    row.line
                )));
            }
        }
    }

    let rows = projection
        .rows
        .iter()
        .map(|row| encode_row(row, schema, year_override.unwrap_or(row.year)))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(
        "encoded {} projection rows into {} features",
        rows.len(),
        schema.len()
    );

    Ok(FeatureMatrix {
        columns: schema.names(),
        rows,
    })
}
