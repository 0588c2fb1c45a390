#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record and table types for the wildfire and deforestation datasets.
//!
//! Every record type implements [`Row`], which exposes its categorical and
//! temporal keys as [`DimensionValue`]s and its numeric columns as optional
//! measures. The filter and aggregation stages only ever talk to [`Row`], so
//! they work unchanged across datasets.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use queimadas_government::{Government, government_for_year};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A categorical or temporal key a table can be filtered or grouped by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Dimension {
    /// Federative unit (UF)
    State,
    /// Municipality name
    Municipality,
    /// IBGE geocode of the locality
    Geocode,
    /// Full observation date
    Date,
    /// Calendar year
    Year,
    /// Calendar month (1-12)
    Month,
    /// Administration in office during the record's year
    Government,
}

/// A numeric column that can be summed or averaged.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Measure {
    /// Fire focus (hotspot) count
    Focuses,
    /// Maximum temperature at 2m
    TemperatureMax,
    /// Mean temperature at 2m
    TemperatureMean,
    /// Accumulated precipitation
    Precipitation,
    /// Cumulative deforested area (km²)
    Area,
}

/// The weather covariate selected for the focuses-vs-weather chart.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(ascii_case_insensitive)]
pub enum WeatherVariable {
    /// Monthly mean of the daily maximum temperature
    #[strum(to_string = "max", serialize = "temperature_max")]
    TemperatureMax,
    /// Monthly mean temperature
    #[strum(to_string = "mean", serialize = "temperature_mean")]
    TemperatureMean,
    /// Monthly precipitation total
    #[strum(to_string = "precipitation")]
    Precipitation,
}

impl WeatherVariable {
    /// All variables, in menu order.
    pub const ALL: &[Self] = &[
        Self::TemperatureMax,
        Self::TemperatureMean,
        Self::Precipitation,
    ];

    /// The measure backing this variable.
    #[must_use]
    pub const fn measure(self) -> Measure {
        match self {
            Self::TemperatureMax => Measure::TemperatureMax,
            Self::TemperatureMean => Measure::TemperatureMean,
            Self::Precipitation => Measure::Precipitation,
        }
    }

    /// Human-readable axis label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::TemperatureMax => "Temperatura Máxima",
            Self::TemperatureMean => "Temperatura Média",
            Self::Precipitation => "Precipitação",
        }
    }

    /// Temperatures are averaged across locations, precipitation is summed.
    #[must_use]
    pub const fn is_averaged(self) -> bool {
        matches!(self, Self::TemperatureMax | Self::TemperatureMean)
    }
}

/// The value of a [`Dimension`] for one record.
///
/// Variant order defines the natural sort used for group keys: integers
/// numerically, dates chronologically, text lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    /// Years, months and other integral keys.
    Int(i64),
    /// Calendar dates.
    Date(NaiveDate),
    /// Free text (states, municipalities, geocodes, government labels).
    Text(String),
}

impl DimensionValue {
    /// Compares two values for filtering. Text is compared case-insensitively;
    /// other variants must be equal.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase() == b.to_lowercase(),
            (a, b) => a == b,
        }
    }

    /// Returns the integer payload, if this is an [`Self::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            Self::Date(_) | Self::Text(_) => None,
        }
    }

    /// Returns the date payload, if this is a [`Self::Date`].
    #[must_use]
    pub const fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(value) => Some(*value),
            Self::Int(_) | Self::Text(_) => None,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Date(value) => write!(f, "{}", value.format("%Y-%m-%d")),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i32> for DimensionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for DimensionValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<NaiveDate> for DimensionValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<&str> for DimensionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Government> for DimensionValue {
    fn from(value: Government) -> Self {
        Self::Text(value.to_string())
    }
}

/// Uniform access to a record's keys and measures.
pub trait Row {
    /// Returns the value of `dimension`, or `None` if this record type does
    /// not carry it.
    fn dimension(&self, dimension: Dimension) -> Option<DimensionValue>;

    /// Returns the value of `measure`, or `None` if it is missing or not
    /// carried by this record type.
    fn measure(&self, measure: Measure) -> Option<f64>;
}

/// An immutable, ordered set of records.
///
/// Stages never mutate a table; filtering and aggregation build new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<R> {
    rows: Vec<R>,
}

impl<R> Table<R> {
    /// Wraps already-parsed rows.
    #[must_use]
    pub const fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    /// Returns the rows in load order.
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<R> FromIterator<R> for Table<R> {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// One fire-focus observation for a state on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireRecord {
    /// Federative unit as written in the source (e.g. "PARÁ").
    pub state: String,
    /// Observation date.
    pub date: NaiveDate,
    /// Derived from `date`.
    pub year: i32,
    /// Derived from `date` (1-12).
    pub month: u32,
    /// Fire focus count; `None` when the cell was empty.
    pub focuses: Option<f64>,
}

impl Row for FireRecord {
    fn dimension(&self, dimension: Dimension) -> Option<DimensionValue> {
        match dimension {
            Dimension::State => Some(self.state.as_str().into()),
            Dimension::Date => Some(self.date.into()),
            Dimension::Year => Some(self.year.into()),
            Dimension::Month => Some(self.month.into()),
            Dimension::Government => Some(government_for_year(self.year).into()),
            Dimension::Municipality | Dimension::Geocode => None,
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Focuses => self.focuses,
            Measure::TemperatureMax
            | Measure::TemperatureMean
            | Measure::Precipitation
            | Measure::Area => None,
        }
    }
}

/// A fire observation enriched with weather covariates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    /// Federative unit, when the enriched file carries one.
    pub state: Option<String>,
    /// Observation date.
    pub date: NaiveDate,
    /// Derived from `date`.
    pub year: i32,
    /// Derived from `date` (1-12).
    pub month: u32,
    /// Fire focus count.
    pub focuses: Option<f64>,
    /// `temperature_2m_max`
    pub temperature_max: Option<f64>,
    /// `temperature_2m_mean`
    pub temperature_mean: Option<f64>,
    /// `precipitation_sum`
    pub precipitation: Option<f64>,
}

impl Row for WeatherRecord {
    fn dimension(&self, dimension: Dimension) -> Option<DimensionValue> {
        match dimension {
            Dimension::State => self.state.as_deref().map(DimensionValue::from),
            Dimension::Date => Some(self.date.into()),
            Dimension::Year => Some(self.year.into()),
            Dimension::Month => Some(self.month.into()),
            Dimension::Government => Some(government_for_year(self.year).into()),
            Dimension::Municipality | Dimension::Geocode => None,
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Focuses => self.focuses,
            Measure::TemperatureMax => self.temperature_max,
            Measure::TemperatureMean => self.temperature_mean,
            Measure::Precipitation => self.precipitation,
            Measure::Area => None,
        }
    }
}

/// Cumulative deforested area of one locality in one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeforestationRecord {
    /// Federative unit.
    pub state: String,
    /// Municipality name.
    pub municipality: String,
    /// IBGE locality geocode.
    pub geocode: String,
    /// Reference year.
    pub year: i32,
    /// Cumulative deforested area in km²; `None` when the cell was empty.
    pub area: Option<f64>,
}

impl DeforestationRecord {
    /// The administration this record's year is attributed to.
    #[must_use]
    pub fn government(&self) -> Government {
        government_for_year(self.year)
    }
}

impl Row for DeforestationRecord {
    fn dimension(&self, dimension: Dimension) -> Option<DimensionValue> {
        match dimension {
            Dimension::State => Some(self.state.as_str().into()),
            Dimension::Municipality => Some(self.municipality.as_str().into()),
            Dimension::Geocode => Some(self.geocode.as_str().into()),
            Dimension::Year => Some(self.year.into()),
            Dimension::Government => Some(self.government().into()),
            Dimension::Date | Dimension::Month => None,
        }
    }

    fn measure(&self, measure: Measure) -> Option<f64> {
        match measure {
            Measure::Area => self.area,
            Measure::Focuses
            | Measure::TemperatureMax
            | Measure::TemperatureMean
            | Measure::Precipitation => None,
        }
    }
}

/// The dimensions identifying one deforestation locality.
pub const LOCALITY_KEY: &[Dimension] = &[
    Dimension::State,
    Dimension::Municipality,
    Dimension::Geocode,
];

/// One raw row of a projection table.
///
/// Cells stay as text until the prediction adapter decides, from the model's
/// feature schema, which columns are categorical and which are numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionRow {
    /// 1-based line number in the source file (header is line 1).
    pub line: u64,
    /// Target year of the projection.
    pub year: i32,
    /// Target month, when the table is monthly.
    pub month: Option<u32>,
    /// Every cell keyed by its header.
    pub values: BTreeMap<String, String>,
}

impl ProjectionRow {
    /// Returns the trimmed cell for `column`.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(|v| v.trim())
    }
}

/// A projection table: header order plus raw rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionTable {
    /// Header names in file order.
    pub columns: Vec<String>,
    /// Rows in file order.
    pub rows: Table<ProjectionRow>,
}

impl ProjectionTable {
    /// Number of projection rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows to project.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
