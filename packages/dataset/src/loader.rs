//! Delimited-file loaders.
//!
//! Each loader reads one dataset into a typed [`Table`]. Rows are
//! deserialized by header name, so extra columns are ignored and column
//! order does not matter. Measure columns must be present in the header.
//! Empty and NA cells (`NaN`, `NA`, `NULL`, ...) load as `None`; anything
//! else that is not a finite number fails the whole load with the offending
//! line.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike as _, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use queimadas_dataset_models::{
    DeforestationRecord, FireRecord, ProjectionRow, ProjectionTable, Table, WeatherRecord,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::DatasetError;

/// Header aliases for the projection table's year column.
const YEAR_COLUMNS: &[&str] = &["ano", "year"];
/// Header aliases for the projection table's month column.
const MONTH_COLUMNS: &[&str] = &["mes", "mês", "month"];

/// Cells read as missing rather than as numbers, matching the tokens pandas
/// treats as NA by default.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Measure columns each dataset must carry, as accepted header names.
const FIRE_MEASURES: &[&[&str]] = &[&["focuses"]];
const WEATHER_MEASURES: &[&[&str]] = &[
    &["focuses"],
    &["temperature_2m_max"],
    &["temperature_2m_mean"],
    &["precipitation_sum"],
];
const DEFORESTATION_MEASURES: &[&[&str]] = &[&["area", "areakm", "area_km2"]];

#[derive(Debug, Deserialize)]
struct RawFireRow {
    date: String,
    #[serde(alias = "state", alias = "estado")]
    uf: String,
    #[serde(default)]
    focuses: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawWeatherRow {
    date: String,
    #[serde(default, alias = "state", alias = "estado")]
    uf: Option<String>,
    #[serde(default)]
    focuses: Option<String>,
    #[serde(default)]
    temperature_2m_max: Option<String>,
    #[serde(default)]
    temperature_2m_mean: Option<String>,
    #[serde(default)]
    precipitation_sum: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDeforestationRow {
    #[serde(alias = "estado", alias = "uf")]
    state: String,
    #[serde(alias = "municipio")]
    municipality: String,
    #[serde(alias = "geocodigo", alias = "cod_ibge")]
    geocode: String,
    #[serde(alias = "ano")]
    year: i32,
    #[serde(default, alias = "areakm", alias = "area_km2")]
    area: Option<String>,
}

/// Parses a date cell.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`,
/// `YYYY/MM/DD` and `DD/MM/YYYY`.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Parses an integral cell, tolerating a `.0` suffix written by spreadsheet
/// exports (`"2023.0"`).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn parse_int_cell(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(value) = s.parse::<i64>() {
        return Some(value);
    }
    let value = s.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

/// Parses a measure cell. NA tokens load as `None`; anything else must be a
/// finite number.
///
/// # Errors
///
/// Returns [`DatasetError::Format`] for text, `inf` and other non-finite
/// values.
pub fn parse_measure(
    cell: Option<&str>,
    column: &str,
    line: u64,
) -> Result<Option<f64>, DatasetError> {
    let Some(cell) = cell.map(str::trim).filter(|c| !MISSING_TOKENS.contains(c)) else {
        return Ok(None);
    };
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(DatasetError::Format {
            line,
            message: format!("'{column}' is not a number: '{cell}'"),
        }),
    }
}

fn open(path: &Path) -> Result<File, DatasetError> {
    File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn require_columns(headers: &StringRecord, required: &[&[&str]]) -> Result<(), DatasetError> {
    for names in required {
        if !headers.iter().any(|h| names.contains(&h)) {
            return Err(DatasetError::Format {
                line: 1,
                message: format!("missing column '{}'", names.join("' / '")),
            });
        }
    }
    Ok(())
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(0, csv::Position::line)
}

/// Reads every record of `reader`, deserializing each into `T` by header
/// name and handing it to `map` together with its line number. Every entry
/// of `required` must match a header first.
fn read_rows<R, T, U, F>(
    reader: R,
    delimiter: u8,
    required: &[&[&str]],
    mut map: F,
) -> Result<Vec<U>, DatasetError>
where
    R: Read,
    T: DeserializeOwned,
    F: FnMut(T, u64) -> Result<U, DatasetError>,
{
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    require_columns(&headers, required)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let raw: T = record.deserialize(Some(&headers))?;
        rows.push(map(raw, line_of(&record))?);
    }
    Ok(rows)
}

fn parse_date_cell(value: &str, line: u64) -> Result<NaiveDate, DatasetError> {
    parse_date(value).ok_or_else(|| DatasetError::Date {
        line,
        value: value.to_string(),
    })
}

/// Loads fire-focus records from any reader.
///
/// # Errors
///
/// Returns [`DatasetError`] if a row is malformed or a date is unparsable.
pub fn load_fires_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Table<FireRecord>, DatasetError> {
    let rows = read_rows(reader, delimiter, FIRE_MEASURES, |raw: RawFireRow, line| {
        let date = parse_date_cell(&raw.date, line)?;
        Ok(FireRecord {
            state: raw.uf,
            date,
            year: date.year(),
            month: date.month(),
            focuses: parse_measure(raw.focuses.as_deref(), "focuses", line)?,
        })
    })?;
    log::debug!("Loaded {} fire records", rows.len());
    Ok(Table::new(rows))
}

/// Loads fire-focus records from `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened, a row is
/// malformed, or a date is unparsable.
pub fn load_fires(path: &Path, delimiter: u8) -> Result<Table<FireRecord>, DatasetError> {
    log::info!("Loading fire records from {}", path.display());
    load_fires_from_reader(open(path)?, delimiter)
}

/// Loads weather-enriched fire records from any reader.
///
/// # Errors
///
/// Returns [`DatasetError`] if a row is malformed or a date is unparsable.
pub fn load_weather_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Table<WeatherRecord>, DatasetError> {
    let rows = read_rows(reader, delimiter, WEATHER_MEASURES, |raw: RawWeatherRow, line| {
        let date = parse_date_cell(&raw.date, line)?;
        Ok(WeatherRecord {
            state: raw.uf,
            date,
            year: date.year(),
            month: date.month(),
            focuses: parse_measure(raw.focuses.as_deref(), "focuses", line)?,
            temperature_max: parse_measure(
                raw.temperature_2m_max.as_deref(),
                "temperature_2m_max",
                line,
            )?,
            temperature_mean: parse_measure(
                raw.temperature_2m_mean.as_deref(),
                "temperature_2m_mean",
                line,
            )?,
            precipitation: parse_measure(
                raw.precipitation_sum.as_deref(),
                "precipitation_sum",
                line,
            )?,
        })
    })?;
    log::debug!("Loaded {} weather-enriched records", rows.len());
    Ok(Table::new(rows))
}

/// Loads weather-enriched fire records from `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened, a row is
/// malformed, or a date is unparsable.
pub fn load_weather(path: &Path, delimiter: u8) -> Result<Table<WeatherRecord>, DatasetError> {
    log::info!("Loading weather-enriched records from {}", path.display());
    load_weather_from_reader(open(path)?, delimiter)
}

/// Loads deforestation records from any reader.
///
/// # Errors
///
/// Returns [`DatasetError`] if a row is malformed.
pub fn load_deforestation_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<Table<DeforestationRecord>, DatasetError> {
    let rows = read_rows(
        reader,
        delimiter,
        DEFORESTATION_MEASURES,
        |raw: RawDeforestationRow, line| {
            if raw.state.is_empty() || raw.geocode.is_empty() {
                return Err(DatasetError::Format {
                    line,
                    message: "state and geocode are required".to_string(),
                });
            }
            Ok(DeforestationRecord {
                state: raw.state,
                municipality: raw.municipality,
                geocode: raw.geocode,
                year: raw.year,
                area: parse_measure(raw.area.as_deref(), "area", line)?,
            })
        },
    )?;
    log::debug!("Loaded {} deforestation records", rows.len());
    Ok(Table::new(rows))
}

/// Loads deforestation records from `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened or a row is
/// malformed.
pub fn load_deforestation(
    path: &Path,
    delimiter: u8,
) -> Result<Table<DeforestationRecord>, DatasetError> {
    log::info!("Loading deforestation records from {}", path.display());
    load_deforestation_from_reader(open(path)?, delimiter)
}

fn find_column<'a>(headers: &'a StringRecord, aliases: &[&str]) -> Option<&'a str> {
    headers
        .iter()
        .find(|h| aliases.iter().any(|alias| h.eq_ignore_ascii_case(alias)))
}

/// Loads a projection table from any reader.
///
/// Cells are kept as text; the year column (`ano`/`year`) is required and
/// the month column (`mes`/`month`) is optional.
///
/// # Errors
///
/// Returns [`DatasetError`] if the year column is missing, a row is
/// malformed, or a year/month cell is not an integer.
pub fn load_projection_from_reader<R: Read>(
    reader: R,
    delimiter: u8,
) -> Result<ProjectionTable, DatasetError> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let year_column = find_column(&headers, YEAR_COLUMNS)
        .ok_or_else(|| DatasetError::Format {
            line: 1,
            message: format!("projection table needs one of the columns {YEAR_COLUMNS:?}"),
        })?
        .to_string();
    let month_column = find_column(&headers, MONTH_COLUMNS).map(str::to_string);

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = line_of(&record);
        let values: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        let year = values
            .get(&year_column)
            .and_then(|v| parse_int_cell(v))
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| DatasetError::Format {
                line,
                message: format!("'{year_column}' is not a valid year"),
            })?;

        let month = match &month_column {
            Some(column) => Some(
                values
                    .get(column)
                    .and_then(|v| parse_int_cell(v))
                    .and_then(|v| u32::try_from(v).ok())
                    .filter(|m| (1..=12).contains(m))
                    .ok_or_else(|| DatasetError::Format {
                        line,
                        message: format!("'{column}' is not a valid month"),
                    })?,
            ),
            None => None,
        };

        rows.push(ProjectionRow {
            line,
            year,
            month,
            values,
        });
    }

    log::debug!("Loaded {} projection rows", rows.len());

    Ok(ProjectionTable {
        columns: headers.iter().map(str::to_string).collect(),
        rows: Table::new(rows),
    })
}

/// Loads a projection table from `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be opened or is malformed.
pub fn load_projection(path: &Path, delimiter: u8) -> Result<ProjectionTable, DatasetError> {
    log::info!("Loading projection table from {}", path.display());
    load_projection_from_reader(open(path)?, delimiter)
}
