//! Runtime configuration.
//!
//! Settings are layered, later layers winning: built-in defaults, the TOML
//! config file, the `QUEIMADAS_DATA_DIR` / `QUEIMADAS_OUTPUT_DIR`
//! environment variables, and finally command-line flags.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "queimadas.toml";

/// Overrides [`Config::data_dir`].
pub const DATA_DIR_ENV: &str = "QUEIMADAS_DATA_DIR";

/// Overrides [`Config::output_dir`].
pub const OUTPUT_DIR_ENV: &str = "QUEIMADAS_OUTPUT_DIR";

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        /// Config file location.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        /// Config file location.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },

    /// A value parsed but is not usable.
    #[error("Invalid config value: {message}")]
    Invalid {
        /// Description of what went wrong.
        message: String,
    },
}

/// Where one dataset lives and how it is delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetConfig {
    /// File name, relative to the data directory.
    pub file: String,
    /// Single-byte field delimiter.
    pub delimiter: u8,
}

impl DatasetConfig {
    fn new(file: &str, delimiter: u8) -> Self {
        Self {
            file: file.to_string(),
            delimiter,
        }
    }

    fn merge(&mut self, name: &str, file: DatasetFile) -> Result<(), ConfigError> {
        if let Some(path) = file.file {
            self.file = path;
        }
        if let Some(delimiter) = file.delimiter {
            self.delimiter = delimiter_byte(name, delimiter)?;
        }
        Ok(())
    }
}

/// Settings for the year-against-year comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonConfig {
    /// First year included.
    pub from_year: i32,
    /// Length of the early-year window, in months.
    pub months: u32,
    /// Drop the last observed month from line charts when it is incomplete.
    pub drop_partial_month: bool,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the dataset files are resolved against.
    pub data_dir: PathBuf,
    /// Directory charts are written to.
    pub output_dir: PathBuf,
    /// Model artifact, relative to the data directory unless absolute.
    pub model: PathBuf,
    /// Daily fire focuses by state.
    pub fires: DatasetConfig,
    /// Fire focuses enriched with daily weather.
    pub weather: DatasetConfig,
    /// Yearly deforested area by municipality.
    pub deforestation: DatasetConfig,
    /// Rows the model projects.
    pub projection: DatasetConfig,
    /// Year-against-year comparison settings.
    pub comparison: ComparisonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            model: PathBuf::from("modelo_queimadas.json"),
            fires: DatasetConfig::new("dados_queimadas.csv", b';'),
            weather: DatasetConfig::new("dados_queimadas_enriquecidos.csv", b','),
            deforestation: DatasetConfig::new("desmatamento_municipios.csv", b','),
            projection: DatasetConfig::new("dados_queimadas_previsao.csv", b','),
            comparison: ComparisonConfig {
                from_year: 2020,
                months: 4,
                drop_partial_month: true,
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DatasetFile {
    file: Option<String>,
    delimiter: Option<char>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ComparisonFile {
    from_year: Option<i32>,
    months: Option<u32>,
    drop_partial_month: Option<bool>,
}

/// On-disk shape of the config file; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    model: Option<PathBuf>,
    fires: DatasetFile,
    weather: DatasetFile,
    deforestation: DatasetFile,
    projection: DatasetFile,
    comparison: ComparisonFile,
}

fn delimiter_byte(name: &str, delimiter: char) -> Result<u8, ConfigError> {
    u8::try_from(delimiter)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| ConfigError::Invalid {
            message: format!("{name}.delimiter '{delimiter}' is not a single ASCII character"),
        })
}

impl Config {
    /// Parses TOML text on top of the defaults.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Parse`] if the text is not valid TOML or has unknown
    ///   keys
    /// * [`ConfigError::Invalid`] if a value is out of range
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::default();
        if let Some(dir) = file.data_dir {
            config.data_dir = dir;
        }
        if let Some(dir) = file.output_dir {
            config.output_dir = dir;
        }
        if let Some(model) = file.model {
            config.model = model;
        }
        config.fires.merge("fires", file.fires)?;
        config.weather.merge("weather", file.weather)?;
        config.deforestation.merge("deforestation", file.deforestation)?;
        config.projection.merge("projection", file.projection)?;

        if let Some(year) = file.comparison.from_year {
            config.comparison.from_year = year;
        }
        if let Some(months) = file.comparison.months {
            if !(1..=12).contains(&months) {
                return Err(ConfigError::Invalid {
                    message: format!("comparison.months must be 1-12, got {months}"),
                });
            }
            config.comparison.months = months;
        }
        if let Some(drop) = file.comparison.drop_partial_month {
            config.comparison.drop_partial_month = drop;
        }

        Ok(config)
    }

    /// Loads the config file, or the defaults when no file is given and
    /// [`DEFAULT_CONFIG_FILE`] does not exist.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::Read`] if an explicitly given file cannot be read
    /// * any error from [`Self::from_toml`]
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if explicit.is_none() && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No {DEFAULT_CONFIG_FILE} found, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        log::info!("Using config file {}", path.display());
        Self::from_toml(path, &text)
    }

    /// Applies directory overrides from the environment, read through
    /// `lookup` (normally [`std::env::var`]).
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(OUTPUT_DIR_ENV).filter(|v| !v.is_empty()) {
            self.output_dir = PathBuf::from(dir);
        }
        self
    }

    /// Full path of a dataset file.
    #[must_use]
    pub fn dataset_path(&self, dataset: &DatasetConfig) -> PathBuf {
        self.data_dir.join(&dataset.file)
    }

    /// Full path of the model artifact.
    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.data_dir.join(&self.model)
    }
}
