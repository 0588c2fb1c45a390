#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset loading and filtering.
//!
//! [`loader`] reads the delimited source files into typed
//! [`Table`](queimadas_dataset_models::Table)s, parsing dates and deriving
//! year/month at load time. [`filter`] narrows a table by user selections
//! without touching the source table.

pub mod filter;
pub mod loader;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or filtering a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened.
    #[error("Failed to open {}: {source}", path.display())]
    Io {
        /// File that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Malformed CSV (wrong field count, unparsable number, bad UTF-8).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A date cell did not match any accepted format.
    #[error("Line {line}: unparsable date '{value}'")]
    Date {
        /// 1-based line number in the source file.
        line: u64,
        /// The offending cell.
        value: String,
    },

    /// Any other structural problem with the input.
    #[error("Line {line}: {message}")]
    Format {
        /// 1-based line number in the source file (1 for header problems).
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// A selection value could not be interpreted for its dimension.
    #[error("Invalid selection '{value}' for {dimension}")]
    Selection {
        /// Dimension the value was meant for.
        dimension: String,
        /// The rejected input.
        value: String,
    },
}
