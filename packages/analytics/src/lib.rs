#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregation engine for the wildfire and deforestation tables.
//!
//! Every function takes a borrowed [`Table`](queimadas_dataset_models::Table)
//! and returns freshly built rows; source tables are never modified.
//! Missing measures count as zero in sums, and no row is ever dropped.

pub mod aggregate;
pub mod comparison;
pub mod delta;
pub mod weather;

use queimadas_dataset_models::Dimension;
use thiserror::Error;

/// Errors that can occur during analytics operations.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A row does not carry a dimension it is being grouped by.
    #[error("Row {row} has no value for {dimension}")]
    MissingDimension {
        /// Dimension that was requested.
        dimension: Dimension,
        /// 0-based index of the row in the table.
        row: usize,
    },

    /// Data conversion error.
    #[error("Conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
