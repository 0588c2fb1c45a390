#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Prediction adapter.
//!
//! Turns a raw projection table into the feature matrix a trained model was
//! fit on ([`schema`]), runs the model behind the [`model::Predictor`] trait,
//! and merges the projected values into the historical series for
//! comparison plotting ([`adapter`]).
//!
//! Nothing here is recovered locally: schema mismatches, unreadable
//! artifacts and cardinality mismatches all surface as [`PredictionError`].

pub mod adapter;
pub mod model;
pub mod schema;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while encoding features or running a model.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The projection table does not fit the model's feature schema.
    #[error("Schema mismatch: {message}")]
    SchemaMismatch {
        /// Description of what went wrong.
        message: String,
    },

    /// The trained-model artifact could not be read or is invalid.
    #[error("Failed to load model artifact {}: {message}", path.display())]
    ArtifactLoad {
        /// Artifact location.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// The model returned a result inconsistent with its input.
    #[error("Integrity error: {message}")]
    Integrity {
        /// Description of what went wrong.
        message: String,
    },
}
