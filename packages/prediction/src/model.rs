//! Trained-model artifacts and the [`Predictor`] seam.
//!
//! A model is trained offline and exported as a JSON document tagged by
//! `kind`. Two shapes are understood: a linear model (intercept plus one
//! coefficient per feature) and a gradient-boosted tree ensemble (base score
//! plus the sum of one leaf per tree).

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::PredictionError;
use crate::schema::{FeatureMatrix, FeatureSchema};

/// Anything that turns a feature matrix into one prediction per row.
pub trait Predictor: Send + Sync {
    /// The features this model expects, in input order.
    fn schema(&self) -> &FeatureSchema;

    /// Predicts one value per matrix row.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError`] if the matrix does not fit the model.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError>;
}

fn check_columns(schema: &FeatureSchema, features: &FeatureMatrix) -> Result<(), PredictionError> {
    let expected = schema.names();
    if features.columns != expected {
        return Err(PredictionError::SchemaMismatch {
            message: format!(
                "model expects columns {expected:?}, got {:?}",
                features.columns
            ),
        });
    }
    if let Some(row) = features.rows.iter().find(|r| r.len() != expected.len()) {
        return Err(PredictionError::SchemaMismatch {
            message: format!(
                "feature row has {} values, expected {}",
                row.len(),
                expected.len()
            ),
        });
    }
    Ok(())
}

/// `intercept + sum(coefficients[i] * x[i])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Feature columns, in coefficient order.
    pub schema: FeatureSchema,
    /// Constant term.
    pub intercept: f64,
    /// One weight per schema feature.
    pub coefficients: Vec<f64>,
}

impl Predictor for LinearModel {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
        check_columns(&self.schema, features)?;
        Ok(features
            .rows
            .iter()
            .map(|row| {
                self.intercept
                    + row
                        .iter()
                        .zip(&self.coefficients)
                        .map(|(x, c)| x * c)
                        .sum::<f64>()
            })
            .collect())
    }
}

/// A node of a regression tree. Children are indices into the same tree's
/// node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// Go `left` when `x[feature] < threshold`, `right` otherwise.
    Split {
        /// Feature column tested.
        feature: usize,
        /// Split point.
        threshold: f64,
        /// Node taken below the threshold.
        left: usize,
        /// Node taken at or above the threshold.
        right: usize,
    },
    /// Terminal node.
    Leaf {
        /// Contribution of the tree for rows ending here.
        value: f64,
    },
}

/// One regression tree, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    /// Nodes in walk order; the root comes first.
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    fn validate(&self, features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= features {
                    return Err(format!(
                        "node {index} splits on feature {feature}, model has {features}"
                    ));
                }
                // Children strictly after their parent keeps every walk finite.
                let in_range = |child: usize| child > index && child < self.nodes.len();
                if !in_range(left) || !in_range(right) {
                    return Err(format!("node {index} has invalid children {left}/{right}"));
                }
            }
        }
        Ok(())
    }

    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return *value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = row.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if x < *threshold { *left } else { *right };
                }
                None => return 0.0,
            }
        }
    }
}

/// `base_score + sum(tree(x))` over every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Feature columns the trees index into.
    pub schema: FeatureSchema,
    /// Added once to every prediction.
    #[serde(default)]
    pub base_score: f64,
    /// Trees whose leaf values are summed.
    pub trees: Vec<RegressionTree>,
}

impl Predictor for TreeEnsemble {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
        check_columns(&self.schema, features)?;
        Ok(features
            .rows
            .iter()
            .map(|row| {
                self.base_score + self.trees.iter().map(|t| t.evaluate(row)).sum::<f64>()
            })
            .collect())
    }
}

/// A deserialized model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// `"kind": "linear"`.
    Linear(LinearModel),
    /// `"kind": "tree_ensemble"`, a boosted regression tree export.
    TreeEnsemble(TreeEnsemble),
}

impl ModelArtifact {
    fn validate(&self) -> Result<(), String> {
        match self {
            Self::Linear(model) => {
                if model.coefficients.len() != model.schema.len() {
                    return Err(format!(
                        "{} coefficients for {} features",
                        model.coefficients.len(),
                        model.schema.len()
                    ));
                }
                Ok(())
            }
            Self::TreeEnsemble(model) => {
                for (index, tree) in model.trees.iter().enumerate() {
                    tree.validate(model.schema.len())
                        .map_err(|e| format!("tree {index}: {e}"))?;
                }
                Ok(())
            }
        }
    }

    /// Parses and validates an artifact from JSON text. `path` is only used
    /// for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ArtifactLoad`] if the JSON is malformed or
    /// the model is inconsistent with its own schema.
    pub fn from_json(path: &Path, json: &str) -> Result<Self, PredictionError> {
        let load_error = |message: String| PredictionError::ArtifactLoad {
            path: path.to_path_buf(),
            message,
        };
        let artifact: Self = serde_json::from_str(json).map_err(|e| load_error(e.to_string()))?;
        artifact.validate().map_err(load_error)?;
        Ok(artifact)
    }
}

impl Predictor for ModelArtifact {
    fn schema(&self) -> &FeatureSchema {
        match self {
            Self::Linear(model) => model.schema(),
            Self::TreeEnsemble(model) => model.schema(),
        }
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<f64>, PredictionError> {
        match self {
            Self::Linear(model) => model.predict(features),
            Self::TreeEnsemble(model) => model.predict(features),
        }
    }
}

/// Reads a model artifact from disk.
///
/// # Errors
///
/// Returns [`PredictionError::ArtifactLoad`] if the file cannot be read or
/// does not hold a valid artifact.
pub fn load_artifact(path: &Path) -> Result<ModelArtifact, PredictionError> {
    log::info!("Loading model artifact from {}", path.display());
    let json = std::fs::read_to_string(path).map_err(|e| PredictionError::ArtifactLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    ModelArtifact::from_json(path, &json)
}

/// A model loaded on first use and reused for the rest of the process.
///
/// A failed load is not cached, so a later call retries.
#[derive(Debug)]
pub struct LazyModel {
    path: PathBuf,
    model: OnceLock<ModelArtifact>,
}

impl LazyModel {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self {
            path,
            model: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` once the artifact has been loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.get().is_some()
    }

    /// Loads the artifact if needed and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`PredictionError::ArtifactLoad`] if loading fails.
    pub fn get(&self) -> Result<&ModelArtifact, PredictionError> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }
        let loaded = load_artifact(&self.path)?;
        Ok(self.model.get_or_init(|| loaded))
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::Feature;

    use super::*;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(vec![
            Feature::Numeric {
                column: "precipitacao".to_string(),
            },
            Feature::OneHot {
                column: "uf".to_string(),
                value: "PA".to_string(),
            },
        ])
    }

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        FeatureMatrix {
            columns: schema().names(),
            rows,
        }
    }

    const TREES: &str = r#"{
        "kind": "tree_ensemble",
        "schema": { "features": [
            { "type": "numeric", "column": "precipitacao" },
            { "type": "one_hot", "column": "uf", "value": "PA" }
        ] },
        "base_score": 100.0,
        "trees": [
            { "nodes": [
                { "feature": 0, "threshold": 50.0, "left": 1, "right": 2 },
                { "value": 40.0 },
                { "value": -30.0 }
            ] },
            { "nodes": [
                { "feature": 1, "threshold": 0.5, "left": 1, "right": 2 },
                { "value": 0.0 },
                { "value": 25.0 }
            ] }
        ]
    }"#;

    #[test]
    fn linear_model_applies_coefficients() {
        let model = LinearModel {
            schema: schema(),
            intercept: 10.0,
            coefficients: vec![-0.5, 100.0],
        };
        let predictions = model
            .predict(&matrix(vec![vec![20.0, 1.0], vec![0.0, 0.0]]))
            .unwrap();
        assert_eq!(predictions, vec![100.0, 10.0]);
    }

    #[test]
    fn tree_ensemble_sums_leaves() {
        let model = ModelArtifact::from_json(Path::new("trees.json"), TREES).unwrap();
        assert!(matches!(model, ModelArtifact::TreeEnsemble(_)));
        let predictions = model
            .predict(&matrix(vec![vec![10.0, 1.0], vec![80.0, 0.0]]))
            .unwrap();
        assert_eq!(predictions, vec![165.0, 70.0]);
    }

    #[test]
    fn rejects_matrix_with_other_columns() {
        let model = ModelArtifact::from_json(Path::new("trees.json"), TREES).unwrap();
        let features = FeatureMatrix {
            columns: vec!["precipitacao".to_string()],
            rows: vec![vec![1.0]],
        };
        assert!(matches!(
            model.predict(&features),
            Err(PredictionError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn malformed_artifacts_fail_to_load() {
        let cases = vec![
            "not json".to_string(),
            r#"{ "kind": "neural_net" }"#.to_string(),
            r#"{
                "kind": "linear",
                "schema": { "features": [] },
                "intercept": 1.0,
                "coefficients": [2.0]
            }"#
            .to_string(),
            TREES.replace(r#""left": 1"#, r#""left": 0"#),
            TREES.replace(r#""feature": 1"#, r#""feature": 7"#),
        ];
        for json in &cases {
            assert!(
                matches!(
                    ModelArtifact::from_json(Path::new("bad.json"), json),
                    Err(PredictionError::ArtifactLoad { .. })
                ),
                "{json}"
            );
        }
    }

    #[test]
    fn missing_file_is_an_artifact_error() {
        let lazy = LazyModel::new(PathBuf::from("/nonexistent/queimadas/model.json"));
        match lazy.get() {
            Err(e @ PredictionError::ArtifactLoad { .. }) => {
                assert!(e.to_string().contains("/nonexistent/queimadas/model.json"), "{e}");
            }
            other => panic!("expected an artifact error, got {:?}", other.err()),
        }
        assert!(!lazy.is_loaded());
    }

    #[test]
    fn lazy_model_loads_once() {
        let path =
            std::env::temp_dir().join(format!("queimadas_model_{}.json", std::process::id()));
        std::fs::write(&path, TREES).unwrap();

        let lazy = LazyModel::new(path.clone());
        assert!(!lazy.is_loaded());
        let first: *const ModelArtifact = lazy.get().unwrap();
        std::fs::remove_file(&path).unwrap();
        let second: *const ModelArtifact = lazy.get().unwrap();

        assert!(lazy.is_loaded());
        assert_eq!(first, second);
    }
}
