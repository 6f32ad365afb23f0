use crate::error::{AppError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Name of the serialized model file inside a model artifact directory.
pub const MODEL_FILE: &str = "model.json";

/// Trait for loaded churn classifiers.
///
/// The serving layer treats the model as an opaque scoring function. Some
/// flavors expose a calibrated probability, others only a hard class
/// label; `predict_proba` returns `None` in the latter case and the
/// prediction service synthesizes a substitute.
pub trait ChurnModel: Send + Sync {
    /// Model flavor name (for logs and metadata)
    fn name(&self) -> &str;

    /// Expected input width
    fn feature_count(&self) -> usize;

    /// Churn probability in [0, 1], if this flavor can produce one
    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>>;

    /// Hard class label: 1 = churn, 0 = no churn
    fn predict_class(&self, features: &[f64]) -> Result<u8>;
}

/// Serialized model artifact, tagged by flavor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "snake_case")]
pub enum ModelArtifact {
    LogisticRegression {
        feature_count: usize,
        coefficients: Vec<f64>,
        intercept: f64,
    },
    DecisionTree {
        feature_count: usize,
        nodes: Vec<TreeNode>,
    },
}

/// One node of a serialized decision tree, in preorder-indexed form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: u8,
    },
}

/// Logistic-regression scorer over persisted coefficients.
pub struct LogisticScorer {
    weights: Array1<f64>,
    intercept: f64,
}

impl LogisticScorer {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            weights: Array1::from_vec(coefficients),
            intercept,
        }
    }

    fn check_width(&self, features: &[f64]) -> Result<()> {
        if features.len() != self.weights.len() {
            return Err(AppError::Internal(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                self.weights.len()
            )));
        }
        Ok(())
    }
}

impl ChurnModel for LogisticScorer {
    fn name(&self) -> &str {
        "logistic_regression"
    }

    fn feature_count(&self) -> usize {
        self.weights.len()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Option<f64>> {
        self.check_width(features)?;
        let x = Array1::from_vec(features.to_vec());
        let margin = self.weights.dot(&x) + self.intercept;
        Ok(Some(sigmoid(margin)))
    }

    fn predict_class(&self, features: &[f64]) -> Result<u8> {
        let proba = self
            .predict_proba(features)?
            .expect("logistic scorer always yields a probability");
        Ok(u8::from(proba >= 0.5))
    }
}

/// Decision-tree scorer over a persisted node table.
///
/// Tree flavors only emit hard class labels; `predict_proba` reports the
/// capability gap with `None` rather than inventing a number here — the
/// substitution policy belongs to the prediction service.
pub struct TreeScorer {
    nodes: Vec<TreeNode>,
    feature_count: usize,
}

impl TreeScorer {
    pub fn new(nodes: Vec<TreeNode>, feature_count: usize) -> Result<Self> {
        if nodes.is_empty() {
            return Err(AppError::Serialization(
                "decision tree artifact has no nodes".to_string(),
            ));
        }
        Ok(Self {
            nodes,
            feature_count,
        })
    }
}

impl ChurnModel for TreeScorer {
    fn name(&self) -> &str {
        "decision_tree"
    }

    fn feature_count(&self) -> usize {
        self.feature_count
    }

    fn predict_proba(&self, _features: &[f64]) -> Result<Option<f64>> {
        Ok(None)
    }

    fn predict_class(&self, features: &[f64]) -> Result<u8> {
        if features.len() != self.feature_count {
            return Err(AppError::Internal(format!(
                "feature vector has {} values, model expects {}",
                features.len(),
                self.feature_count
            )));
        }

        let mut index = 0usize;
        // Node table is a DAG indexed downward; the hop budget bounds
        // traversal on a malformed table.
        for _ in 0..self.nodes.len() {
            match &self.nodes[index] {
                TreeNode::Leaf { class } => return Ok(*class),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    index = if value <= *threshold { *left } else { *right };
                    if index >= self.nodes.len() {
                        return Err(AppError::Internal(format!(
                            "tree node index {} out of bounds",
                            index
                        )));
                    }
                }
            }
        }

        Err(AppError::Internal(
            "tree traversal did not reach a leaf".to_string(),
        ))
    }
}

/// Load a classifier from a model artifact directory.
pub fn load_model(model_dir: &Path) -> Result<Box<dyn ChurnModel>> {
    let path = model_dir.join(MODEL_FILE);
    let raw = fs::read_to_string(&path).map_err(|e| {
        AppError::ModelResolution(format!("failed to read {}: {}", path.display(), e))
    })?;
    let artifact: ModelArtifact = serde_json::from_str(&raw).map_err(|e| {
        AppError::ModelResolution(format!("failed to parse {}: {}", path.display(), e))
    })?;

    let model: Box<dyn ChurnModel> = match artifact {
        ModelArtifact::LogisticRegression {
            feature_count,
            coefficients,
            intercept,
        } => {
            if coefficients.len() != feature_count {
                return Err(AppError::ModelResolution(format!(
                    "artifact declares {} features but carries {} coefficients",
                    feature_count,
                    coefficients.len()
                )));
            }
            Box::new(LogisticScorer::new(coefficients, intercept))
        }
        ModelArtifact::DecisionTree {
            feature_count,
            nodes,
        } => Box::new(TreeScorer::new(nodes, feature_count)?),
    };

    info!(
        model = model.name(),
        features = model.feature_count(),
        path = %path.display(),
        "Model loaded"
    );

    Ok(model)
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
