use serde::{Deserialize, Serialize};
use std::fmt;

/// Business-readable churn risk label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    #[serde(rename = "Likely to churn")]
    LikelyToChurn,
    #[serde(rename = "Not likely to churn")]
    NotLikelyToChurn,
}

impl RiskLabel {
    /// Classify a probability against a decision threshold.
    pub fn from_probability(probability: f64, threshold: f64) -> Self {
        if probability >= threshold {
            RiskLabel::LikelyToChurn
        } else {
            RiskLabel::NotLikelyToChurn
        }
    }

    pub fn is_high_risk(&self) -> bool {
        matches!(self, RiskLabel::LikelyToChurn)
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLabel::LikelyToChurn => write!(f, "Likely to churn"),
            RiskLabel::NotLikelyToChurn => write!(f, "Not likely to churn"),
        }
    }
}

/// Result of scoring a single customer record.
///
/// Constructed fresh per request and returned to the caller; never
/// persisted by this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnPrediction {
    /// Business-readable risk label
    pub prediction: RiskLabel,

    /// Churn score on a 0-100 scale (`raw_prob * 100`)
    pub score: f64,

    /// Churn probability in [0, 1]
    pub raw_prob: f64,

    /// Decision threshold the label was derived with
    pub threshold_used: f64,

    /// Feature columns consumed by the model, in model input order
    pub features_used: Vec<String>,
}

/// Metadata about the model a serving process resolved at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Registered model name
    pub model_name: String,

    /// Registry version, when resolved through the registry
    pub version: Option<u32>,

    /// Training run the artifact came from, when known
    pub run_id: Option<String>,

    /// Resolution path that produced the model ("registry" or "local-scan")
    pub resolved_via: String,
}
