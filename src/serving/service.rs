use crate::error::{AppError, Result};
use crate::models::{ChurnPrediction, CustomerRecord, ModelInfo, RiskLabel};
use crate::serving::model::ChurnModel;
use crate::serving::schema::FeatureSchema;
use crate::serving::transform::FeatureTransformer;
use tracing::debug;

/// Probability substituted for a positive hard label when the model
/// exposes no calibrated probability. A known approximation, not a
/// calibrated value.
pub const SYNTHETIC_POSITIVE_PROBA: f64 = 0.85;

/// Probability substituted for a negative hard label.
pub const SYNTHETIC_NEGATIVE_PROBA: f64 = 0.15;

/// Request-facing prediction service.
///
/// Built once at startup from the resolved model, schema, and threshold,
/// then shared read-only across requests. Nothing here mutates after
/// construction, so the service is safe behind an `Arc` under any worker
/// model the server chooses.
pub struct PredictionService {
    transformer: FeatureTransformer,
    model: Box<dyn ChurnModel>,
    threshold: f64,
    info: ModelInfo,
}

impl PredictionService {
    pub fn new(
        schema: FeatureSchema,
        model: Box<dyn ChurnModel>,
        threshold: f64,
        info: ModelInfo,
    ) -> Self {
        Self {
            transformer: FeatureTransformer::new(schema),
            model,
            threshold,
            info,
        }
    }

    /// Score one customer record.
    ///
    /// Classifier failures surface as a single wrapped scoring error; the
    /// transformation itself cannot fail.
    pub fn predict(&self, record: &CustomerRecord) -> Result<ChurnPrediction> {
        let features = self.transformer.transform(record);
        let raw_prob = self.probability(&features)?;
        Ok(self.package(raw_prob))
    }

    /// Score an already-transformed feature vector (the offline
    /// evaluation path).
    pub fn predict_features(&self, features: &[f64]) -> Result<ChurnPrediction> {
        let raw_prob = self.probability(features)?;
        Ok(self.package(raw_prob))
    }

    fn probability(&self, features: &[f64]) -> Result<f64> {
        let raw_prob = match self
            .model
            .predict_proba(features)
            .map_err(wrap_scoring)?
        {
            Some(proba) => proba.clamp(0.0, 1.0),
            None => {
                // Label-only flavor: synthesize a substitute probability.
                let class = self.model.predict_class(features).map_err(wrap_scoring)?;
                if class == 1 {
                    SYNTHETIC_POSITIVE_PROBA
                } else {
                    SYNTHETIC_NEGATIVE_PROBA
                }
            }
        };

        debug!(
            model = self.model.name(),
            raw_prob,
            threshold = self.threshold,
            "Scored feature vector"
        );

        Ok(raw_prob)
    }

    fn package(&self, raw_prob: f64) -> ChurnPrediction {
        ChurnPrediction {
            prediction: RiskLabel::from_probability(raw_prob, self.threshold),
            score: raw_prob * 100.0,
            raw_prob,
            threshold_used: self.threshold,
            features_used: self.transformer.schema().columns().to_vec(),
        }
    }

    pub fn transformer(&self) -> &FeatureTransformer {
        &self.transformer
    }

    pub fn schema(&self) -> &FeatureSchema {
        self.transformer.schema()
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn info(&self) -> &ModelInfo {
        &self.info
    }
}

fn wrap_scoring(err: AppError) -> AppError {
    AppError::Scoring(err.to_string())
}
