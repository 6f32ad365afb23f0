/// Serving-time inference pipeline.
///
/// This module owns the train/serve consistency contract: the feature
/// transformation applied here must reproduce the training-time
/// preprocessing exactly, column for column. The pieces:
/// - `schema`: the persisted feature-column schema and the fixed encoding
///   tables shared with training
/// - `transform`: the deterministic record-to-vector pipeline
/// - `model`: loadable classifier artifacts behind the `ChurnModel` seam
/// - `service`: the request-facing composition of all of the above
pub mod model;
pub mod schema;
pub mod service;
pub mod transform;

pub use model::{load_model, ChurnModel, LogisticScorer, TreeScorer};
pub use schema::FeatureSchema;
pub use service::PredictionService;
pub use transform::FeatureTransformer;
