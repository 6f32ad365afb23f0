//! Churn Serving Library
//!
//! Production serving stack for the Telco customer-churn model: a
//! deterministic serving-time feature transformer that reproduces the
//! training pipeline exactly, a prediction service over loadable model
//! artifacts, file-backed model registry resolution with a local-scan
//! fallback, and the REST/UI surface plus operational tooling around them.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod models;
pub mod registry;
pub mod serving;
pub mod validation;

pub use config::Config;
pub use error::{AppError, Result};
pub use models::{ChurnPrediction, CustomerRecord, RiskLabel};
pub use serving::{FeatureSchema, FeatureTransformer, PredictionService};
