use crate::api::AppState;
use crate::error::Result;
use crate::metrics::{CHURN_SCORE, PREDICTIONS_TOTAL, PREDICTION_DURATION_SECONDS};
use crate::models::{ChurnPrediction, CustomerRecord, ModelInfo, RiskLabel};
use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::time::Instant;
use validator::Validate;

/// Health check endpoint
///
/// Returns a fixed success payload once startup succeeded; load balancers
/// key off this.
pub async fn health_check() -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Main prediction endpoint
///
/// Receives a validated customer record, runs the inference pipeline, and
/// returns the full prediction record. Scoring failures become structured
/// error responses; they never take the process down.
pub async fn predict(
    State(state): State<AppState>,
    Json(record): Json<CustomerRecord>,
) -> Result<Json<ChurnPrediction>> {
    record.validate()?;

    let started = Instant::now();
    let result = state.service.predict(&record);
    PREDICTION_DURATION_SECONDS.observe(started.elapsed().as_secs_f64());

    match result {
        Ok(prediction) => {
            let outcome = match prediction.prediction {
                RiskLabel::LikelyToChurn => "likely_to_churn",
                RiskLabel::NotLikelyToChurn => "not_likely_to_churn",
            };
            PREDICTIONS_TOTAL.with_label_values(&[outcome]).inc();
            CHURN_SCORE
                .with_label_values(&[outcome])
                .observe(prediction.score);

            Ok(Json(prediction))
        }
        Err(e) => {
            PREDICTIONS_TOTAL.with_label_values(&["error"]).inc();
            Err(e)
        }
    }
}

/// Resolved-model metadata endpoint
pub async fn model_info(State(state): State<AppState>) -> Json<ModelInfoResponse> {
    let info: &ModelInfo = state.service.info();
    Json(ModelInfoResponse {
        model_name: info.model_name.clone(),
        version: info.version,
        run_id: info.run_id.clone(),
        resolved_via: info.resolved_via.clone(),
        flavor: state.service.model_name().to_string(),
        threshold: state.service.threshold(),
        feature_count: state.service.schema().len(),
    })
}

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub model_name: String,
    pub version: Option<u32>,
    pub run_id: Option<String>,
    pub resolved_via: String,
    pub flavor: String,
    pub threshold: f64,
    pub feature_count: usize,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}
