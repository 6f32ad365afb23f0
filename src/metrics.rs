//! Prometheus metrics exporter for the churn serving stack.
//!
//! A single hot path (transform + score) keeps this deliberately small:
//! request counters, a prediction-latency histogram, a churn-score
//! histogram, and build info.

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace("churn_serving"),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// Total number of predictions served
    ///
    /// Labels: outcome (likely_to_churn / not_likely_to_churn / error)
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of predictions served")
            .namespace("churn_serving"),
        &["outcome"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// End-to-end prediction duration in seconds (transform + score)
    pub static ref PREDICTION_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "prediction_duration_seconds",
            "Prediction duration in seconds"
        )
        .namespace("churn_serving")
        .buckets(vec![0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1])
    ).expect("Failed to create PREDICTION_DURATION_SECONDS metric");

    /// Distribution of served churn scores (0-100)
    pub static ref CHURN_SCORE: HistogramVec = HistogramVec::new(
        HistogramOpts::new("churn_score", "Distribution of served churn scores")
            .namespace("churn_serving")
            .buckets(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]),
        &["label"]
    ).expect("Failed to create CHURN_SCORE metric");

    /// Application build info
    ///
    /// Labels: version, model, resolved_via
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace("churn_serving"),
        &["version", "model", "resolved_via"]
    ).expect("Failed to create BUILD_INFO metric");
}

/// Initialize the Prometheus metrics registry.
///
/// Registers all metrics; call once at application startup.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_DURATION_SECONDS.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(CHURN_SCORE.clone()))?;
    PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Generate Prometheus text format metrics for the /metrics endpoint.
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}
