use churn_serving::{
    api::{build_router, AppState},
    config::Config,
    models::ModelInfo,
    registry::resolve_model,
    serving::{load_model, FeatureSchema, PredictionService},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churn_serving=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load().map_err(|e| anyhow::anyhow!("failed to load configuration: {e}"))?;

    tracing::info!("Starting Churn Serving v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Registry root: {}, model: {}, stage: {}",
        config.registry.root.display(),
        config.registry.model_name,
        config.registry.stage
    );

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = churn_serving::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        } else {
            tracing::info!("✅ Prometheus metrics initialized");
        }
    } else {
        tracing::info!("⚠️  Prometheus metrics disabled in configuration");
    }

    // Resolve the serving model. This is the one startup step that is
    // allowed to kill the process: no model+schema pair, no serving.
    let resolved = resolve_model(&config.registry)
        .map_err(|e| anyhow::anyhow!("startup aborted: {e}"))?;
    tracing::info!(
        "✅ Model resolved via {} (run: {}, version: {})",
        resolved.resolved_via,
        resolved.run_id.as_deref().unwrap_or("unknown"),
        resolved
            .version
            .map(|v| v.to_string())
            .unwrap_or_else(|| "unregistered".to_string()),
    );

    let schema = FeatureSchema::load(&resolved.schema_path)
        .map_err(|e| anyhow::anyhow!("startup aborted: {e}"))?;
    let model = load_model(&resolved.model_dir)
        .map_err(|e| anyhow::anyhow!("startup aborted: {e}"))?;
    tracing::info!(
        "✅ Loaded {} model with {} feature columns",
        model.name(),
        schema.len()
    );

    // Run-scoped threshold wins; configuration supplies the fallback.
    let threshold = resolved
        .threshold
        .unwrap_or(config.serving.default_threshold);
    tracing::info!("Decision threshold: {:.2}", threshold);

    if config.observability.prometheus_enabled {
        churn_serving::metrics::BUILD_INFO
            .with_label_values(&[
                env!("CARGO_PKG_VERSION"),
                model.name(),
                resolved.resolved_via,
            ])
            .set(1.0);
    }

    let info = ModelInfo {
        model_name: config.registry.model_name.clone(),
        version: resolved.version,
        run_id: resolved.run_id.clone(),
        resolved_via: resolved.resolved_via.to_string(),
    };

    let service = Arc::new(PredictionService::new(schema, model, threshold, info));
    tracing::info!("✅ Prediction service initialized");

    // Build HTTP router
    let app = build_router(AppState::new(service));

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("🚀 HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Prediction API: http://{}/v1/predict", http_addr);
    tracing::info!("   Web UI: http://{}/ui", http_addr);
    tracing::info!("   Metrics: http://{}/metrics", http_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
