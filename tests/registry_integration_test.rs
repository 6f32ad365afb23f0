/// Integration tests for model resolution: the full startup path from a
/// seeded tracking tree to a working prediction service, both through the
/// registry and through the local-scan fallback.
mod common;

use churn_serving::config::RegistryConfig;
use churn_serving::error::AppError;
use churn_serving::models::ModelInfo;
use churn_serving::registry::{resolve_model, RegistryStore};
use churn_serving::serving::{load_model, FeatureSchema, PredictionService};
use common::{reference_record, seed_tracking_run};
use std::path::Path;

fn registry_config(root: &Path) -> RegistryConfig {
    RegistryConfig {
        root: root.to_path_buf(),
        model_name: "telco-churn-model".to_string(),
        stage: "Production".to_string(),
        experiment: "Telco Churn".to_string(),
    }
}

fn promote(root: &Path, run_id: &str) {
    let store = RegistryStore::new(root);
    let run = store.find_run(run_id).unwrap();
    let version = store.register_model("telco-churn-model", &run).unwrap();
    store
        .transition_stage("telco-churn-model", version.version, "Production")
        .unwrap();
}

#[test]
fn test_registry_resolution_builds_a_working_service() {
    let dir = tempfile::tempdir().unwrap();
    seed_tracking_run(dir.path(), "run1", 100, Some(0.4));
    promote(dir.path(), "run1");

    let resolved = resolve_model(&registry_config(dir.path())).unwrap();
    assert_eq!(resolved.resolved_via, "registry");
    assert_eq!(resolved.threshold, Some(0.4));

    // The resolved pair is loadable end to end.
    let schema = FeatureSchema::load(&resolved.schema_path).unwrap();
    let model = load_model(&resolved.model_dir).unwrap();
    let service = PredictionService::new(
        schema,
        model,
        resolved.threshold.unwrap(),
        ModelInfo {
            model_name: "telco-churn-model".to_string(),
            version: resolved.version,
            run_id: resolved.run_id.clone(),
            resolved_via: resolved.resolved_via.to_string(),
        },
    );

    let prediction = service.predict(&reference_record()).unwrap();
    assert_eq!(prediction.threshold_used, 0.4);
    assert!((0.0..=1.0).contains(&prediction.raw_prob));
}

#[test]
fn test_registry_prefers_latest_production_version() {
    let dir = tempfile::tempdir().unwrap();
    seed_tracking_run(dir.path(), "run1", 100, None);
    seed_tracking_run(dir.path(), "run2", 200, None);
    promote(dir.path(), "run1");
    promote(dir.path(), "run2");

    let resolved = resolve_model(&registry_config(dir.path())).unwrap();
    assert_eq!(resolved.run_id.as_deref(), Some("run2"));
    assert_eq!(resolved.version, Some(2));
}

#[test]
fn test_fallback_scan_without_registered_versions() {
    let dir = tempfile::tempdir().unwrap();
    seed_tracking_run(dir.path(), "run1", 100, Some(0.4));
    // No promotion: registry path has nothing in Production.

    let resolved = resolve_model(&registry_config(dir.path())).unwrap();
    assert_eq!(resolved.resolved_via, "local-scan");
    // The fallback carries no run identity and no run-scoped threshold;
    // the caller falls back to the configured default.
    assert_eq!(resolved.run_id, None);
    assert_eq!(resolved.threshold, None);
    assert!(resolved.schema_path.is_file());
}

#[test]
fn test_empty_tracking_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let err = resolve_model(&registry_config(dir.path())).unwrap_err();
    assert!(matches!(err, AppError::ModelResolution(_)));
}

#[test]
fn test_promote_and_latest_run_flow() {
    let dir = tempfile::tempdir().unwrap();
    seed_tracking_run(dir.path(), "older", 100, None);
    seed_tracking_run(dir.path(), "newer", 200, None);

    let store = RegistryStore::new(dir.path());

    // latest-run orders by start time
    let latest = store.latest_run("Telco Churn").unwrap();
    assert_eq!(latest.run_id, "newer");

    // promoting that run makes it the serving version
    promote(dir.path(), &latest.run_id);
    let resolved = resolve_model(&registry_config(dir.path())).unwrap();
    assert_eq!(resolved.run_id.as_deref(), Some("newer"));

    // the run was registered exactly once
    let store = RegistryStore::new(dir.path());
    let versions = store.versions_for_run("telco-churn-model", "newer").unwrap();
    assert_eq!(versions.len(), 1);
}

#[test]
fn test_evaluation_metrics_land_in_the_run() {
    let dir = tempfile::tempdir().unwrap();
    seed_tracking_run(dir.path(), "run1", 100, None);

    let store = RegistryStore::new(dir.path());
    let run = store.find_run("run1").unwrap();
    store.log_metric(&run, "eval_f1", 0.62).unwrap();

    let metric_file = dir
        .path()
        .join("0")
        .join("run1")
        .join("metrics")
        .join("eval_f1");
    let contents = std::fs::read_to_string(metric_file).unwrap();
    assert!(contents.contains("0.62"));
}
