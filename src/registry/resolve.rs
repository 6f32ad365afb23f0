use crate::config::RegistryConfig;
use crate::error::{AppError, Result};
use crate::registry::store::RegistryStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

/// Name of the feature-schema artifact next to (or inside) a model dir.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.txt";

/// A resolved model+schema pair, ready for loading.
#[derive(Debug, Clone)]
pub struct ResolvedModel {
    /// Directory holding the model artifact
    pub model_dir: PathBuf,

    /// Path to the feature schema file from the same training run
    pub schema_path: PathBuf,

    /// Training run the artifact came from, when known
    pub run_id: Option<String>,

    /// Registry version, when resolved through the registry
    pub version: Option<u32>,

    /// Decision threshold persisted with the training run, when present
    pub threshold: Option<f64>,

    /// Which strategy produced this resolution
    pub resolved_via: &'static str,
}

/// A strategy for locating the current serving model.
pub trait ModelResolver {
    fn name(&self) -> &'static str;
    fn resolve(&self) -> Result<ResolvedModel>;
}

/// Primary strategy: the registered Production-stage version.
pub struct RegistryResolver {
    store: RegistryStore,
    model_name: String,
    stage: String,
}

impl RegistryResolver {
    pub fn new(store: RegistryStore, model_name: impl Into<String>, stage: impl Into<String>) -> Self {
        Self {
            store,
            model_name: model_name.into(),
            stage: stage.into(),
        }
    }
}

impl ModelResolver for RegistryResolver {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn resolve(&self) -> Result<ResolvedModel> {
        let version = self
            .store
            .latest_version(&self.model_name, &self.stage)?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "no model version found for {} in {} stage",
                    self.model_name, self.stage
                ))
            })?;

        let run = self.store.find_run(&version.run_id)?;
        let artifacts = self.store.artifacts_dir(&run);

        let model_dir = artifacts.join("model");
        if !model_dir.is_dir() {
            return Err(AppError::ModelResolution(format!(
                "run {} has no model artifact at {}",
                run.run_id,
                model_dir.display()
            )));
        }

        let schema_path = artifacts.join(FEATURE_COLUMNS_FILE);
        if !schema_path.is_file() {
            return Err(AppError::ModelResolution(format!(
                "run {} has no {} artifact",
                run.run_id, FEATURE_COLUMNS_FILE
            )));
        }

        let threshold = match self.store.run_param(&run, "threshold")? {
            Some(raw) => match raw.parse::<f64>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(run_id = %run.run_id, value = %raw, "Unparseable threshold param, ignoring");
                    None
                }
            },
            None => None,
        };

        info!(
            model = %self.model_name,
            version = version.version,
            run_id = %run.run_id,
            "Resolved model from registry"
        );

        Ok(ResolvedModel {
            model_dir,
            schema_path,
            run_id: Some(run.run_id),
            version: Some(version.version),
            threshold,
            resolved_via: "registry",
        })
    }
}

/// Fallback strategy: scan the tracking root for the most recently
/// modified model artifact directory, taking the schema file from the
/// same directory or its parent.
pub struct LocalScanResolver {
    root: PathBuf,
}

impl LocalScanResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn candidate_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut candidates = Vec::new();

        let experiments = fs::read_dir(&self.root).map_err(|e| {
            AppError::ModelResolution(format!("tracking root {}: {}", self.root.display(), e))
        })?;

        for experiment in experiments.flatten() {
            let experiment_path = experiment.path();
            let name = experiment.file_name();
            if !experiment_path.is_dir() || name.to_string_lossy() == "models" {
                continue;
            }
            let Ok(runs) = fs::read_dir(&experiment_path) else {
                continue;
            };
            for run in runs.flatten() {
                let model_dir = run.path().join("artifacts").join("model");
                if model_dir.is_dir() {
                    candidates.push(model_dir);
                }
            }
        }

        Ok(candidates)
    }
}

impl ModelResolver for LocalScanResolver {
    fn name(&self) -> &'static str {
        "local-scan"
    }

    fn resolve(&self) -> Result<ResolvedModel> {
        let candidates = self.candidate_dirs()?;

        let model_dir = candidates
            .into_iter()
            .max_by_key(|dir| modified_time(dir))
            .ok_or_else(|| {
                AppError::ModelResolution(format!(
                    "no local model artifacts found under {}",
                    self.root.display()
                ))
            })?;

        // Schema file sits in the model dir or its parent (artifacts/).
        let mut schema_path = model_dir.join(FEATURE_COLUMNS_FILE);
        if !schema_path.is_file() {
            if let Some(parent) = model_dir.parent() {
                schema_path = parent.join(FEATURE_COLUMNS_FILE);
            }
        }
        if !schema_path.is_file() {
            return Err(AppError::ModelResolution(format!(
                "{} not found next to {}",
                FEATURE_COLUMNS_FILE,
                model_dir.display()
            )));
        }

        info!(model_dir = %model_dir.display(), "Resolved model from local artifact scan");

        Ok(ResolvedModel {
            model_dir,
            schema_path,
            run_id: None,
            version: None,
            threshold: None,
            resolved_via: "local-scan",
        })
    }
}

fn modified_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .unwrap_or(SystemTime::UNIX_EPOCH)
}

/// Resolve the serving model: registry first, local scan on failure,
/// fatal error when both strategies come up empty.
pub fn resolve_model(config: &RegistryConfig) -> Result<ResolvedModel> {
    let store = RegistryStore::new(&config.root);
    let primary = RegistryResolver::new(store, &config.model_name, &config.stage);

    match primary.resolve() {
        Ok(resolved) => Ok(resolved),
        Err(registry_error) => {
            warn!(
                error = %registry_error,
                "Registry load failed, falling back to local artifact scan"
            );

            let fallback = LocalScanResolver::new(&config.root);
            fallback.resolve().map_err(|scan_error| {
                AppError::ModelResolution(format!(
                    "registry resolution failed ({}) and local scan failed ({})",
                    registry_error, scan_error
                ))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::store::{ExperimentMeta, RunMeta};
    use std::fs;

    fn seed_run(root: &Path, run_id: &str, start_time: i64, with_schema_in: &str) {
        let exp_dir = root.join("0");
        fs::create_dir_all(&exp_dir).unwrap();
        let exp = ExperimentMeta {
            experiment_id: "0".to_string(),
            name: "Telco Churn".to_string(),
            creation_time: 0,
        };
        fs::write(exp_dir.join("meta.yaml"), serde_yaml::to_string(&exp).unwrap()).unwrap();

        let run_dir = exp_dir.join(run_id);
        let model_dir = run_dir.join("artifacts").join("model");
        fs::create_dir_all(&model_dir).unwrap();
        let run = RunMeta {
            run_id: run_id.to_string(),
            experiment_id: "0".to_string(),
            start_time,
            status: "FINISHED".to_string(),
        };
        fs::write(run_dir.join("meta.yaml"), serde_yaml::to_string(&run).unwrap()).unwrap();
        fs::write(
            model_dir.join("model.json"),
            r#"{"flavor":"logistic_regression","feature_count":1,"coefficients":[0.5],"intercept":0.0}"#,
        )
        .unwrap();

        let schema_dir = match with_schema_in {
            "model" => model_dir.clone(),
            _ => run_dir.join("artifacts"),
        };
        fs::write(schema_dir.join(FEATURE_COLUMNS_FILE), "tenure\n").unwrap();
    }

    fn test_config(root: &Path) -> RegistryConfig {
        RegistryConfig {
            root: root.to_path_buf(),
            model_name: "telco-churn-model".to_string(),
            stage: "Production".to_string(),
            experiment: "Telco Churn".to_string(),
        }
    }

    #[test]
    fn test_registry_resolution_prefers_production_version() {
        let dir = tempfile::tempdir().unwrap();
        seed_run(dir.path(), "run1", 100, "artifacts");

        let store = RegistryStore::new(dir.path());
        let run = store.find_run("run1").unwrap();
        store.register_model("telco-churn-model", &run).unwrap();
        store
            .transition_stage("telco-churn-model", 1, "Production")
            .unwrap();

        // Threshold param flows through resolution
        let params_dir = dir.path().join("0").join("run1").join("params");
        fs::create_dir_all(&params_dir).unwrap();
        fs::write(params_dir.join("threshold"), "0.4").unwrap();

        let resolved = resolve_model(&test_config(dir.path())).unwrap();
        assert_eq!(resolved.resolved_via, "registry");
        assert_eq!(resolved.run_id.as_deref(), Some("run1"));
        assert_eq!(resolved.version, Some(1));
        assert_eq!(resolved.threshold, Some(0.4));
        assert!(resolved.model_dir.is_dir());
        assert!(resolved.schema_path.is_file());
    }

    #[test]
    fn test_fallback_scan_when_registry_empty() {
        let dir = tempfile::tempdir().unwrap();
        seed_run(dir.path(), "run1", 100, "artifacts");
        // No registered versions at all.

        let resolved = resolve_model(&test_config(dir.path())).unwrap();
        assert_eq!(resolved.resolved_via, "local-scan");
        assert_eq!(resolved.run_id, None);
        assert_eq!(resolved.threshold, None);
    }

    #[test]
    fn test_fallback_finds_schema_inside_model_dir() {
        let dir = tempfile::tempdir().unwrap();
        seed_run(dir.path(), "run1", 100, "model");

        let resolver = LocalScanResolver::new(dir.path());
        let resolved = resolver.resolve().unwrap();
        assert!(resolved
            .schema_path
            .parent()
            .unwrap()
            .ends_with("model"));
    }

    #[test]
    fn test_both_paths_failing_is_fatal() {
        let dir = tempfile::tempdir().unwrap();

        let err = resolve_model(&test_config(dir.path())).unwrap_err();
        match err {
            AppError::ModelResolution(message) => {
                assert!(message.contains("local scan failed"));
            }
            other => panic!("expected model resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_schema_artifact_fails_registry_resolution() {
        let dir = tempfile::tempdir().unwrap();
        seed_run(dir.path(), "run1", 100, "artifacts");
        fs::remove_file(
            dir.path()
                .join("0")
                .join("run1")
                .join("artifacts")
                .join(FEATURE_COLUMNS_FILE),
        )
        .unwrap();

        let store = RegistryStore::new(dir.path());
        let run = store.find_run("run1").unwrap();
        store.register_model("telco-churn-model", &run).unwrap();
        store
            .transition_stage("telco-churn-model", 1, "Production")
            .unwrap();

        let resolver = RegistryResolver::new(
            RegistryStore::new(dir.path()),
            "telco-churn-model",
            "Production",
        );
        assert!(resolver.resolve().is_err());
    }
}
