use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Directory under the tracking root holding registered model versions.
const MODELS_DIR: &str = "models";

/// Experiment metadata (`<root>/<experiment_id>/meta.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentMeta {
    pub experiment_id: String,
    pub name: String,
    #[serde(default)]
    pub creation_time: i64,
}

/// Run metadata (`<root>/<experiment_id>/<run_id>/meta.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub experiment_id: String,
    pub start_time: i64,
    #[serde(default)]
    pub status: String,
}

/// Registered model version metadata
/// (`<root>/models/<name>/version-<n>/meta.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVersionMeta {
    pub name: String,
    pub version: u32,
    pub run_id: String,
    pub current_stage: String,
    pub source: String,
    #[serde(default)]
    pub creation_timestamp: i64,
}

/// Reader/writer for the file-backed tracking and registry tree.
#[derive(Debug, Clone)]
pub struct RegistryStore {
    root: PathBuf,
}

impl RegistryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // ------------------------------------------------------------------
    // Experiments and runs
    // ------------------------------------------------------------------

    /// Look an experiment up by display name.
    pub fn experiment_by_name(&self, name: &str) -> Result<ExperimentMeta> {
        for dir in self.experiment_dirs()? {
            let meta_path = dir.join("meta.yaml");
            if !meta_path.is_file() {
                continue;
            }
            let meta: ExperimentMeta = read_yaml(&meta_path)?;
            if meta.name == name {
                return Ok(meta);
            }
        }
        Err(AppError::NotFound(format!("experiment '{}' not found", name)))
    }

    /// All runs of an experiment, unordered.
    pub fn runs(&self, experiment_id: &str) -> Result<Vec<RunMeta>> {
        let exp_dir = self.root.join(experiment_id);
        let mut runs = Vec::new();

        for entry in fs::read_dir(&exp_dir).map_err(|e| {
            AppError::NotFound(format!("experiment dir {}: {}", exp_dir.display(), e))
        })? {
            let entry = entry?;
            let meta_path = entry.path().join("meta.yaml");
            if entry.path().is_dir() && meta_path.is_file() {
                if let Ok(meta) = read_yaml::<RunMeta>(&meta_path) {
                    runs.push(meta);
                }
            }
        }

        Ok(runs)
    }

    /// Most recent run of an experiment, by start time.
    pub fn latest_run(&self, experiment_name: &str) -> Result<RunMeta> {
        let experiment = self.experiment_by_name(experiment_name)?;
        let mut runs = self.runs(&experiment.experiment_id)?;
        runs.sort_by_key(|run| std::cmp::Reverse(run.start_time));

        runs.into_iter().next().ok_or_else(|| {
            AppError::NotFound(format!(
                "no runs found in experiment '{}'",
                experiment_name
            ))
        })
    }

    /// Find a run by id across all experiments.
    pub fn find_run(&self, run_id: &str) -> Result<RunMeta> {
        for dir in self.experiment_dirs()? {
            let meta_path = dir.join(run_id).join("meta.yaml");
            if meta_path.is_file() {
                return read_yaml(&meta_path);
            }
        }
        Err(AppError::NotFound(format!("run '{}' not found", run_id)))
    }

    pub fn run_dir(&self, run: &RunMeta) -> PathBuf {
        self.root.join(&run.experiment_id).join(&run.run_id)
    }

    pub fn artifacts_dir(&self, run: &RunMeta) -> PathBuf {
        self.run_dir(run).join("artifacts")
    }

    /// Read one training-run parameter (params are one-value-per-file).
    pub fn run_param(&self, run: &RunMeta, key: &str) -> Result<Option<String>> {
        let path = self.run_dir(run).join("params").join(key);
        if !path.is_file() {
            return Ok(None);
        }
        let value = fs::read_to_string(&path)?;
        Ok(Some(value.trim().to_string()))
    }

    /// Append a metric observation to a run (`timestamp value step`).
    pub fn log_metric(&self, run: &RunMeta, key: &str, value: f64) -> Result<()> {
        let metrics_dir = self.run_dir(run).join("metrics");
        fs::create_dir_all(&metrics_dir)?;

        let line = format!("{} {} 0\n", chrono::Utc::now().timestamp_millis(), value);
        let path = metrics_dir.join(key);
        let mut existing = if path.is_file() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };
        existing.push_str(&line);
        fs::write(&path, existing)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Registered model versions
    // ------------------------------------------------------------------

    /// All registered versions of a model, unordered.
    pub fn model_versions(&self, name: &str) -> Result<Vec<ModelVersionMeta>> {
        let model_dir = self.root.join(MODELS_DIR).join(name);
        let mut versions = Vec::new();

        if !model_dir.is_dir() {
            return Ok(versions);
        }

        for entry in fs::read_dir(&model_dir)? {
            let entry = entry?;
            let meta_path = entry.path().join("meta.yaml");
            if entry.path().is_dir() && meta_path.is_file() {
                versions.push(read_yaml::<ModelVersionMeta>(&meta_path)?);
            }
        }

        Ok(versions)
    }

    /// Highest-numbered version currently in the given stage.
    pub fn latest_version(&self, name: &str, stage: &str) -> Result<Option<ModelVersionMeta>> {
        let version = self
            .model_versions(name)?
            .into_iter()
            .filter(|v| v.current_stage.eq_ignore_ascii_case(stage))
            .max_by_key(|v| v.version);
        Ok(version)
    }

    /// Versions registered from a specific run.
    pub fn versions_for_run(&self, name: &str, run_id: &str) -> Result<Vec<ModelVersionMeta>> {
        Ok(self
            .model_versions(name)?
            .into_iter()
            .filter(|v| v.run_id == run_id)
            .collect())
    }

    /// Register a run's model artifact as a new version (stage "None").
    pub fn register_model(&self, name: &str, run: &RunMeta) -> Result<ModelVersionMeta> {
        let next_version = self
            .model_versions(name)?
            .iter()
            .map(|v| v.version)
            .max()
            .unwrap_or(0)
            + 1;

        let meta = ModelVersionMeta {
            name: name.to_string(),
            version: next_version,
            run_id: run.run_id.clone(),
            current_stage: "None".to_string(),
            source: self
                .artifacts_dir(run)
                .join("model")
                .to_string_lossy()
                .into_owned(),
            creation_timestamp: chrono::Utc::now().timestamp_millis(),
        };
        self.write_version(&meta)?;

        info!(model = name, version = next_version, run_id = %run.run_id, "Model version registered");
        Ok(meta)
    }

    /// Transition a registered version into a new stage.
    pub fn transition_stage(
        &self,
        name: &str,
        version: u32,
        stage: &str,
    ) -> Result<ModelVersionMeta> {
        let meta_path = self.version_dir(name, version).join("meta.yaml");
        if !meta_path.is_file() {
            return Err(AppError::NotFound(format!(
                "model '{}' version {} not found",
                name, version
            )));
        }

        let mut meta: ModelVersionMeta = read_yaml(&meta_path)?;
        meta.current_stage = stage.to_string();
        self.write_version(&meta)?;

        info!(model = name, version, stage, "Model version transitioned");
        Ok(meta)
    }

    fn version_dir(&self, name: &str, version: u32) -> PathBuf {
        self.root
            .join(MODELS_DIR)
            .join(name)
            .join(format!("version-{}", version))
    }

    fn write_version(&self, meta: &ModelVersionMeta) -> Result<()> {
        let dir = self.version_dir(&meta.name, meta.version);
        fs::create_dir_all(&dir)?;
        let yaml = serde_yaml::to_string(meta)?;
        fs::write(dir.join("meta.yaml"), yaml)?;
        Ok(())
    }

    /// Experiment directories under the root (skips the registry subtree
    /// and anything without the expected shape).
    fn experiment_dirs(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();
        let entries = fs::read_dir(&self.root).map_err(|e| {
            AppError::NotFound(format!("tracking root {}: {}", self.root.display(), e))
        })?;

        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if path.is_dir() && name != MODELS_DIR && !name.starts_with('.') {
                dirs.push(path);
            }
        }

        Ok(dirs)
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)?;
    serde_yaml::from_str(&raw)
        .map_err(|e| AppError::Serialization(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_experiment(root: &Path, experiment_id: &str, name: &str) {
        let dir = root.join(experiment_id);
        fs::create_dir_all(&dir).unwrap();
        let meta = ExperimentMeta {
            experiment_id: experiment_id.to_string(),
            name: name.to_string(),
            creation_time: 0,
        };
        fs::write(dir.join("meta.yaml"), serde_yaml::to_string(&meta).unwrap()).unwrap();
    }

    fn write_run(root: &Path, experiment_id: &str, run_id: &str, start_time: i64) -> RunMeta {
        let dir = root.join(experiment_id).join(run_id);
        fs::create_dir_all(&dir).unwrap();
        let meta = RunMeta {
            run_id: run_id.to_string(),
            experiment_id: experiment_id.to_string(),
            start_time,
            status: "FINISHED".to_string(),
        };
        fs::write(dir.join("meta.yaml"), serde_yaml::to_string(&meta).unwrap()).unwrap();
        meta
    }

    #[test]
    fn test_latest_run_orders_by_start_time() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        write_run(dir.path(), "0", "older", 100);
        write_run(dir.path(), "0", "newer", 200);

        let store = RegistryStore::new(dir.path());
        let latest = store.latest_run("Telco Churn").unwrap();
        assert_eq!(latest.run_id, "newer");
    }

    #[test]
    fn test_missing_experiment_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RegistryStore::new(dir.path());
        assert!(matches!(
            store.latest_run("Telco Churn"),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_run_params_read_from_files() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        let run = write_run(dir.path(), "0", "run1", 100);

        let params_dir = dir.path().join("0").join("run1").join("params");
        fs::create_dir_all(&params_dir).unwrap();
        fs::write(params_dir.join("threshold"), "0.35\n").unwrap();

        let store = RegistryStore::new(dir.path());
        assert_eq!(
            store.run_param(&run, "threshold").unwrap(),
            Some("0.35".to_string())
        );
        assert_eq!(store.run_param(&run, "missing").unwrap(), None);
    }

    #[test]
    fn test_register_and_promote() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        let run = write_run(dir.path(), "0", "run1", 100);

        let store = RegistryStore::new(dir.path());
        let v1 = store.register_model("telco-churn-model", &run).unwrap();
        assert_eq!(v1.version, 1);
        assert_eq!(v1.current_stage, "None");

        // Nothing is in Production yet
        assert!(store
            .latest_version("telco-churn-model", "Production")
            .unwrap()
            .is_none());

        let promoted = store
            .transition_stage("telco-churn-model", 1, "Production")
            .unwrap();
        assert_eq!(promoted.current_stage, "Production");

        let latest = store
            .latest_version("telco-churn-model", "Production")
            .unwrap()
            .unwrap();
        assert_eq!(latest.version, 1);
        assert_eq!(latest.run_id, "run1");
    }

    #[test]
    fn test_latest_version_picks_highest_in_stage() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        let run1 = write_run(dir.path(), "0", "run1", 100);
        let run2 = write_run(dir.path(), "0", "run2", 200);

        let store = RegistryStore::new(dir.path());
        store.register_model("telco-churn-model", &run1).unwrap();
        store.register_model("telco-churn-model", &run2).unwrap();
        store
            .transition_stage("telco-churn-model", 1, "Production")
            .unwrap();
        store
            .transition_stage("telco-churn-model", 2, "Production")
            .unwrap();

        let latest = store
            .latest_version("telco-churn-model", "Production")
            .unwrap()
            .unwrap();
        assert_eq!(latest.version, 2);
        assert_eq!(latest.run_id, "run2");
    }

    #[test]
    fn test_versions_for_run() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        let run = write_run(dir.path(), "0", "run1", 100);

        let store = RegistryStore::new(dir.path());
        assert!(store
            .versions_for_run("telco-churn-model", "run1")
            .unwrap()
            .is_empty());

        store.register_model("telco-churn-model", &run).unwrap();
        let versions = store.versions_for_run("telco-churn-model", "run1").unwrap();
        assert_eq!(versions.len(), 1);
    }

    #[test]
    fn test_log_metric_appends() {
        let dir = tempfile::tempdir().unwrap();
        write_experiment(dir.path(), "0", "Telco Churn");
        let run = write_run(dir.path(), "0", "run1", 100);

        let store = RegistryStore::new(dir.path());
        store.log_metric(&run, "eval_f1", 0.61).unwrap();
        store.log_metric(&run, "eval_f1", 0.63).unwrap();

        let contents =
            fs::read_to_string(dir.path().join("0").join("run1").join("metrics").join("eval_f1"))
                .unwrap();
        assert_eq!(contents.lines().count(), 2);
        assert!(contents.contains("0.61"));
    }
}
