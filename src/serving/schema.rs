use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Numeric columns that need type coercion before scoring.
pub const NUMERIC_COLS: [&str; 3] = ["tenure", "MonthlyCharges", "TotalCharges"];

/// Deterministic binary feature mappings.
///
/// These tables must stay identical to the ones used when the feature
/// schema was produced; any drift is a silent train/serve skew, not a
/// runtime error. Tri-state values ("No phone service", "No internet
/// service") are intentionally absent — they encode to 0.
pub static BINARY_MAP: Lazy<HashMap<&'static str, HashMap<&'static str, f64>>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert(
        "gender",
        HashMap::from([("Female", 0.0), ("Male", 1.0)]),
    );
    map.insert("Partner", HashMap::from([("No", 0.0), ("Yes", 1.0)]));
    map.insert("Dependents", HashMap::from([("No", 0.0), ("Yes", 1.0)]));
    map.insert("PhoneService", HashMap::from([("No", 0.0), ("Yes", 1.0)]));
    map.insert(
        "PaperlessBilling",
        HashMap::from([("No", 0.0), ("Yes", 1.0)]),
    );
    map
});

/// Ordered feature-column schema fixed at training time.
///
/// The single source of truth for both the width and the order of the
/// model's input vector. Persisted as a flat text file, one column name
/// per line, order-significant.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema from an in-memory column list (tests, fixtures).
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Load the schema from its training-time artifact file.
    ///
    /// Blank lines are skipped and surrounding whitespace trimmed,
    /// matching the training-side writer. An empty result is an error:
    /// a schema with no columns cannot describe any model input.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| {
            AppError::ModelResolution(format!(
                "failed to read feature schema {}: {}",
                path.display(),
                e
            ))
        })?;

        let columns: Vec<String> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if columns.is_empty() {
            return Err(AppError::ModelResolution(format!(
                "feature schema {} contains no columns",
                path.display()
            )));
        }

        tracing::info!(
            path = %path.display(),
            columns = columns.len(),
            "Feature schema loaded"
        );

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
