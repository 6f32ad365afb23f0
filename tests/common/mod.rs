//! Shared fixtures for integration tests.

use churn_serving::models::CustomerRecord;
use churn_serving::serving::FeatureSchema;
use std::fs;
use std::path::Path;

/// The training-time feature columns for the Telco churn model: binary
/// and numeric passthrough columns in dataset order, then the drop-first
/// one-hot indicators.
pub const TELCO_COLUMNS: [&str; 30] = [
    "gender",
    "SeniorCitizen",
    "Partner",
    "Dependents",
    "tenure",
    "PhoneService",
    "PaperlessBilling",
    "MonthlyCharges",
    "TotalCharges",
    "MultipleLines_No phone service",
    "MultipleLines_Yes",
    "InternetService_Fiber optic",
    "InternetService_No",
    "OnlineSecurity_No internet service",
    "OnlineSecurity_Yes",
    "OnlineBackup_No internet service",
    "OnlineBackup_Yes",
    "DeviceProtection_No internet service",
    "DeviceProtection_Yes",
    "TechSupport_No internet service",
    "TechSupport_Yes",
    "StreamingTV_No internet service",
    "StreamingTV_Yes",
    "StreamingMovies_No internet service",
    "StreamingMovies_Yes",
    "Contract_One year",
    "Contract_Two year",
    "PaymentMethod_Credit card (automatic)",
    "PaymentMethod_Electronic check",
    "PaymentMethod_Mailed check",
];

pub fn telco_schema() -> FeatureSchema {
    FeatureSchema::new(TELCO_COLUMNS.iter().map(|s| s.to_string()).collect())
}

/// JSON body of the reference customer record used across the test suite.
pub const REFERENCE_RECORD_JSON: &str = r#"{
    "gender": "Female",
    "Partner": "No",
    "Dependents": "No",
    "tenure": 1,
    "PhoneService": "No",
    "MultipleLines": "No phone service",
    "InternetService": "DSL",
    "OnlineSecurity": "No",
    "OnlineBackup": "No",
    "DeviceProtection": "No",
    "TechSupport": "No",
    "StreamingTV": "No",
    "StreamingMovies": "No",
    "Contract": "Month-to-month",
    "PaperlessBilling": "Yes",
    "PaymentMethod": "Electronic check",
    "MonthlyCharges": 29.85,
    "TotalCharges": 29.85
}"#;

pub fn reference_record() -> CustomerRecord {
    serde_json::from_str(REFERENCE_RECORD_JSON).unwrap()
}

/// A logistic model.json body with mild weights over the 30 columns.
pub fn logistic_artifact_json() -> String {
    // Short tenure and month-to-month contracts push churn risk up; the
    // exact values only need to keep probabilities strictly inside (0, 1).
    let mut coefficients = vec![0.0; TELCO_COLUMNS.len()];
    coefficients[4] = -0.05; // tenure
    coefficients[7] = 0.01; // MonthlyCharges
    coefficients[25] = -0.6; // Contract_One year
    coefficients[26] = -1.2; // Contract_Two year
    coefficients[11] = 0.4; // InternetService_Fiber optic
    serde_json::json!({
        "flavor": "logistic_regression",
        "feature_count": TELCO_COLUMNS.len(),
        "coefficients": coefficients,
        "intercept": -0.2,
    })
    .to_string()
}

/// Seed a complete tracking tree for one run: meta files, params, the
/// model artifact, and the feature schema.
pub fn seed_tracking_run(root: &Path, run_id: &str, start_time: i64, threshold: Option<f64>) {
    let exp_dir = root.join("0");
    fs::create_dir_all(&exp_dir).unwrap();
    fs::write(
        exp_dir.join("meta.yaml"),
        "experiment_id: \"0\"\nname: Telco Churn\ncreation_time: 0\n",
    )
    .unwrap();

    let run_dir = exp_dir.join(run_id);
    let model_dir = run_dir.join("artifacts").join("model");
    fs::create_dir_all(&model_dir).unwrap();
    fs::write(
        run_dir.join("meta.yaml"),
        format!(
            "run_id: {run_id}\nexperiment_id: \"0\"\nstart_time: {start_time}\nstatus: FINISHED\n"
        ),
    )
    .unwrap();

    fs::write(model_dir.join("model.json"), logistic_artifact_json()).unwrap();
    fs::write(
        run_dir.join("artifacts").join("feature_columns.txt"),
        TELCO_COLUMNS.join("\n"),
    )
    .unwrap();

    if let Some(threshold) = threshold {
        let params_dir = run_dir.join("params");
        fs::create_dir_all(&params_dir).unwrap();
        fs::write(params_dir.join("threshold"), threshold.to_string()).unwrap();
    }
}
