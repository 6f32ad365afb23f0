use crate::error::{AppError, Result};
use crate::models::FieldValue;
use serde::Deserialize;
use std::fs::File;
use std::path::Path;

/// One raw row of the labelled Telco dataset.
///
/// Every field is optional with the empty default so that partial CSVs
/// still load — column-presence problems are the validator's job to
/// report, not a parse failure. The numeric columns stay as text because
/// the source data genuinely carries blanks there (`TotalCharges`) and
/// the serving transformer owns the coercion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetRow {
    #[serde(rename = "customerID", default)]
    pub customer_id: String,
    #[serde(default)]
    pub gender: String,
    #[serde(rename = "SeniorCitizen", default)]
    pub senior_citizen: Option<i64>,
    #[serde(rename = "Partner", default)]
    pub partner: String,
    #[serde(rename = "Dependents", default)]
    pub dependents: String,
    #[serde(default)]
    pub tenure: String,
    #[serde(rename = "PhoneService", default)]
    pub phone_service: String,
    #[serde(rename = "MultipleLines", default)]
    pub multiple_lines: String,
    #[serde(rename = "InternetService", default)]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity", default)]
    pub online_security: String,
    #[serde(rename = "OnlineBackup", default)]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection", default)]
    pub device_protection: String,
    #[serde(rename = "TechSupport", default)]
    pub tech_support: String,
    #[serde(rename = "StreamingTV", default)]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies", default)]
    pub streaming_movies: String,
    #[serde(rename = "Contract", default)]
    pub contract: String,
    #[serde(rename = "PaperlessBilling", default)]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod", default)]
    pub payment_method: String,
    #[serde(rename = "MonthlyCharges", default)]
    pub monthly_charges: String,
    #[serde(rename = "TotalCharges", default)]
    pub total_charges: String,
    #[serde(rename = "Churn", default)]
    pub churn: Option<String>,
}

impl DatasetRow {
    /// Flatten the row into the transformer's input shape. Numerics stay
    /// as text here; serving-time coercion handles them identically to
    /// training.
    pub fn raw_fields(&self) -> Vec<(String, FieldValue)> {
        vec![
            ("gender".into(), FieldValue::text(&self.gender)),
            (
                "SeniorCitizen".into(),
                FieldValue::Number(self.senior_citizen.unwrap_or(0) as f64),
            ),
            ("Partner".into(), FieldValue::text(&self.partner)),
            ("Dependents".into(), FieldValue::text(&self.dependents)),
            ("tenure".into(), FieldValue::text(&self.tenure)),
            ("PhoneService".into(), FieldValue::text(&self.phone_service)),
            ("MultipleLines".into(), FieldValue::text(&self.multiple_lines)),
            (
                "InternetService".into(),
                FieldValue::text(&self.internet_service),
            ),
            (
                "OnlineSecurity".into(),
                FieldValue::text(&self.online_security),
            ),
            ("OnlineBackup".into(), FieldValue::text(&self.online_backup)),
            (
                "DeviceProtection".into(),
                FieldValue::text(&self.device_protection),
            ),
            ("TechSupport".into(), FieldValue::text(&self.tech_support)),
            ("StreamingTV".into(), FieldValue::text(&self.streaming_tv)),
            (
                "StreamingMovies".into(),
                FieldValue::text(&self.streaming_movies),
            ),
            ("Contract".into(), FieldValue::text(&self.contract)),
            (
                "PaperlessBilling".into(),
                FieldValue::text(&self.paperless_billing),
            ),
            ("PaymentMethod".into(), FieldValue::text(&self.payment_method)),
            (
                "MonthlyCharges".into(),
                FieldValue::text(&self.monthly_charges),
            ),
            ("TotalCharges".into(), FieldValue::text(&self.total_charges)),
        ]
    }

    /// Binary churn label: 1 for "Yes", 0 for "No", `None` otherwise.
    pub fn churn_label(&self) -> Option<u8> {
        match self.churn.as_deref().map(str::trim) {
            Some("Yes") => Some(1),
            Some("No") => Some(0),
            _ => None,
        }
    }
}

/// A loaded labelled dataset: the header row plus every parsed record.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<DatasetRow>,
}

/// Load a labelled churn CSV from disk.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = File::open(path)
        .map_err(|e| AppError::NotFound(format!("dataset {}: {}", path.display(), e)))?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Serialization(format!("{}: {}", path.display(), e)))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.deserialize::<DatasetRow>() {
        let row =
            record.map_err(|e| AppError::Serialization(format!("{}: {}", path.display(), e)))?;
        rows.push(row);
    }

    Ok(Dataset { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_CSV: &str = "\
customerID,gender,SeniorCitizen,Partner,Dependents,tenure,PhoneService,MultipleLines,InternetService,OnlineSecurity,OnlineBackup,DeviceProtection,TechSupport,StreamingTV,StreamingMovies,Contract,PaperlessBilling,PaymentMethod,MonthlyCharges,TotalCharges,Churn
7590-VHVEG,Female,0,Yes,No,1,No,No phone service,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,29.85,29.85,No
5575-GNVDE,Male,0,No,No,34,Yes,No,DSL,Yes,No,Yes,No,No,No,One year,No,Mailed check,56.95,1889.5,Yes
3668-QPYBK,Male,0,No,No,2,Yes,No,DSL,Yes,Yes,No,No,No,No,Month-to-month,Yes,Mailed check,53.85, ,No
";

    fn write_sample() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_CSV.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_dataset() {
        let file = write_sample();
        let dataset = load_dataset(file.path()).unwrap();

        assert_eq!(dataset.rows.len(), 3);
        assert!(dataset.headers.contains(&"customerID".to_string()));
        assert_eq!(dataset.rows[0].customer_id, "7590-VHVEG");
        assert_eq!(dataset.rows[1].churn_label(), Some(1));
        assert_eq!(dataset.rows[0].churn_label(), Some(0));
    }

    #[test]
    fn test_blank_total_charges_survives_loading() {
        let file = write_sample();
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.rows[2].total_charges.trim(), "");
    }

    #[test]
    fn test_raw_fields_width() {
        let file = write_sample();
        let dataset = load_dataset(file.path()).unwrap();
        assert_eq!(dataset.rows[0].raw_fields().len(), 19);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        assert!(load_dataset(Path::new("/nonexistent/telco.csv")).is_err());
    }
}
