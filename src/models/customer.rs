use serde::{Deserialize, Serialize};
use validator::Validate;

/// A raw value as it arrives at the serving boundary.
///
/// Category fields carry text; numeric fields carry numbers. The feature
/// transformer is total over both shapes, so an upstream source that hands
/// a numeric field over as text (the labelled CSVs do, for `TotalCharges`)
/// still flows through coercion rather than erroring.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
}

impl FieldValue {
    pub fn text(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Customer data for churn prediction.
///
/// Field names mirror the original dataset columns exactly; the wire
/// format depends on that. All 15 category fields are required strings,
/// `SeniorCitizen` is an optional 0/1 flag (absent means 0).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CustomerRecord {
    // Demographics
    #[validate(length(min = 1))]
    pub gender: String, // "Male" or "Female"
    #[serde(rename = "SeniorCitizen", default)]
    #[validate(range(min = 0, max = 1))]
    pub senior_citizen: Option<i64>,
    #[serde(rename = "Partner")]
    #[validate(length(min = 1))]
    pub partner: String,
    #[serde(rename = "Dependents")]
    #[validate(length(min = 1))]
    pub dependents: String,

    // Phone services
    #[serde(rename = "PhoneService")]
    #[validate(length(min = 1))]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    #[validate(length(min = 1))]
    pub multiple_lines: String, // "Yes", "No", or "No phone service"

    // Internet services
    #[serde(rename = "InternetService")]
    #[validate(length(min = 1))]
    pub internet_service: String, // "DSL", "Fiber optic", or "No"
    #[serde(rename = "OnlineSecurity")]
    #[validate(length(min = 1))]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    #[validate(length(min = 1))]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    #[validate(length(min = 1))]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    #[validate(length(min = 1))]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    #[validate(length(min = 1))]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    #[validate(length(min = 1))]
    pub streaming_movies: String,

    // Account information
    #[serde(rename = "Contract")]
    #[validate(length(min = 1))]
    pub contract: String, // "Month-to-month", "One year", "Two year"
    #[serde(rename = "PaperlessBilling")]
    #[validate(length(min = 1))]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    #[validate(length(min = 1))]
    pub payment_method: String,

    // Numeric features
    pub tenure: i64, // months with the company
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: f64,
    #[serde(rename = "TotalCharges")]
    pub total_charges: f64,
}

impl CustomerRecord {
    /// Flatten the record into `(column name, raw value)` pairs in dataset
    /// column order. This is the transformer's input shape.
    pub fn raw_fields(&self) -> Vec<(String, FieldValue)> {
        vec![
            ("gender".into(), FieldValue::text(&self.gender)),
            (
                "SeniorCitizen".into(),
                FieldValue::Number(self.senior_citizen.unwrap_or(0) as f64),
            ),
            ("Partner".into(), FieldValue::text(&self.partner)),
            ("Dependents".into(), FieldValue::text(&self.dependents)),
            ("tenure".into(), FieldValue::Number(self.tenure as f64)),
            ("PhoneService".into(), FieldValue::text(&self.phone_service)),
            (
                "MultipleLines".into(),
                FieldValue::text(&self.multiple_lines),
            ),
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
            (
                "PaymentMethod".into(),
                FieldValue::text(&self.payment_method),
            ),
            (
                "MonthlyCharges".into(),
                FieldValue::Number(self.monthly_charges),
            ),
            (
                "TotalCharges".into(),
                FieldValue::Number(self.total_charges),
            ),
        ]
    }
}
