use crate::api::AppState;
use crate::models::CustomerRecord;
use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

/// Serve the prediction form.
pub async fn ui_page() -> Html<&'static str> {
    Html(include_str!("../../assets/ui.html"))
}

/// Form-encoded counterpart of the JSON endpoint.
///
/// Field names match the dataset columns so the form and the API describe
/// the same record. Numeric inputs arrive as text from the browser and are
/// coerced leniently; the transformer treats anything unparseable as 0
/// anyway.
#[derive(Debug, Deserialize)]
pub struct UiPredictForm {
    pub gender: String,
    #[serde(rename = "SeniorCitizen", default)]
    pub senior_citizen: Option<String>,
    #[serde(rename = "Partner")]
    pub partner: String,
    #[serde(rename = "Dependents")]
    pub dependents: String,
    #[serde(rename = "PhoneService")]
    pub phone_service: String,
    #[serde(rename = "MultipleLines")]
    pub multiple_lines: String,
    #[serde(rename = "InternetService")]
    pub internet_service: String,
    #[serde(rename = "OnlineSecurity")]
    pub online_security: String,
    #[serde(rename = "OnlineBackup")]
    pub online_backup: String,
    #[serde(rename = "DeviceProtection")]
    pub device_protection: String,
    #[serde(rename = "TechSupport")]
    pub tech_support: String,
    #[serde(rename = "StreamingTV")]
    pub streaming_tv: String,
    #[serde(rename = "StreamingMovies")]
    pub streaming_movies: String,
    #[serde(rename = "Contract")]
    pub contract: String,
    #[serde(rename = "PaperlessBilling")]
    pub paperless_billing: String,
    #[serde(rename = "PaymentMethod")]
    pub payment_method: String,
    pub tenure: String,
    #[serde(rename = "MonthlyCharges")]
    pub monthly_charges: String,
    #[serde(rename = "TotalCharges")]
    pub total_charges: String,
}

impl UiPredictForm {
    fn into_record(self) -> CustomerRecord {
        CustomerRecord {
            gender: self.gender,
            senior_citizen: self
                .senior_citizen
                .and_then(|raw| raw.trim().parse::<i64>().ok()),
            partner: self.partner,
            dependents: self.dependents,
            phone_service: self.phone_service,
            multiple_lines: self.multiple_lines,
            internet_service: self.internet_service,
            online_security: self.online_security,
            online_backup: self.online_backup,
            device_protection: self.device_protection,
            tech_support: self.tech_support,
            streaming_tv: self.streaming_tv,
            streaming_movies: self.streaming_movies,
            contract: self.contract,
            paperless_billing: self.paperless_billing,
            payment_method: self.payment_method,
            tenure: self.tenure.trim().parse().unwrap_or(0),
            monthly_charges: self.monthly_charges.trim().parse().unwrap_or(0.0),
            total_charges: self.total_charges.trim().parse().unwrap_or(0.0),
        }
    }
}

/// Run the same inference pipeline as the API endpoint and render the
/// result inline.
pub async fn ui_predict(
    State(state): State<AppState>,
    Form(form): Form<UiPredictForm>,
) -> Html<String> {
    let record = form.into_record();

    let body = match state.service.predict(&record) {
        Ok(prediction) => {
            let (badge, class) = if prediction.prediction.is_high_risk() {
                ("⚠️ High Risk", "high-risk")
            } else {
                ("✅ Low Risk", "low-risk")
            };
            format!(
                r#"<div class="result {class}">
  <h2>{badge}: {label}</h2>
  <p>Churn score: {score:.1} / 100 (threshold {threshold:.2})</p>
  <p><a href="/ui">&larr; Score another customer</a></p>
</div>"#,
                label = prediction.prediction,
                score = prediction.score,
                threshold = prediction.threshold_used,
            )
        }
        Err(e) => format!(
            r#"<div class="result high-risk">
  <h2>Prediction failed</h2>
  <p>{e}</p>
  <p><a href="/ui">&larr; Back</a></p>
</div>"#
        ),
    };

    Html(render_result_page(&body))
}

fn render_result_page(body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Churn Predictor — Result</title>
  <style>
    body {{ font-family: system-ui, sans-serif; background: #f8f9fa; margin: 40px auto; max-width: 640px; }}
    .result {{ padding: 24px; border-radius: 8px; background: #fff; border: 1px solid #ddd; }}
    .result.high-risk h2 {{ color: #b71c1c; }}
    .result.low-risk h2 {{ color: #1b5e20; }}
  </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}
