use crate::dataset::{Dataset, DatasetRow};
use tracing::{info, warn};

/// Number of distinct quality checks the sweep performs.
const TOTAL_CHECKS: usize = 15;

/// Outcome of a dataset quality sweep.
///
/// Failures are human-readable strings and never an error: the decision
/// to proceed belongs to the caller.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub passed: bool,
    pub failures: Vec<String>,
    pub checks_run: usize,
}

impl ValidationReport {
    fn from_failures(failures: Vec<String>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
            checks_run: TOTAL_CHECKS,
        }
    }
}

/// Comprehensive data validation for the Telco churn dataset.
///
/// Validates schema, business-logic constraints, numeric ranges, and
/// consistency properties the model's training pipeline expects.
pub fn validate_churn_dataset(dataset: &Dataset) -> ValidationReport {
    info!(rows = dataset.rows.len(), "Starting data validation");

    let mut failures = Vec::new();

    // Schema validation: essential columns
    let required_columns = [
        "customerID",
        "gender",
        "Partner",
        "Dependents",
        "PhoneService",
        "InternetService",
        "Contract",
        "tenure",
        "MonthlyCharges",
        "TotalCharges",
    ];
    for column in required_columns {
        if !dataset.headers.iter().any(|h| h == column) {
            failures.push(format!("Missing column: {}", column));
        }
    }
    if !failures.is_empty() {
        warn!(failed = failures.len(), "Schema validation failed: missing columns");
        return ValidationReport::from_failures(failures);
    }

    let rows = &dataset.rows;

    if rows.iter().any(|row| row.customer_id.trim().is_empty()) {
        failures.push("customerID has null values".to_string());
    }

    // Business-logic constraints
    if !all_in(rows, |r| &r.gender, &["Male", "Female"]) {
        failures.push("gender contains invalid values".to_string());
    }

    let yes_no_fields: [(&str, fn(&DatasetRow) -> &String); 3] = [
        ("Partner", |r| &r.partner),
        ("Dependents", |r| &r.dependents),
        ("PhoneService", |r| &r.phone_service),
    ];
    for (field, accessor) in yes_no_fields {
        if !all_in(rows, accessor, &["Yes", "No"]) {
            failures.push(format!("{} contains invalid values (expected Yes/No)", field));
        }
    }

    if !all_in(rows, |r| &r.contract, &["Month-to-month", "One year", "Two year"]) {
        failures.push("Contract contains invalid values".to_string());
    }

    if !all_in(rows, |r| &r.internet_service, &["DSL", "Fiber optic", "No"]) {
        failures.push("InternetService contains invalid values".to_string());
    }

    // Numeric range validation
    let tenure: Vec<Option<f64>> = rows.iter().map(|r| parse_numeric(&r.tenure)).collect();
    let monthly: Vec<Option<f64>> = rows
        .iter()
        .map(|r| parse_numeric(&r.monthly_charges))
        .collect();
    let total: Vec<Option<f64>> = rows
        .iter()
        .map(|r| parse_numeric(&r.total_charges))
        .collect();

    if any_below(&tenure, 0.0) {
        failures.push("tenure has negative values".to_string());
    }
    if any_below(&monthly, 0.0) {
        failures.push("MonthlyCharges has negative values".to_string());
    }
    if any_below(&total, 0.0) {
        failures.push("TotalCharges has negative values".to_string());
    }

    // Statistical sanity
    if tenure.iter().flatten().any(|&v| v > 120.0) {
        failures.push("tenure exceeds reasonable maximum (120 months)".to_string());
    }
    if monthly.iter().flatten().any(|&v| v > 200.0) {
        failures.push("MonthlyCharges exceeds reasonable maximum ($200)".to_string());
    }
    if tenure.iter().any(Option::is_none) {
        failures.push("tenure has null values".to_string());
    }
    if monthly.iter().any(Option::is_none) {
        failures.push("MonthlyCharges has null values".to_string());
    }

    // Consistency: total charges accumulate from monthly charges, so
    // TotalCharges >= MonthlyCharges should hold for nearly every row
    // (unparseable pairs count as violations, as training sees them).
    if !rows.is_empty() {
        let consistent = total
            .iter()
            .zip(monthly.iter())
            .filter(|(t, m)| matches!((t, m), (Some(t), Some(m)) if t >= m))
            .count();
        let ratio = consistent as f64 / rows.len() as f64;
        if ratio < 0.95 {
            failures
                .push("TotalCharges < MonthlyCharges in more than 5% of records".to_string());
        }
    }

    let report = ValidationReport::from_failures(failures);
    if report.passed {
        info!(checks = report.checks_run, "Data validation passed");
    } else {
        warn!(
            failed = report.failures.len(),
            checks = report.checks_run,
            "Data validation failed"
        );
    }
    report
}

fn all_in(rows: &[DatasetRow], accessor: impl Fn(&DatasetRow) -> &String, allowed: &[&str]) -> bool {
    rows.iter()
        .all(|row| allowed.contains(&accessor(row).trim()))
}

fn any_below(values: &[Option<f64>], bound: f64) -> bool {
    values.iter().flatten().any(|&v| v < bound)
}

fn parse_numeric(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
