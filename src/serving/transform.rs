use crate::models::{CustomerRecord, FieldValue};
use crate::serving::schema::{FeatureSchema, BINARY_MAP, NUMERIC_COLS};
use std::collections::HashMap;

/// Serving-time feature transformer.
///
/// Applies the identical transformation pipeline used during model
/// training, in order:
/// 1. numeric type coercion (unparseable values become 0)
/// 2. deterministic binary encoding (unmapped categories become 0)
/// 3. one-hot expansion of the remaining category fields
/// 4. indicators materialized directly as 0/1 numerics
/// 5. reindex onto the training feature schema (missing columns filled
///    with 0, extras dropped, output strictly in schema order)
///
/// Step 5 is load-bearing, not a safety net: a single-row input can only
/// ever produce the indicator column for the one category it contains, so
/// the reindex is what restores the full training-time column set. It must
/// run after expansion.
///
/// Every step is total. No input that reaches this type can make it panic
/// or error; if the schema could not be loaded at startup the transformer
/// is never constructed in the first place.
#[derive(Debug, Clone)]
pub struct FeatureTransformer {
    schema: FeatureSchema,
}

impl FeatureTransformer {
    pub fn new(schema: FeatureSchema) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Transform one customer record into a model-ready feature vector.
    pub fn transform(&self, record: &CustomerRecord) -> Vec<f64> {
        self.transform_fields(&record.raw_fields())
    }

    /// Transform raw `(column, value)` pairs into a model-ready vector.
    ///
    /// This is the shape the labelled-CSV path feeds (numerics arrive as
    /// text there and go through the same coercion as training saw).
    pub fn transform_fields(&self, fields: &[(String, FieldValue)]) -> Vec<f64> {
        let mut working: HashMap<String, f64> = HashMap::with_capacity(fields.len());

        for (name, value) in fields {
            let name = name.trim();

            if NUMERIC_COLS.contains(&name) {
                working.insert(name.to_string(), coerce_numeric(value));
            } else if let Some(table) = BINARY_MAP.get(name) {
                working.insert(name.to_string(), encode_binary(table, value));
            } else {
                match value {
                    // Already-numeric fields (SeniorCitizen) pass through
                    FieldValue::Number(n) => {
                        working.insert(name.to_string(), if n.is_finite() { *n } else { 0.0 });
                    }
                    // Remaining category fields expand to an indicator
                    // column, named the way the training pipeline named
                    // them. The baseline (dropped-first) category simply
                    // has no schema column, so its indicator vanishes in
                    // the reindex below.
                    FieldValue::Text(s) => {
                        working.insert(format!("{}_{}", name, s), 1.0);
                    }
                }
            }
        }

        // Reindex onto the training schema: fill 0, drop extras, schema order.
        self.schema
            .columns()
            .iter()
            .map(|column| working.get(column).copied().unwrap_or(0.0))
            .collect()
    }
}

/// Parse a raw value as a number; anything unparseable (including blank
/// strings and non-finite numbers) becomes 0.
fn coerce_numeric(value: &FieldValue) -> f64 {
    let parsed = match value {
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    };
    if parsed.is_finite() {
        parsed
    } else {
        0.0
    }
}

/// Look a value up in a two-entry binary table after trimming; anything
/// not in the table (tri-state service strings included) encodes to 0.
fn encode_binary(table: &HashMap<&'static str, f64>, value: &FieldValue) -> f64 {
    let text = match value {
        FieldValue::Text(s) => s.trim().to_string(),
        FieldValue::Number(n) => n.to_string(),
    };
    table.get(text.as_str()).copied().unwrap_or(0.0)
}
