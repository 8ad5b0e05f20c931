// Product enrichment
//
// Raw catalog records are schemaless JSON documents. Enrichment projects a
// record into a JSON-safe shape for the caller: internal embedding fields are
// stripped, every remaining value is normalized to text/number/boolean, and
// the candidate's combined search score is attached as `relevance_score`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Internal-only fields removed from every record before it leaves the system
const INTERNAL_FIELDS: &[&str] = &[
    "embedding",
    "embedding_generated_at",
    "embedding_model",
    "__v",
];

/// Decimal places kept on `relevance_score`
const SCORE_PRECISION: u32 = 4;

/// Maximum description length in the compact tool-result summary
pub const SUMMARY_DESCRIPTION_LIMIT: usize = 120;

/// A catalog record enriched for presentation
///
/// Holds only text, number, and boolean values plus the computed
/// `relevance_score` in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[cfg_attr(feature = "openapi", schema(value_type = Object))]
#[serde(transparent)]
pub struct EnrichedProduct(Map<String, Value>);

impl EnrichedProduct {
    /// Project a raw record into an enriched product.
    ///
    /// Returns `None` when the record is not a JSON object. Null fields are
    /// dropped; arrays and nested objects are serialized to their JSON text.
    pub fn from_record(record: Value, combined_score: f64) -> Option<Self> {
        let Value::Object(record) = record else {
            return None;
        };

        let mut fields = Map::with_capacity(record.len() + 1);
        for (key, value) in record {
            if INTERNAL_FIELDS.contains(&key.as_str()) {
                continue;
            }
            match value {
                Value::String(_) | Value::Number(_) | Value::Bool(_) => {
                    fields.insert(key, value);
                }
                Value::Null => {}
                other => {
                    fields.insert(key, Value::String(other.to_string()));
                }
            }
        }

        let rounded = round_score(combined_score);
        fields.insert(
            "relevance_score".to_string(),
            serde_json::Number::from_f64(rounded)
                .map(Value::Number)
                .unwrap_or(Value::Number(0.into())),
        );

        Some(Self(fields))
    }

    /// Field accessor on the underlying record
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    fn text_field(&self, key: &str) -> String {
        match self.0.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    /// Attached relevance score
    pub fn relevance_score(&self) -> f64 {
        self.0
            .get("relevance_score")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }

    /// Compact row for the tool-result turn: id, title, price, category, and
    /// a description truncated to a bounded prefix.
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.text_field("_id"),
            title: self.text_field("title"),
            price: self.0.get("price").cloned().unwrap_or(Value::Null),
            category: self.text_field("category"),
            description: truncate_description(&self.text_field("description")),
        }
    }
}

/// Compact product row sent back to the provider as part of the tool result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: String,
    pub title: String,
    pub price: Value,
    pub category: String,
    pub description: String,
}

/// Round a combined score to the fixed precision
fn round_score(score: f64) -> f64 {
    let factor = 10f64.powi(SCORE_PRECISION as i32);
    (score * factor).round() / factor
}

/// Truncate a description to the summary limit, marking truncation with "..."
fn truncate_description(description: &str) -> String {
    if description.chars().count() > SUMMARY_DESCRIPTION_LIMIT {
        let prefix: String = description.chars().take(SUMMARY_DESCRIPTION_LIMIT).collect();
        format!("{}...", prefix)
    } else {
        description.to_string()
    }
}
