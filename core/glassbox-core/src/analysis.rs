//! Helpers for the external analyzer's output.
//!
//! The analyzer returns `{coherence, terminology, completeness, comment}`.
//! The log stores that mapping verbatim; this module only reads it to derive
//! the soft score.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClarityReport {
    pub coherence: u32,
    pub terminology: u32,
    pub completeness: u32,
    pub comment: String,
    /// Any additional keys the analyzer returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ClarityReport {
    /// Lenient parse: missing or non-numeric metrics count as 0, values are
    /// capped at 100. Non-object input yields an empty report.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        let mut extra = object.clone();
        let coherence = take_metric(&mut extra, "coherence");
        let terminology = take_metric(&mut extra, "terminology");
        let completeness = take_metric(&mut extra, "completeness");
        let comment = match extra.remove("comment") {
            Some(Value::String(text)) => text,
            Some(other) if !other.is_null() => other.to_string(),
            _ => String::new(),
        };

        Self {
            coherence,
            terminology,
            completeness,
            comment,
            extra,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn take_metric(object: &mut Map<String, Value>, key: &str) -> u32 {
    let value = match object.remove(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if value.is_finite() {
        value.clamp(0.0, 100.0).round() as u32
    } else {
        0
    }
}

/// Rounded mean of the three clarity metrics.
pub fn soft_score(report: &ClarityReport) -> u32 {
    let sum = report.coherence + report.terminology + report.completeness;
    (f64::from(sum) / 3.0).round() as u32
}
