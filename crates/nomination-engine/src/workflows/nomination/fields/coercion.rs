use serde::Serialize;
use serde_json::Value;

use super::FieldValue;

/// Type conversion applied to a matched field before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Coercion {
    /// Floating-point percentage.
    Percentage,
    /// Whole-number tally of defects or nonconformances.
    Count,
    Passthrough,
}

impl Coercion {
    /// Derives the coercion from a storage field name.
    pub fn for_field(internal_name: &str) -> Self {
        if internal_name.contains("percent") {
            Self::Percentage
        } else if internal_name.contains("defect") || internal_name.contains("nonconformance") {
            Self::Count
        } else {
            Self::Passthrough
        }
    }

    pub fn apply(self, value: &Value) -> FieldValue {
        match self {
            Coercion::Percentage => to_float(value),
            Coercion::Count => to_integer(value),
            Coercion::Passthrough => passthrough(value),
        }
    }
}

fn to_float(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Number(number) => number
            .as_f64()
            .map(FieldValue::Number)
            .unwrap_or_else(|| invalid(value)),
        Value::String(raw) => parse_float(raw)
            .map(FieldValue::Number)
            .unwrap_or_else(|| invalid(value)),
        _ => invalid(value),
    }
}

fn to_integer(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Number(number) => match number.as_i64() {
            Some(integer) => FieldValue::Integer(integer),
            None => number
                .as_f64()
                .and_then(truncate)
                .map(FieldValue::Integer)
                .unwrap_or_else(|| invalid(value)),
        },
        Value::String(raw) => raw
            .trim()
            .parse::<i64>()
            .ok()
            .or_else(|| parse_float(raw).and_then(truncate))
            .map(FieldValue::Integer)
            .unwrap_or_else(|| invalid(value)),
        _ => invalid(value),
    }
}

fn passthrough(value: &Value) -> FieldValue {
    match value {
        Value::Null => FieldValue::Null,
        Value::Bool(flag) => FieldValue::Bool(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => FieldValue::Integer(integer),
            None => number
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| invalid(value)),
        },
        Value::String(text) => FieldValue::Text(text.clone()),
        Value::Array(_) | Value::Object(_) => invalid(value),
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
}

fn truncate(value: f64) -> Option<i64> {
    let truncated = value.trunc();
    if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
        Some(truncated as i64)
    } else {
        None
    }
}

fn invalid(value: &Value) -> FieldValue {
    let raw = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    FieldValue::Invalid { invalid: raw }
}
