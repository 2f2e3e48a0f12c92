//! Field registry that translates presentation field names (camelCase) into storage field
//! names (snake_case), coercing values according to what each field holds.
//!
//! Mapping never fails: unknown keys are dropped and values that cannot be coerced are kept
//! as [`FieldValue::Invalid`] so the caller can decide whether to reject the write.

mod coercion;
mod reader;
mod registry;
mod update;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use coercion::Coercion;
pub(crate) use reader::FieldReader;
pub use registry::{FieldRegistry, FieldSet, FieldSpec};
pub use update::FieldUpdate;

/// Identifier key that callers may echo back; it is never written.
pub const ID_FIELD: &str = "id";
/// Storage key stamped on every mapped update.
pub const UPDATED_AT_FIELD: &str = "updated_at";

/// Storage-ready value produced by coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Input a percentage or count field could not be coerced from.
    Invalid { invalid: String },
}

impl FieldValue {
    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldValue::Invalid { .. })
    }

    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            FieldValue::Number(value) => Some(*value),
            FieldValue::Integer(value) => Some(*value as f64),
            FieldValue::Text(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        value.filter(|value| value.is_finite())
    }
}

/// Result of mapping one update: the storage fields plus the untranslated input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedFields {
    pub db_fields: BTreeMap<String, FieldValue>,
    pub original_fields: FieldUpdate,
}

impl MappedFields {
    pub fn get(&self, internal_name: &str) -> Option<&FieldValue> {
        self.db_fields.get(internal_name)
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        match self.db_fields.get(UPDATED_AT_FIELD) {
            Some(FieldValue::Timestamp(at)) => Some(*at),
            _ => None,
        }
    }

    /// Fields whose input could not be coerced to the type the field holds.
    pub fn defects(&self) -> Vec<FieldDefect> {
        self.db_fields
            .iter()
            .filter_map(|(field, value)| match value {
                FieldValue::Invalid { invalid } => Some(FieldDefect {
                    field: field.clone(),
                    problem: DefectKind::Uncoercible {
                        raw: invalid.clone(),
                    },
                }),
                _ => None,
            })
            .collect()
    }
}

/// Advisory report of keys that matched no known field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldValidation {
    pub valid: bool,
    pub invalid_fields: Vec<String>,
}

/// A stored field value that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefect {
    pub field: String,
    pub problem: DefectKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefectKind {
    Uncoercible { raw: String },
    ExpectedNumber,
    ExpectedText,
    ExpectedBoolean,
    Negative,
    OutOfRange { min: f64, max: f64 },
}

pub fn map_vendor_rating_fields(update: &FieldUpdate) -> MappedFields {
    FieldSet::VendorRating.registry().map(update)
}

pub fn map_cost_competency_fields(update: &FieldUpdate) -> MappedFields {
    FieldSet::CostCompetency.registry().map(update)
}

pub fn validate_fields(set: FieldSet, update: &FieldUpdate) -> FieldValidation {
    set.registry().validate(update)
}
