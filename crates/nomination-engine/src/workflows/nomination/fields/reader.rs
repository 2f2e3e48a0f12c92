use super::{DefectKind, FieldDefect, FieldValue, MappedFields};

/// Pulls typed values out of mapped storage fields, collecting every defect it meets.
///
/// Absent and `null` fields leave the target slot untouched.
pub(crate) struct FieldReader<'a> {
    mapped: &'a MappedFields,
    defects: Vec<FieldDefect>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(mapped: &'a MappedFields) -> Self {
        Self {
            mapped,
            defects: Vec::new(),
        }
    }

    fn present(&self, field: &str) -> Option<&'a FieldValue> {
        self.mapped
            .get(field)
            .filter(|value| !matches!(value, FieldValue::Null))
    }

    fn reject(&mut self, field: &str, problem: DefectKind) {
        self.defects.push(FieldDefect {
            field: field.to_string(),
            problem,
        });
    }

    fn number(&mut self, field: &str) -> Option<f64> {
        let value = self.present(field)?;
        match value {
            FieldValue::Invalid { invalid } => {
                let raw = invalid.clone();
                self.reject(field, DefectKind::Uncoercible { raw });
                None
            }
            other => match other.as_f64() {
                Some(number) => Some(number),
                None => {
                    self.reject(field, DefectKind::ExpectedNumber);
                    None
                }
            },
        }
    }

    /// Cost amounts, lead times and scores: finite and not below zero.
    pub(crate) fn non_negative(&mut self, field: &str, slot: &mut Option<f64>) {
        if let Some(number) = self.number(field) {
            if number < 0.0 {
                self.reject(field, DefectKind::Negative);
            } else {
                *slot = Some(number);
            }
        }
    }

    pub(crate) fn bounded(&mut self, field: &str, min: f64, max: f64, slot: &mut Option<f64>) {
        if let Some(number) = self.number(field) {
            if (min..=max).contains(&number) {
                *slot = Some(number);
            } else {
                self.reject(field, DefectKind::OutOfRange { min, max });
            }
        }
    }

    pub(crate) fn count(&mut self, field: &str, slot: &mut Option<i64>) {
        let Some(value) = self.present(field) else {
            return;
        };

        match value {
            FieldValue::Integer(count) if *count >= 0 => *slot = Some(*count),
            FieldValue::Integer(_) => self.reject(field, DefectKind::Negative),
            FieldValue::Invalid { invalid } => {
                let raw = invalid.clone();
                self.reject(field, DefectKind::Uncoercible { raw });
            }
            _ => self.reject(field, DefectKind::ExpectedNumber),
        }
    }

    pub(crate) fn text(&mut self, field: &str, slot: &mut Option<String>) {
        let Some(value) = self.present(field) else {
            return;
        };

        match value {
            FieldValue::Text(text) => *slot = Some(text.trim().to_string()),
            FieldValue::Integer(number) => *slot = Some(number.to_string()),
            FieldValue::Number(number) => *slot = Some(number.to_string()),
            _ => self.reject(field, DefectKind::ExpectedText),
        }
    }

    pub(crate) fn flag(&mut self, field: &str, slot: &mut Option<bool>) {
        let Some(value) = self.present(field) else {
            return;
        };

        match value {
            FieldValue::Bool(flag) => *slot = Some(*flag),
            FieldValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => *slot = Some(true),
                "false" | "no" => *slot = Some(false),
                _ => self.reject(field, DefectKind::ExpectedBoolean),
            },
            _ => self.reject(field, DefectKind::ExpectedBoolean),
        }
    }

    pub(crate) fn finish(self) -> Result<(), Vec<FieldDefect>> {
        if self.defects.is_empty() {
            Ok(())
        } else {
            Err(self.defects)
        }
    }
}
