use serde_json::{Number, Value};

const VENDOR_COLUMNS: [&str; 4] = ["vendor_id", "vendorid", "vendor id", "vendor"];

/// Strips spreadsheet artefacts from a header while keeping its case, which the field
/// registry relies on to tell camelCase from snake_case names.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn is_vendor_column(header: &str) -> bool {
    let lowered = header.to_ascii_lowercase();
    VENDOR_COLUMNS.contains(&lowered.as_str())
}

/// Converts a cell into the JSON value the field registry expects; blank cells yield nothing.
pub(crate) fn cell_value(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(integer) = trimmed.parse::<i64>() {
        return Some(Value::from(integer));
    }

    let number = trimmed
        .replace(',', "")
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64);
    match number {
        Some(number) => Some(Value::Number(number)),
        None => Some(Value::String(trimmed.to_string())),
    }
}
