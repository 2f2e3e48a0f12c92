use std::io::Read;

use super::normalizer::{cell_value, is_vendor_column, normalize_header};
use super::CostSheetImportError;
use crate::workflows::nomination::{FieldUpdate, VendorId};

#[derive(Debug)]
pub(crate) struct CostSheetRow {
    pub(crate) vendor_id: VendorId,
    pub(crate) fields: FieldUpdate,
}

pub(crate) fn parse_rows<R: Read>(reader: R) -> Result<Vec<CostSheetRow>, CostSheetImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let vendor_column = headers
        .iter()
        .position(|header| is_vendor_column(header))
        .ok_or(CostSheetImportError::MissingVendorColumn)?;

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row = index + 1;
        let vendor_id = record
            .get(vendor_column)
            .map(str::trim)
            .filter(|vendor| !vendor.is_empty())
            .ok_or(CostSheetImportError::MissingVendorId { row })?;

        let mut fields = FieldUpdate::new();
        for (column, header) in headers.iter().enumerate() {
            if column == vendor_column || header.is_empty() {
                continue;
            }
            if let Some(value) = record.get(column).and_then(cell_value) {
                fields.push(header.clone(), value);
            }
        }

        rows.push(CostSheetRow {
            vendor_id: VendorId::from(vendor_id),
            fields,
        });
    }

    Ok(rows)
}
