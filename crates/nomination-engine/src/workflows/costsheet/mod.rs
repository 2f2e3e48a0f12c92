//! CSV cost-sheet import: one row per vendor quote, headers in either field naming convention.

mod normalizer;
mod parser;

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::workflows::nomination::{VendorCostEntry, VendorId};

#[derive(Debug)]
pub enum CostSheetImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    MissingVendorColumn,
    MissingVendorId { row: usize },
}

impl std::fmt::Display for CostSheetImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostSheetImportError::Io(err) => write!(f, "failed to read cost sheet: {}", err),
            CostSheetImportError::Csv(err) => write!(f, "invalid cost sheet CSV data: {}", err),
            CostSheetImportError::MissingVendorColumn => {
                write!(f, "cost sheet has no vendor id column")
            }
            CostSheetImportError::MissingVendorId { row } => {
                write!(f, "cost sheet row {} has no vendor id", row)
            }
        }
    }
}

impl std::error::Error for CostSheetImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CostSheetImportError::Io(err) => Some(err),
            CostSheetImportError::Csv(err) => Some(err),
            CostSheetImportError::MissingVendorColumn
            | CostSheetImportError::MissingVendorId { .. } => None,
        }
    }
}

impl From<std::io::Error> for CostSheetImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CostSheetImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub struct CostSheetImporter;

impl CostSheetImporter {
    pub fn from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<VendorCostEntry>, CostSheetImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<VendorCostEntry>, CostSheetImportError> {
        let entries: Vec<VendorCostEntry> = parser::parse_rows(reader)?
            .into_iter()
            .map(|row| VendorCostEntry {
                vendor_id: row.vendor_id,
                nomination_id: None,
                fields: row.fields,
            })
            .collect();

        debug!(entries = entries.len(), "cost sheet parsed");
        Ok(entries)
    }
}

/// Vendors in first-appearance order, each listed once.
pub fn distinct_vendors(entries: &[VendorCostEntry]) -> Vec<VendorId> {
    let mut vendors: Vec<VendorId> = Vec::new();
    for entry in entries {
        if !vendors.contains(&entry.vendor_id) {
            vendors.push(entry.vendor_id.clone());
        }
    }
    vendors
}
