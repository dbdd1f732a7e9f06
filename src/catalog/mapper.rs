//! Row mapping: raw spreadsheet rows → candidate records for one catalog.

use tracing::{debug, warn};

use super::normalize::{normalize, normalize_hazard, normalize_value, parse_integer};
use super::reader::{Cell, RawRow};
use super::schema::{CatalogDefinition, FieldKind, FieldSpec};
use crate::error::RowMappingError;
use crate::store::{FieldValue, RecordValues};

/// Normalized values of the catalog's key fields, in key order.
pub type KeySignature = Vec<String>;

/// Key signature of any value map (candidate or stored), normalized the same way on both sides.
pub fn key_signature(values: &RecordValues, def: &CatalogDefinition) -> KeySignature {
    def.key_fields
        .iter()
        .map(|field| values.get(*field).map(normalize_value).unwrap_or_default())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecord {
    pub values: RecordValues,
}

impl CandidateRecord {
    pub fn text(&self, field: &str) -> &str {
        self.values
            .get(field)
            .and_then(FieldValue::as_str)
            .unwrap_or("")
    }

    pub fn key_signature(&self, def: &CatalogDefinition) -> KeySignature {
        key_signature(&self.values, def)
    }
}

#[derive(Debug)]
pub enum RowRejection {
    /// The lookup field normalized to empty.
    MissingKey { field: &'static str },
    Mapping(RowMappingError),
}

/// Value a field takes when its column is absent from the row.
pub fn default_value(kind: FieldKind) -> FieldValue {
    match kind {
        FieldKind::Text => FieldValue::Text(String::new()),
        FieldKind::Hazard => FieldValue::Text("0".to_string()),
        FieldKind::Integer => FieldValue::Int(0),
    }
}

fn extract(spec: &FieldSpec, cell: &Cell) -> Result<FieldValue, RowMappingError> {
    if let Cell::Error(value) = cell {
        return Err(RowMappingError::ErrorCell {
            field: spec.name,
            column: spec.column,
            value: value.clone(),
        });
    }
    Ok(match spec.kind {
        FieldKind::Text => FieldValue::Text(normalize(cell)),
        FieldKind::Hazard => FieldValue::Text(normalize_hazard(cell)),
        FieldKind::Integer => FieldValue::Int(parse_integer(cell)),
    })
}

pub fn map_row(row: &RawRow, def: &CatalogDefinition) -> Result<CandidateRecord, RowRejection> {
    let mut values = RecordValues::new();
    for spec in def.fields {
        let value = match row.get(spec.column) {
            Some(cell) => extract(spec, cell).map_err(RowRejection::Mapping)?,
            None => default_value(spec.kind),
        };
        values.insert(spec.name.to_string(), value);
    }

    let record = CandidateRecord { values };
    let lookup = def.lookup_field();
    if record.text(lookup).is_empty() {
        return Err(RowRejection::MissingKey { field: lookup });
    }
    Ok(record)
}

#[derive(Debug, Clone, Default)]
pub struct MappedBatch {
    pub records: Vec<CandidateRecord>,
    pub rejected: usize,
}

/// Maps every row, skipping rejects. `first_row_number` is the sheet row of `rows[0]`, for logs.
pub fn map_rows(rows: &[RawRow], def: &CatalogDefinition, first_row_number: usize) -> MappedBatch {
    let mut batch = MappedBatch::default();
    for (offset, row) in rows.iter().enumerate() {
        let row_number = first_row_number + offset;
        match map_row(row, def) {
            Ok(record) => batch.records.push(record),
            Err(RowRejection::MissingKey { field }) => {
                debug!(row = row_number, field, "skipping row without key value");
                batch.rejected += 1;
            }
            Err(RowRejection::Mapping(err)) => {
                warn!(row = row_number, catalog = def.catalog_id, "skipping row: {err}");
                batch.rejected += 1;
            }
        }
    }
    batch
}
