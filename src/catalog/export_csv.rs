//! CSV dump of a stored catalog: header = field names in column order, rows in listing order.

use std::io::Write;

use super::lookup::list_records;
use super::schema::CatalogDefinition;
use crate::store::CatalogStore;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] crate::error::StoreError),
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes every stored record of `def` to `out`. Returns the number of data rows.
pub fn export_catalog_csv<S: CatalogStore + ?Sized, W: Write>(
    store: &S,
    def: &CatalogDefinition,
    out: W,
) -> Result<usize, ExportError> {
    let records = list_records(store, def)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(def.field_names())?;
    for record in &records {
        writer.write_record(def.field_names().map(|field| record.text(field)))?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::find_catalog;
    use crate::store::{FieldValue, MemoryStore, RecordValues};

    #[test]
    fn writes_header_and_ordered_rows() {
        let def = find_catalog("config_auto").unwrap();
        let mut store = MemoryStore::for_catalogs();
        for (code, axles) in [("T3S2", 2), ("C2", 0)] {
            let mut values = RecordValues::new();
            values.insert("code".into(), FieldValue::from(code));
            values.insert("name".into(), FieldValue::from("x"));
            values.insert("numero_ejes_remolque".into(), FieldValue::Int(axles));
            store.create(def.storage_target, values).unwrap();
        }

        let mut buf = Vec::new();
        let rows = export_catalog_csv(&store, def, &mut buf).unwrap();
        assert_eq!(rows, 2);
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(
            text,
            "code,name,numero_ejes_remolque\nC2,x,0\nT3S2,x,2\n"
        );
    }
}
