//! Catalog import pipeline:
//! read sheet → map rows → dedupe batch → backfill parents → reconcile → write.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::backfill::backfill_parents;
use super::dedupe::dedupe;
use super::mapper::map_rows;
use super::reader::{read_rows, RawRow};
use super::reconcile::{reconcile, Reconciliation};
use super::schema::{find_catalog, CatalogDefinition};
use super::writer::write_records;
use crate::error::ImportError;
use crate::store::CatalogStore;

pub const DEFAULT_SHEET_INDEX: usize = 0;
pub const DEFAULT_START_ROW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Zero-based worksheet index.
    #[serde(default)]
    pub sheet_index: usize,
    /// One-based first data row; earlier rows are headers.
    #[serde(default = "default_start_row")]
    pub start_row: usize,
}

fn default_start_row() -> usize {
    DEFAULT_START_ROW
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            sheet_index: DEFAULT_SHEET_INDEX,
            start_row: DEFAULT_START_ROW,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    /// Distinct records after mapping and in-batch dedupe.
    pub processed: usize,
    pub created: usize,
    /// Already stored under the same key; left untouched.
    pub existing: usize,
    /// Rejected by the store's unique constraint during the per-record retry.
    pub conflicts: usize,
    /// Rows skipped by the mapper (no key value or unreadable cell).
    pub rejected_rows: usize,
    /// Parent stubs created for referenced keys with no stored parent.
    pub parents_created: usize,
}

/// Imports one spreadsheet into the catalog named `catalog_id`.
pub fn import_catalog<S: CatalogStore + ?Sized>(
    store: &mut S,
    catalog_id: &str,
    file_bytes: &[u8],
    options: ImportOptions,
) -> Result<ImportResult, ImportError> {
    let def = find_catalog(catalog_id)
        .ok_or_else(|| ImportError::UnknownCatalog(catalog_id.to_string()))?;
    let sheet = read_rows(file_bytes, options.sheet_index, options.start_row)?;
    import_rows(store, def, &sheet.rows, sheet.first_row_number())
}

/// Runs the pipeline on rows that were already read. `first_row_number` only labels log lines.
pub fn import_rows<S: CatalogStore + ?Sized>(
    store: &mut S,
    def: &CatalogDefinition,
    rows: &[RawRow],
    first_row_number: usize,
) -> Result<ImportResult, ImportError> {
    let mapped = map_rows(rows, def, first_row_number);
    if mapped.records.is_empty() {
        return Err(ImportError::NoValidKeys {
            catalog: def.catalog_id,
            field: def.lookup_field(),
        });
    }

    let records = dedupe(mapped.records, def);
    let processed = records.len();

    let parents_created = match backfill_parents(store, def, &records) {
        Ok(created) => created,
        Err(err) => {
            warn!(catalog = def.catalog_id, "parent backfill failed, continuing: {err}");
            0
        }
    };

    let Reconciliation {
        to_create,
        already_present,
    } = reconcile(store, def, records)?;
    let outcome = write_records(store, def, to_create)?;

    let result = ImportResult {
        processed,
        created: outcome.created,
        existing: already_present,
        conflicts: outcome.conflicts,
        rejected_rows: mapped.rejected,
        parents_created,
    };
    info!(
        catalog = def.catalog_id,
        processed = result.processed,
        created = result.created,
        existing = result.existing,
        conflicts = result.conflicts,
        rejected_rows = result.rejected_rows,
        "catalog import finished"
    );
    Ok(result)
}

/// Deletes every stored record of the catalog. Returns how many were removed.
pub fn clear_catalog<S: CatalogStore + ?Sized>(
    store: &mut S,
    catalog_id: &str,
) -> Result<usize, ImportError> {
    let def = find_catalog(catalog_id)
        .ok_or_else(|| ImportError::UnknownCatalog(catalog_id.to_string()))?;
    let removed = store.delete_all(def.storage_target)?;
    info!(catalog = def.catalog_id, removed, "catalog cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::reader::Cell;
    use crate::store::MemoryStore;

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn unknown_catalog_fails_before_reading() {
        let mut store = MemoryStore::for_catalogs();
        let err = import_catalog(&mut store, "bogus", b"", ImportOptions::default()).unwrap_err();
        assert!(matches!(err, ImportError::UnknownCatalog(id) if id == "bogus"));
    }

    #[test]
    fn rows_without_keys_fail_with_no_valid_keys() {
        let mut store = MemoryStore::for_catalogs();
        let def = find_catalog("uom").unwrap();
        let rows = vec![vec![t(""), t("Pieza")], vec![Cell::Empty]];
        let err = import_rows(&mut store, def, &rows, 2).unwrap_err();
        assert!(matches!(err, ImportError::NoValidKeys { .. }));
        assert_eq!(store.count(def.storage_target).unwrap(), 0);
    }

    #[test]
    fn clear_reports_deleted_count() {
        let mut store = MemoryStore::for_catalogs();
        let def = find_catalog("figura").unwrap();
        let rows = vec![vec![t("01"), t("Operador")], vec![t("02"), t("Propietario")]];
        import_rows(&mut store, def, &rows, 2).unwrap();
        assert_eq!(clear_catalog(&mut store, "figura").unwrap(), 2);
        assert_eq!(store.count(def.storage_target).unwrap(), 0);
        assert!(matches!(
            clear_catalog(&mut store, "nope"),
            Err(ImportError::UnknownCatalog(_))
        ));
    }

    #[test]
    fn default_options_read_first_sheet_after_header() {
        let options = ImportOptions::default();
        assert_eq!(options.sheet_index, 0);
        assert_eq!(options.start_row, 2);
    }
}
