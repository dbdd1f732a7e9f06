//! Splits a deduplicated batch into rows already stored and rows to create.
//!
//! Existing rows are prefetched by the lookup field alone (a superset when the
//! key is composite) and then matched exactly on the full normalized key in memory.
//! A match is never updated; import only inserts.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::mapper::{key_signature, CandidateRecord, KeySignature};
use super::schema::CatalogDefinition;
use crate::error::ImportError;
use crate::store::{CatalogStore, RecordId, StoredRecord};

/// Normalized key signature → id of the stored record, built fresh per run.
#[derive(Debug, Clone, Default)]
pub struct ExistingRecordIndex {
    by_key: HashMap<KeySignature, RecordId>,
}

impl ExistingRecordIndex {
    pub fn build(records: &[StoredRecord], def: &CatalogDefinition) -> Self {
        let by_key = records
            .iter()
            .map(|rec| (key_signature(&rec.values, def), rec.id))
            .collect();
        Self { by_key }
    }

    pub fn get(&self, key: &KeySignature) -> Option<RecordId> {
        self.by_key.get(key).copied()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    pub to_create: Vec<CandidateRecord>,
    pub already_present: usize,
}

pub fn reconcile<S: CatalogStore + ?Sized>(
    store: &S,
    def: &CatalogDefinition,
    records: Vec<CandidateRecord>,
) -> Result<Reconciliation, ImportError> {
    let lookup = def.lookup_field();
    let lookup_values: BTreeSet<String> = records
        .iter()
        .map(|record| record.text(lookup))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    if lookup_values.is_empty() {
        return Err(ImportError::NoValidKeys {
            catalog: def.catalog_id,
            field: lookup,
        });
    }

    let candidates = store.search_in(def.storage_target, lookup, &lookup_values)?;
    let index = ExistingRecordIndex::build(&candidates, def);
    debug!(
        catalog = def.catalog_id,
        lookup_values = lookup_values.len(),
        prefetched = candidates.len(),
        "indexed existing records"
    );

    let mut out = Reconciliation::default();
    for record in records {
        if index.get(&record.key_signature(def)).is_some() {
            out.already_present += 1;
        } else {
            out.to_create.push(record);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::schema::find_catalog;
    use crate::store::{FieldValue, MemoryStore, RecordValues};

    fn values(pairs: &[(&str, &str)]) -> RecordValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), FieldValue::from(*v)))
            .collect()
    }

    #[test]
    fn stored_values_are_normalized_before_matching() {
        let def = find_catalog("municipio").unwrap();
        let mut store = MemoryStore::for_catalogs();
        // Written by something other than the importer, with trailing noise.
        store
            .create(
                def.storage_target,
                values(&[("code", "001"), ("estado", "AGU "), ("name", "Aguascalientes")]),
            )
            .unwrap();

        let batch = vec![
            CandidateRecord {
                values: values(&[("code", "001"), ("estado", "AGU"), ("name", "x")]),
            },
            CandidateRecord {
                values: values(&[("code", "001"), ("estado", "BCN"), ("name", "y")]),
            },
        ];
        let out = reconcile(&store, def, batch).unwrap();
        assert_eq!(out.already_present, 1);
        assert_eq!(out.to_create.len(), 1);
        assert_eq!(out.to_create[0].text("estado"), "BCN");
    }

    #[test]
    fn empty_batch_has_no_valid_keys() {
        let def = find_catalog("uom").unwrap();
        let store = MemoryStore::for_catalogs();
        let err = reconcile(&store, def, Vec::new()).unwrap_err();
        assert!(matches!(err, ImportError::NoValidKeys { field: "code", .. }));
    }

    #[test]
    fn index_maps_signature_to_record_id() {
        let def = find_catalog("uom").unwrap();
        let stored = vec![StoredRecord {
            id: 7,
            values: values(&[("code", "KGM"), ("name", "Kilogramo")]),
        }];
        let index = ExistingRecordIndex::build(&stored, def);
        assert_eq!(index.get(&vec!["KGM".to_string()]), Some(7));
        assert_eq!(index.get(&vec!["H87".to_string()]), None);
    }
}
