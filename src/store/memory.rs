//! In-process record store. Used directly by tests and benches, and as the
//! table engine underneath [`super::JsonFileStore`].

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::{CatalogStore, RecordId, RecordValues, StoreError, StoredRecord};
use crate::catalog::schema::CATALOGS;

/// One storage target: rows plus the id sequence.
///
/// `key_index` holds the unique-key tuple of every stored row. It is not
/// persisted; it is rebuilt from `records` on the first insert after a load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Table {
    pub next_id: RecordId,
    pub(crate) records: Vec<StoredRecord>,
    #[serde(skip)]
    key_index: Option<HashSet<Vec<String>>>,
}

impl Table {
    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn matching(&self, field: &str, values: &BTreeSet<String>) -> Vec<StoredRecord> {
        self.records
            .iter()
            .filter(|rec| values.contains(&rec.text(field)))
            .cloned()
            .collect()
    }

    fn key_index(&mut self, unique_key: &[String]) -> &mut HashSet<Vec<String>> {
        let records = &self.records;
        self.key_index.get_or_insert_with(|| {
            records
                .iter()
                .map(|rec| key_tuple(&rec.values, unique_key))
                .collect()
        })
    }

    /// Validates the whole batch against the unique key before inserting any of it.
    pub(crate) fn insert_all(
        &mut self,
        target: &str,
        unique_key: &[String],
        batch: Vec<RecordValues>,
    ) -> Result<Vec<RecordId>, StoreError> {
        let mut tuples = Vec::new();
        if !unique_key.is_empty() {
            let index = self.key_index(unique_key);
            let mut in_batch = HashSet::with_capacity(batch.len());
            for values in &batch {
                let tuple = key_tuple(values, unique_key);
                if index.contains(&tuple) || !in_batch.insert(tuple.clone()) {
                    return Err(StoreError::Integrity {
                        target: target.to_string(),
                        fields: unique_key.join(", "),
                        values: tuple.join(", "),
                    });
                }
                tuples.push(tuple);
            }
        }

        if let Some(index) = self.key_index.as_mut() {
            index.extend(tuples);
        }
        let mut ids = Vec::with_capacity(batch.len());
        for values in batch {
            self.next_id += 1;
            ids.push(self.next_id);
            self.records.push(StoredRecord {
                id: self.next_id,
                values,
            });
        }
        Ok(ids)
    }

    /// Inserts each record on its own; a rejected record leaves the others unaffected.
    pub(crate) fn insert_each(
        &mut self,
        target: &str,
        unique_key: &[String],
        batch: Vec<RecordValues>,
    ) -> Vec<Result<RecordId, StoreError>> {
        batch
            .into_iter()
            .map(|values| {
                self.insert_all(target, unique_key, vec![values])
                    .map(|ids| ids[0])
            })
            .collect()
    }

    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.key_index = None;
        removed
    }
}

fn key_tuple(values: &RecordValues, unique_key: &[String]) -> Vec<String> {
    unique_key
        .iter()
        .map(|field| values.get(field).map(ToString::to_string).unwrap_or_default())
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: HashMap<String, Table>,
    constraints: HashMap<String, Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with one table per registered catalog, unique on the catalog's key fields.
    pub fn for_catalogs() -> Self {
        let mut store = Self::new();
        for def in CATALOGS {
            store.register_target(def.storage_target, def.key_fields);
        }
        store
    }

    pub fn register_target(&mut self, target: &str, unique_key: &[&str]) {
        self.constraints.insert(
            target.to_string(),
            unique_key.iter().map(|f| f.to_string()).collect(),
        );
        self.tables.entry(target.to_string()).or_default();
    }

    pub(crate) fn unique_key(&self, target: &str) -> Result<&[String], StoreError> {
        self.constraints
            .get(target)
            .map(Vec::as_slice)
            .ok_or_else(|| StoreError::UnknownTarget(target.to_string()))
    }

    pub(crate) fn table(&self, target: &str) -> Result<&Table, StoreError> {
        self.tables
            .get(target)
            .ok_or_else(|| StoreError::UnknownTarget(target.to_string()))
    }

    pub(crate) fn replace_table(&mut self, target: &str, table: Table) {
        self.tables.insert(target.to_string(), table);
    }
}

impl CatalogStore for MemoryStore {
    fn search_in(
        &self,
        target: &str,
        field: &str,
        values: &BTreeSet<String>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.table(target)?.matching(field, values))
    }

    fn search_all(&self, target: &str) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.table(target)?.records.clone())
    }

    fn create(&mut self, target: &str, values: RecordValues) -> Result<RecordId, StoreError> {
        let ids = self.create_many(target, vec![values])?;
        Ok(ids[0])
    }

    fn create_many(
        &mut self,
        target: &str,
        batch: Vec<RecordValues>,
    ) -> Result<Vec<RecordId>, StoreError> {
        let unique_key = self.unique_key(target)?.to_vec();
        let table = self
            .tables
            .get_mut(target)
            .ok_or_else(|| StoreError::UnknownTarget(target.to_string()))?;
        table.insert_all(target, &unique_key, batch)
    }

    fn create_each(
        &mut self,
        target: &str,
        batch: Vec<RecordValues>,
    ) -> Result<Vec<Result<RecordId, StoreError>>, StoreError> {
        let unique_key = self.unique_key(target)?.to_vec();
        let table = self
            .tables
            .get_mut(target)
            .ok_or_else(|| StoreError::UnknownTarget(target.to_string()))?;
        Ok(table.insert_each(target, &unique_key, batch))
    }

    fn delete_all(&mut self, target: &str) -> Result<usize, StoreError> {
        self.unique_key(target)?;
        Ok(self.tables.entry(target.to_string()).or_default().clear())
    }

    fn count(&self, target: &str) -> Result<usize, StoreError> {
        Ok(self.table(target)?.len())
    }
}
