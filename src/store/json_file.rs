//! File-backed store: one pretty-printed JSON file per storage target under a data directory.
//! Every successful mutation rewrites that target's file (temp file + rename).

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::memory::{MemoryStore, Table};
use super::{CatalogStore, RecordId, RecordValues, StoreError, StoredRecord};

#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Opens (or initialises) a store rooted at `data_dir` with every catalog table registered.
    /// Existing table files are loaded; missing ones start empty.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        let mut inner = MemoryStore::for_catalogs();
        for def in crate::catalog::schema::CATALOGS {
            let path = table_path(&data_dir, def.storage_target);
            if let Some(table) = load_table(&path, def.storage_target)? {
                debug!(
                    target_table = def.storage_target,
                    records = table.len(),
                    "loaded table"
                );
                inner.replace_table(def.storage_target, table);
            }
        }
        Ok(Self { data_dir, inner })
    }

    fn commit<T>(
        &mut self,
        target: &str,
        mutate: impl FnOnce(&mut Table, &[String]) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let unique_key = self.inner.unique_key(target)?.to_vec();
        let mut table = self.inner.table(target)?.clone();
        let out = mutate(&mut table, &unique_key)?;
        persist_table(&table_path(&self.data_dir, target), target, &table)?;
        self.inner.replace_table(target, table);
        Ok(out)
    }
}

fn table_path(data_dir: &Path, target: &str) -> PathBuf {
    data_dir.join(format!("{target}.json"))
}

fn load_table(path: &Path, target: &str) -> Result<Option<Table>, StoreError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Persist {
                target: target.to_string(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::Corrupt {
            target: target.to_string(),
            source,
        })
}

fn persist_table(path: &Path, target: &str, table: &Table) -> Result<(), StoreError> {
    let persist_err = |source: io::Error| StoreError::Persist {
        target: target.to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(persist_err)?;
    }
    let payload = serde_json::to_string_pretty(table)
        .map_err(|err| persist_err(io::Error::new(io::ErrorKind::InvalidData, err)))?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, payload).map_err(persist_err)?;
    fs::rename(&tmp, path).map_err(persist_err)
}

impl CatalogStore for JsonFileStore {
    fn search_in(
        &self,
        target: &str,
        field: &str,
        values: &BTreeSet<String>,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        self.inner.search_in(target, field, values)
    }

    fn search_all(&self, target: &str) -> Result<Vec<StoredRecord>, StoreError> {
        self.inner.search_all(target)
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
        self.commit(target, |table, unique_key| {
            table.insert_all(target, unique_key, batch)
        })
    }

    /// Applies every record to one copy of the table and rewrites the file once.
    fn create_each(
        &mut self,
        target: &str,
        batch: Vec<RecordValues>,
    ) -> Result<Vec<Result<RecordId, StoreError>>, StoreError> {
        self.commit(target, |table, unique_key| {
            Ok(table.insert_each(target, unique_key, batch))
        })
    }

    fn delete_all(&mut self, target: &str) -> Result<usize, StoreError> {
        self.commit(target, |table, _| Ok(table.clear()))
    }

    fn count(&self, target: &str) -> Result<usize, StoreError> {
        self.inner.count(target)
    }
}
