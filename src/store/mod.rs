//! Record store the catalog importer writes into.
//! Tables are keyed by storage target; each target can carry one unique constraint.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use crate::error::StoreError;

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

pub type RecordId = u64;

/// A stored or candidate field value. Catalog fields are text except counts such as trailer axles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Text(String),
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Int(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

pub type RecordValues = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub values: RecordValues,
}

impl StoredRecord {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Field rendered as text; missing fields read as empty.
    pub fn text(&self, field: &str) -> String {
        self.values
            .get(field)
            .map(ToString::to_string)
            .unwrap_or_default()
    }
}

/// Narrow storage interface: search, create (single and bulk), delete-all.
///
/// `create` and `create_many` are atomic: when a unique constraint is violated
/// the call returns [`StoreError::Integrity`] and nothing from it is stored.
/// `create_each` applies that atomicity per record instead of per call.
pub trait CatalogStore {
    /// Records of `target` whose `field` equals one of `values`.
    fn search_in(
        &self,
        target: &str,
        field: &str,
        values: &BTreeSet<String>,
    ) -> Result<Vec<StoredRecord>, StoreError>;

    fn search_all(&self, target: &str) -> Result<Vec<StoredRecord>, StoreError>;

    fn create(&mut self, target: &str, values: RecordValues) -> Result<RecordId, StoreError>;

    fn create_many(
        &mut self,
        target: &str,
        batch: Vec<RecordValues>,
    ) -> Result<Vec<RecordId>, StoreError>;

    /// Creates every record on its own. The inner results hold the per-record
    /// outcome (an id or an integrity violation); any other failure stops the
    /// call and is returned as the outer error, with earlier records kept.
    fn create_each(
        &mut self,
        target: &str,
        batch: Vec<RecordValues>,
    ) -> Result<Vec<Result<RecordId, StoreError>>, StoreError> {
        let mut results = Vec::with_capacity(batch.len());
        for values in batch {
            match self.create(target, values) {
                Err(err) if !err.is_integrity_violation() => return Err(err),
                outcome => results.push(outcome),
            }
        }
        Ok(results)
    }

    fn delete_all(&mut self, target: &str) -> Result<usize, StoreError>;

    fn count(&self, target: &str) -> Result<usize, StoreError> {
        Ok(self.search_all(target)?.len())
    }
}
