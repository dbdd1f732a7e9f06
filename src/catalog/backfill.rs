//! Parent stubs for child catalogs: a neighborhood row implies its postal code exists.
//! Stubs carry only the key; descriptive fields stay empty until the parent catalog is imported.

use std::collections::BTreeSet;

use tracing::info;

use super::mapper::{default_value, CandidateRecord};
use super::normalize::normalize_value;
use super::schema::{find_catalog, CatalogDefinition};
use crate::error::BackfillError;
use crate::store::{CatalogStore, FieldValue, RecordValues};

/// Minimal parent record: every field at its default except the lookup field.
pub fn parent_stub(parent: &CatalogDefinition, key: &str) -> RecordValues {
    parent
        .fields
        .iter()
        .map(|spec| {
            let value = if spec.name == parent.lookup_field() {
                FieldValue::from(key)
            } else {
                default_value(spec.kind)
            };
            (spec.name.to_string(), value)
        })
        .collect()
}

/// Creates stubs for referenced parent keys that have no stored parent. Returns how many were created.
pub fn backfill_parents<S: CatalogStore + ?Sized>(
    store: &mut S,
    def: &CatalogDefinition,
    records: &[CandidateRecord],
) -> Result<usize, BackfillError> {
    let Some(parent_ref) = def.parent else {
        return Ok(0);
    };
    let parent = find_catalog(parent_ref.catalog_id)
        .ok_or(BackfillError::UnknownParent(parent_ref.catalog_id))?;
    let storage_err = |source| BackfillError::Storage {
        target: parent.storage_target,
        source,
    };

    let referenced: BTreeSet<String> = records
        .iter()
        .map(|record| record.text(parent_ref.field))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect();
    if referenced.is_empty() {
        return Ok(0);
    }

    let lookup = parent.lookup_field();
    let existing: BTreeSet<String> = store
        .search_in(parent.storage_target, lookup, &referenced)
        .map_err(storage_err)?
        .iter()
        .filter_map(|rec| rec.get(lookup).map(normalize_value))
        .collect();

    let stubs: Vec<RecordValues> = referenced
        .difference(&existing)
        .map(|key| parent_stub(parent, key))
        .collect();
    if stubs.is_empty() {
        return Ok(0);
    }

    let created = store
        .create_many(parent.storage_target, stubs)
        .map_err(storage_err)?
        .len();
    info!(
        catalog = def.catalog_id,
        parent = parent.catalog_id,
        created,
        "created missing parent records"
    );
    Ok(created)
}
