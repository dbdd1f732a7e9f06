//! Two-tier write: one bulk create, and on a uniqueness violation a per-record
//! retry where each record succeeds or is rejected on its own.

use tracing::{debug, warn};

use super::mapper::CandidateRecord;
use super::schema::CatalogDefinition;
use crate::error::StoreError;
use crate::store::CatalogStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOutcome {
    pub created: usize,
    /// Records the store rejected as duplicates during the per-record retry.
    pub conflicts: usize,
    pub used_fallback: bool,
}

/// Writes `to_create`. Only uniqueness violations are recovered; any other
/// store failure propagates, in the fallback loop aborting the remaining records.
pub fn write_records<S: CatalogStore + ?Sized>(
    store: &mut S,
    def: &CatalogDefinition,
    to_create: Vec<CandidateRecord>,
) -> Result<WriteOutcome, StoreError> {
    if to_create.is_empty() {
        return Ok(WriteOutcome::default());
    }

    let batch: Vec<_> = to_create.iter().map(|r| r.values.clone()).collect();
    match store.create_many(def.storage_target, batch) {
        Ok(ids) => {
            return Ok(WriteOutcome {
                created: ids.len(),
                ..WriteOutcome::default()
            })
        }
        Err(err) if err.is_integrity_violation() => {
            warn!(
                catalog = def.catalog_id,
                records = to_create.len(),
                "bulk create rejected ({err}); retrying one record at a time"
            );
        }
        Err(err) => return Err(err),
    }

    let mut outcome = WriteOutcome {
        used_fallback: true,
        ..WriteOutcome::default()
    };
    let batch = to_create.into_iter().map(|r| r.values).collect();
    for result in store.create_each(def.storage_target, batch)? {
        match result {
            Ok(_) => outcome.created += 1,
            Err(err) => {
                debug!(catalog = def.catalog_id, "skipping duplicate: {err}");
                outcome.conflicts += 1;
            }
        }
    }
    Ok(outcome)
}
