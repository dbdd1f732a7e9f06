//! Catalog provenance: which file each catalog was last imported from, when, and how many
//! records the store held afterwards. Lives next to the table files as `registry.json`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub const REGISTRY_FILE_NAME: &str = "registry.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSetEntry {
    /// Spreadsheet the catalog was imported from; empty after a clear.
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Table file, relative to the data directory.
    pub path: String,
    pub record_count: usize,
}

/// Keyed by catalog id.
pub type Registry = HashMap<String, DataSetEntry>;

pub fn registry_path(data_dir: &Path) -> PathBuf {
    data_dir.join(REGISTRY_FILE_NAME)
}

/// Reads the registry; a missing file is an empty registry.
pub fn load_registry(path: &Path) -> Result<Registry, RegistryError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Registry::new()),
        Err(source) => {
            return Err(RegistryError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };
    serde_json::from_str(&content).map_err(|source| RegistryError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn save_registry(path: &Path, registry: &Registry) -> Result<(), RegistryError> {
    let io_err = |source: io::Error| RegistryError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let payload = serde_json::to_string_pretty(registry).map_err(|source| RegistryError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    fs::write(path, payload).map_err(io_err)
}

/// Upserts the entry for `catalog_id`, stamping today's UTC date.
pub fn record_import(
    registry: &mut Registry,
    catalog_id: &str,
    storage_target: &str,
    source: &str,
    record_count: usize,
) {
    registry.insert(
        catalog_id.to_string(),
        DataSetEntry {
            source: source.to_string(),
            last_updated: Some(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            path: format!("{storage_target}.json"),
            record_count,
        },
    );
}

/// Load, apply `record_import`, save.
pub fn update_registry_file(
    data_dir: &Path,
    catalog_id: &str,
    storage_target: &str,
    source: &str,
    record_count: usize,
) -> Result<(), RegistryError> {
    let path = registry_path(data_dir);
    let mut registry = load_registry(&path)?;
    record_import(&mut registry, catalog_id, storage_target, source, record_count);
    save_registry(&path, &registry)
}
