use std::io;

use thiserror::Error;

/// Failures raised by a [`crate::store::CatalogStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint on the storage target rejected the write.
    #[error("unique constraint on {target}({fields}) violated by ({values})")]
    Integrity {
        target: String,
        fields: String,
        values: String,
    },
    #[error("unknown storage target '{0}'")]
    UnknownTarget(String),
    #[error("failed to persist table '{target}': {source}")]
    Persist {
        target: String,
        #[source]
        source: io::Error,
    },
    #[error("table file for '{target}' is not valid JSON: {source}")]
    Corrupt {
        target: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Integrity { .. })
    }
}

/// Fatal import failures. Any of these aborts the run before a result is produced.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error(
        "could not read the file as a spreadsheet (.xlsx: {modern}; .xls: {legacy})"
    )]
    UnreadableFile { modern: String, legacy: String },
    #[error("no data rows found in sheet {sheet_index} from row {start_row}")]
    EmptySheet { sheet_index: usize, start_row: usize },
    #[error("unknown catalog '{0}'")]
    UnknownCatalog(String),
    #[error("no valid values for key field '{field}' in catalog '{catalog}'")]
    NoValidKeys {
        catalog: &'static str,
        field: &'static str,
    },
    #[error("invalid import options: {0}")]
    InvalidOptions(String),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
}

/// A single spreadsheet row that could not be turned into a record.
#[derive(Debug, Error)]
pub enum RowMappingError {
    #[error("column {column} ('{field}') holds a spreadsheet error value: {value}")]
    ErrorCell {
        field: &'static str,
        column: usize,
        value: String,
    },
}

/// Failure while creating parent stubs; logged and swallowed by the importer.
#[derive(Debug, Error)]
pub enum BackfillError {
    #[error("parent catalog '{0}' is not registered")]
    UnknownParent(&'static str),
    #[error("failed to look up or create '{target}' parents: {source}")]
    Storage {
        target: &'static str,
        #[source]
        source: StoreError,
    },
}

/// Provenance registry could not be read or written.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("failed to access registry {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("registry {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("config file {path} is not valid YAML: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}
