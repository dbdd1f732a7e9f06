//! SAT catalog import and reconciliation.

pub mod backfill;
pub mod dedupe;
pub mod export_csv;
pub mod import;
pub mod lookup;
pub mod mapper;
pub mod normalize;
pub mod reader;
pub mod reconcile;
pub mod schema;
pub mod writer;

pub use import::{
    clear_catalog, import_catalog, import_rows, ImportOptions, ImportResult,
};
pub use mapper::CandidateRecord;
pub use reader::{Cell, RawRow};
pub use schema::{find_catalog, CatalogDefinition, CATALOGS};
