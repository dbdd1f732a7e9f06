//! On-disk metadata that sits beside the catalog tables.

pub mod registry;
