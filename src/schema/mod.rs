//! Schema mapping module
//!
//! Maps the all-string CSV schema onto the catalog schema of a table.
//!
//! # Features
//!
//! - **Type Parsing**: Catalog (Hive) type names to Arrow types
//! - **Column Mappings**: One mapping per column, then per partition key
//! - **Bulk Apply**: Rename, cast and reorder a RecordBatch in one step

mod mapping;
mod types;

pub use mapping::{apply_mappings, build_mappings, ColumnMapping, SOURCE_TYPE};
pub use types::parse_catalog_type;
