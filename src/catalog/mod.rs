//! Table catalog module
//!
//! Looks up table column / partition-key definitions and registers newly
//! written partitions.
//!
//! # Overview
//!
//! - `Catalog` - the narrow interface the job consumes
//! - `GlueCatalog` - AWS Glue Data Catalog
//! - `FileCatalog` - YAML-defined catalog for local runs and tests

mod file;
mod glue;
mod types;

pub use file::FileCatalog;
pub use glue::{load_glue_client, GlueCatalog};
pub use types::{Catalog, ColumnDefinition, PartitionRegistration, TableDefinition};
