// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # csv2parquet
//!
//! Incrementally converts Hive-partitioned CSV datasets in one bucket into
//! catalog-typed Parquet in another.
//!
//! ## Features
//!
//! - **Bucket Diff**: Only partitions missing from the output are converted
//! - **Catalog Typing**: Columns are cast to the types declared in the catalog
//! - **Partitioned Parquet**: Hive-style layout with partition registration
//! - **Workflow Targets**: Partition lists shared with other workflow jobs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use csv2parquet::catalog::FileCatalog;
//! use csv2parquet::config::JobConfig;
//! use csv2parquet::engine::SyncJob;
//! use csv2parquet::storage::Bucket;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> csv2parquet::Result<()> {
//!     let config = JobConfig::new(Some("raw".into()), Some("lake".into()))?
//!         .with_database(Some("pfs_dev".into()));
//!     let catalog = Arc::new(FileCatalog::from_file("catalog.yaml")?);
//!
//!     let job = SyncJob::new(
//!         config,
//!         Bucket::open("./raw")?,
//!         Bucket::open("./lake")?,
//!         catalog,
//!     );
//!     let report = job.run().await?;
//!     println!("{} files converted", report.stats.files_converted);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   new files   ┌──────────────┐  typed batch  ┌──────────────┐
//! │  BucketDiff  │──────────────>│  CsvLoader   │──────────────>│ ParquetSink  │
//! │ input/output │               │ + partition  │  (mappings)   │ + Catalog    │
//! └──────────────┘               └──────────────┘               └──────────────┘
//!        ^                                                             │
//!        │ Target                                           touched    │
//! ┌──────┴───────┐                                          partitions │
//! │WorkflowStore │<────────────────────────────────────────────────────┘
//! └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Job configuration and dataset descriptors
pub mod config;

/// Bucket access
pub mod storage;

/// Input/output bucket comparison
pub mod diff;

/// Partition resolution from object keys
pub mod partition;

/// Catalog type mapping
pub mod schema;

/// Table catalog (Glue, file)
pub mod catalog;

/// Workflow run properties
pub mod workflow;

/// CSV decoding
pub mod decode;

/// Parquet output
pub mod output;

/// Conversion pipeline and job orchestration
pub mod engine;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

pub use config::{DatasetDescriptor, JobConfig};
pub use engine::{JobReport, SyncJob};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
