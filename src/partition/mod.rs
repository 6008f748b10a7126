//! Partition resolution module
//!
//! Recovers Hive-style `key=value` partitions from object key paths.
//!
//! # Overview
//!
//! New files are discovered as paths relative to a dataset prefix, e.g.
//! `dt=2023-01-01/part.csv`. The first segment names the partition the
//! file belongs to; its value is injected as a constant column and decides
//! where the converted Parquet file lands.

mod types;

pub use types::{hive_path, PartitionKey, HIVE_DEFAULT_PARTITION};
