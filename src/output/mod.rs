//! Output module
//!
//! Handles Parquet encoding and partitioned writes to the output bucket.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Encoding Arrow RecordBatches as Parquet files
//! - Splitting batches into Hive-style partitions
//! - Registering written partitions in the catalog
//! - Empty partition markers

mod sink;
mod writer;

pub use sink::{split_by_partition, ParquetSink, PartitionSlice, SinkOutcome, EMPTY_MARKER_NAME};
pub use writer::{encode_batch, ParquetWriter, ParquetWriterConfig};
