//! Bucket diff module
//!
//! Finds partition files present in the input bucket whose partition
//! directory does not exist in the output bucket yet.
//!
//! # Overview
//!
//! Keys are expected to look like `<prefix>/<key>=<value>/<file>`. Anything
//! else is ignored. The diff never writes and never reports objects that only
//! exist in the output bucket.

mod engine;
mod types;

pub use engine::BucketDiff;
pub use types::{existing_partition, split_key, DiffResult, KeyParts};
