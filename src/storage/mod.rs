//! Object storage module
//!
//! Thin wrapper over `object_store` giving the job a bucket view keyed by
//! raw object key strings.
//!
//! # Overview
//!
//! - `Bucket` - a named bucket backed by S3, R2, GCS, Azure, local disk or memory
//! - Raw string-prefix listing (`mesh-info/dt=` matches `mesh-info/dt=2023-01-01/a.csv`)

mod bucket;

pub use bucket::{listing_root, Bucket};
