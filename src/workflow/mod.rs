//! Workflow parameter propagation
//!
//! Reads and writes the `Target` run property that links this job to the
//! other jobs of an orchestrated workflow run.
//!
//! # Overview
//!
//! - Before a run, a non-empty `Target` restricts which partitions are diffed
//! - After a run without a supplied `Target`, the touched partitions are
//!   published as `Target` for downstream jobs
//!
//! Stores:
//! - `GlueWorkflowStore` - AWS Glue workflow run properties
//! - `FileWorkflowStore` - JSON file (or in-memory) store for local runs

mod file;
mod glue;
mod types;

pub use file::FileWorkflowStore;
pub use glue::GlueWorkflowStore;
pub use types::{
    propagate_targets, supplied_targets, TargetSet, WorkflowRun, WorkflowStore, TARGET_PROPERTY,
};
