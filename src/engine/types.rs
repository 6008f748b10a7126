//! Engine types
//!
//! Run statistics and the report returned by a sync job.

use crate::diff::DiffResult;
use crate::workflow::{TargetSet, WorkflowRun};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Statistics from a sync operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStats {
    /// CSV files converted
    pub files_converted: usize,
    /// Rows written to Parquet
    pub rows_written: usize,
    /// Parquet files written
    pub parquet_files: usize,
    /// Empty partition markers written
    pub empty_markers: usize,
    /// Partitions registered in the catalog
    pub partitions_registered: usize,
    /// Datasets with at least one new file
    pub datasets_synced: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a converted file
    pub fn add_file(&mut self) {
        self.files_converted += 1;
    }

    /// Add rows and the Parquet files holding them
    pub fn add_output(&mut self, rows: usize, files: usize) {
        self.rows_written += rows;
        self.parquet_files += files;
    }

    /// Add an empty marker
    pub fn add_marker(&mut self) {
        self.empty_markers += 1;
    }

    /// Add registered partitions
    pub fn add_partitions(&mut self, count: usize) {
        self.partitions_registered += count;
    }

    /// Add a dataset
    pub fn add_dataset(&mut self) {
        self.datasets_synced += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}

/// Summary of one job run
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Job name, if given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    /// Job run id, if given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_run_id: Option<String>,
    /// Workflow run the job belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowRun>,
    /// Targets supplied by an upstream job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplied_targets: Option<TargetSet>,
    /// Target value written back to the workflow run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_target: Option<String>,
    /// Files found by the diff
    pub diff: DiffResult,
    /// Conversion statistics
    pub stats: SyncStats,
    /// Run start
    pub started_at: DateTime<Utc>,
    /// Run end
    pub finished_at: DateTime<Utc>,
}
