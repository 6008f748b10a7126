//! Job orchestration
//!
//! One run: read workflow targets, diff the buckets, convert the new files,
//! then publish the touched partitions to the workflow run.

use super::types::JobReport;
use super::ConversionPipeline;
use crate::catalog::Catalog;
use crate::config::JobConfig;
use crate::diff::{BucketDiff, DiffResult};
use crate::error::{Error, Result};
use crate::storage::Bucket;
use crate::types::RunProperties;
use crate::workflow::{
    propagate_targets, supplied_targets, TargetSet, WorkflowRun, WorkflowStore, TARGET_PROPERTY,
};
use chrono::Utc;
use std::sync::Arc;

/// A configured sync job
pub struct SyncJob {
    config: JobConfig,
    input: Bucket,
    output: Bucket,
    catalog: Arc<dyn Catalog>,
    workflow_store: Option<Arc<dyn WorkflowStore>>,
}

impl SyncJob {
    /// Create a job over already opened buckets
    pub fn new(config: JobConfig, input: Bucket, output: Bucket, catalog: Arc<dyn Catalog>) -> Self {
        Self {
            config,
            input,
            output,
            catalog,
            workflow_store: None,
        }
    }

    /// Set the store holding workflow run properties
    #[must_use]
    pub fn with_workflow_store(mut self, store: Arc<dyn WorkflowStore>) -> Self {
        self.workflow_store = Some(store);
        self
    }

    /// Job configuration
    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    fn workflow(&self) -> Result<Option<(&WorkflowRun, &dyn WorkflowStore)>> {
        match (&self.config.workflow, &self.workflow_store) {
            (Some(run), Some(store)) => Ok(Some((run, store.as_ref()))),
            (Some(run), None) => Err(Error::config(format!(
                "Workflow run {run} given but no workflow store configured"
            ))),
            (None, _) => Ok(None),
        }
    }

    /// Current run properties and the targets they supply
    async fn read_targets(&self) -> Result<(RunProperties, Option<TargetSet>)> {
        let Some((run, store)) = self.workflow()? else {
            return Ok((RunProperties::new(), None));
        };

        let properties = store.get_run_properties(run).await?;
        let targets = supplied_targets(&properties);
        match &targets {
            Some(targets) => tracing::info!(workflow = %run, targets = %targets, "Using supplied targets"),
            None => tracing::info!(workflow = %run, "No targets supplied, scanning all partitions"),
        }
        Ok((properties, targets))
    }

    /// Compute the new files without converting anything
    pub async fn diff(&self) -> Result<DiffResult> {
        let (_, targets) = self.read_targets().await?;
        BucketDiff::new(&self.input, &self.output)
            .diff_datasets(&self.config.datasets, targets.as_ref())
            .await
    }

    /// Run the job
    pub async fn run(&self) -> Result<JobReport> {
        let started_at = Utc::now();
        let database = self.config.require_database()?;

        tracing::info!(
            job = ?self.config.job_name,
            run_id = ?self.config.job_run_id,
            input = %self.input.url(""),
            output = %self.output.url(""),
            database = %database,
            "Starting sync"
        );

        let (properties, targets) = self.read_targets().await?;
        let diff = BucketDiff::new(&self.input, &self.output)
            .diff_datasets(&self.config.datasets, targets.as_ref())
            .await?;

        let mut pipeline = ConversionPipeline::new(
            self.input.clone(),
            self.output.clone(),
            Arc::clone(&self.catalog),
            database,
        );
        let stats = pipeline.run(&self.config.datasets, &diff).await?;

        let mut published_target = None;
        if let Some((run, store)) = self.workflow()? {
            let properties = propagate_targets(properties, targets.is_some(), &diff.partitions);
            store.put_run_properties(run, &properties).await?;
            published_target = properties.get(TARGET_PROPERTY).cloned();
            tracing::info!(workflow = %run, target = ?published_target, "Updated workflow run properties");
        }

        tracing::info!(
            files = stats.files_converted,
            rows = stats.rows_written,
            markers = stats.empty_markers,
            duration_ms = stats.duration_ms,
            "Sync complete"
        );

        Ok(JobReport {
            job_name: self.config.job_name.clone(),
            job_run_id: self.config.job_run_id.clone(),
            workflow: self.config.workflow.clone(),
            supplied_targets: targets,
            published_target,
            diff,
            stats,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
