//! CLI runner - executes commands

use crate::catalog::{load_glue_client, Catalog, FileCatalog, GlueCatalog};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_datasets, DatasetDescriptor, JobConfig};
use crate::diff::DiffResult;
use crate::engine::{JobReport, SyncJob};
use crate::error::Result;
use crate::storage::Bucket;
use crate::workflow::{FileWorkflowStore, GlueWorkflowStore, WorkflowStore};
use aws_sdk_glue::Client;
use serde::Serialize;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match self.cli.command.unwrap_or(Commands::Run) {
            Commands::Run => self.run_job().await,
            Commands::Diff => self.diff().await,
            Commands::Datasets => self.datasets(),
        }
    }

    fn load_datasets(&self) -> Result<Option<Vec<DatasetDescriptor>>> {
        self.cli.datasets.as_ref().map(load_datasets).transpose()
    }

    /// Validated job configuration; fails before any client is created
    fn job_config(&self) -> Result<JobConfig> {
        let mut config = JobConfig::new(
            self.cli.input_bucket.clone(),
            self.cli.output_bucket.clone(),
        )?
        .with_job(self.cli.job_name.clone(), self.cli.job_run_id.clone())
        .with_database(self.cli.database.clone())
        .with_workflow(
            self.cli.workflow_name.clone(),
            self.cli.workflow_run_id.clone(),
        );

        if let Some(datasets) = self.load_datasets()? {
            config = config.with_datasets(datasets)?;
        }
        Ok(config)
    }

    /// Open buckets and backends for a validated config
    async fn build_job(&self, config: JobConfig) -> Result<SyncJob> {
        let input = Bucket::open(&config.input_bucket)?;
        let output = Bucket::open(&config.output_bucket)?;

        let mut glue = None;
        let catalog: Arc<dyn Catalog> = match &self.cli.catalog_file {
            Some(path) => Arc::new(FileCatalog::from_file(path)?),
            None => Arc::new(GlueCatalog::new(self.glue_client(&mut glue).await)),
        };

        let mut job = SyncJob::new(config, input, output, catalog);
        if job.config().workflow.is_some() {
            let store: Arc<dyn WorkflowStore> = match &self.cli.workflow_file {
                Some(path) => Arc::new(FileWorkflowStore::from_file(path)?),
                None => Arc::new(GlueWorkflowStore::new(self.glue_client(&mut glue).await)),
            };
            job = job.with_workflow_store(store);
        }

        tracing::debug!(
            input = %job.config().input_bucket,
            output = %job.config().output_bucket,
            datasets = job.config().datasets.len(),
            "Job configured"
        );
        Ok(job)
    }

    /// Glue client shared by the catalog and workflow store
    async fn glue_client(&self, cached: &mut Option<Client>) -> Client {
        if let Some(client) = cached {
            return client.clone();
        }
        let client = load_glue_client(self.cli.region.as_deref()).await;
        *cached = Some(client.clone());
        client
    }

    async fn run_job(&self) -> Result<()> {
        let config = self.job_config()?;
        config.require_database()?;
        let job = self.build_job(config).await?;

        let report = job.run().await?;
        match self.cli.format {
            OutputFormat::Json => Self::print_json(&report)?,
            OutputFormat::Pretty => Self::print_report(&report),
        }
        Ok(())
    }

    async fn diff(&self) -> Result<()> {
        let config = self.job_config()?;
        let job = self.build_job(config).await?;

        let diff = job.diff().await?;
        match self.cli.format {
            OutputFormat::Json => Self::print_json(&diff)?,
            OutputFormat::Pretty => Self::print_diff(&diff),
        }
        Ok(())
    }

    fn datasets(&self) -> Result<()> {
        let datasets = self
            .load_datasets()?
            .unwrap_or_else(crate::config::builtin_datasets);

        match self.cli.format {
            OutputFormat::Json => Self::print_json(&datasets)?,
            OutputFormat::Pretty => {
                for dataset in &datasets {
                    println!(
                        "{:<24} {:<20} {:<24} {}",
                        dataset.prefix, dataset.name, dataset.table, dataset.partition_key
                    );
                }
            }
        }
        Ok(())
    }

    fn print_json<T: Serialize>(value: &T) -> Result<()> {
        println!("{}", serde_json::to_string(value)?);
        Ok(())
    }

    fn print_diff(diff: &DiffResult) {
        if diff.is_empty() {
            println!("No new files");
            return;
        }
        for (prefix, files) in &diff.datasets {
            println!("{prefix}:");
            for file in files {
                println!("  {file}");
            }
        }
        println!("Partitions: {}", diff.partitions);
    }

    fn print_report(report: &JobReport) {
        Self::print_diff(&report.diff);

        let stats = &report.stats;
        println!(
            "Converted {} file(s): {} row(s) in {} Parquet file(s), {} empty marker(s), {} partition(s) registered in {}ms",
            stats.files_converted,
            stats.rows_written,
            stats.parquet_files,
            stats.empty_markers,
            stats.partitions_registered,
            stats.duration_ms
        );
        if let Some(target) = &report.published_target {
            println!("Target: {target}");
        }
    }
}
