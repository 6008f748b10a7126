//! Execution engine module
//!
//! Converts new CSV files into catalog-typed, partitioned Parquet.
//!
//! # Overview
//!
//! The engine module provides:
//! - `ConversionPipeline` - Per-file load, map, write and register steps
//! - `SyncJob` - Workflow targets, diff, conversion and target propagation
//! - `SyncStats` / `JobReport` - What a run did

mod job;
mod types;

pub use job::SyncJob;
pub use types::{JobReport, SyncStats};

use crate::catalog::{Catalog, TableDefinition};
use crate::config::DatasetDescriptor;
use crate::decode::CsvLoader;
use crate::diff::DiffResult;
use crate::error::{Error, Result};
use crate::output::ParquetSink;
use crate::partition::PartitionKey;
use crate::schema::{apply_mappings, build_mappings, ColumnMapping};
use crate::storage::Bucket;
use std::sync::Arc;
use std::time::Instant;

/// Table definition and mappings of the dataset being converted
struct LoadedTable {
    table: TableDefinition,
    mappings: Vec<ColumnMapping>,
}

/// CSV to Parquet conversion pipeline
pub struct ConversionPipeline {
    /// Bucket holding the CSV files
    input: Bucket,
    /// CSV decoder
    loader: CsvLoader,
    /// Partitioned Parquet writer
    sink: ParquetSink,
    /// Table metadata
    catalog: Arc<dyn Catalog>,
    /// Catalog database
    database: String,
    /// Statistics
    stats: SyncStats,
}

impl ConversionPipeline {
    /// Create a pipeline between two buckets
    pub fn new(
        input: Bucket,
        output: Bucket,
        catalog: Arc<dyn Catalog>,
        database: impl Into<String>,
    ) -> Self {
        let database = database.into();
        Self {
            input,
            loader: CsvLoader::new(),
            sink: ParquetSink::new(output, Arc::clone(&catalog), database.clone()),
            catalog,
            database,
            stats: SyncStats::default(),
        }
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Convert every file of the diff, dataset by dataset
    pub async fn run(
        &mut self,
        datasets: &[DatasetDescriptor],
        diff: &DiffResult,
    ) -> Result<SyncStats> {
        let start = Instant::now();

        for dataset in datasets {
            self.convert_dataset(dataset, diff.files(&dataset.prefix))
                .await?;
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);
        Ok(self.stats.clone())
    }

    /// Convert the new files of one dataset
    ///
    /// The catalog table is only looked up when there is something to convert.
    pub async fn convert_dataset(
        &mut self,
        dataset: &DatasetDescriptor,
        files: &[String],
    ) -> Result<()> {
        if files.is_empty() {
            tracing::debug!(dataset = %dataset.name, "No new files");
            return Ok(());
        }

        let table = self.catalog.get_table(&self.database, &dataset.table).await?;
        let loaded = LoadedTable {
            mappings: build_mappings(&table),
            table,
        };

        tracing::info!(
            dataset = %dataset.name,
            table = %dataset.table,
            files = files.len(),
            "Converting dataset"
        );

        for relative_path in files {
            self.convert_file(dataset, &loaded, relative_path).await?;
        }

        self.stats.add_dataset();
        Ok(())
    }

    async fn convert_file(
        &mut self,
        dataset: &DatasetDescriptor,
        loaded: &LoadedTable,
        relative_path: &str,
    ) -> Result<()> {
        let key = format!("{}/{relative_path}", dataset.prefix);
        let source_url = self.input.url(&key);

        let partition = PartitionKey::resolve(relative_path)?;
        let data = self.input.get(&key).await?;
        let csv = self
            .loader
            .load(&data)
            .map_err(|e| match e {
                Error::CsvParse { message } => Error::csv(format!("{source_url}: {message}")),
                other => other,
            })?
            .with_constant_column(&partition.name, &partition.value)?;

        let batch = apply_mappings(csv.batch(), &loaded.mappings)?;
        self.stats.add_file();

        if batch.num_rows() == 0 {
            let marker = self.sink.write_marker(&dataset.prefix, &partition).await?;
            self.stats.add_marker();
            tracing::info!(source = %source_url, marker = %marker, "Empty file, wrote marker");
            return Ok(());
        }

        let outcome = self
            .sink
            .write(
                &loaded.table,
                &dataset.prefix,
                Some(&partition),
                file_name(relative_path),
                &batch,
            )
            .await?;

        self.stats.add_output(outcome.rows, outcome.files.len());
        self.stats.add_partitions(outcome.partitions.len());
        tracing::info!(
            source = %source_url,
            rows = outcome.rows,
            files = ?outcome.files,
            "Converted file"
        );
        Ok(())
    }
}

/// Last segment of a relative path (`dt=x/part.csv` -> `part.csv`)
fn file_name(relative_path: &str) -> &str {
    relative_path
        .rsplit_once('/')
        .map_or(relative_path, |(_, file)| file)
}

#[cfg(test)]
mod tests;
