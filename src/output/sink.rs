//! Hive-partitioned Parquet sink with catalog registration

use super::writer::encode_batch;
use crate::catalog::{Catalog, PartitionRegistration, TableDefinition};
use crate::error::{Error, Result};
use crate::partition::{hive_path, PartitionKey, HIVE_DEFAULT_PARTITION};
use crate::storage::Bucket;
use arrow::array::{Array, AsArray, StringArray, UInt32Array};
use arrow::compute::{cast, take_record_batch};
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;

/// Object written inside otherwise empty partition directories
pub const EMPTY_MARKER_NAME: &str = "_empty";

/// Rows of one partition, without the partition columns
#[derive(Debug)]
pub struct PartitionSlice {
    /// Partition keys in table order
    pub keys: Vec<PartitionKey>,
    /// Data columns only
    pub batch: RecordBatch,
}

/// Split a batch by the values of its partition columns
///
/// Groups keep first-seen order. Null values land in the Hive default
/// partition. With no partition columns the whole batch is one group.
pub fn split_by_partition(
    batch: &RecordBatch,
    partition_columns: &[&str],
) -> Result<Vec<PartitionSlice>> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let schema = batch.schema();
    let mut key_indices = Vec::with_capacity(partition_columns.len());
    for name in partition_columns {
        let index = schema.index_of(name).map_err(|_| {
            Error::output(format!("Partition column '{name}' missing from batch"))
        })?;
        key_indices.push(index);
    }

    let data_indices: Vec<usize> = (0..schema.fields().len())
        .filter(|i| !key_indices.contains(i))
        .collect();
    let data = batch.project(&data_indices)?;

    if key_indices.is_empty() {
        return Ok(vec![PartitionSlice {
            keys: Vec::new(),
            batch: data,
        }]);
    }

    let key_values: Vec<StringArray> = key_indices
        .iter()
        .map(|&i| Ok(cast(batch.column(i), &DataType::Utf8)?.as_string::<i32>().clone()))
        .collect::<Result<_>>()?;

    let mut groups: Vec<(Vec<String>, Vec<u32>)> = Vec::new();
    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();
    for row in 0..batch.num_rows() {
        let values: Vec<String> = key_values
            .iter()
            .map(|array| {
                if array.is_null(row) {
                    HIVE_DEFAULT_PARTITION.to_string()
                } else {
                    array.value(row).to_string()
                }
            })
            .collect();

        let group = *lookup.entry(values.clone()).or_insert_with(|| {
            groups.push((values, Vec::new()));
            groups.len() - 1
        });
        groups[group].1.push(row as u32);
    }

    groups
        .into_iter()
        .map(|(values, rows)| {
            let keys = partition_columns
                .iter()
                .zip(values)
                .map(|(name, value)| PartitionKey::new(*name, value))
                .collect();
            let batch = take_record_batch(&data, &UInt32Array::from(rows))?;
            Ok(PartitionSlice { keys, batch })
        })
        .collect()
}

/// Result of writing one dataset file
#[derive(Debug, Clone, Default)]
pub struct SinkOutcome {
    /// URLs of Parquet files written
    pub files: Vec<String>,
    /// Rows written across all files
    pub rows: usize,
    /// Partitions registered in the catalog
    pub partitions: Vec<PartitionRegistration>,
}

/// Writes partitioned Parquet to the output bucket and registers partitions
pub struct ParquetSink {
    bucket: Bucket,
    catalog: Arc<dyn Catalog>,
    database: String,
}

impl ParquetSink {
    /// Create a sink for a catalog database
    pub fn new(bucket: Bucket, catalog: Arc<dyn Catalog>, database: impl Into<String>) -> Self {
        Self {
            bucket,
            catalog,
            database: database.into(),
        }
    }

    /// Output bucket
    pub fn bucket(&self) -> &Bucket {
        &self.bucket
    }

    /// Write `batch` under `{prefix}/` partitioned by the table's keys
    ///
    /// Each partition gets `{prefix}/{k=v..}/{source_file}.parquet`. A batch
    /// with no rows writes nothing.
    ///
    /// The `source` partition keeps its input directory segment and value,
    /// whatever the catalog type would print.
    pub async fn write(
        &self,
        table: &TableDefinition,
        prefix: &str,
        source: Option<&PartitionKey>,
        source_file: &str,
        batch: &RecordBatch,
    ) -> Result<SinkOutcome> {
        let mut outcome = SinkOutcome::default();

        for slice in split_by_partition(batch, &table.partition_key_names())? {
            let keys: Vec<PartitionKey> = slice
                .keys
                .into_iter()
                .map(|key| match source {
                    Some(source) if source.name.eq_ignore_ascii_case(&key.name) => source.clone(),
                    _ => key,
                })
                .collect();

            let dir = if keys.is_empty() {
                prefix.to_string()
            } else {
                format!("{prefix}/{}", hive_path(&keys))
            };

            let data = encode_batch(&slice.batch, None)?;
            let url = self
                .bucket
                .put(&format!("{dir}/{source_file}.parquet"), data)
                .await?;
            tracing::debug!(url = %url, rows = slice.batch.num_rows(), "Wrote Parquet file");

            outcome.rows += slice.batch.num_rows();
            outcome.files.push(url);

            if !keys.is_empty() {
                let registration = PartitionRegistration {
                    values: keys.into_iter().map(|k| k.value).collect(),
                    location: self.bucket.url(&format!("{dir}/")),
                };
                self.catalog
                    .register_partition(&self.database, table, &registration)
                    .await?;
                outcome.partitions.push(registration);
            }
        }

        Ok(outcome)
    }

    /// Create the empty marker object of a partition directory
    pub async fn write_marker(&self, prefix: &str, partition: &PartitionKey) -> Result<String> {
        self.bucket
            .put(
                &format!("{prefix}/{partition}/{EMPTY_MARKER_NAME}"),
                Bytes::new(),
            )
            .await
    }
}
