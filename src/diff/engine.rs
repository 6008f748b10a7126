//! Input/output bucket comparison

use super::types::{existing_partition, split_key, DiffResult};
use crate::config::DatasetDescriptor;
use crate::error::Result;
use crate::storage::Bucket;
use crate::workflow::TargetSet;
use std::collections::HashSet;

/// Compares an input bucket against an output bucket
pub struct BucketDiff<'a> {
    input: &'a Bucket,
    output: &'a Bucket,
}

impl<'a> BucketDiff<'a> {
    /// Create a diff between two buckets
    pub fn new(input: &'a Bucket, output: &'a Bucket) -> Self {
        Self { input, output }
    }

    /// Diff one raw key prefix, appending new files to `result`
    pub async fn diff_prefix(
        &self,
        dataset: &DatasetDescriptor,
        prefix: &str,
        result: &mut DiffResult,
    ) -> Result<()> {
        // a marker for `top/k=v/` lists as `top/k=v`, outside the prefix itself
        let existing: HashSet<(String, String)> = self
            .output
            .list_keys(prefix.trim_end_matches('/'))
            .await?
            .iter()
            .filter_map(|key| existing_partition(key))
            .map(|(top, partition)| (top.to_string(), partition.to_string()))
            .collect();

        for key in self.input.list_keys(prefix).await? {
            let Some(parts) = split_key(&key) else {
                tracing::debug!(key = %key, "Skipping key outside prefix/partition/file layout");
                continue;
            };
            if parts.file.is_empty() {
                continue;
            }
            if existing.contains(&(parts.top.to_string(), parts.partition.to_string())) {
                continue;
            }

            result.push(&dataset.prefix, parts.relative_path());
            result.partitions.insert(parts.partition_value());
        }

        Ok(())
    }

    /// Diff every dataset, optionally restricted to target partition values
    pub async fn diff_datasets(
        &self,
        datasets: &[DatasetDescriptor],
        targets: Option<&TargetSet>,
    ) -> Result<DiffResult> {
        let mut result = DiffResult::new();

        for dataset in datasets {
            match targets {
                Some(targets) => {
                    for target in targets.iter() {
                        self.diff_prefix(dataset, &dataset.partition_prefix(target), &mut result)
                            .await?;
                    }
                }
                None => {
                    self.diff_prefix(dataset, &dataset.scan_prefix(), &mut result)
                        .await?;
                }
            }

            let files = result.files(&dataset.prefix);
            if !files.is_empty() {
                tracing::info!(dataset = %dataset.name, files = ?files, "New files");
            }
        }

        Ok(result)
    }
}
