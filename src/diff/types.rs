//! Diff result types

use crate::workflow::TargetSet;
use serde::Serialize;

/// The three segments of an eligible object key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Dataset prefix (`mesh-info`)
    pub top: &'a str,
    /// Partition segment (`dt=2023-01-01`)
    pub partition: &'a str,
    /// File name, empty for directory markers
    pub file: &'a str,
}

impl KeyParts<'_> {
    /// Value part of the partition segment
    pub fn partition_value(&self) -> &str {
        self.partition
            .split_once('=')
            .map_or(self.partition, |(_, value)| value)
    }

    /// Path relative to the dataset prefix (`dt=2023-01-01/part.csv`)
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.partition, self.file)
    }
}

/// Split a key into exactly three segments with a non-empty partition
pub fn split_key(key: &str) -> Option<KeyParts<'_>> {
    let mut segments = key.split('/');
    let top = segments.next()?;
    let partition = segments.next()?;
    let file = segments.next()?;
    if segments.next().is_some() || partition.is_empty() {
        return None;
    }
    Some(KeyParts {
        top,
        partition,
        file,
    })
}

/// Dataset prefix and partition segment an output key shows to exist
///
/// Besides file keys this accepts `top/key=value`, which is how a directory
/// marker (`top/key=value/`) comes back from a listing.
pub fn existing_partition(key: &str) -> Option<(&str, &str)> {
    if let Some(parts) = split_key(key) {
        return Some((parts.top, parts.partition));
    }
    let (top, partition) = key.split_once('/')?;
    (partition.contains('=') && !partition.contains('/')).then_some((top, partition))
}

/// New input files per dataset prefix
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// `(dataset prefix, relative paths)` in dataset order
    pub datasets: Vec<(String, Vec<String>)>,
    /// Partition values touched by the new files, in discovery order
    pub partitions: TargetSet,
}

impl DiffResult {
    /// Create an empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new file under a dataset prefix
    pub fn push(&mut self, prefix: &str, relative_path: String) {
        match self.datasets.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, paths)) => paths.push(relative_path),
            None => self.datasets.push((prefix.to_string(), vec![relative_path])),
        }
    }

    /// New files of one dataset (empty if none)
    pub fn files(&self, prefix: &str) -> &[String] {
        self.datasets
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, paths)| paths.as_slice())
            .unwrap_or_default()
    }

    /// Total number of new files
    pub fn file_count(&self) -> usize {
        self.datasets.iter().map(|(_, paths)| paths.len()).sum()
    }

    /// Whether nothing new was found
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}
