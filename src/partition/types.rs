//! Partition key types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory value used for null partition values
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

/// A single `name=value` partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    /// Partition column name (e.g. `dt`)
    pub name: String,
    /// Partition value (e.g. `2023-01-01`)
    pub value: String,
}

impl PartitionKey {
    /// Create a new partition key
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a single `name=value` path segment
    ///
    /// Only the first `=` separates name from value.
    pub fn parse(segment: &str) -> Result<Self> {
        let (name, value) = segment
            .split_once('=')
            .ok_or_else(|| Error::malformed_partition(segment, "expected 'key=value'"))?;

        if name.is_empty() {
            return Err(Error::malformed_partition(segment, "empty partition key"));
        }

        Ok(Self::new(name, value))
    }

    /// Resolve the partition of a dataset-relative path
    ///
    /// `dt=2023-01-01/part.csv` resolves to `dt` / `2023-01-01`.
    pub fn resolve(relative_path: &str) -> Result<Self> {
        let (segment, file) = relative_path.split_once('/').ok_or_else(|| {
            Error::malformed_partition(relative_path, "expected '<key>=<value>/<file>'")
        })?;

        if file.is_empty() {
            return Err(Error::malformed_partition(relative_path, "missing file name"));
        }

        Self::parse(segment).map_err(|_| {
            Error::malformed_partition(relative_path, "first segment is not 'key=value'")
        })
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Join partition keys into a Hive directory path (`a=1/b=2`)
pub fn hive_path(keys: &[PartitionKey]) -> String {
    keys.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/")
}
