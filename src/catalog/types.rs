//! Catalog types and traits

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A column as declared in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    /// Column name
    pub name: String,
    /// Catalog (Hive) type name, e.g. `int`, `decimal(10,2)`
    #[serde(rename = "type")]
    pub data_type: String,
}

impl ColumnDefinition {
    /// Create a new column definition
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }
}

/// A table as declared in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Table name
    pub name: String,
    /// Regular (data) columns
    #[serde(default)]
    pub columns: Vec<ColumnDefinition>,
    /// Partition key columns, in partition order
    #[serde(default)]
    pub partition_keys: Vec<ColumnDefinition>,
    /// Table location, if declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl TableDefinition {
    /// Create an empty table definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            partition_keys: Vec::new(),
            location: None,
        }
    }

    /// Add a regular column
    #[must_use]
    pub fn with_column(mut self, name: impl Into<String>, data_type: impl Into<String>) -> Self {
        self.columns.push(ColumnDefinition::new(name, data_type));
        self
    }

    /// Add a partition key
    #[must_use]
    pub fn with_partition_key(
        mut self,
        name: impl Into<String>,
        data_type: impl Into<String>,
    ) -> Self {
        self.partition_keys
            .push(ColumnDefinition::new(name, data_type));
        self
    }

    /// Partition key names in order
    pub fn partition_key_names(&self) -> Vec<&str> {
        self.partition_keys.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A partition to add to a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionRegistration {
    /// Partition values, one per partition key
    pub values: Vec<String>,
    /// Storage location of the partition directory
    pub location: String,
}

/// Table metadata service
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch a table definition; a missing table is `Error::TableNotFound`
    async fn get_table(&self, database: &str, table: &str) -> Result<TableDefinition>;

    /// Register a partition; registering an existing partition is not an error
    async fn register_partition(
        &self,
        database: &str,
        table: &TableDefinition,
        partition: &PartitionRegistration,
    ) -> Result<()>;
}
