//! YAML file catalog

use super::types::{Catalog, PartitionRegistration, TableDefinition};
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    databases: BTreeMap<String, DatabaseEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct DatabaseEntry {
    #[serde(default)]
    tables: Vec<TableEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TableEntry {
    #[serde(flatten)]
    table: TableDefinition,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    partitions: Vec<PartitionRegistration>,
}

impl CatalogFile {
    fn table(&self, database: &str, table: &str) -> Option<&TableEntry> {
        self.databases
            .get(database)?
            .tables
            .iter()
            .find(|t| t.table.name == table)
    }

    fn table_mut(&mut self, database: &str, table: &str) -> Option<&mut TableEntry> {
        self.databases
            .get_mut(database)?
            .tables
            .iter_mut()
            .find(|t| t.table.name == table)
    }
}

/// Catalog defined in a YAML document
///
/// ```yaml
/// databases:
///   pfs_dev:
///     tables:
///       - name: mesh_info
///         columns: [{ name: id, type: int }]
///         partition_keys: [{ name: dt, type: string }]
/// ```
#[derive(Debug)]
pub struct FileCatalog {
    /// Backing file; `None` keeps registrations in memory only
    path: Option<PathBuf>,
    contents: RwLock<CatalogFile>,
}

impl FileCatalog {
    /// Parse a catalog from a YAML string (in-memory)
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let contents: CatalogFile = serde_yaml::from_str(yaml)?;
        Ok(Self {
            path: None,
            contents: RwLock::new(contents),
        })
    }

    /// Load a catalog file; registrations are written back to it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read catalog file {}: {e}", path.display()))
        })?;
        let mut catalog = Self::from_yaml_str(&yaml)?;
        catalog.path = Some(path.to_path_buf());
        Ok(catalog)
    }

    /// Partitions registered for a table
    pub async fn partitions(&self, database: &str, table: &str) -> Vec<PartitionRegistration> {
        self.contents
            .read()
            .await
            .table(database, table)
            .map(|t| t.partitions.clone())
            .unwrap_or_default()
    }

    async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let contents = serde_yaml::to_string(&*self.contents.read().await)?;
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::catalog(format!("Failed to write catalog file: {e}")))?;
        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::catalog(format!("Failed to rename catalog file: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for FileCatalog {
    async fn get_table(&self, database: &str, table: &str) -> Result<TableDefinition> {
        self.contents
            .read()
            .await
            .table(database, table)
            .map(|t| t.table.clone())
            .ok_or_else(|| Error::table_not_found(database, table))
    }

    async fn register_partition(
        &self,
        database: &str,
        table: &TableDefinition,
        partition: &PartitionRegistration,
    ) -> Result<()> {
        {
            let mut contents = self.contents.write().await;
            let entry = contents
                .table_mut(database, &table.name)
                .ok_or_else(|| Error::table_not_found(database, &table.name))?;

            if entry.partitions.iter().any(|p| p.values == partition.values) {
                return Ok(());
            }
            entry.partitions.push(partition.clone());
        }
        self.save().await
    }
}
