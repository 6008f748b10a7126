//! File-backed workflow property store
//!
//! Persists run properties as JSON with atomic writes. Used for local runs
//! and tests where no orchestrator is available.

use super::types::{WorkflowRun, WorkflowStore};
use crate::error::{Error, Result};
use crate::types::RunProperties;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

/// workflow name -> run id -> properties
type RunTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// JSON file store of workflow run properties
#[derive(Debug)]
pub struct FileWorkflowStore {
    /// Path to the JSON file (empty for in-memory)
    path: PathBuf,
    /// Cached contents
    runs: Arc<RwLock<RunTable>>,
}

impl FileWorkflowStore {
    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            runs: Arc::new(RwLock::new(RunTable::new())),
        }
    }

    /// Open a store, loading existing runs if the file is present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let runs = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| {
                Error::workflow(format!("Failed to read workflow file: {e}"))
            })?;
            serde_json::from_str(&contents).map_err(|e| {
                Error::workflow(format!("Failed to parse workflow file: {e}"))
            })?
        } else {
            RunTable::new()
        };

        Ok(Self {
            path,
            runs: Arc::new(RwLock::new(runs)),
        })
    }

    /// Seed the properties of a run without persisting
    pub async fn seed(&self, run: &WorkflowRun, properties: RunProperties) {
        let mut runs = self.runs.write().await;
        runs.entry(run.name.clone())
            .or_default()
            .insert(run.run_id.clone(), properties.into_iter().collect());
    }

    /// Save current contents to file
    async fn save(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Ok(()); // In-memory mode
        }

        let runs = self.runs.read().await;
        let contents = serde_json::to_string_pretty(&*runs)
            .map_err(|e| Error::workflow(format!("Failed to serialize workflow runs: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::workflow(format!("Failed to write workflow file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::workflow(format!("Failed to rename workflow file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl WorkflowStore for FileWorkflowStore {
    async fn get_run_properties(&self, run: &WorkflowRun) -> Result<RunProperties> {
        let runs = self.runs.read().await;
        Ok(runs
            .get(&run.name)
            .and_then(|r| r.get(&run.run_id))
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn put_run_properties(
        &self,
        run: &WorkflowRun,
        properties: &RunProperties,
    ) -> Result<()> {
        {
            let mut runs = self.runs.write().await;
            runs.entry(run.name.clone()).or_default().insert(
                run.run_id.clone(),
                properties
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
            );
        }
        self.save().await
    }
}
