//! Job configuration
//!
//! Defines the dataset list the job knows about and the validated runtime
//! configuration assembled from CLI / environment parameters.

use crate::error::{Error, Result};
use crate::workflow::WorkflowRun;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Default partition key name used by every built-in dataset
pub const DEFAULT_PARTITION_KEY: &str = "dt";

// ============================================================================
// Dataset Descriptors
// ============================================================================

/// A CSV dataset synchronized by the job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    /// Top-level key prefix in both buckets (e.g. `mesh-info`)
    pub prefix: String,
    /// Human-readable name
    pub name: String,
    /// Catalog table name
    pub table: String,
    /// Partition key name used in the second path segment
    #[serde(default = "default_partition_key")]
    pub partition_key: String,
}

fn default_partition_key() -> String {
    DEFAULT_PARTITION_KEY.to_string()
}

impl DatasetDescriptor {
    /// Create a descriptor partitioned by `dt`
    pub fn new(
        prefix: impl Into<String>,
        name: impl Into<String>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            table: table.into(),
            partition_key: default_partition_key(),
        }
    }

    /// Use a different partition key name
    #[must_use]
    pub fn with_partition_key(mut self, key: impl Into<String>) -> Self {
        self.partition_key = key.into();
        self
    }

    /// Prefix covering every partition of this dataset: `{prefix}/{key}=`
    pub fn scan_prefix(&self) -> String {
        format!("{}/{}=", self.prefix, self.partition_key)
    }

    /// Prefix covering a single partition value: `{prefix}/{key}={value}/`
    pub fn partition_prefix(&self, value: &str) -> String {
        format!("{}/{}={value}/", self.prefix, self.partition_key)
    }

    fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() || self.prefix.contains('/') {
            return Err(Error::invalid_value(
                "datasets.prefix",
                format!("'{}' must be a single non-empty path segment", self.prefix),
            ));
        }
        if self.table.is_empty() {
            return Err(Error::invalid_value(
                "datasets.table",
                format!("dataset '{}' has no table name", self.prefix),
            ));
        }
        if self.partition_key.is_empty()
            || self.partition_key.contains('=')
            || self.partition_key.contains('/')
        {
            return Err(Error::invalid_value(
                "datasets.partition_key",
                format!(
                    "dataset '{}' has invalid partition key '{}'",
                    self.prefix, self.partition_key
                ),
            ));
        }
        Ok(())
    }
}

/// The datasets produced by the simulator, in processing order
pub fn builtin_datasets() -> Vec<DatasetDescriptor> {
    vec![
        DatasetDescriptor::new("mesh-info", "MeshInfo", "mesh_info"),
        DatasetDescriptor::new(
            "collision-optimizer",
            "CollisionOptimizer",
            "collision_optimizer",
        ),
        DatasetDescriptor::new(
            "character-move-log",
            "CharacterMoveLog",
            "character_move_log",
        ),
        DatasetDescriptor::new(
            "character-start-log",
            "CharacterStartLog",
            "character_start_log",
        ),
        DatasetDescriptor::new(
            "character-end-log",
            "CharacterEndLog",
            "character_end_log",
        ),
        DatasetDescriptor::new(
            "character-info-log",
            "CharacterInfoLog",
            "character_info_log",
        ),
        DatasetDescriptor::new("goal-density-info", "GoalDensityInfo", "goal_density_info"),
    ]
}

/// Validate a dataset list: non-empty, well-formed, unique prefixes
pub fn validate_datasets(datasets: &[DatasetDescriptor]) -> Result<()> {
    if datasets.is_empty() {
        return Err(Error::invalid_value("datasets", "no datasets configured"));
    }

    let mut seen = HashSet::new();
    for dataset in datasets {
        dataset.validate()?;
        if !seen.insert(dataset.prefix.as_str()) {
            return Err(Error::invalid_value(
                "datasets.prefix",
                format!("duplicate prefix '{}'", dataset.prefix),
            ));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DatasetsFile {
    datasets: Vec<DatasetDescriptor>,
}

/// Parse and validate a dataset list from YAML
pub fn load_datasets_from_str(yaml: &str) -> Result<Vec<DatasetDescriptor>> {
    let file: DatasetsFile = serde_yaml::from_str(yaml)?;
    validate_datasets(&file.datasets)?;
    Ok(file.datasets)
}

/// Load and validate a dataset list from a YAML file
pub fn load_datasets(path: impl AsRef<Path>) -> Result<Vec<DatasetDescriptor>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        Error::config(format!("Failed to read datasets file {}: {e}", path.display()))
    })?;
    load_datasets_from_str(&contents)
}

// ============================================================================
// Job Configuration
// ============================================================================

/// Validated configuration for a sync run
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Job name (informational)
    pub job_name: Option<String>,
    /// Job run id (informational)
    pub job_run_id: Option<String>,
    /// Input bucket holding CSV files
    pub input_bucket: String,
    /// Output bucket receiving Parquet files
    pub output_bucket: String,
    /// Catalog database name
    pub database: Option<String>,
    /// Workflow run context, present only when both name and run id are given
    pub workflow: Option<WorkflowRun>,
    /// Datasets to synchronize, in order
    pub datasets: Vec<DatasetDescriptor>,
}

impl JobConfig {
    /// Build a config, failing when either bucket name is missing
    pub fn new(input_bucket: Option<String>, output_bucket: Option<String>) -> Result<Self> {
        let input_bucket = non_empty(input_bucket)
            .ok_or_else(|| Error::missing_field("INPUT_BUCKET"))?;
        let output_bucket = non_empty(output_bucket)
            .ok_or_else(|| Error::missing_field("OUTPUT_BUCKET"))?;

        Ok(Self {
            job_name: None,
            job_run_id: None,
            input_bucket,
            output_bucket,
            database: None,
            workflow: None,
            datasets: builtin_datasets(),
        })
    }

    /// Set the job name and run id
    #[must_use]
    pub fn with_job(mut self, name: Option<String>, run_id: Option<String>) -> Self {
        self.job_name = non_empty(name);
        self.job_run_id = non_empty(run_id);
        self
    }

    /// Set the catalog database
    #[must_use]
    pub fn with_database(mut self, database: Option<String>) -> Self {
        self.database = non_empty(database);
        self
    }

    /// Attach workflow context; ignored unless both parts are present
    #[must_use]
    pub fn with_workflow(mut self, name: Option<String>, run_id: Option<String>) -> Self {
        self.workflow = match (non_empty(name), non_empty(run_id)) {
            (Some(name), Some(run_id)) => Some(WorkflowRun::new(name, run_id)),
            _ => None,
        };
        self
    }

    /// Replace the dataset list
    pub fn with_datasets(mut self, datasets: Vec<DatasetDescriptor>) -> Result<Self> {
        validate_datasets(&datasets)?;
        self.datasets = datasets;
        Ok(self)
    }

    /// Catalog database, required for conversion
    pub fn require_database(&self) -> Result<&str> {
        self.database
            .as_deref()
            .ok_or_else(|| Error::missing_field("DATABASE"))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_builtin_datasets_order() {
        let datasets = builtin_datasets();
        assert_eq!(datasets.len(), 7);
        assert_eq!(datasets[0].prefix, "mesh-info");
        assert_eq!(datasets[0].table, "mesh_info");
        assert_eq!(datasets[6].prefix, "goal-density-info");
        assert!(datasets.iter().all(|d| d.partition_key == "dt"));
        validate_datasets(&datasets).unwrap();
    }

    #[test]
    fn test_scan_prefixes() {
        let dataset = DatasetDescriptor::new("mesh-info", "MeshInfo", "mesh_info");
        assert_eq!(dataset.scan_prefix(), "mesh-info/dt=");
        assert_eq!(
            dataset.partition_prefix("2023-01-01"),
            "mesh-info/dt=2023-01-01/"
        );
    }

    #[test]
    fn test_load_datasets_from_yaml() {
        let yaml = r"
datasets:
  - prefix: events
    name: Events
    table: events
  - prefix: metrics
    name: Metrics
    table: metrics
    partition_key: day
";
        let datasets = load_datasets_from_str(yaml).unwrap();
        assert_eq!(datasets.len(), 2);
        assert_eq!(datasets[0].partition_key, "dt");
        assert_eq!(datasets[1].partition_key, "day");
    }

    #[test]
    fn test_duplicate_prefix_rejected() {
        let datasets = vec![
            DatasetDescriptor::new("a", "A", "a"),
            DatasetDescriptor::new("a", "A2", "a2"),
        ];
        let err = validate_datasets(&datasets).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("duplicate prefix"));
    }

    #[test]
    fn test_nested_prefix_rejected() {
        let datasets = vec![DatasetDescriptor::new("a/b", "AB", "ab")];
        assert!(validate_datasets(&datasets).is_err());
    }

    #[test]
    fn test_missing_buckets() {
        let err = JobConfig::new(None, Some("out".into())).unwrap_err();
        assert_eq!(err.to_string(), "Missing required config field: INPUT_BUCKET");

        let err = JobConfig::new(Some("in".into()), Some("  ".into())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config field: OUTPUT_BUCKET"
        );
    }

    #[test]
    fn test_workflow_requires_both_parts() {
        let config = JobConfig::new(Some("in".into()), Some("out".into()))
            .unwrap()
            .with_workflow(Some("wf".into()), None);
        assert!(config.workflow.is_none());

        let config = config.with_workflow(Some("wf".into()), Some("wr_1".into()));
        let run = config.workflow.unwrap();
        assert_eq!(run.name, "wf");
        assert_eq!(run.run_id, "wr_1");
    }

    #[test]
    fn test_require_database() {
        let config = JobConfig::new(Some("in".into()), Some("out".into())).unwrap();
        assert!(config.require_database().is_err());
        let config = config.with_database(Some("pfs_dev".into()));
        assert_eq!(config.require_database().unwrap(), "pfs_dev");
    }
}
