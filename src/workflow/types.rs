//! Workflow types and traits

use crate::error::Result;
use crate::types::RunProperties;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Run property carrying the comma-separated partition values
pub const TARGET_PROPERTY: &str = "Target";

/// Identifies one run of a named workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowRun {
    /// Workflow name
    pub name: String,
    /// Run identifier
    pub run_id: String,
}

impl WorkflowRun {
    /// Create a new workflow run reference
    pub fn new(name: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            run_id: run_id.into(),
        }
    }
}

impl fmt::Display for WorkflowRun {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.run_id)
    }
}

/// Ordered set of partition values without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetSet {
    values: Vec<String>,
}

impl TargetSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated list; blanks are dropped, duplicates removed
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect()
    }

    /// Insert a value, returning false if it was already present
    pub fn insert(&mut self, value: impl Into<String>) -> bool {
        let value = value.into();
        if self.values.contains(&value) {
            return false;
        }
        self.values.push(value);
        true
    }

    /// Whether the value is present
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<String> for TargetSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = Self::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.values.join(","))
    }
}

/// Property store of a workflow orchestrator
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Fetch all run properties
    async fn get_run_properties(&self, run: &WorkflowRun) -> Result<RunProperties>;

    /// Replace the run properties
    async fn put_run_properties(&self, run: &WorkflowRun, properties: &RunProperties)
        -> Result<()>;
}

/// Targets supplied by an upstream job, if any
pub fn supplied_targets(properties: &RunProperties) -> Option<TargetSet> {
    properties
        .get(TARGET_PROPERTY)
        .map(|list| TargetSet::parse(list))
        .filter(|targets| !targets.is_empty())
}

/// Run properties to write back after a run
///
/// A supplied `Target` is kept as-is; otherwise the touched partitions
/// become the new `Target`.
pub fn propagate_targets(
    mut properties: RunProperties,
    supplied: bool,
    touched: &TargetSet,
) -> RunProperties {
    if !supplied {
        properties.insert(TARGET_PROPERTY.to_string(), touched.to_string());
    }
    properties
}
