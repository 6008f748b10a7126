//! AWS Glue workflow run properties

use super::types::{WorkflowRun, WorkflowStore};
use crate::error::{Error, Result};
use crate::types::RunProperties;
use async_trait::async_trait;
use aws_sdk_glue::error::DisplayErrorContext;
use aws_sdk_glue::Client;

/// Workflow store backed by Glue `Get/PutWorkflowRunProperties`
#[derive(Debug, Clone)]
pub struct GlueWorkflowStore {
    client: Client,
}

impl GlueWorkflowStore {
    /// Create a store from a Glue client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkflowStore for GlueWorkflowStore {
    async fn get_run_properties(&self, run: &WorkflowRun) -> Result<RunProperties> {
        let output = self
            .client
            .get_workflow_run_properties()
            .name(&run.name)
            .run_id(&run.run_id)
            .send()
            .await
            .map_err(|e| {
                Error::workflow(format!(
                    "Failed to get run properties of {run}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(output.run_properties().cloned().unwrap_or_default())
    }

    async fn put_run_properties(
        &self,
        run: &WorkflowRun,
        properties: &RunProperties,
    ) -> Result<()> {
        self.client
            .put_workflow_run_properties()
            .name(&run.name)
            .run_id(&run.run_id)
            .set_run_properties(Some(properties.clone()))
            .send()
            .await
            .map_err(|e| {
                Error::workflow(format!(
                    "Failed to put run properties of {run}: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }
}
