//! AWS Glue Data Catalog

use super::types::{Catalog, ColumnDefinition, PartitionRegistration, TableDefinition};
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_glue::config::Region;
use aws_sdk_glue::error::DisplayErrorContext;
use aws_sdk_glue::operation::create_partition::CreatePartitionError;
use aws_sdk_glue::operation::get_table::GetTableError;
use aws_sdk_glue::types::{Column, PartitionInput, StorageDescriptor};
use aws_sdk_glue::Client;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Build a Glue client from the default AWS credential chain
pub async fn load_glue_client(region: Option<&str>) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    let config = loader.load().await;
    Client::new(&config)
}

fn to_column(column: &Column) -> ColumnDefinition {
    ColumnDefinition::new(column.name(), column.r#type().unwrap_or("string"))
}

/// Catalog backed by the Glue Data Catalog
#[derive(Debug)]
pub struct GlueCatalog {
    client: Client,
    /// Storage descriptors of fetched tables, reused for new partitions
    descriptors: Mutex<HashMap<(String, String), StorageDescriptor>>,
}

impl GlueCatalog {
    /// Create a catalog from a Glue client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            descriptors: Mutex::new(HashMap::new()),
        }
    }

    /// Partition storage descriptor inheriting the table's formats and serde
    async fn partition_descriptor(
        &self,
        database: &str,
        table: &str,
        location: &str,
    ) -> StorageDescriptor {
        let descriptors = self.descriptors.lock().await;
        let mut builder = StorageDescriptor::builder().location(location);

        if let Some(table_sd) = descriptors.get(&(database.to_string(), table.to_string())) {
            builder = builder
                .set_columns(Some(table_sd.columns().to_vec()))
                .set_input_format(table_sd.input_format().map(String::from))
                .set_output_format(table_sd.output_format().map(String::from))
                .set_serde_info(table_sd.serde_info().cloned())
                .compressed(table_sd.compressed());
        }

        builder.build()
    }
}

#[async_trait]
impl Catalog for GlueCatalog {
    async fn get_table(&self, database: &str, table: &str) -> Result<TableDefinition> {
        let output = self
            .client
            .get_table()
            .database_name(database)
            .name(table)
            .send()
            .await
            .map_err(|e| {
                if matches!(
                    e.as_service_error(),
                    Some(GetTableError::EntityNotFoundException(_))
                ) {
                    Error::table_not_found(database, table)
                } else {
                    Error::catalog(format!(
                        "Failed to get table {database}.{table}: {}",
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let glue_table = output
            .table()
            .ok_or_else(|| Error::table_not_found(database, table))?;

        let descriptor = glue_table.storage_descriptor();
        let definition = TableDefinition {
            name: glue_table.name().to_string(),
            columns: descriptor
                .map(|sd| sd.columns().iter().map(to_column).collect())
                .unwrap_or_default(),
            partition_keys: glue_table.partition_keys().iter().map(to_column).collect(),
            location: descriptor.and_then(|sd| sd.location()).map(String::from),
        };

        if let Some(sd) = descriptor {
            self.descriptors
                .lock()
                .await
                .insert((database.to_string(), table.to_string()), sd.clone());
        }

        Ok(definition)
    }

    async fn register_partition(
        &self,
        database: &str,
        table: &TableDefinition,
        partition: &PartitionRegistration,
    ) -> Result<()> {
        let descriptor = self
            .partition_descriptor(database, &table.name, &partition.location)
            .await;
        let input = PartitionInput::builder()
            .set_values(Some(partition.values.clone()))
            .storage_descriptor(descriptor)
            .build();

        let result = self
            .client
            .create_partition()
            .database_name(database)
            .table_name(&table.name)
            .partition_input(input)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e)
                if matches!(
                    e.as_service_error(),
                    Some(CreatePartitionError::AlreadyExistsException(_))
                ) =>
            {
                tracing::debug!(
                    table = %table.name,
                    values = ?partition.values,
                    "Partition already registered"
                );
                Ok(())
            }
            Err(e) => Err(Error::catalog(format!(
                "Failed to register partition {:?} of {database}.{}: {}",
                partition.values,
                table.name,
                DisplayErrorContext(&e)
            ))),
        }
    }
}
