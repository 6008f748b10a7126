//! Column mappings from CSV columns to catalog columns

use super::types::parse_catalog_type;
use crate::catalog::TableDefinition;
use crate::error::{Error, Result};
use arrow::array::{new_null_array, ArrayRef};
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde::Serialize;
use std::sync::Arc;

/// Type of every column read from CSV
pub const SOURCE_TYPE: &str = "string";

/// Rename/cast of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    /// Column name in the loaded CSV
    pub source_name: String,
    /// Column type in the loaded CSV (always `string`)
    pub source_type: String,
    /// Column name in the catalog table
    pub target_name: String,
    /// Catalog type name
    pub target_type: String,
}

impl ColumnMapping {
    /// Map a string column onto a catalog column of the same name
    pub fn new(name: impl Into<String>, target_type: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source_name: name.clone(),
            source_type: SOURCE_TYPE.to_string(),
            target_name: name,
            target_type: target_type.into(),
        }
    }

    /// Arrow type of the target column
    pub fn target_data_type(&self) -> Result<DataType> {
        parse_catalog_type(&self.target_type)
    }
}

/// Build mappings for a table: columns first, then partition keys
pub fn build_mappings(table: &TableDefinition) -> Vec<ColumnMapping> {
    table
        .columns
        .iter()
        .chain(table.partition_keys.iter())
        .map(|column| ColumnMapping::new(&column.name, &column.data_type))
        .collect()
}

/// Exact match first, then ASCII case-insensitive
fn find_column(schema: &Schema, name: &str) -> Option<usize> {
    schema.index_of(name).ok().or_else(|| {
        schema
            .fields()
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    })
}

/// Apply mappings to a batch
///
/// The result holds exactly the mapped target columns in mapping order.
/// Unmapped source columns are dropped and mapped columns missing from the
/// source are filled with nulls. Values that cannot be cast are an error.
pub fn apply_mappings(batch: &RecordBatch, mappings: &[ColumnMapping]) -> Result<RecordBatch> {
    let rows = batch.num_rows();
    let schema = batch.schema();
    let options = CastOptions {
        safe: false,
        ..Default::default()
    };

    let mut fields = Vec::with_capacity(mappings.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(mappings.len());

    for mapping in mappings {
        let target = mapping.target_data_type()?;
        let column = match find_column(&schema, &mapping.source_name) {
            Some(index) => cast_with_options(batch.column(index), &target, &options)
                .map_err(|e| Error::schema_mapping(&mapping.source_name, e.to_string()))?,
            None => {
                tracing::debug!(
                    column = %mapping.source_name,
                    "Column missing from source, filling with nulls"
                );
                new_null_array(&target, rows)
            }
        };

        fields.push(Field::new(&mapping.target_name, target, true));
        columns.push(column);
    }

    let batch = RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(rows)),
    )?;
    Ok(batch)
}
