//! CSV loader backed by the Arrow CSV reader

use crate::error::{Error, Result};
use arrow::array::{ArrayRef, StringArray};
use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use std::io::Cursor;
use std::sync::Arc;

/// A CSV file loaded as a single string-typed batch
#[derive(Debug, Clone)]
pub struct LoadedCsv {
    batch: RecordBatch,
}

impl LoadedCsv {
    /// The loaded rows
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Number of data rows
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Append a constant string column, replacing any column of the same name
    pub fn with_constant_column(self, name: &str, value: &str) -> Result<Self> {
        let rows = self.batch.num_rows();
        let schema = self.batch.schema();

        let mut fields: Vec<Field> = Vec::with_capacity(schema.fields().len() + 1);
        let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len() + 1);
        for (field, column) in schema.fields().iter().zip(self.batch.columns()) {
            if field.name() != name {
                fields.push(field.as_ref().clone());
                columns.push(Arc::clone(column));
            }
        }

        fields.push(Field::new(name, DataType::Utf8, true));
        columns.push(Arc::new(StringArray::from_iter_values(
            std::iter::repeat(value).take(rows),
        )));

        let batch = RecordBatch::try_new_with_options(
            Arc::new(Schema::new(fields)),
            columns,
            &RecordBatchOptions::new().with_row_count(Some(rows)),
        )?;
        Ok(Self { batch })
    }
}

/// CSV loader with configurable delimiter and header handling
#[derive(Debug, Clone)]
pub struct CsvLoader {
    /// Field delimiter
    delimiter: u8,
    /// Whether the first row is a header
    has_header: bool,
    /// Rows per decoded batch
    batch_size: usize,
}

impl Default for CsvLoader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
            batch_size: 8192,
        }
    }
}

impl CsvLoader {
    /// Create a loader for comma-separated files with a header row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader with custom settings
    pub fn with_options(delimiter: u8, has_header: bool) -> Self {
        Self {
            delimiter,
            has_header,
            ..Self::default()
        }
    }

    fn format(&self) -> Format {
        Format::default()
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
    }

    /// Column names from the header (or `column_{i}`), all typed Utf8
    fn string_schema(&self, data: &[u8]) -> Result<SchemaRef> {
        let (inferred, _) = self
            .format()
            .infer_schema(Cursor::new(data), Some(0))
            .map_err(|e| Error::csv(format!("Failed to read header: {e}")))?;

        let fields: Vec<Field> = inferred
            .fields()
            .iter()
            .map(|f| Field::new(f.name(), DataType::Utf8, true))
            .collect();
        Ok(Arc::new(Schema::new(fields)))
    }

    /// Decode a CSV object
    pub fn load(&self, data: &[u8]) -> Result<LoadedCsv> {
        let schema = self.string_schema(data)?;
        if schema.fields().is_empty() {
            return Ok(LoadedCsv {
                batch: RecordBatch::new_empty(schema),
            });
        }

        let reader = ReaderBuilder::new(Arc::clone(&schema))
            .with_header(self.has_header)
            .with_delimiter(self.delimiter)
            .with_batch_size(self.batch_size)
            .build(Cursor::new(data))
            .map_err(|e| Error::csv(e.to_string()))?;

        let batches = reader
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::csv(e.to_string()))?;

        let batch = concat_batches(&schema, &batches)?;
        Ok(LoadedCsv { batch })
    }
}
