//! Parquet encoder
//!
//! Encodes Arrow RecordBatches into in-memory Parquet files ready to upload.

use crate::error::{Error, Result};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use std::sync::Arc;

/// Default rows per row group
const DEFAULT_ROW_GROUP_ROWS: usize = 1024 * 1024;

/// Parquet encoding settings for converted files
///
/// Snappy compression with dictionary encoding and column statistics,
/// matching what Glue crawlers and Athena expect from Hive tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParquetWriterConfig {
    /// Page compression codec
    pub compression: Compression,
    /// Maximum rows per row group
    pub max_row_group_rows: usize,
    /// Dictionary-encode columns
    pub dictionary: bool,
}

impl Default for ParquetWriterConfig {
    fn default() -> Self {
        Self {
            compression: Compression::SNAPPY,
            max_row_group_rows: DEFAULT_ROW_GROUP_ROWS,
            dictionary: true,
        }
    }
}

impl ParquetWriterConfig {
    /// Snappy-compressed defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different compression codec
    #[must_use]
    pub fn with_compression(self, compression: Compression) -> Self {
        Self {
            compression,
            ..self
        }
    }

    /// Cap the number of rows per row group
    #[must_use]
    pub fn with_max_row_group_rows(self, rows: usize) -> Self {
        Self {
            max_row_group_rows: rows.max(1),
            ..self
        }
    }

    /// Turn dictionary encoding on or off
    #[must_use]
    pub fn with_dictionary(self, dictionary: bool) -> Self {
        Self { dictionary, ..self }
    }

    fn writer_properties(&self) -> WriterProperties {
        WriterProperties::builder()
            .set_created_by(format!("{} {}", crate::NAME, crate::VERSION))
            .set_compression(self.compression)
            .set_max_row_group_size(self.max_row_group_rows)
            .set_dictionary_enabled(self.dictionary)
            .set_statistics_enabled(EnabledStatistics::Page)
            .build()
    }
}

/// In-memory Parquet file writer
pub struct ParquetWriter {
    writer: ArrowWriter<Vec<u8>>,
    rows_written: usize,
}

impl ParquetWriter {
    /// Start a file with the given schema
    pub fn new(schema: &Schema, config: &ParquetWriterConfig) -> Result<Self> {
        let writer = ArrowWriter::try_new(
            Vec::new(),
            Arc::new(schema.clone()),
            Some(config.writer_properties()),
        )
        .map_err(|e| Error::output(format!("Cannot start Parquet file: {e}")))?;

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Append rows
    pub fn write(&mut self, batch: &RecordBatch) -> Result<()> {
        self.writer
            .write(batch)
            .map_err(|e| Error::output(format!("Cannot encode rows as Parquet: {e}")))?;
        self.rows_written += batch.num_rows();
        Ok(())
    }

    /// Rows appended so far
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Write the footer and hand back the file contents
    pub fn finish(self) -> Result<Bytes> {
        self.writer
            .into_inner()
            .map(Bytes::from)
            .map_err(|e| Error::output(format!("Cannot finish Parquet file: {e}")))
    }
}

/// Encode one batch as a complete Parquet file
pub fn encode_batch(batch: &RecordBatch, config: Option<&ParquetWriterConfig>) -> Result<Bytes> {
    let config = config.copied().unwrap_or_default();
    let mut writer = ParquetWriter::new(&batch.schema(), &config)?;
    writer.write(batch)?;
    writer.finish()
}
