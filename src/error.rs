//! Error types for csv2parquet
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for csv2parquet
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Storage Errors
    // ============================================================================
    #[error("Storage error: {message}")]
    Storage { message: String },

    // ============================================================================
    // Catalog Errors
    // ============================================================================
    #[error("Catalog error: {message}")]
    Catalog { message: String },

    #[error("Table '{database}.{table}' not found in catalog")]
    TableNotFound { database: String, table: String },

    // ============================================================================
    // Workflow Errors
    // ============================================================================
    #[error("Workflow error: {message}")]
    Workflow { message: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Malformed partition path '{path}': {message}")]
    MalformedPartition { path: String, message: String },

    #[error("Unsupported catalog type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("Failed to map column '{column}': {message}")]
    SchemaMapping { column: String, message: String },

    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    // ============================================================================
    // Arrow/Parquet Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Output error: {message}")]
    Output { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::Catalog {
            message: message.into(),
        }
    }

    /// Create a table-not-found error
    pub fn table_not_found(database: impl Into<String>, table: impl Into<String>) -> Self {
        Self::TableNotFound {
            database: database.into(),
            table: table.into(),
        }
    }

    /// Create a workflow error
    pub fn workflow(message: impl Into<String>) -> Self {
        Self::Workflow {
            message: message.into(),
        }
    }

    /// Create a malformed partition error
    pub fn malformed_partition(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedPartition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a schema mapping error
    pub fn schema_mapping(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SchemaMapping {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(message: impl Into<String>) -> Self {
        Self::CsvParse {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Whether this error was raised by configuration validation
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::Config { .. }
                | Error::MissingConfigField { .. }
                | Error::InvalidConfigValue { .. }
                | Error::YamlParse(_)
        )
    }
}

/// Result type alias for csv2parquet
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_field("INPUT_BUCKET");
        assert_eq!(
            err.to_string(),
            "Missing required config field: INPUT_BUCKET"
        );

        let err = Error::table_not_found("pfs_dev", "mesh_info");
        assert_eq!(
            err.to_string(),
            "Table 'pfs_dev.mesh_info' not found in catalog"
        );

        let err = Error::malformed_partition("part.csv", "missing '='");
        assert_eq!(
            err.to_string(),
            "Malformed partition path 'part.csv': missing '='"
        );
    }

    #[test]
    fn test_is_config() {
        assert!(Error::config("x").is_config());
        assert!(Error::missing_field("OUTPUT_BUCKET").is_config());
        assert!(Error::invalid_value("datasets", "empty").is_config());
        assert!(!Error::catalog("x").is_config());
        assert!(!Error::table_not_found("db", "t").is_config());
    }
}
