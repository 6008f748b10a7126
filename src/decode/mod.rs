//! CSV decoding module
//!
//! Loads CSV objects into Arrow RecordBatches with every column typed as
//! a nullable string; typing is left to the schema mapper.

mod csv;

pub use csv::{CsvLoader, LoadedCsv};
