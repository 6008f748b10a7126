//! Catalog type parsing

use crate::error::{Error, Result};
use arrow::datatypes::{DataType, TimeUnit};
use regex::Regex;
use std::sync::LazyLock;

/// Hive default decimal precision when none is declared
const DEFAULT_DECIMAL_PRECISION: u8 = 10;

/// `name(args)` for parameterized types
static PARAMETERIZED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(decimal|varchar|char)\s*\(\s*([^)]*)\)$").unwrap());

/// Parse a catalog type name into an Arrow data type
///
/// Accepts the scalar Hive types the Glue catalog uses for Parquet tables.
/// Complex types (`array<..>`, `map<..>`, `struct<..>`) are unsupported.
pub fn parse_catalog_type(type_name: &str) -> Result<DataType> {
    let normalized = type_name.trim().to_ascii_lowercase();
    let unsupported = || Error::UnsupportedType {
        type_name: type_name.to_string(),
    };

    let data_type = match normalized.as_str() {
        "string" | "varchar" | "char" => DataType::Utf8,
        "tinyint" => DataType::Int8,
        "smallint" => DataType::Int16,
        "int" | "integer" => DataType::Int32,
        "bigint" => DataType::Int64,
        "float" => DataType::Float32,
        "double" => DataType::Float64,
        "boolean" => DataType::Boolean,
        "date" => DataType::Date32,
        "timestamp" => DataType::Timestamp(TimeUnit::Microsecond, None),
        "binary" => DataType::Binary,
        "decimal" => DataType::Decimal128(DEFAULT_DECIMAL_PRECISION, 0),
        other => {
            let captures = PARAMETERIZED.captures(other).ok_or_else(unsupported)?;
            match &captures[1] {
                "decimal" => parse_decimal_args(&captures[2]).ok_or_else(unsupported)?,
                _ => DataType::Utf8,
            }
        }
    };

    Ok(data_type)
}

fn parse_decimal_args(args: &str) -> Option<DataType> {
    let mut parts = args.split(',').map(str::trim);
    let precision: u8 = parts.next()?.parse().ok()?;
    let scale: i8 = match parts.next() {
        Some(scale) => scale.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || precision == 0 || precision > 38 || scale < 0 {
        return None;
    }
    if scale as u8 > precision {
        return None;
    }
    Some(DataType::Decimal128(precision, scale))
}
