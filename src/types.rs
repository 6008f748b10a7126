//! Common types used throughout csv2parquet
//!
//! Shared type aliases used across multiple modules.

use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// Property bag attached to a workflow run
pub type RunProperties = StringMap;
