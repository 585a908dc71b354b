//! Schema document loading.
//!
//! The compiler itself takes a plain [`serde_json::Value`]; these helpers
//! cover the common read-then-parse path with errors that name the document.

use std::fs;
use std::path::Path;

use serde_json::Value;

use super::errors::SchemaCompileError;

/// Parses a schema document from JSON text.
pub fn schema_from_str(text: &str) -> Result<Value, SchemaCompileError> {
    serde_json::from_str(text).map_err(|source| SchemaCompileError::SchemaParse { source })
}

/// Reads and parses a schema document from a JSON file.
pub fn schema_from_file<P: AsRef<Path>>(path: P) -> Result<Value, SchemaCompileError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| SchemaCompileError::SchemaRead {
        path: path.display().to_string(),
        source,
    })?;
    schema_from_str(&text)
}
