//! Override annotations embedded in schema documents.
//!
//! All annotations are optional and namespaced with the `tablefold-` prefix so
//! they cannot collide with standard JSON Schema keywords. Every key carrying
//! the prefix is stripped from emitted table schemas.
//!
//! | Annotation | Value | Effect |
//! |---|---|---|
//! | `tablefold-table-name` | string | overrides the derived table name |
//! | `tablefold-model-name` | string | overrides the key the compiled handle is returned under |
//! | `tablefold-id-column` | string | overrides the identity column (default `id`) |
//! | `tablefold-join-to-column` | string | used verbatim as a HasMany `join.to` |
//! | `tablefold-join-through` | object | `{from, to}` columns of an intermediate join table |
//!
//! The join annotations are read from the array property node that collapses
//! into the relation, not from its items.

use serde_json::Value;

use super::descriptor::{JoinThrough, JsonMap};
use super::errors::SchemaCompileError;

/// Namespace prefix shared by every override annotation.
pub const ANNOTATION_PREFIX: &str = "tablefold-";

pub const TABLE_NAME: &str = "tablefold-table-name";
pub const MODEL_NAME: &str = "tablefold-model-name";
pub const ID_COLUMN: &str = "tablefold-id-column";
pub const JOIN_TO_COLUMN: &str = "tablefold-join-to-column";
pub const JOIN_THROUGH: &str = "tablefold-join-through";

/// True for keys that belong to the annotation namespace and are stripped
/// from emitted schemas.
pub fn is_annotation(key: &str) -> bool {
    key.starts_with(ANNOTATION_PREFIX)
}

/// Reads a string-valued annotation. Any other JSON type is a configuration
/// error naming the schema path.
pub(crate) fn string_annotation<'a>(
    node: &'a JsonMap,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, SchemaCompileError> {
    match node.get(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value)),
        Some(other) => Err(SchemaCompileError::MalformedAnnotation {
            annotation: key.to_string(),
            path: path.to_string(),
            expected: format!("a string, found {}", json_type_name(other)),
        }),
    }
}

/// Reads `tablefold-join-through`: an object whose `from` and `to` are
/// `table.column` paths into the intermediate table.
pub(crate) fn join_through_annotation(
    node: &JsonMap,
    path: &str,
) -> Result<Option<JoinThrough>, SchemaCompileError> {
    let Some(value) = node.get(JOIN_THROUGH) else {
        return Ok(None);
    };
    let malformed = |expected: String| SchemaCompileError::MalformedAnnotation {
        annotation: JOIN_THROUGH.to_string(),
        path: path.to_string(),
        expected,
    };
    let Some(object) = value.as_object() else {
        return Err(malformed(format!(
            "an object with `from` and `to`, found {}",
            json_type_name(value)
        )));
    };
    let side = |name: &str| -> Result<String, SchemaCompileError> {
        let raw = object
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(format!("a string `{name}` key")))?;
        if !raw.contains('.') {
            return Err(malformed(format!("`{name}` in `table.column` form")));
        }
        Ok(raw.to_string())
    };
    Ok(Some(JoinThrough {
        from: side("from")?,
        to: side("to")?,
    }))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
