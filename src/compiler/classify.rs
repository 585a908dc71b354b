//! Structural node classification, resolved once per node during the
//! pre-order phase.

use serde_json::Value;

use super::descriptor::JsonMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeClass {
    /// Maps to a persisted table: carries an identity and object semantics.
    Table,
    /// Object content inlined into the nearest enclosing table.
    Embedded,
    /// Array whose items compile to their own table.
    ArrayOfTable,
    /// Array whose items stay inline.
    ArrayOfEmbedded,
    /// Purely descriptive leaf content, passed through unchanged.
    Scalar,
}

pub(crate) fn classify(node: &JsonMap) -> NodeClass {
    if is_table(node) {
        return NodeClass::Table;
    }
    if let Some(items) = node.get("items").and_then(Value::as_object) {
        if node.get("type").is_none() || type_is(node, "array") {
            return if is_table(items) {
                NodeClass::ArrayOfTable
            } else {
                NodeClass::ArrayOfEmbedded
            };
        }
    }
    if type_is(node, "object") || has_properties(node) {
        return NodeClass::Embedded;
    }
    NodeClass::Scalar
}

/// A node compiles to a table when it carries a string `$id` and is
/// object-shaped: no declared type, an explicit `object` type, or a
/// `properties` map. Identity-less objects stay embedded; identity-carrying
/// scalars stay scalar.
pub(crate) fn is_table(node: &JsonMap) -> bool {
    node.get("$id").and_then(Value::as_str).is_some()
        && (node.get("type").is_none() || type_is(node, "object") || has_properties(node))
}

fn type_is(node: &JsonMap, expected: &str) -> bool {
    node.get("type").and_then(Value::as_str) == Some(expected)
}

fn has_properties(node: &JsonMap) -> bool {
    node.get("properties").is_some_and(Value::is_object)
}
