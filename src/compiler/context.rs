//! Traversal state: the identity context carried down the tree and the
//! relation accumulator merged back up.
//!
//! The context is derived fresh for every child and never mutated in place,
//! so sibling subtrees cannot observe each other's traversal state. Relations
//! discovered below a non-table node ride the accumulator upward until the
//! nearest enclosing table absorbs them.

use indexmap::IndexMap;

use super::descriptor::RelationMapping;
use super::errors::SchemaCompileError;

/// Identity of the nearest enclosing table, as seen from one node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TraversalContext {
    /// Dotted path of the enclosing table plus any embedded keys crossed
    /// since, e.g. `Orders` or `Orders.shipping`. Used as the table side of
    /// foreign-key join paths.
    pub table_path: String,
    /// The enclosing table's identity column.
    pub id_column: String,
    /// `table.column` reference to the enclosing table's identity column,
    /// unchanged across embedded descendants.
    pub id_path: String,
}

impl TraversalContext {
    pub fn for_table(table_name: &str, id_column: &str) -> Self {
        TraversalContext {
            table_path: table_name.to_string(),
            id_column: id_column.to_string(),
            id_path: format!("{table_name}.{id_column}"),
        }
    }

    /// Context seen by an embedded child reached through `key`.
    pub fn for_embedded_child(&self, key: &str) -> Self {
        TraversalContext {
            table_path: format!("{}.{}", self.table_path, key),
            id_column: self.id_column.clone(),
            id_path: self.id_path.clone(),
        }
    }

    /// Flattened id path, the synthesized foreign-key column name on a
    /// HasMany target (`Orders.id` becomes `Orders_id`).
    pub fn foreign_key_column(&self) -> String {
        self.id_path.replace('.', "_")
    }
}

/// Relations waiting for their nearest enclosing table.
#[derive(Debug, Default)]
pub(crate) struct RelationAccumulator {
    relations: IndexMap<String, RelationMapping>,
}

impl RelationAccumulator {
    /// Adds one relation under the property name it was inferred from. A name
    /// already present is a configuration error naming the duplicate.
    pub fn insert(
        &mut self,
        name: &str,
        relation: RelationMapping,
        path: &str,
    ) -> Result<(), SchemaCompileError> {
        if self.relations.contains_key(name) {
            return Err(SchemaCompileError::DuplicateRelation {
                relation: name.to_string(),
                path: path.to_string(),
            });
        }
        self.relations.insert(name.to_string(), relation);
        Ok(())
    }

    /// Absorbs a child accumulator, preserving its insertion order.
    pub fn merge(
        &mut self,
        child: RelationAccumulator,
        path: &str,
    ) -> Result<(), SchemaCompileError> {
        for (name, relation) in child.relations {
            self.insert(&name, relation, path)?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> IndexMap<String, RelationMapping> {
        self.relations
    }
}
