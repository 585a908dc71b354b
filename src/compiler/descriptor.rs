//! Output value types: table descriptors and the relation graph between them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Insertion-ordered JSON object, the working representation of a schema node.
pub type JsonMap = serde_json::Map<String, Value>;

/// Relation cardinality between two compiled tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationKind {
    /// The owning table holds the foreign key referencing the target's
    /// identity column.
    BelongsToOne,
    /// The target table holds the foreign key referencing the owning table's
    /// identity column.
    HasMany,
}

impl RelationKind {
    /// Token recorded in [`RelationMapping::kind`] when the model factory does
    /// not supply its own.
    pub fn default_token(&self) -> &'static str {
        match self {
            RelationKind::BelongsToOne => "BelongsToOne",
            RelationKind::HasMany => "HasMany",
        }
    }
}

/// Intermediate join table mediating a many-to-many shaped relation.
///
/// Both sides are `table.column` paths into the intermediate table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinThrough {
    pub from: String,
    pub to: String,
}

impl JoinThrough {
    pub fn from_table(&self) -> &str {
        table_side(&self.from)
    }

    pub fn to_table(&self) -> &str {
        table_side(&self.to)
    }
}

fn table_side(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

/// Join condition for one relation edge.
///
/// `from` always names a column on the owning side: the owning table's
/// foreign-key stub for a BelongsToOne, the owning table's identity column
/// for a HasMany.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinClause {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<JoinThrough>,
}

/// One edge of the relation graph, keyed in its owning table by the schema
/// property name it was inferred from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationMapping {
    /// The model factory's relation-kind token, verbatim.
    pub kind: String,
    pub target_table: String,
    pub join: JoinClause,
}

/// One compiled table: the unit handed to the model factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
    pub id_column: String,
    /// The source node's keys minus override annotations, with relation
    /// properties stripped and foreign-key stubs inserted. Always carries a
    /// `properties` object, in declared order.
    pub schema: JsonMap,
    pub relations: IndexMap<String, RelationMapping>,
}

impl TableDescriptor {
    /// Dotted `table.column` reference to this table's identity column.
    pub fn id_path(&self) -> String {
        format!("{}.{}", self.table_name, self.id_column)
    }

    /// True when the emitted schema declares `name` as a property.
    pub fn declares_property(&self, name: &str) -> bool {
        self.schema
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|properties| properties.contains_key(name))
    }

    pub(crate) fn properties_mut(&mut self) -> &mut JsonMap {
        let slot = self
            .schema
            .entry("properties".to_string())
            .or_insert_with(|| Value::Object(JsonMap::new()));
        if !slot.is_object() {
            *slot = Value::Object(JsonMap::new());
        }
        slot.as_object_mut().expect("properties slot is an object")
    }
}
