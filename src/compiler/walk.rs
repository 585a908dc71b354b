//! The two-phase recursive walk.
//!
//! Each node is visited once, but the visit has a pre-order half (derive the
//! identity context the children will see) and a post-order half (apply the
//! children's outcomes to the node, then decide what the node hands its own
//! parent). A decision at a leaf therefore reshapes its ancestors' output:
//! a table node replaces the property that held it with a foreign-key stub,
//! and an array of tables collapses into a HasMany on the nearest enclosing
//! table, synthesizing the foreign-key column on its target.
//!
//! Compilation runs in three stages: the walk collects table descriptors in
//! post-order, join-through references are validated against the completed
//! registry, and only then is every descriptor emitted through the model
//! factory. A configuration error at either of the first two stages fails the
//! call before any model is created.

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde_json::Value;

use super::annotations;
use super::classify::{classify, NodeClass};
use super::context::{RelationAccumulator, TraversalContext};
use super::descriptor::{JoinClause, JsonMap, RelationKind, RelationMapping, TableDescriptor};
use super::errors::SchemaCompileError;
use super::factory::ModelFactory;
use super::registry::TableRegistry;

/// Mapping of model identifier to the handle the factory returned for it.
pub type ModelMap<H> = IndexMap<String, H>;

/// Compiles a schema document into model handles, one per table node.
///
/// The document is consumed as the compiler's working copy. Documents with no
/// object semantics (scalars, identity-less objects) compile to an empty
/// mapping, which is a valid result rather than an error.
pub fn compile<F: ModelFactory>(
    factory: &mut F,
    document: Value,
) -> Result<ModelMap<F::Handle>, SchemaCompileError> {
    let Value::Object(mut root) = document else {
        return Ok(ModelMap::new());
    };

    let mut compiler = Compiler {
        virtual_attributes: factory.virtual_attributes(),
        belongs_to_one_token: factory.relation_token(RelationKind::BelongsToOne),
        has_many_token: factory.relation_token(RelationKind::HasMany),
        registry: TableRegistry::default(),
        through_checks: Vec::new(),
    };

    compiler.walk(&mut root, Slot::Root, None, "#")?;
    compiler.check_join_through_targets()?;
    compiler.emit(factory)
}

/// Where a node hangs off its parent.
#[derive(Debug, Clone, Copy)]
enum Slot<'a> {
    Root,
    Property(&'a str),
    Items,
}

fn slot_key<'a>(slot: Slot<'a>) -> &'a str {
    match slot {
        Slot::Root => "",
        Slot::Property(key) => key,
        Slot::Items => "items",
    }
}

/// What a child walk hands back to its parent.
enum NodeOutcome {
    /// The node compiled to its own table, at this registry index.
    Table(usize),
    /// An array property whose items compiled to a table. The parent removes
    /// the property and adopts the finalized relation under its key.
    CollapsedArray {
        relation: RelationMapping,
        bubbled: RelationAccumulator,
    },
    /// Content stays inline; relations found beneath bubble up to the
    /// nearest enclosing table.
    Inline(RelationAccumulator),
}

/// Names a table node derives for itself during the pre-order phase.
struct TableIdentity {
    table_name: String,
    id_column: String,
    model_key: String,
}

fn derive_identity(node: &JsonMap, path: &str) -> Result<TableIdentity, SchemaCompileError> {
    let fallback = node
        .get("title")
        .and_then(Value::as_str)
        .or_else(|| node.get("$id").and_then(Value::as_str))
        .unwrap_or_default();
    Ok(TableIdentity {
        table_name: annotations::string_annotation(node, annotations::TABLE_NAME, path)?
            .unwrap_or(fallback)
            .to_string(),
        id_column: annotations::string_annotation(node, annotations::ID_COLUMN, path)?
            .unwrap_or("id")
            .to_string(),
        model_key: annotations::string_annotation(node, annotations::MODEL_NAME, path)?
            .unwrap_or(fallback)
            .to_string(),
    })
}

/// A join-through reference recorded during the walk, checked once the
/// registry is complete (the intermediate table may compile later in
/// document order).
struct ThroughCheck {
    relation: String,
    table: String,
    path: String,
}

struct Compiler {
    virtual_attributes: Vec<String>,
    belongs_to_one_token: String,
    has_many_token: String,
    registry: TableRegistry,
    through_checks: Vec<ThroughCheck>,
}

impl Compiler {
    fn walk(
        &mut self,
        node: &mut JsonMap,
        slot: Slot<'_>,
        parent_ctx: Option<&TraversalContext>,
        path: &str,
    ) -> Result<NodeOutcome, SchemaCompileError> {
        let class = classify(node);
        trace!("{path}: classified as {class:?}");

        // Pre-order: a table node starts a fresh identity context, everything
        // else extends the parent's.
        let identity = if class == NodeClass::Table {
            Some(derive_identity(node, path)?)
        } else {
            None
        };
        let ctx = match &identity {
            Some(identity) => Some(TraversalContext::for_table(
                &identity.table_name,
                &identity.id_column,
            )),
            None => parent_ctx.map(|ctx| ctx.for_embedded_child(slot_key(slot))),
        };

        let mut accumulator = RelationAccumulator::default();

        // Visit the properties in declared order, applying each child's
        // outcome to this node before moving to the next sibling.
        let property_keys: Vec<String> = node
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();

        for key in property_keys {
            let child_path = format!("{path}/properties/{key}");
            let outcome = {
                let child = node
                    .get_mut("properties")
                    .and_then(Value::as_object_mut)
                    .and_then(|properties| properties.get_mut(&key));
                match child {
                    Some(Value::Object(child)) => {
                        self.walk(child, Slot::Property(key.as_str()), ctx.as_ref(), &child_path)?
                    }
                    _ => continue,
                }
            };
            match outcome {
                NodeOutcome::Inline(relations) => {
                    accumulator.merge(relations, &child_path)?;
                }
                NodeOutcome::Table(index) => {
                    self.embed_table_property(node, &key, index, ctx.as_ref(), &mut accumulator, &child_path)?;
                }
                NodeOutcome::CollapsedArray { relation, bubbled } => {
                    if let Some(Value::Object(properties)) = node.get_mut("properties") {
                        properties.shift_remove(&key);
                    }
                    accumulator.merge(bubbled, &child_path)?;
                    accumulator.insert(&key, relation, &child_path)?;
                }
            }
        }

        // Visit the items of an array node.
        if matches!(class, NodeClass::ArrayOfTable | NodeClass::ArrayOfEmbedded) {
            let items_path = format!("{path}/items");
            let outcome = match node.get_mut("items") {
                Some(Value::Object(items)) => {
                    Some(self.walk(items, Slot::Items, ctx.as_ref(), &items_path)?)
                }
                _ => None,
            };
            match outcome {
                Some(NodeOutcome::Table(index)) => match (&ctx, slot) {
                    (Some(ctx), Slot::Property(key)) => {
                        let relation = self.finalize_has_many(node, index, ctx, key, path)?;
                        return Ok(NodeOutcome::CollapsedArray {
                            relation,
                            bubbled: accumulator,
                        });
                    }
                    (None, _) => {
                        debug!("{path}: array of tables has no enclosing table; no relation recorded");
                    }
                    (Some(_), _) => {
                        warn!("{path}: array of tables is not an object property; no relation recorded");
                    }
                },
                Some(NodeOutcome::CollapsedArray { bubbled, .. })
                | Some(NodeOutcome::Inline(bubbled)) => {
                    accumulator.merge(bubbled, &items_path)?;
                }
                None => {}
            }
        }

        // Post-order: a table node absorbs the accumulated relations and
        // registers itself; everything else passes them upward.
        match identity {
            Some(identity) => {
                let descriptor = TableDescriptor {
                    table_name: identity.table_name,
                    id_column: identity.id_column,
                    schema: self.emitted_schema(node),
                    relations: accumulator.into_inner(),
                };
                debug!(
                    "{path}: registered table `{}` under model key `{}` with {} relation(s)",
                    descriptor.table_name,
                    identity.model_key,
                    descriptor.relations.len()
                );
                let index = self.registry.insert(identity.model_key, descriptor);
                Ok(NodeOutcome::Table(index))
            }
            None => Ok(NodeOutcome::Inline(accumulator)),
        }
    }

    /// A table compiled out of an object property: swap the property for a
    /// foreign-key stub and record the BelongsToOne under the property name.
    fn embed_table_property(
        &mut self,
        node: &mut JsonMap,
        key: &str,
        target: usize,
        ctx: Option<&TraversalContext>,
        accumulator: &mut RelationAccumulator,
        child_path: &str,
    ) -> Result<(), SchemaCompileError> {
        let fk_property = format!("{key}_id");
        if let Some(Value::Object(properties)) = node.get_mut("properties") {
            properties.shift_remove(key);
            properties.insert(fk_property.clone(), integer_property());
        }
        let Some(ctx) = ctx else {
            debug!("{child_path}: table has no enclosing table; dropping its to-one relation");
            return Ok(());
        };
        let target = &self.registry.get(target).descriptor;
        let relation = RelationMapping {
            kind: self.belongs_to_one_token.clone(),
            target_table: target.table_name.clone(),
            join: JoinClause {
                from: format!("{}.{}", ctx.table_path, fk_property),
                to: target.id_path(),
                through: None,
            },
        };
        accumulator.insert(key, relation, child_path)
    }

    /// Resolves the pending HasMany at the array node that owns it. The
    /// join's `from` side is the enclosing table's identity column; the `to`
    /// side comes from an override annotation on the array property, a
    /// join-through, or the synthesized default of the flattened owner id
    /// path as a column on the target.
    fn finalize_has_many(
        &mut self,
        array_node: &JsonMap,
        target: usize,
        ctx: &TraversalContext,
        key: &str,
        path: &str,
    ) -> Result<RelationMapping, SchemaCompileError> {
        let target_table = self.registry.get(target).descriptor.table_name.clone();
        let target_id_path = self.registry.get(target).descriptor.id_path();

        let join = if let Some(column) =
            annotations::string_annotation(array_node, annotations::JOIN_TO_COLUMN, path)?
        {
            JoinClause {
                from: ctx.id_path.clone(),
                to: column.to_string(),
                through: None,
            }
        } else if let Some(through) = annotations::join_through_annotation(array_node, path)? {
            self.through_checks.push(ThroughCheck {
                relation: key.to_string(),
                table: through.from_table().to_string(),
                path: path.to_string(),
            });
            if through.to_table() != through.from_table() {
                self.through_checks.push(ThroughCheck {
                    relation: key.to_string(),
                    table: through.to_table().to_string(),
                    path: path.to_string(),
                });
            }
            JoinClause {
                from: ctx.id_path.clone(),
                to: target_id_path,
                through: Some(through),
            }
        } else {
            let fk_column = ctx.foreign_key_column();
            let target_entry = &mut self.registry.get_mut(target).descriptor;
            let properties = target_entry.properties_mut();
            if properties.contains_key(&fk_column) {
                warn!(
                    "table `{target_table}` already declares `{fk_column}`; relation `{key}` reuses it"
                );
            } else {
                properties.insert(fk_column.clone(), integer_property());
            }
            JoinClause {
                from: ctx.id_path.clone(),
                to: format!("{target_table}.{fk_column}"),
                through: None,
            }
        };

        Ok(RelationMapping {
            kind: self.has_many_token.clone(),
            target_table,
            join,
        })
    }

    /// Builds the schema a table descriptor carries: every declared key minus
    /// override annotations, with `properties` always present, filtered of
    /// the factory's virtual attributes, in declared order.
    fn emitted_schema(&self, node: &JsonMap) -> JsonMap {
        let mut properties = JsonMap::new();
        if let Some(declared) = node.get("properties").and_then(Value::as_object) {
            for (name, value) in declared {
                if self.virtual_attributes.iter().any(|v| v == name) {
                    trace!("dropping virtual attribute `{name}` from emitted schema");
                    continue;
                }
                properties.insert(name.clone(), value.clone());
            }
        }
        let mut schema = JsonMap::new();
        schema.insert("properties".to_string(), Value::Object(properties));
        for (key, value) in node {
            if key == "properties" || annotations::is_annotation(key) {
                continue;
            }
            schema.insert(key.clone(), value.clone());
        }
        schema
    }

    fn check_join_through_targets(&self) -> Result<(), SchemaCompileError> {
        for check in &self.through_checks {
            if !self.registry.contains_table(&check.table) {
                return Err(SchemaCompileError::UnknownJoinThroughTable {
                    relation: check.relation.clone(),
                    table: check.table.clone(),
                    path: check.path.clone(),
                });
            }
        }
        Ok(())
    }

    /// Hands every collected descriptor to the factory, strictly in
    /// post-order, stopping at the first failure.
    fn emit<F: ModelFactory>(
        self,
        factory: &mut F,
    ) -> Result<ModelMap<F::Handle>, SchemaCompileError> {
        let mut models = ModelMap::new();
        for table in self.registry.into_tables() {
            let handle = factory.create_model(&table.descriptor).map_err(|source| {
                SchemaCompileError::ModelFactory {
                    table: table.descriptor.table_name.clone(),
                    source,
                }
            })?;
            if models.insert(table.model_key.clone(), handle).is_some() {
                warn!(
                    "model key `{}` compiled more than once; keeping the last table registered under it",
                    table.model_key
                );
            }
        }
        Ok(models)
    }
}

fn integer_property() -> Value {
    serde_json::json!({ "type": "integer" })
}
