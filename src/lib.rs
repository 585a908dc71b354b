//! tablefold - flattens nested JSON Schema documents into a relational model.
//!
//! A schema document is walked top-down then bottom-up. Nodes carrying an
//! identity compile to table descriptors; object properties and array items
//! that compile to tables are replaced in their parent by foreign-key columns
//! and relation mappings (BelongsToOne for embedded objects, HasMany for
//! arrays). The resulting descriptors are handed, in post-order, to a caller
//! supplied [`ModelFactory`] that binds each table to whatever model handle
//! the surrounding ORM uses.
//!
//! ```
//! use tablefold::{compile, FactoryError, ModelFactory, TableDescriptor};
//! use serde_json::json;
//!
//! struct Binder;
//!
//! impl ModelFactory for Binder {
//!     type Handle = String;
//!
//!     fn create_model(&mut self, table: &TableDescriptor) -> Result<String, FactoryError> {
//!         Ok(table.table_name.clone())
//!     }
//! }
//!
//! let document = json!({
//!     "$id": "./orders",
//!     "title": "Orders",
//!     "type": "object",
//!     "properties": {
//!         "reference": { "type": "string" },
//!         "lines": {
//!             "type": "array",
//!             "items": {
//!                 "$id": "./order-lines",
//!                 "title": "OrderLines",
//!                 "type": "object",
//!                 "properties": { "sku": { "type": "string" } }
//!             }
//!         }
//!     }
//! });
//!
//! let mut binder = Binder;
//! let models = compile(&mut binder, document).unwrap();
//! assert_eq!(models.len(), 2);
//! assert!(models.contains_key("Orders"));
//! assert!(models.contains_key("OrderLines"));
//! ```

pub mod compiler;

pub use compiler::{
    compile, schema_from_file, schema_from_str, FactoryError, JoinClause, JoinThrough, JsonMap,
    ModelFactory, ModelMap, RelationKind, RelationMapping, SchemaCompileError, TableDescriptor,
};
