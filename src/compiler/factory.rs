//! The consumed model-binder capability.

use super::descriptor::{RelationKind, TableDescriptor};

/// Error surfaced by a model factory. Propagated to the compile caller
/// unchanged, wrapped only in [`SchemaCompileError::ModelFactory`] to name the
/// failing table.
///
/// [`SchemaCompileError::ModelFactory`]: super::errors::SchemaCompileError::ModelFactory
pub type FactoryError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// External ORM binder that turns compiled table descriptors into model
/// handles.
///
/// `create_model` is invoked exactly once per compiled table, strictly in
/// post-order: a relation's target table is always created before the table
/// that references it. The compiler never retries, caches, or reorders these
/// calls, and stops at the first failure.
pub trait ModelFactory {
    /// Opaque handle the binder returns for one table.
    type Handle;

    fn create_model(&mut self, table: &TableDescriptor) -> Result<Self::Handle, FactoryError>;

    /// Property names that must never appear in an emitted table schema, even
    /// when declared on the input document.
    fn virtual_attributes(&self) -> Vec<String> {
        Vec::new()
    }

    /// Token recorded verbatim as [`RelationMapping::kind`] for relations of
    /// the given cardinality.
    ///
    /// [`RelationMapping::kind`]: super::descriptor::RelationMapping::kind
    fn relation_token(&self, kind: RelationKind) -> String {
        kind.default_token().to_string()
    }
}
