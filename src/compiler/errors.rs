//! Compile-time failure surface.
//!
//! Configuration errors name the offending schema location as a JSON-pointer
//! style path (`#/properties/addresses`). They fail the whole compile call; no
//! partial model mapping is ever returned. Factory errors wrap the
//! collaborator's error without altering it.

use thiserror::Error;

use super::factory::FactoryError;

#[derive(Debug, Error)]
pub enum SchemaCompileError {
    #[error("duplicate relation name `{relation}` at {path}")]
    DuplicateRelation { relation: String, path: String },

    #[error("malformed `{annotation}` annotation at {path}: expected {expected}")]
    MalformedAnnotation {
        annotation: String,
        path: String,
        expected: String,
    },

    #[error(
        "join-through for relation `{relation}` at {path} references `{table}`, \
         which is not a compiled table"
    )]
    UnknownJoinThroughTable {
        relation: String,
        table: String,
        path: String,
    },

    #[error("failed to read schema document `{path}`: {source}")]
    SchemaRead {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse schema document: {source}")]
    SchemaParse { source: serde_json::Error },

    #[error("model factory failed for table `{table}`: {source}")]
    ModelFactory { table: String, source: FactoryError },
}
