//! Error types for the schema model

use thiserror::Error;

use crate::types::FieldId;

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Errors that can occur when constructing a schema from parts.
///
/// The mutation API never produces these — it generates fresh ids and treats
/// stale references as no-ops. Only whole-schema construction can fail.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two fields carry the same id
    #[error("duplicate field id: {id}")]
    DuplicateFieldId { id: FieldId },
}
