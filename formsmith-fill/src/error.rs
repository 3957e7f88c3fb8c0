//! Error types for the fill runtime

use thiserror::Error;

use formsmith_resolve::DependencyFault;
use formsmith_schema::FieldId;

/// Result type for fill-runtime operations
pub type Result<T> = std::result::Result<T, FillError>;

/// Errors reported by a fill session.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FillError {
    /// The edit referenced a field id not in the loaded schema
    #[error("unknown field: {id}")]
    UnknownField { id: FieldId },

    /// Derived fields are computed, never directly editable
    #[error("derived field cannot be edited directly: {id}")]
    DerivedFieldEdit { id: FieldId },

    /// The schema's derived fields are unevaluable (dangling parent or cycle)
    #[error(transparent)]
    Dependency(#[from] DependencyFault),
}
