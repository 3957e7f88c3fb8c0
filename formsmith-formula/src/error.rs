//! Error types for formula parsing and evaluation

use thiserror::Error;

/// Result type for formula operations
pub type Result<T> = std::result::Result<T, FormulaError>;

/// Faults raised while parsing or evaluating a formula.
///
/// None of these are fatal: the fill runtime maps every variant to an empty
/// value for the affected derived field and carries on with the rest of the
/// recomputation pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// The formula text is not a well-formed expression
    #[error("parse error: {message}")]
    Parse { message: String },

    /// The formula references a name with no binding
    #[error("unknown reference: {name}")]
    UnknownReference { name: String },

    /// The referenced binding exists but currently holds no value
    #[error("reference has no value: {name}")]
    EmptyReference { name: String },

    /// An operator was applied to operands it does not support
    #[error("type mismatch applying '{op}'")]
    TypeMismatch { op: &'static str },

    /// Arithmetic produced NaN or an infinity
    #[error("non-finite numeric result")]
    NonFinite,
}

impl FormulaError {
    pub(crate) fn parse(message: impl Into<String>) -> Self {
        FormulaError::Parse {
            message: message.into(),
        }
    }
}
