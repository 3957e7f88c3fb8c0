//! Form schema model and builder mutation API
//!
//! `formsmith-schema` owns the data definitions for a form: typed fields,
//! their validation rule sets, and the optional derived-field configuration
//! that makes a field computed instead of user-editable. A [`FormSchema`] is
//! an ordered sequence of fields; order is render order and the only
//! tie-break order used anywhere in the system.
//!
//! # Architecture
//!
//! - **Schema-only**: owns field definitions, never field values
//! - **Single owner**: exactly one builder or fill session holds a schema at
//!   a time; the mutation API takes `&mut self`
//! - **Resilient mutations**: operations referencing a stale field id or an
//!   out-of-range index are no-ops, not errors
//! - **JSON on the wire**: all types serialize with serde using the
//!   camelCase record format shared with the saved-forms store

pub mod builder;
pub mod error;
pub mod types;

pub use error::{Result, SchemaError};
pub use types::{DerivedConfig, Field, FieldId, FieldType, FormSchema, ValidationRules, Value};
