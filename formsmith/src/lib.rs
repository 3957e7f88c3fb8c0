//! Formsmith — a dynamic form toolkit.
//!
//! The pieces, bottom up:
//!
//! - [`schema`]: the form model ([`FormSchema`], [`Field`], [`Value`]) and
//!   the builder mutation API
//! - [`validation`]: rule checks producing ordered human-readable messages
//! - [`formula`]: the sandboxed expression language behind derived fields
//! - [`resolve`]: dependency ordering for derived-field recomputation
//! - [`fill`]: the data-entry runtime ([`FillSession`])
//! - [`store`]: file-backed persistence for named schema snapshots
//!
//! A typical flow builds a schema with the mutation API, saves it through a
//! [`FormStore`], and later loads it into a [`FillSession`] for data entry.

pub use formsmith_fill as fill;
pub use formsmith_formula as formula;
pub use formsmith_resolve as resolve;
pub use formsmith_schema as schema;
pub use formsmith_store as store;
pub use formsmith_validation as validation;

pub use formsmith_fill::{FillError, FillSession, SubmitReport};
pub use formsmith_resolve::DependencyFault;
pub use formsmith_schema::{
    DerivedConfig, Field, FieldId, FieldType, FormSchema, ValidationRules, Value,
};
pub use formsmith_store::{FormRecord, FormStore, FormSummary};
pub use formsmith_validation::{validate, validate_field};
