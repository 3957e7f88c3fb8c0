//! Core schema types: fields, values, rule sets, and the form schema.
//!
//! All types serialize to/from JSON via serde using the camelCase wire
//! format of the saved-forms artifact. `validation` and `derived` are
//! omitted when not set; a missing scalar is JSON `null`.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque unique identifier for a field, assigned at creation and immutable.
///
/// Generated ids are identifier-shaped (`field_<ulid>`) so a formula can
/// reference a parent field by id as a plain identifier token. Arbitrary
/// strings (e.g. UUIDs from older artifacts) are accepted on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(String);

impl FieldId {
    /// Generate a fresh unique id.
    pub fn generate() -> Self {
        FieldId(format!("field_{}", Ulid::new().to_string().to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FieldId {
    fn from(s: &str) -> Self {
        FieldId(s.to_string())
    }
}

impl From<String> for FieldId {
    fn from(s: String) -> Self {
        FieldId(s)
    }
}

impl std::fmt::Display for FieldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The type of a field — determines which control renders it and which
/// validation rules apply. Immutable after creation; retyping a field means
/// deleting and recreating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Date,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Textarea => "textarea",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Date => "date",
        };
        f.write_str(s)
    }
}

/// A scalar field value.
///
/// `Empty` is the explicit "no value" — the evaluator's degraded result and
/// the state of an untouched binding. It serializes as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl Value {
    /// Whether this value counts as "empty" for the notEmpty rule.
    ///
    /// Mirrors the loose emptiness test of the legacy browser builder: the
    /// empty string, `false`, zero, and NaN are all empty-like.
    pub fn is_empty_like(&self) -> bool {
        match self {
            Value::Empty => true,
            Value::Text(s) => s.is_empty(),
            Value::Bool(b) => !b,
            Value::Number(n) => *n == 0.0 || n.is_nan(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    /// String rendition of a value. Whole numbers render without a trailing
    /// `.0`; `Empty` renders as the empty string.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{n}")
                }
            }
            Value::Bool(b) => write!(f, "{b}"),
            Value::Empty => Ok(()),
        }
    }
}

/// Validation rule set for a field. Every member is optional; an absent
/// member means the rule is not enforced. Rules are independent and all
/// applicable rules run — violations accumulate, never short-circuit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not_empty: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_rule: Option<bool>,
}

impl ValidationRules {
    /// Shallow-merge `patch` into `self`: members set in the patch replace
    /// the existing members, unspecified members are left untouched.
    pub fn merge(&mut self, patch: &ValidationRules) {
        if patch.not_empty.is_some() {
            self.not_empty = patch.not_empty;
        }
        if patch.min_length.is_some() {
            self.min_length = patch.min_length;
        }
        if patch.max_length.is_some() {
            self.max_length = patch.max_length;
        }
        if patch.email.is_some() {
            self.email = patch.email;
        }
        if patch.password_rule.is_some() {
            self.password_rule = patch.password_rule;
        }
    }
}

/// Derived-field configuration. Presence on a field means its value is
/// computed by the formula from the parent fields' values and is never
/// directly editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedConfig {
    #[serde(default)]
    pub formula: String,
    #[serde(default)]
    pub parent_ids: Vec<FieldId>,
}

/// A single schema entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: FieldId,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "derivedConfig")]
    pub derived: Option<DerivedConfig>,
}

impl Field {
    /// A new field with default attributes: placeholder label, not required,
    /// empty-string default value, empty rule set.
    pub fn new(field_type: FieldType) -> Self {
        Field {
            id: FieldId::generate(),
            field_type,
            label: "New Field".to_string(),
            required: false,
            default_value: Some(Value::Text(String::new())),
            validation: Some(ValidationRules::default()),
            derived: None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.derived.is_some()
    }
}

/// An ordered sequence of fields. Order is render order and tab order, and
/// the only total order used for tie-breaks anywhere in the system.
///
/// Invariant: field ids are unique. [`FormSchema::from_fields`] enforces
/// this; the mutation API preserves it. A derived field referencing an id
/// not present in the schema is legal here — the dependency resolver reports
/// it as a fault at evaluation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormSchema {
    pub(crate) fields: Vec<Field>,
}

impl FormSchema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a schema from existing fields, rejecting duplicate ids.
    pub fn from_fields(fields: Vec<Field>) -> crate::error::Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for field in &fields {
            if !seen.insert(&field.id) {
                return Err(crate::error::SchemaError::DuplicateFieldId {
                    id: field.id.clone(),
                });
            }
        }
        Ok(FormSchema { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<Field> {
        self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Get a field by id.
    pub fn field(&self, id: &FieldId) -> Option<&Field> {
        self.fields.iter().find(|f| &f.id == id)
    }

    pub fn contains(&self, id: &FieldId) -> bool {
        self.field(id).is_some()
    }

    /// Position of a field in schema order.
    pub fn index_of(&self, id: &FieldId) -> Option<usize> {
        self.fields.iter().position(|f| &f.id == id)
    }

    /// The derived fields, in schema order.
    pub fn derived_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_derived())
    }
}
