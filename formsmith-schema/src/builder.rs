//! Builder mutation API for [`FormSchema`].
//!
//! Every operation acts on the single owned schema instance. Operations that
//! reference a field id no longer in the schema, or an out-of-range index,
//! are silent no-ops so a UI holding stale references stays resilient.
//!
//! None of these operations invoke the dependency resolver or the formula
//! evaluator — a derived field may legally be configured before its parents
//! exist. Evaluable correctness is checked only when a fill session loads
//! the schema.

use tracing::debug;

use crate::types::{DerivedConfig, Field, FieldId, FieldType, FormSchema, ValidationRules, Value};

impl FormSchema {
    fn field_mut(&mut self, id: &FieldId) -> Option<&mut Field> {
        self.fields.iter_mut().find(|f| &f.id == id)
    }

    /// Append a new field of the given type with default attributes.
    /// Returns the freshly assigned id.
    pub fn add_field(&mut self, field_type: FieldType) -> FieldId {
        let field = Field::new(field_type);
        let id = field.id.clone();
        self.fields.push(field);
        debug!(%id, %field_type, "field added");
        id
    }

    /// Set a field's display label.
    pub fn update_label(&mut self, id: &FieldId, label: impl Into<String>) {
        if let Some(field) = self.field_mut(id) {
            field.label = label.into();
            debug!(%id, "label updated");
        }
    }

    /// Flip a field's required flag.
    pub fn toggle_required(&mut self, id: &FieldId) {
        if let Some(field) = self.field_mut(id) {
            field.required = !field.required;
            debug!(%id, required = field.required, "required toggled");
        }
    }

    /// Set a field's default value.
    pub fn set_default_value(&mut self, id: &FieldId, value: Value) {
        if let Some(field) = self.field_mut(id) {
            field.default_value = Some(value);
            debug!(%id, "default value updated");
        }
    }

    /// Shallow-merge a partial rule set into a field's validation rules.
    /// Members absent from the patch are left untouched.
    pub fn merge_validation(&mut self, id: &FieldId, patch: &ValidationRules) {
        if let Some(field) = self.field_mut(id) {
            field
                .validation
                .get_or_insert_with(ValidationRules::default)
                .merge(patch);
            debug!(%id, "validation rules merged");
        }
    }

    /// Remove a field. Other fields' `parent_ids` referencing it are left
    /// dangling on purpose; the dependency resolver reports them as faults
    /// rather than silently discarding user-authored formulas.
    pub fn delete_field(&mut self, id: &FieldId) {
        let before = self.fields.len();
        self.fields.retain(|f| &f.id != id);
        if self.fields.len() != before {
            debug!(%id, "field deleted");
        }
    }

    /// Move the field at `from_index` to `to_index`, shifting the fields in
    /// between. No-op when either index is outside `[0, len)`.
    pub fn reorder(&mut self, from_index: usize, to_index: usize) {
        if from_index >= self.fields.len() || to_index >= self.fields.len() {
            return;
        }
        let field = self.fields.remove(from_index);
        self.fields.insert(to_index, field);
        debug!(from_index, to_index, "fields reordered");
    }

    /// Set or clear a field's derived configuration. `None` clears derived
    /// status along with any existing formula and parent ids.
    pub fn set_derived(&mut self, id: &FieldId, config: Option<DerivedConfig>) {
        if let Some(field) = self.field_mut(id) {
            let derived = config.is_some();
            field.derived = config;
            debug!(%id, derived, "derived config updated");
        }
    }

    /// Clear all fields. Used after a successful save-and-start-new-form
    /// transition.
    pub fn reset(&mut self) {
        self.fields.clear();
        debug!("schema reset");
    }
}
