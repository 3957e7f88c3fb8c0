//! FillSession — per-schema data-entry state machine.
//!
//! Loading a schema creates the session (the Loaded state); dropping or
//! replacing it is the unload transition back to Idle. The dependency order
//! is resolved once at load and cached — the schema cannot change while a
//! session owns it.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use tracing::{debug, warn};

use formsmith_formula::evaluate;
use formsmith_resolve::{resolve, DependencyFault};
use formsmith_schema::{FieldId, FieldType, FormSchema, Value};
use formsmith_validation::validate_field;

use crate::error::{FillError, Result};

/// Outcome of a submit pass: the full violation map across every field.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReport {
    pub passed: bool,
    /// Violations per field; fields with no violations are absent.
    pub violations: BTreeMap<FieldId, Vec<String>>,
}

/// A loaded schema plus its mutable value bindings.
pub struct FillSession {
    schema: FormSchema,
    bindings: BTreeMap<FieldId, Value>,
    violations: BTreeMap<FieldId, Vec<String>>,
    /// Evaluation order cached at load; a fault here flags every derived
    /// field rather than producing a wrong recomputation order.
    order: std::result::Result<Vec<FieldId>, DependencyFault>,
}

impl FillSession {
    /// Load a schema with an empty binding map.
    pub fn load(schema: FormSchema) -> Self {
        let order = resolve(&schema);
        match &order {
            Ok(ids) => debug!(fields = schema.len(), derived = ids.len(), "fill session loaded"),
            Err(fault) => warn!(%fault, "fill session loaded with unevaluable derived fields"),
        }
        FillSession {
            schema,
            bindings: BTreeMap::new(),
            violations: BTreeMap::new(),
            order,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Unload, handing the schema back and discarding bindings.
    pub fn into_schema(self) -> FormSchema {
        self.schema
    }

    /// The current raw binding for a field, if any.
    pub fn binding(&self, id: &FieldId) -> Option<&Value> {
        self.bindings.get(id)
    }

    /// The dependency fault cached at load, if the schema is unevaluable.
    pub fn dependency_fault(&self) -> Option<&DependencyFault> {
        self.order.as_ref().err()
    }

    /// Current violations for a field (empty until the field is edited or
    /// the form is submitted).
    pub fn violations(&self, id: &FieldId) -> &[String] {
        self.violations.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The value a control should display: the binding, else the field's
    /// default, else empty. Number and date fields display invalid content
    /// as empty instead of surfacing garbage.
    pub fn display_value(&self, id: &FieldId) -> Value {
        let Some(field) = self.schema.field(id) else {
            return Value::Empty;
        };
        let raw = self
            .bindings
            .get(id)
            .cloned()
            .or_else(|| field.default_value.clone())
            .unwrap_or(Value::Empty);
        match field.field_type {
            FieldType::Date if !is_displayable_date(&raw) => Value::Empty,
            FieldType::Number if !is_displayable_number(&raw) => Value::Empty,
            _ => raw,
        }
    }

    /// Apply one user edit: write the value, recompute every derived field
    /// in dependency order, re-validate the edited field only.
    ///
    /// Writes to a derived field are rejected — its binding is always the
    /// evaluator's output.
    pub fn on_field_change(&mut self, id: &FieldId, value: Value) -> Result<()> {
        let Some(field) = self.schema.field(id) else {
            return Err(FillError::UnknownField { id: id.clone() });
        };
        if field.is_derived() {
            return Err(FillError::DerivedFieldEdit { id: id.clone() });
        }

        self.bindings.insert(id.clone(), value);
        self.recompute_derived();

        if let Some(field) = self.schema.field(id) {
            let current = self.bindings.get(id).cloned().unwrap_or(Value::Empty);
            let violations = validate_field(&current, field);
            debug!(%id, violations = violations.len(), "field changed");
            self.violations.insert(id.clone(), violations);
        }
        Ok(())
    }

    /// Validate every field's current binding. A dependency fault cached at
    /// load surfaces here as an error, never as a clean submit.
    pub fn on_submit(&self) -> Result<SubmitReport> {
        if let Err(fault) = &self.order {
            return Err(FillError::Dependency(fault.clone()));
        }
        let mut violations = BTreeMap::new();
        for field in self.schema.fields() {
            let value = self.bindings.get(&field.id).cloned().unwrap_or(Value::Empty);
            let field_violations = validate_field(&value, field);
            if !field_violations.is_empty() {
                violations.insert(field.id.clone(), field_violations);
            }
        }
        let passed = violations.is_empty();
        debug!(passed, failing_fields = violations.len(), "submit validated");
        Ok(SubmitReport { passed, violations })
    }

    /// Recompute every derived field. With a valid order, later derived
    /// fields see already-updated upstream derived values; with a cached
    /// fault, every derived field resolves to "no value".
    fn recompute_derived(&mut self) {
        let order = match &self.order {
            Ok(order) => order.clone(),
            Err(fault) => {
                warn!(%fault, "dependency fault; derived fields resolve to no value");
                let derived: Vec<FieldId> =
                    self.schema.derived_fields().map(|f| f.id.clone()).collect();
                for id in derived {
                    self.bindings.insert(id, Value::Empty);
                }
                return;
            }
        };

        for id in &order {
            let Some(field) = self.schema.field(id) else {
                continue;
            };
            let Some(config) = &field.derived else {
                continue;
            };
            let mut parent_bindings: BTreeMap<String, Value> = BTreeMap::new();
            for parent_id in &config.parent_ids {
                let value = self.bindings.get(parent_id).cloned().unwrap_or(Value::Empty);
                parent_bindings.insert(parent_id.as_str().to_string(), value);
            }
            let value = evaluate(&config.formula, &parent_bindings);
            self.bindings.insert(id.clone(), value);
        }
    }
}

fn is_displayable_date(value: &Value) -> bool {
    match value {
        Value::Text(s) => {
            !s.is_empty()
                && (NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
                    || DateTime::parse_from_rfc3339(s).is_ok())
        }
        Value::Number(n) => n.is_finite(),
        Value::Bool(_) | Value::Empty => false,
    }
}

fn is_displayable_number(value: &Value) -> bool {
    match value {
        Value::Number(n) => !n.is_nan(),
        Value::Text(s) => s.trim().is_empty() || s.trim().parse::<f64>().is_ok(),
        Value::Bool(_) => true,
        Value::Empty => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsmith_schema::{DerivedConfig, ValidationRules};

    fn number_field(schema: &mut FormSchema) -> FieldId {
        schema.add_field(FieldType::Number)
    }

    /// A plain field, a derived field B = A + 3, and a derived field
    /// C = B * 2 chained on B.
    fn chained_schema() -> (FormSchema, FieldId, FieldId, FieldId) {
        let mut schema = FormSchema::new();
        let a = number_field(&mut schema);
        let b = number_field(&mut schema);
        let c = number_field(&mut schema);
        schema.set_derived(
            &b,
            Some(DerivedConfig {
                formula: format!("{a} + 3"),
                parent_ids: vec![a.clone()],
            }),
        );
        schema.set_derived(
            &c,
            Some(DerivedConfig {
                formula: format!("{b} * 2"),
                parent_ids: vec![b.clone()],
            }),
        );
        (schema, a, b, c)
    }

    #[test]
    fn load_starts_with_empty_bindings() {
        let (schema, a, b, _) = chained_schema();
        let session = FillSession::load(schema);
        assert_eq!(session.binding(&a), None);
        assert_eq!(session.binding(&b), None);
        assert!(session.dependency_fault().is_none());
    }

    #[test]
    fn chained_derivation_recomputes_in_order() {
        let (schema, a, b, c) = chained_schema();
        let mut session = FillSession::load(schema);

        session.on_field_change(&a, Value::Number(2.0)).unwrap();

        assert_eq!(session.binding(&b), Some(&Value::Number(5.0)));
        assert_eq!(session.binding(&c), Some(&Value::Number(10.0)));
    }

    #[test]
    fn chained_derivation_order_survives_schema_reordering() {
        let (mut schema, a, b, c) = chained_schema();
        // Put the deepest consumer first.
        let ci = schema.index_of(&c).unwrap();
        schema.reorder(ci, 0);
        let mut session = FillSession::load(schema);

        session.on_field_change(&a, Value::Number(2.0)).unwrap();
        assert_eq!(session.binding(&b), Some(&Value::Number(5.0)));
        assert_eq!(session.binding(&c), Some(&Value::Number(10.0)));
    }

    #[test]
    fn derived_field_edits_are_rejected() {
        let (schema, _, b, _) = chained_schema();
        let mut session = FillSession::load(schema);

        let err = session.on_field_change(&b, Value::Number(99.0)).unwrap_err();
        assert_eq!(err, FillError::DerivedFieldEdit { id: b.clone() });
        assert_eq!(session.binding(&b), None);
    }

    #[test]
    fn unknown_field_edits_are_rejected() {
        let (schema, ..) = chained_schema();
        let mut session = FillSession::load(schema);
        let ghost = FieldId::from("field_ghost");
        assert_eq!(
            session.on_field_change(&ghost, Value::Number(1.0)),
            Err(FillError::UnknownField { id: ghost })
        );
    }

    #[test]
    fn change_revalidates_only_the_edited_field() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        let b = schema.add_field(FieldType::Text);
        for id in [&a, &b] {
            schema.merge_validation(
                id,
                &ValidationRules {
                    not_empty: Some(true),
                    ..Default::default()
                },
            );
        }
        let mut session = FillSession::load(schema);

        session.on_field_change(&a, Value::Text(String::new())).unwrap();
        assert_eq!(session.violations(&a), ["This field is required"]);
        // b was never edited; no violations recorded yet.
        assert!(session.violations(&b).is_empty());

        session.on_field_change(&a, Value::Text("hi".into())).unwrap();
        assert!(session.violations(&a).is_empty());
    }

    #[test]
    fn violation_order_is_stable() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        schema.merge_validation(
            &a,
            &ValidationRules {
                not_empty: Some(true),
                min_length: Some(5),
                ..Default::default()
            },
        );
        let mut session = FillSession::load(schema);
        session.on_field_change(&a, Value::Text(String::new())).unwrap();
        assert_eq!(
            session.violations(&a),
            ["This field is required", "Minimum length is 5"]
        );
    }

    #[test]
    fn dangling_parent_flags_derived_fields_but_accepts_plain_edits() {
        let (mut schema, a, b, c) = chained_schema();
        let extra = schema.add_field(FieldType::Text);
        schema.delete_field(&a);
        let mut session = FillSession::load(schema);

        assert!(matches!(
            session.dependency_fault(),
            Some(DependencyFault::DanglingParent { .. })
        ));

        // Plain fields stay editable; derived fields resolve to no value.
        session.on_field_change(&extra, Value::Text("ok".into())).unwrap();
        assert_eq!(session.binding(&extra), Some(&Value::Text("ok".into())));
        assert_eq!(session.binding(&b), Some(&Value::Empty));
        assert_eq!(session.binding(&c), Some(&Value::Empty));

        // Submit surfaces the fault as a distinct class, not "no violations".
        let err = session.on_submit().unwrap_err();
        assert!(matches!(
            err,
            FillError::Dependency(DependencyFault::DanglingParent { .. })
        ));
    }

    #[test]
    fn cycle_flags_derived_fields() {
        let mut schema = FormSchema::new();
        let x = number_field(&mut schema);
        let y = number_field(&mut schema);
        schema.set_derived(
            &x,
            Some(DerivedConfig {
                formula: format!("{y} + 1"),
                parent_ids: vec![y.clone()],
            }),
        );
        schema.set_derived(
            &y,
            Some(DerivedConfig {
                formula: format!("{x} + 1"),
                parent_ids: vec![x.clone()],
            }),
        );
        let plain = schema.add_field(FieldType::Number);
        let mut session = FillSession::load(schema);

        assert!(matches!(
            session.dependency_fault(),
            Some(DependencyFault::CyclicDependency { .. })
        ));
        session.on_field_change(&plain, Value::Number(1.0)).unwrap();
        assert_eq!(session.binding(&x), Some(&Value::Empty));
        assert_eq!(session.binding(&y), Some(&Value::Empty));
    }

    #[test]
    fn evaluation_fault_affects_only_that_field() {
        let mut schema = FormSchema::new();
        let a = number_field(&mut schema);
        let broken = number_field(&mut schema);
        let fine = number_field(&mut schema);
        schema.set_derived(
            &broken,
            Some(DerivedConfig {
                formula: format!("{a} +"),
                parent_ids: vec![a.clone()],
            }),
        );
        schema.set_derived(
            &fine,
            Some(DerivedConfig {
                formula: format!("{a} * 2"),
                parent_ids: vec![a.clone()],
            }),
        );
        let mut session = FillSession::load(schema);

        session.on_field_change(&a, Value::Number(4.0)).unwrap();
        assert_eq!(session.binding(&broken), Some(&Value::Empty));
        assert_eq!(session.binding(&fine), Some(&Value::Number(8.0)));
    }

    #[test]
    fn submit_validates_every_field() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        let b = schema.add_field(FieldType::Text);
        schema.merge_validation(
            &b,
            &ValidationRules {
                not_empty: Some(true),
                ..Default::default()
            },
        );
        let mut session = FillSession::load(schema);
        session.on_field_change(&a, Value::Text("hello".into())).unwrap();

        // b was never touched, but submit still checks it.
        let report = session.on_submit().unwrap();
        assert!(!report.passed);
        assert_eq!(report.violations.len(), 1);
        assert_eq!(report.violations[&b], vec!["This field is required"]);

        session.on_field_change(&b, Value::Text("there".into())).unwrap();
        let report = session.on_submit().unwrap();
        assert!(report.passed);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn display_value_falls_back_to_default() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Text);
        schema.set_default_value(&a, Value::Text("prefill".into()));
        let mut session = FillSession::load(schema);

        assert_eq!(session.display_value(&a), Value::Text("prefill".into()));
        session.on_field_change(&a, Value::Text("typed".into())).unwrap();
        assert_eq!(session.display_value(&a), Value::Text("typed".into()));
    }

    #[test]
    fn display_value_hides_invalid_dates_and_numbers() {
        let mut schema = FormSchema::new();
        let date = schema.add_field(FieldType::Date);
        let number = schema.add_field(FieldType::Number);
        let mut session = FillSession::load(schema);

        session.on_field_change(&date, Value::Text("not-a-date".into())).unwrap();
        assert_eq!(session.display_value(&date), Value::Empty);
        session.on_field_change(&date, Value::Text("2026-08-23".into())).unwrap();
        assert_eq!(session.display_value(&date), Value::Text("2026-08-23".into()));

        session.on_field_change(&number, Value::Text("12x".into())).unwrap();
        assert_eq!(session.display_value(&number), Value::Empty);
        session.on_field_change(&number, Value::Text("12.5".into())).unwrap();
        assert_eq!(session.display_value(&number), Value::Text("12.5".into()));
    }

    #[test]
    fn unload_returns_the_schema() {
        let (schema, a, ..) = chained_schema();
        let mut session = FillSession::load(schema.clone());
        session.on_field_change(&a, Value::Number(1.0)).unwrap();

        let returned = session.into_schema();
        assert_eq!(returned, schema);

        // A fresh session starts clean — bindings do not survive unload.
        let session = FillSession::load(returned);
        assert_eq!(session.binding(&a), None);
    }
}
