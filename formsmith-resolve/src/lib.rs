//! Derived-field dependency resolver
//!
//! Derived fields may themselves be parents of other derived fields, so a
//! naive linear recomputation can read stale upstream values. This crate
//! builds the dependency graph over a schema's derived fields and produces
//! an evaluation order in which every producer comes before its consumers,
//! or reports the offending fields when no such order exists.
//!
//! Ordering is deterministic: fields with no constraint between them keep
//! their schema order, so identical schemas always resolve to identical
//! orders.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tracing::debug;

use formsmith_schema::{FieldId, FormSchema};

/// Faults that make a schema's derived fields unevaluable.
///
/// Recoverable by design: the fill runtime flags the fault, resolves the
/// affected derived fields to "no value", and keeps accepting edits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DependencyFault {
    /// A derived field lists a parent id not present in the schema, e.g.
    /// after the parent was deleted in the builder.
    #[error("derived field '{field_id}' references unknown parent '{parent_id}'")]
    DanglingParent {
        field_id: FieldId,
        parent_id: FieldId,
    },

    /// One or more derived fields transitively depend on themselves.
    /// Carries every derived field left unorderable, in schema order.
    #[error("cyclic dependency among derived fields: {}", format_ids(field_ids))]
    CyclicDependency { field_ids: Vec<FieldId> },
}

fn format_ids(ids: &[FieldId]) -> String {
    ids.iter()
        .map(FieldId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Compute the order in which a schema's derived fields are safe to
/// evaluate left-to-right. A schema without derived fields resolves to the
/// empty order.
///
/// Kahn's algorithm restricted to the derived subgraph: non-derived parents
/// carry no ordering constraint because their bindings are never recomputed.
/// Ties break by schema order (stable).
pub fn resolve(schema: &FormSchema) -> Result<Vec<FieldId>, DependencyFault> {
    let known_ids: HashSet<&FieldId> = schema.fields().iter().map(|f| &f.id).collect();

    // Reject dangling references up front, first offender in schema order.
    for field in schema.fields() {
        let Some(config) = &field.derived else {
            continue;
        };
        for parent_id in &config.parent_ids {
            if !known_ids.contains(parent_id) {
                return Err(DependencyFault::DanglingParent {
                    field_id: field.id.clone(),
                    parent_id: parent_id.clone(),
                });
            }
        }
    }

    let derived: Vec<&FieldId> = schema.derived_fields().map(|f| &f.id).collect();
    let derived_set: HashSet<&FieldId> = derived.iter().copied().collect();

    // Edges among derived fields only: parent -> consumer. Duplicate parent
    // entries count once.
    let mut indegree: HashMap<&FieldId, usize> = derived.iter().map(|id| (*id, 0)).collect();
    let mut consumers: HashMap<&FieldId, Vec<&FieldId>> = HashMap::new();
    for field in schema.fields() {
        let Some(config) = &field.derived else {
            continue;
        };
        let mut seen: HashSet<&FieldId> = HashSet::new();
        for parent_id in &config.parent_ids {
            if derived_set.contains(parent_id) && seen.insert(parent_id) {
                *indegree.entry(&field.id).or_insert(0) += 1;
                consumers.entry(parent_id).or_default().push(&field.id);
            }
        }
    }

    let mut order: Vec<FieldId> = Vec::with_capacity(derived.len());
    let mut placed: HashSet<&FieldId> = HashSet::new();
    loop {
        // Scan in schema order so unconstrained fields keep their relative
        // positions across runs.
        let next = derived
            .iter()
            .copied()
            .find(|id| !placed.contains(id) && indegree.get(id).copied() == Some(0));
        let Some(id) = next else { break };
        placed.insert(id);
        order.push(id.clone());
        if let Some(children) = consumers.get(id) {
            for child in children {
                if let Some(n) = indegree.get_mut(child) {
                    *n = n.saturating_sub(1);
                }
            }
        }
    }

    if placed.len() != derived.len() {
        let field_ids: Vec<FieldId> = derived
            .iter()
            .filter(|id| !placed.contains(*id))
            .map(|id| (*id).clone())
            .collect();
        return Err(DependencyFault::CyclicDependency { field_ids });
    }

    debug!(derived = order.len(), "derived evaluation order resolved");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formsmith_schema::{DerivedConfig, FieldType};

    fn derive_from(schema: &mut FormSchema, id: &FieldId, parents: &[&FieldId]) {
        schema.set_derived(
            id,
            Some(DerivedConfig {
                formula: String::new(),
                parent_ids: parents.iter().map(|p| (*p).clone()).collect(),
            }),
        );
    }

    #[test]
    fn schema_without_derived_fields_resolves_empty() {
        let mut schema = FormSchema::new();
        schema.add_field(FieldType::Text);
        schema.add_field(FieldType::Number);
        assert_eq!(resolve(&schema), Ok(vec![]));
    }

    #[test]
    fn chain_orders_producers_first() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let b = schema.add_field(FieldType::Number);
        let c = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &b, &[&a]);
        derive_from(&mut schema, &c, &[&b]);

        assert_eq!(resolve(&schema), Ok(vec![b.clone(), c.clone()]));

        // Even when the consumer appears first in the schema.
        schema.reorder(2, 0);
        assert_eq!(resolve(&schema), Ok(vec![b, c]));
    }

    #[test]
    fn unconstrained_fields_keep_schema_order() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let d1 = schema.add_field(FieldType::Number);
        let d2 = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &d1, &[&a]);
        derive_from(&mut schema, &d2, &[&a]);

        assert_eq!(resolve(&schema), Ok(vec![d1.clone(), d2.clone()]));

        // Swapping the two derived fields swaps the order.
        let i1 = schema.index_of(&d1).unwrap();
        let i2 = schema.index_of(&d2).unwrap();
        schema.reorder(i1, i2);
        assert_eq!(resolve(&schema), Ok(vec![d2, d1]));
    }

    #[test]
    fn resolution_is_reproducible() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let ids: Vec<FieldId> = (0..5).map(|_| schema.add_field(FieldType::Number)).collect();
        for id in &ids {
            derive_from(&mut schema, id, &[&a]);
        }
        let first = resolve(&schema).unwrap();
        for _ in 0..5 {
            assert_eq!(resolve(&schema).unwrap(), first);
        }
    }

    #[test]
    fn two_cycle_reports_both_ids() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let b = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &a, &[&b]);
        derive_from(&mut schema, &b, &[&a]);

        assert_eq!(
            resolve(&schema),
            Err(DependencyFault::CyclicDependency {
                field_ids: vec![a, b],
            })
        );
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &a, &[&a]);

        assert_eq!(
            resolve(&schema),
            Err(DependencyFault::CyclicDependency {
                field_ids: vec![a],
            })
        );
    }

    #[test]
    fn cycle_does_not_hide_downstream_fields() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let b = schema.add_field(FieldType::Number);
        let c = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &a, &[&b]);
        derive_from(&mut schema, &b, &[&a]);
        derive_from(&mut schema, &c, &[&a]);

        // c is unorderable too: it depends on the cycle.
        assert_eq!(
            resolve(&schema),
            Err(DependencyFault::CyclicDependency {
                field_ids: vec![a, b, c],
            })
        );
    }

    #[test]
    fn dangling_parent_reported() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let b = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &b, &[&a]);
        schema.delete_field(&a);

        assert_eq!(
            resolve(&schema),
            Err(DependencyFault::DanglingParent {
                field_id: b,
                parent_id: a,
            })
        );
    }

    #[test]
    fn duplicate_parent_ids_count_once() {
        let mut schema = FormSchema::new();
        let a = schema.add_field(FieldType::Number);
        let b = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &b, &[&a, &a, &a]);
        assert_eq!(resolve(&schema), Ok(vec![b]));
    }

    #[test]
    fn derived_parent_of_derived_uses_dependency_order_not_schema_order() {
        let mut schema = FormSchema::new();
        // Consumer placed before its producer in the schema.
        let total = schema.add_field(FieldType::Number);
        let subtotal = schema.add_field(FieldType::Number);
        let qty = schema.add_field(FieldType::Number);
        derive_from(&mut schema, &total, &[&subtotal]);
        derive_from(&mut schema, &subtotal, &[&qty]);

        assert_eq!(resolve(&schema), Ok(vec![subtotal, total]));
    }
}
