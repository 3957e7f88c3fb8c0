//! Field validation rule engine
//!
//! A pure mapping from (value, rule set) to a list of human-readable
//! violation reasons. Validation never fails and never short-circuits:
//! every applicable rule runs and violations accumulate in a fixed order —
//! notEmpty, minLength, maxLength, email, passwordRule. Consumers may assert
//! on the order, not just set membership.
//!
//! The same engine runs in the builder (rule preview) and the fill runtime
//! (per-edit and on-submit checks), so a value is judged identically in both.

use once_cell::sync::Lazy;
use regex::Regex;

use formsmith_schema::{Field, ValidationRules, Value};

/// One-or-more non-whitespace/non-`@` chars, `@`, same, `.`, same.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Check a value against a rule set. Returns violation reasons in the fixed
/// rule order; an empty vector means the value passes.
///
/// Length rules apply only to text values — applying `minLength` or
/// `maxLength` to a non-text value is a no-op, not a fault. The email and
/// password rules test the value's string rendition, so an empty or missing
/// value fails them (same coercion the legacy browser builder applied).
pub fn validate(value: &Value, rules: &ValidationRules) -> Vec<String> {
    let mut violations = Vec::new();

    if rules.not_empty == Some(true) && value.is_empty_like() {
        violations.push("This field is required".to_string());
    }

    if let Some(min) = rules.min_length {
        if min > 0 {
            if let Value::Text(s) = value {
                if s.chars().count() < min as usize {
                    violations.push(format!("Minimum length is {min}"));
                }
            }
        }
    }

    if let Some(max) = rules.max_length {
        if max > 0 {
            if let Value::Text(s) = value {
                if s.chars().count() > max as usize {
                    violations.push(format!("Maximum length is {max}"));
                }
            }
        }
    }

    if rules.email == Some(true) && !EMAIL_RE.is_match(&value.to_string()) {
        violations.push("Invalid email format".to_string());
    }

    if rules.password_rule == Some(true) {
        let s = value.to_string();
        if s.chars().count() < 8 || !s.chars().any(|c| c.is_ascii_digit()) {
            violations.push("Password must be min 8 chars and contain a number".to_string());
        }
    }

    violations
}

/// Check a value against a field's rule set. A field without rules has no
/// constraint and produces no violations.
pub fn validate_field(value: &Value, field: &Field) -> Vec<String> {
    match &field.validation {
        Some(rules) => validate(value, rules),
        None => Vec::new(),
    }
}
