//! Recursive interpreter over the expression tree and a binding map.

use std::collections::BTreeMap;

use tracing::debug;

use formsmith_schema::Value;

use crate::ast::{BinOp, Expr};
use crate::error::{FormulaError, Result};
use crate::parse::parse;

/// Evaluate a formula against the given bindings, reporting the precise
/// fault on failure.
pub fn try_evaluate(formula: &str, bindings: &BTreeMap<String, Value>) -> Result<Value> {
    let expr = parse(formula)?;
    let value = eval_expr(&expr, bindings)?;
    if let Value::Number(n) = value {
        if !n.is_finite() {
            return Err(FormulaError::NonFinite);
        }
    }
    Ok(value)
}

/// Evaluate a formula against the given bindings. Total: every fault
/// degrades to [`Value::Empty`], which callers display as "no value".
pub fn evaluate(formula: &str, bindings: &BTreeMap<String, Value>) -> Value {
    match try_evaluate(formula, bindings) {
        Ok(value) => value,
        Err(error) => {
            debug!(%error, "formula evaluation degraded to empty");
            Value::Empty
        }
    }
}

fn eval_expr(expr: &Expr, bindings: &BTreeMap<String, Value>) -> Result<Value> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Text(s) => Ok(Value::Text(s.clone())),
        Expr::Ref(name) => match bindings.get(name) {
            None => Err(FormulaError::UnknownReference { name: name.clone() }),
            Some(Value::Empty) => Err(FormulaError::EmptyReference { name: name.clone() }),
            Some(value) => Ok(value.clone()),
        },
        Expr::Neg(inner) => match eval_expr(inner, bindings)? {
            Value::Number(n) => Ok(Value::Number(-n)),
            _ => Err(FormulaError::TypeMismatch { op: "-" }),
        },
        Expr::Binary { op, lhs, rhs } => {
            let lhs = eval_expr(lhs, bindings)?;
            let rhs = eval_expr(rhs, bindings)?;
            apply(*op, lhs, rhs)
        }
    }
}

fn apply(op: BinOp, lhs: Value, rhs: Value) -> Result<Value> {
    match op {
        BinOp::Add => add(lhs, rhs),
        BinOp::Sub | BinOp::Mul | BinOp::Div => {
            let (Some(a), Some(b)) = (lhs.as_number(), rhs.as_number()) else {
                return Err(FormulaError::TypeMismatch { op: op.symbol() });
            };
            let n = match op {
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                _ => a / b,
            };
            Ok(Value::Number(n))
        }
        BinOp::Eq => Ok(Value::Bool(structurally_equal(&lhs, &rhs))),
        BinOp::Ne => Ok(Value::Bool(!structurally_equal(&lhs, &rhs))),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let ordering = match (&lhs, &rhs) {
                (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
                (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
                _ => return Err(FormulaError::TypeMismatch { op: op.symbol() }),
            };
            // NaN comparisons are simply false, never a fault.
            let result = ordering.map_or(false, |ord| match op {
                BinOp::Lt => ord.is_lt(),
                BinOp::Le => ord.is_le(),
                BinOp::Gt => ord.is_gt(),
                _ => ord.is_ge(),
            });
            Ok(Value::Bool(result))
        }
    }
}

/// `+` adds numbers; with at least one text operand it concatenates string
/// renditions, which keeps string-valued parents working the way the legacy
/// substitution-based formulas did.
fn add(lhs: Value, rhs: Value) -> Result<Value> {
    match (&lhs, &rhs) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
        (Value::Text(_), _) | (_, Value::Text(_)) => {
            Ok(Value::Text(format!("{lhs}{rhs}")))
        }
        _ => Err(FormulaError::TypeMismatch { op: "+" }),
    }
}

fn structurally_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Text(a), Value::Text(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        _ => false,
    }
}
