//! Sandboxed formula parser and evaluator
//!
//! Derived fields compute their value from a small formula language over
//! named parent bindings: numeric and string literals, identifier references,
//! the four arithmetic operators, comparisons, and parentheses. Formulas are
//! parsed into an expression tree and interpreted recursively over the
//! supplied bindings only — no host-language evaluation, no access to
//! anything outside the binding map.
//!
//! Evaluation is deterministic and pure: the same formula and bindings
//! always produce the same result. The total entry point [`evaluate`]
//! degrades every fault (parse error, unknown reference, type mismatch,
//! non-finite arithmetic) to [`Value::Empty`], which callers treat as
//! "no value" — distinct from a validation failure. [`try_evaluate`] exposes
//! the precise [`FormulaError`] instead.

pub mod ast;
pub mod error;
pub mod eval;
pub mod parse;
pub mod token;

pub use ast::{BinOp, Expr};
pub use error::{FormulaError, Result};
pub use eval::{evaluate, try_evaluate};
pub use parse::parse;
