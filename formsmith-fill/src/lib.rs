//! Fill-in runtime for a loaded form schema
//!
//! A [`FillSession`] owns a schema and a mutable value binding map for one
//! data-entry pass. Every user edit runs the same synchronous cycle: write
//! the value, recompute every derived field in dependency order, re-validate
//! the edited field. Submission validates every field and surfaces any
//! dependency fault as a distinct error rather than an empty violation map.
//!
//! One session owns one schema at a time; dropping the session (or replacing
//! it when the user switches records) is the unload transition.

pub mod error;
pub mod session;

pub use error::{FillError, Result};
pub use session::{FillSession, SubmitReport};
