//! Persistent store for saved form schemas
//!
//! Saved forms are named schema snapshots in a single JSON array on disk,
//! addressed by position. Writes go through a temp file and rename so a
//! crash mid-save never corrupts the existing file. The on-disk shape is
//! backwards compatible with records written by the earlier browser-based
//! builder.

pub mod error;
pub mod store;
pub mod types;

pub use error::{Result, StoreError};
pub use store::FormStore;
pub use types::{FormRecord, FormSummary};
