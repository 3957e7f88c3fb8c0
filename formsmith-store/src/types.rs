//! Saved-form record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use formsmith_schema::FormSchema;

/// One saved form: a user-chosen name plus the schema snapshot.
///
/// The wire shape is `{name, createdAt, schema: [...]}`, the exact record
/// format the legacy browser builder wrote to its `savedForms` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormRecord {
    pub name: String,

    pub schema: FormSchema,

    /// Absent on records predating timestamps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl FormRecord {
    /// Snapshot a schema under a name, stamped with the current time.
    pub fn new(name: impl Into<String>, schema: FormSchema) -> Self {
        FormRecord {
            name: name.into(),
            schema,
            created_at: Some(Utc::now()),
        }
    }
}

/// Listing row for a saved form, cheap to show without the full schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub name: String,
    pub field_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&FormRecord> for FormSummary {
    fn from(record: &FormRecord) -> Self {
        FormSummary {
            name: record.name.clone(),
            field_count: record.schema.len(),
            created_at: record.created_at,
        }
    }
}
