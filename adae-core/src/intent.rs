//! Structured intents and query results

use crate::error::ExtractionError;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};

/// A validated `(column, value)` filter derived from a question.
///
/// The only way to obtain one is through a schema check, so `target_column`
/// is always a key of the schema it was built against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Intent {
    target_column: String,
    filter_value: String,
}

impl Intent {
    /// Build an intent, rejecting columns outside `schema`.
    pub fn new(
        schema: &Schema,
        target_column: impl Into<String>,
        filter_value: impl Into<String>,
    ) -> Result<Self, ExtractionError> {
        let target_column = target_column.into();
        schema.validate_column(&target_column)?;
        Ok(Self {
            target_column,
            filter_value: filter_value.into(),
        })
    }

    pub fn target_column(&self) -> &str {
        &self.target_column
    }

    pub fn filter_value(&self) -> &str {
        &self.filter_value
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} == {}", self.target_column, self.filter_value)
    }
}

/// Wire shape emitted by extraction backends.
///
/// Both fields are required and nothing else is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntentPayload {
    pub target_column: String,
    pub filter_value: String,
}

impl IntentPayload {
    pub fn validate(self, schema: &Schema) -> Result<Intent, ExtractionError> {
        Intent::new(schema, self.target_column, self.filter_value)
    }
}

impl From<&Intent> for IntentPayload {
    fn from(intent: &Intent) -> Self {
        Self {
            target_column: intent.target_column.clone(),
            filter_value: intent.filter_value.clone(),
        }
    }
}

/// Outcome of executing an intent against a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub intent: Intent,
    /// Number of distinct subjects among matching rows
    pub subject_count: usize,
    /// Distinct subject identifiers in first-occurrence order
    pub matching_ids: Vec<String>,
}

impl QueryResult {
    /// Build a result; `subject_count` always mirrors `matching_ids`.
    pub fn new(intent: Intent, matching_ids: Vec<String>) -> Self {
        Self {
            subject_count: matching_ids.len(),
            intent,
            matching_ids,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.matching_ids.is_empty()
    }
}
