//! Filterable schema
//!
//! The schema enumerates the only columns an intent may target, each with a
//! human-readable description that model-backed resolvers receive as context.

use crate::constants::{ORGAN_CLASS_COLUMN, SEVERITY_COLUMN, TERM_COLUMN};
use crate::error::{ConfigError, ExtractionError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reference adverse-event schema (severity, term, organ class).
pub static ADAE_SCHEMA: Lazy<Schema> = Lazy::new(Schema::adae);

/// A single filterable column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Column name as it appears in the dataset header
    pub name: String,
    /// Semantic description handed to extraction backends
    pub description: String,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Ordered set of filterable columns.
///
/// Deserializes from a column list through `Schema::new`, so the empty and
/// duplicate checks always apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SchemaColumn>", into = "Vec<SchemaColumn>")]
pub struct Schema {
    columns: Vec<SchemaColumn>,
}

impl TryFrom<Vec<SchemaColumn>> for Schema {
    type Error = ConfigError;

    fn try_from(columns: Vec<SchemaColumn>) -> Result<Self, Self::Error> {
        Schema::new(columns)
    }
}

impl From<Schema> for Vec<SchemaColumn> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

impl Schema {
    /// Build a schema from explicit columns.
    ///
    /// Rejects an empty column list and duplicate column names.
    pub fn new(columns: Vec<SchemaColumn>) -> Result<Self, ConfigError> {
        if columns.is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "schema.columns".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "schema.columns.name".to_string(),
                    value: column.name.clone(),
                    reason: "must not be empty".to_string(),
                });
            }
            if !seen.insert(column.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "schema.columns.name".to_string(),
                    value: column.name.clone(),
                    reason: "duplicate column".to_string(),
                });
            }
        }

        Ok(Self { columns })
    }

    /// The reference three-column adverse-event schema.
    pub fn adae() -> Self {
        Self {
            columns: vec![
                SchemaColumn::new(
                    SEVERITY_COLUMN,
                    "Severity or intensity (e.g., MILD, MODERATE, SEVERE).",
                ),
                SchemaColumn::new(
                    TERM_COLUMN,
                    "Specific condition term (e.g., HEADACHE, NAUSEA, DIZZINESS).",
                ),
                SchemaColumn::new(
                    ORGAN_CLASS_COLUMN,
                    "Primary body system/organ class (e.g., CARDIAC DISORDERS).",
                ),
            ],
        }
    }

    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn description(&self, name: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.description.as_str())
    }

    /// Look up a column, failing with `UnknownColumn` when it is not a key.
    pub fn validate_column(&self, name: &str) -> Result<&SchemaColumn, ExtractionError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ExtractionError::UnknownColumn {
                column: name.to_string(),
                allowed: self.column_names(),
            })
    }

    /// Render the column -> description mapping for a prompt.
    pub fn context(&self) -> String {
        self.columns
            .iter()
            .map(|c| format!("- {}: {}", c.name, c.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::adae()
    }
}
