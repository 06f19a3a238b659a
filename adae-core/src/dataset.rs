//! Adverse-event dataset
//!
//! Rows are string-typed. A column missing from a row is a null value.
//! Schema columns are upper-cased once at construction so every later
//! comparison is case-insensitive by construction; the subject identifier is
//! left exactly as loaded.

use crate::constants::SUBJECT_ID_COLUMN;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One adverse-event record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    values: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.values.insert(column.into(), value.into());
    }

    /// Value for `column`, or `None` when null.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values.get(column).map(String::as_str)
    }

    pub fn subject_id(&self) -> Option<&str> {
        self.get(SUBJECT_ID_COLUMN)
    }

    fn normalize(&mut self, schema: &Schema) {
        for column in schema.columns() {
            if let Some(value) = self.values.get_mut(&column.name) {
                *value = value.to_uppercase();
            }
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Ordered, read-only table of adverse-event rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, upper-casing every schema column present in `rows`.
    pub fn new(schema: &Schema, columns: Vec<String>, mut rows: Vec<Row>) -> Self {
        for row in &mut rows {
            row.normalize(schema);
        }
        Self { columns, rows }
    }

    /// Zero-row table carrying the subject column plus every schema column.
    pub fn empty(schema: &Schema) -> Self {
        let mut columns = vec![SUBJECT_ID_COLUMN.to_string()];
        columns.extend(schema.column_names());
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, sev: &str, term: &str) -> Row {
        Row::new()
            .with("USUBJID", id)
            .with("AESEV", sev)
            .with("AETERM", term)
    }

    #[test]
    fn test_new_uppercases_schema_columns_only() {
        let dataset = Dataset::new(
            &Schema::adae(),
            vec!["USUBJID".into(), "AESEV".into(), "AETERM".into(), "SITE".into()],
            vec![row("site-01-s1", "mild", "Headache").with("SITE", "berlin")],
        );
        let r = &dataset.rows()[0];
        assert_eq!(r.get("AESEV"), Some("MILD"));
        assert_eq!(r.get("AETERM"), Some("HEADACHE"));
        assert_eq!(r.subject_id(), Some("site-01-s1"));
        assert_eq!(r.get("SITE"), Some("berlin"));
    }

    #[test]
    fn test_missing_value_is_null() {
        let r = Row::new().with("USUBJID", "S1");
        assert_eq!(r.get("AESOC"), None);
    }

    #[test]
    fn test_empty_dataset_has_expected_columns() {
        let dataset = Dataset::empty(&Schema::adae());
        assert!(dataset.is_empty());
        assert_eq!(dataset.columns(), &["USUBJID", "AESEV", "AETERM", "AESOC"]);
    }

    #[test]
    fn test_row_from_iter() {
        let r: Row = [("USUBJID", "S9"), ("AESEV", "SEVERE")].into_iter().collect();
        assert_eq!(r.subject_id(), Some("S9"));
        assert_eq!(r.get("AESEV"), Some("SEVERE"));
    }
}
