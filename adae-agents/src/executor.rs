//! Query executor
//!
//! Applies a validated intent to a dataset: case-insensitive substring
//! filter on the target column, then the distinct subject identifiers of
//! matching rows in first-occurrence order. Read-only.

use adae_core::{ContainsMatcher, Dataset, Intent, QueryResult};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryExecutor;

impl QueryExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn execute(&self, intent: Intent, dataset: &Dataset) -> QueryResult {
        let matcher = ContainsMatcher::new(intent.filter_value());
        let column = intent.target_column();

        let mut seen = HashSet::new();
        let mut matching_ids = Vec::new();
        let mut matched_rows = 0usize;

        for row in dataset.rows() {
            if !matcher.matches(row.get(column)) {
                continue;
            }
            matched_rows += 1;
            // A row without a subject identifier contributes nothing.
            if let Some(id) = row.subject_id() {
                if seen.insert(id) {
                    matching_ids.push(id.to_string());
                }
            }
        }

        tracing::info!(
            column = %column,
            value = %intent.filter_value(),
            matched_rows,
            subjects = matching_ids.len(),
            "Executed intent"
        );

        QueryResult::new(intent, matching_ids)
    }
}
