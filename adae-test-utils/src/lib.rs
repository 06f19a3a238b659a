//! ADAE Test Utilities
//!
//! Centralized test infrastructure for the ADAE workspace:
//! - Proptest generators for rows, datasets, intents and questions
//! - Fixtures for the reference adverse-event scenario
//! - Custom assertions for pipeline invariants

// Re-export mocks from their source crates
pub use adae_llm::MockCompletionProvider;
pub use adae_storage::InMemoryDatasetSource;

// Re-export core types for convenience
pub use adae_core::{
    AdaeError, AdaeResult, ContainsMatcher, Dataset, ExtractionError, Intent, LlmError,
    QueryResult, Row, Schema, ORGAN_CLASS_COLUMN, SEVERITY_COLUMN, SUBJECT_ID_COLUMN, TERM_COLUMN,
};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for generating ADAE values.

    use super::*;
    use proptest::prelude::*;

    /// Subject identifiers drawn from a small pool so duplicates are common.
    pub fn arb_subject_id() -> impl Strategy<Value = String> {
        (1u8..=12).prop_map(|n| format!("S{}", n))
    }

    /// Severity grade in arbitrary letter case.
    pub fn arb_severity() -> impl Strategy<Value = String> {
        prop_oneof![Just("MILD"), Just("Moderate"), Just("severe"), Just("Severe")]
            .prop_map(String::from)
    }

    /// Adverse-event term, mostly from a known vocabulary.
    pub fn arb_term() -> impl Strategy<Value = String> {
        prop_oneof![
            3 => prop_oneof![
                Just("HEADACHE"),
                Just("Nausea"),
                Just("dizziness"),
                Just("SEVERE HEADACHE"),
                Just("RASH"),
            ]
            .prop_map(String::from),
            1 => "[A-Za-z ]{1,16}",
        ]
    }

    pub fn arb_organ_class() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("CARDIAC DISORDERS"),
            Just("Nervous system disorders"),
            Just("SKIN AND SUBCUTANEOUS TISSUE DISORDERS"),
            Just("GASTROINTESTINAL DISORDERS"),
        ]
        .prop_map(String::from)
    }

    /// A row where every schema value may be null.
    pub fn arb_row() -> impl Strategy<Value = Row> {
        (
            arb_subject_id(),
            proptest::option::of(arb_severity()),
            proptest::option::of(arb_term()),
            proptest::option::of(arb_organ_class()),
        )
            .prop_map(|(id, severity, term, soc)| {
                let mut row = Row::new().with(SUBJECT_ID_COLUMN, id);
                if let Some(v) = severity {
                    row.insert(SEVERITY_COLUMN, v);
                }
                if let Some(v) = term {
                    row.insert(TERM_COLUMN, v);
                }
                if let Some(v) = soc {
                    row.insert(ORGAN_CLASS_COLUMN, v);
                }
                row
            })
    }

    /// A normalized dataset of up to 40 rows.
    pub fn arb_dataset() -> impl Strategy<Value = Dataset> {
        prop::collection::vec(arb_row(), 0..40).prop_map(|rows| {
            let schema = Schema::adae();
            Dataset::new(&schema, Dataset::empty(&schema).columns().to_vec(), rows)
        })
    }

    pub fn arb_column() -> impl Strategy<Value = String> {
        prop::sample::select(Schema::adae().column_names())
    }

    /// Filter values: known fragments in mixed case, the sentinel, or empty.
    pub fn arb_filter_value() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("headache"),
            Just("HEAD"),
            Just("Nausea"),
            Just("mild"),
            Just("SEVERE"),
            Just("cardiac"),
            Just("disorders"),
            Just("UNKNOWN"),
            Just(""),
        ]
        .prop_map(String::from)
    }

    pub fn arb_intent() -> impl Strategy<Value = Intent> {
        (arb_column(), arb_filter_value()).prop_map(|(column, value)| {
            Intent::new(&Schema::adae(), &column, &value).expect("generated column is in schema")
        })
    }

    /// Free-form question text, including non-ASCII.
    pub fn arb_question() -> impl Strategy<Value = String> {
        prop_oneof![
            "\\PC{0,80}",
            "[A-Za-z ,.?]{0,60}",
            Just("Which subjects experienced a Headache?".to_string()),
        ]
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for the reference scenario.

    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// CSV text for the three-row scenario: S1 twice with HEADACHE, S2 with NAUSEA.
    pub const SCENARIO_CSV: &str = "\
USUBJID,AESEV,AETERM,AESOC
S1,MODERATE,HEADACHE,NERVOUS SYSTEM DISORDERS
S2,MILD,NAUSEA,GASTROINTESTINAL DISORDERS
S1,SEVERE,HEADACHE,NERVOUS SYSTEM DISORDERS
";

    pub use adae_core::DEFAULT_QUESTIONS as REFERENCE_QUESTIONS;

    pub fn scenario_rows() -> Vec<Row> {
        vec![
            Row::new()
                .with(SUBJECT_ID_COLUMN, "S1")
                .with(SEVERITY_COLUMN, "MODERATE")
                .with(TERM_COLUMN, "HEADACHE")
                .with(ORGAN_CLASS_COLUMN, "NERVOUS SYSTEM DISORDERS"),
            Row::new()
                .with(SUBJECT_ID_COLUMN, "S2")
                .with(SEVERITY_COLUMN, "MILD")
                .with(TERM_COLUMN, "NAUSEA")
                .with(ORGAN_CLASS_COLUMN, "GASTROINTESTINAL DISORDERS"),
            Row::new()
                .with(SUBJECT_ID_COLUMN, "S1")
                .with(SEVERITY_COLUMN, "SEVERE")
                .with(TERM_COLUMN, "HEADACHE")
                .with(ORGAN_CLASS_COLUMN, "NERVOUS SYSTEM DISORDERS"),
        ]
    }

    pub fn scenario_dataset() -> Dataset {
        let schema = Schema::adae();
        Dataset::new(
            &schema,
            Dataset::empty(&schema).columns().to_vec(),
            scenario_rows(),
        )
    }

    pub fn scenario_source() -> InMemoryDatasetSource {
        InMemoryDatasetSource::with_schema_columns(&Schema::adae(), scenario_rows())
    }

    /// Write `contents` to a temporary `.csv` file.
    pub fn write_csv(contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp csv");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        file.flush().expect("flush temp csv");
        file
    }

    /// Mock provider that answers with a fixed intent object.
    pub fn mock_intent_provider(column: &str, value: &str) -> MockCompletionProvider {
        MockCompletionProvider::always(format!(
            r#"{{"target_column": "{}", "filter_value": "{}"}}"#,
            column, value
        ))
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for pipeline invariants.

    use super::*;
    use std::collections::HashSet;

    /// Assert that identifiers are distinct and the count matches.
    #[track_caller]
    pub fn assert_distinct_ids(result: &QueryResult) {
        let unique: HashSet<&String> = result.matching_ids.iter().collect();
        assert_eq!(
            unique.len(),
            result.matching_ids.len(),
            "Duplicate subject ids: {:?}",
            result.matching_ids
        );
        assert_eq!(
            result.subject_count,
            result.matching_ids.len(),
            "subject_count does not match ids"
        );
    }

    /// Assert that ids are exactly the subjects of the rows matching the
    /// result's intent, in the order of each subject's first matching row.
    ///
    /// Non-matching rows never fix a subject's position.
    #[track_caller]
    pub fn assert_first_occurrence_order(result: &QueryResult, dataset: &Dataset) {
        let matcher = ContainsMatcher::new(result.intent.filter_value());
        let column = result.intent.target_column();
        let mut expected: Vec<&str> = Vec::new();
        for id in dataset
            .rows()
            .iter()
            .filter(|row| matcher.matches(row.get(column)))
            .filter_map(Row::subject_id)
        {
            if !expected.contains(&id) {
                expected.push(id);
            }
        }
        assert_eq!(result.matching_ids, expected, "ids out of first-occurrence order");
    }

    /// Assert that an intent targets a schema column.
    #[track_caller]
    pub fn assert_in_schema(intent: &Intent) {
        assert!(
            Schema::adae().contains(intent.target_column()),
            "Intent targets unknown column {}",
            intent.target_column()
        );
    }

    /// Assert that a result is an extraction failure.
    #[track_caller]
    pub fn assert_extraction_failure<T: std::fmt::Debug>(result: &AdaeResult<T>) {
        match result {
            Err(e) if e.is_extraction_failure() => {}
            other => panic!("Expected extraction failure, got: {:?}", other),
        }
    }

    /// Assert that a result is a timeout.
    #[track_caller]
    pub fn assert_timeout<T: std::fmt::Debug>(result: &AdaeResult<T>) {
        match result {
            Err(AdaeError::Extraction(ExtractionError::Timeout { .. })) => {}
            other => panic!("Expected Timeout, got: {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::assertions::*;
    use super::fixtures::*;
    use super::*;
    use adae_storage::{CsvDatasetSource, DatasetSource};

    #[test]
    fn test_scenario_csv_matches_rows() {
        let file = write_csv(SCENARIO_CSV);
        let loaded = CsvDatasetSource::new(file.path())
            .load(&Schema::adae())
            .unwrap();
        assert_eq!(loaded.rows(), scenario_dataset().rows());
    }

    #[test]
    fn test_assert_distinct_ids_accepts_valid() {
        let intent = Intent::new(&Schema::adae(), "AETERM", "HEADACHE").unwrap();
        assert_distinct_ids(&QueryResult::new(intent, vec!["S1".into(), "S2".into()]));
    }

    fn late_match_dataset() -> Dataset {
        let schema = Schema::adae();
        let rows = vec![
            Row::new().with(SUBJECT_ID_COLUMN, "S2").with(TERM_COLUMN, "NAUSEA"),
            Row::new().with(SUBJECT_ID_COLUMN, "S1").with(TERM_COLUMN, "HEADACHE"),
            Row::new().with(SUBJECT_ID_COLUMN, "S2").with(TERM_COLUMN, "HEADACHE"),
        ];
        Dataset::new(&schema, Dataset::empty(&schema).columns().to_vec(), rows)
    }

    #[test]
    fn test_order_ignores_earlier_non_matching_rows() {
        let intent = Intent::new(&Schema::adae(), "AETERM", "HEADACHE").unwrap();
        let result = QueryResult::new(intent, vec!["S1".into(), "S2".into()]);
        assert_first_occurrence_order(&result, &late_match_dataset());
    }

    #[test]
    #[should_panic(expected = "first-occurrence order")]
    fn test_order_rejects_row_order_of_non_matches() {
        let intent = Intent::new(&Schema::adae(), "AETERM", "HEADACHE").unwrap();
        let result = QueryResult::new(intent, vec!["S2".into(), "S1".into()]);
        assert_first_occurrence_order(&result, &late_match_dataset());
    }

    #[test]
    #[should_panic]
    fn test_assert_distinct_ids_rejects_duplicates() {
        let intent = Intent::new(&Schema::adae(), "AETERM", "HEADACHE").unwrap();
        assert_distinct_ids(&QueryResult::new(intent, vec!["S1".into(), "S1".into()]));
    }
}
