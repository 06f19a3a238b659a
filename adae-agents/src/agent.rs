//! Clinical data agent
//!
//! Owns one resolver and one loaded dataset for the lifetime of a session.
//! `execute_query` is the single public entry point: resolve the question,
//! execute the intent, return the result. An extraction failure is surfaced
//! as an error, never as an empty result.

use crate::executor::QueryExecutor;
use crate::report::{BatchSummary, ReportSink, RunHeader};
use adae_core::{
    AdaeResult, Dataset, ExtractionError, Intent, IntentResolver, QueryResult, Schema,
};
use adae_storage::{load_or_empty, DatasetSource};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// Result of one question in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    /// 1-based position in the batch
    pub index: usize,
    pub question: String,
    pub result: AdaeResult<QueryResult>,
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Natural-language query session over an adverse-event dataset.
pub struct ClinicalDataAgent {
    resolver: Arc<dyn IntentResolver>,
    dataset: Arc<Dataset>,
    executor: QueryExecutor,
    resolve_timeout: Option<Duration>,
}

impl ClinicalDataAgent {
    pub fn new(resolver: Arc<dyn IntentResolver>, dataset: Dataset) -> Self {
        Self::with_shared_dataset(resolver, Arc::new(dataset))
    }

    /// Share one loaded dataset between several agents.
    pub fn with_shared_dataset(resolver: Arc<dyn IntentResolver>, dataset: Arc<Dataset>) -> Self {
        Self {
            resolver,
            dataset,
            executor: QueryExecutor::new(),
            resolve_timeout: None,
        }
    }

    /// Load the dataset from `source`, falling back to an empty table when
    /// the source does not exist.
    pub fn from_source(
        resolver: Arc<dyn IntentResolver>,
        source: &dyn DatasetSource,
        schema: &Schema,
    ) -> AdaeResult<Self> {
        let dataset = load_or_empty(source, schema)?;
        Ok(Self::new(resolver, dataset))
    }

    /// Bound the time spent resolving each question.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        self.resolve_timeout = Some(timeout);
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn backend_name(&self) -> &str {
        self.resolver.backend_name()
    }

    async fn resolve(&self, question: &str) -> AdaeResult<Intent> {
        match self.resolve_timeout {
            Some(limit) => tokio::time::timeout(limit, self.resolver.resolve(question))
                .await
                .map_err(|_| ExtractionError::Timeout {
                    timeout_ms: limit.as_millis() as u64,
                })?,
            None => self.resolver.resolve(question).await,
        }
    }

    /// Answer one question.
    pub async fn execute_query(&self, question: &str) -> AdaeResult<QueryResult> {
        let intent = match self.resolve(question).await {
            Ok(intent) => intent,
            Err(e) => {
                tracing::error!(
                    backend = %self.backend_name(),
                    question = %question,
                    error = %e,
                    "Intent extraction failed"
                );
                return Err(e);
            }
        };
        tracing::info!(backend = %self.backend_name(), intent = %intent, "Resolved intent");

        Ok(self.executor.execute(intent, &self.dataset))
    }

    /// Answer each question in order, reporting to `sink`.
    ///
    /// A failed question is recorded and the batch moves on. Sink write
    /// failures are logged and never abort the batch.
    pub async fn run_batch<S: AsRef<str>>(
        &self,
        questions: &[S],
        sink: &mut dyn ReportSink,
    ) -> Vec<QueryOutcome> {
        let header = RunHeader {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            backend: self.backend_name().to_string(),
            dataset_rows: self.dataset.len(),
        };
        tracing::info!(run_id = %header.run_id, questions = questions.len(), "Starting batch");
        if let Err(e) = sink.begin(&header) {
            tracing::warn!(error = %e, "Report sink failed on begin");
        }

        let mut outcomes = Vec::with_capacity(questions.len());
        for (i, question) in questions.iter().enumerate() {
            let question = question.as_ref();
            let outcome = QueryOutcome {
                index: i + 1,
                question: question.to_string(),
                result: self.execute_query(question).await,
            };
            if let Err(e) = sink.record(&outcome) {
                tracing::warn!(error = %e, index = outcome.index, "Report sink failed on record");
            }
            outcomes.push(outcome);
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let summary = BatchSummary {
            run_id: header.run_id,
            finished_at: Utc::now(),
            succeeded,
            failed: outcomes.len() - succeeded,
        };
        tracing::info!(
            run_id = %summary.run_id,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Batch complete"
        );
        if let Err(e) = sink.finish(&summary) {
            tracing::warn!(error = %e, "Report sink failed on finish");
        }

        outcomes
    }
}

impl std::fmt::Debug for ClinicalDataAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClinicalDataAgent")
            .field("backend", &self.backend_name())
            .field("rows", &self.dataset.len())
            .field("resolve_timeout", &self.resolve_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::NullSink;
    use crate::rule::RuleBasedResolver;
    use adae_core::{AdaeError, Row};
    use adae_storage::{CsvDatasetSource, InMemoryDatasetSource};

    fn scenario() -> Dataset {
        let schema = Schema::adae();
        let rows = vec![
            Row::new()
                .with("USUBJID", "S1")
                .with("AESEV", "MODERATE")
                .with("AETERM", "HEADACHE")
                .with("AESOC", "NERVOUS SYSTEM DISORDERS"),
            Row::new()
                .with("USUBJID", "S2")
                .with("AESEV", "MILD")
                .with("AETERM", "NAUSEA")
                .with("AESOC", "GASTROINTESTINAL DISORDERS"),
            Row::new()
                .with("USUBJID", "S1")
                .with("AESEV", "SEVERE")
                .with("AETERM", "HEADACHE")
                .with("AESOC", "NERVOUS SYSTEM DISORDERS"),
        ];
        Dataset::new(&schema, Dataset::empty(&schema).columns().to_vec(), rows)
    }

    fn agent() -> ClinicalDataAgent {
        ClinicalDataAgent::new(Arc::new(RuleBasedResolver::adae()), scenario())
    }

    #[tokio::test]
    async fn test_execute_query_headache() {
        let result = agent()
            .execute_query("Which subjects experienced a Headache?")
            .await
            .unwrap();
        assert_eq!(result.intent.to_string(), "AETERM == HEADACHE");
        assert_eq!(result.subject_count, 1);
        assert_eq!(result.matching_ids, vec!["S1"]);
    }

    #[tokio::test]
    async fn test_execute_query_unknown_is_empty_success() {
        let result = agent()
            .execute_query("Find subjects with Diarrhoea.")
            .await
            .unwrap();
        assert_eq!(result.intent.filter_value(), "UNKNOWN");
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_from_missing_source_gives_empty_dataset() {
        let source = CsvDatasetSource::new("/nonexistent/adae.csv");
        let agent = ClinicalDataAgent::from_source(
            Arc::new(RuleBasedResolver::adae()),
            &source,
            &Schema::adae(),
        )
        .unwrap();
        assert!(agent.dataset().is_empty());
        let result = agent.execute_query("moderate?").await.unwrap();
        assert_eq!(result.subject_count, 0);
    }

    #[tokio::test]
    async fn test_from_in_memory_source() {
        let schema = Schema::adae();
        let source = InMemoryDatasetSource::with_schema_columns(
            &schema,
            vec![Row::new().with("USUBJID", "S7").with("AESOC", "cardiac disorders")],
        );
        let agent =
            ClinicalDataAgent::from_source(Arc::new(RuleBasedResolver::adae()), &source, &schema)
                .unwrap();
        let result = agent.execute_query("cardiac events").await.unwrap();
        assert_eq!(result.matching_ids, vec!["S7"]);
    }

    #[tokio::test]
    async fn test_run_batch_counts() {
        let outcomes = agent()
            .run_batch(
                &[
                    "Give me the subjects who had Adverse events of Moderate severity.",
                    "Which subjects experienced a Headache?",
                    "Find subjects with Diarrhoea.",
                ],
                &mut NullSink,
            )
            .await;
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(QueryOutcome::is_success));
        assert_eq!(outcomes[0].index, 1);
        assert_eq!(outcomes[2].index, 3);
        assert_eq!(outcomes[0].result.as_ref().unwrap().matching_ids, vec!["S1"]);
    }

    #[test]
    fn test_timeout_error_shape() {
        let err: AdaeError = ExtractionError::Timeout { timeout_ms: 5 }.into();
        assert!(err.is_extraction_failure());
    }
}
