//! ADAE Agents - Query Pipeline
//!
//! Turns a natural-language question into a list of subjects:
//! - `RuleBasedResolver` maps questions to intents with a keyword table
//! - `QueryExecutor` filters the dataset and collects distinct subjects
//! - `ClinicalDataAgent` wires a resolver to a loaded dataset
//! - `ReportSink` implementations render batch runs as text or JSON lines

pub mod agent;
pub mod executor;
pub mod report;
pub mod rule;

pub use agent::{ClinicalDataAgent, QueryOutcome};
pub use executor::QueryExecutor;
pub use report::{
    BatchSummary, JsonLinesWriter, NullSink, ReportSink, ReportWriter, RunHeader, TeeWriter,
};
pub use rule::{Keyword, KeywordRule, RuleBasedResolver};
