//! Batch reporting
//!
//! A `ReportSink` receives the run header, one record per question, and the
//! closing summary. `ReportWriter` renders the human-readable transcript;
//! `JsonLinesWriter` emits one JSON object per line. Either can target a
//! `TeeWriter` to mirror output to the console and a log file at once.

use crate::agent::QueryOutcome;
use adae_core::REPORT_ID_PREVIEW;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::{self, Write};
use uuid::Uuid;

const RULE: &str = "==================================================";

// ============================================================================
// RUN METADATA
// ============================================================================

/// Identity of one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunHeader {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub backend: String,
    pub dataset_rows: usize,
}

/// Totals for a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub finished_at: DateTime<Utc>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

// ============================================================================
// SINK TRAIT
// ============================================================================

/// Destination for batch progress.
pub trait ReportSink {
    fn begin(&mut self, header: &RunHeader) -> io::Result<()>;
    fn record(&mut self, outcome: &QueryOutcome) -> io::Result<()>;
    fn finish(&mut self, summary: &BatchSummary) -> io::Result<()>;
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn begin(&mut self, _header: &RunHeader) -> io::Result<()> {
        Ok(())
    }

    fn record(&mut self, _outcome: &QueryOutcome) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, _summary: &BatchSummary) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// TEXT TRANSCRIPT
// ============================================================================

/// Human-readable transcript writer.
#[derive(Debug)]
pub struct ReportWriter<W: Write> {
    out: W,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn id_preview(ids: &[String]) -> String {
    let shown = ids
        .iter()
        .take(REPORT_ID_PREVIEW)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if ids.len() > REPORT_ID_PREVIEW {
        format!("[{}] ...", shown)
    } else {
        format!("[{}]", shown)
    }
}

impl<W: Write> ReportSink for ReportWriter<W> {
    fn begin(&mut self, header: &RunHeader) -> io::Result<()> {
        writeln!(self.out, "{}", RULE)?;
        writeln!(self.out, "ADAE QUERY RUN {}", header.run_id)?;
        writeln!(
            self.out,
            "STARTED: {}  BACKEND: {}  ROWS: {}",
            header.started_at.to_rfc3339(),
            header.backend,
            header.dataset_rows
        )?;
        writeln!(self.out, "{}", RULE)?;
        self.out.flush()
    }

    fn record(&mut self, outcome: &QueryOutcome) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "QUERY {}: {}", outcome.index, outcome.question)?;
        match &outcome.result {
            Ok(result) => {
                writeln!(self.out, "-> Mapped: {}", result.intent)?;
                writeln!(
                    self.out,
                    "-> Result: Found {} unique subjects.",
                    result.subject_count
                )?;
                writeln!(self.out, "-> IDs: {}", id_preview(&result.matching_ids))?;
            }
            Err(e) => writeln!(self.out, "-> Error: {}", e)?,
        }
        self.out.flush()
    }

    fn finish(&mut self, summary: &BatchSummary) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", RULE)?;
        writeln!(
            self.out,
            "COMPLETED: {}  SUCCEEDED: {}  FAILED: {}",
            summary.finished_at.to_rfc3339(),
            summary.succeeded,
            summary.failed
        )?;
        writeln!(self.out, "{}", RULE)?;
        self.out.flush()
    }
}

// ============================================================================
// JSON LINES
// ============================================================================

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonEvent<'a> {
    Begin(&'a RunHeader),
    Query {
        index: usize,
        question: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        result: Option<&'a adae_core::QueryResult>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    Finish(&'a BatchSummary),
}

/// Machine-readable writer: one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesWriter<W: Write> {
    out: W,
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &JsonEvent<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> ReportSink for JsonLinesWriter<W> {
    fn begin(&mut self, header: &RunHeader) -> io::Result<()> {
        self.emit(&JsonEvent::Begin(header))
    }

    fn record(&mut self, outcome: &QueryOutcome) -> io::Result<()> {
        self.emit(&JsonEvent::Query {
            index: outcome.index,
            question: &outcome.question,
            result: outcome.result.as_ref().ok(),
            error: outcome.result.as_ref().err().map(ToString::to_string),
        })
    }

    fn finish(&mut self, summary: &BatchSummary) -> io::Result<()> {
        self.emit(&JsonEvent::Finish(summary))
    }
}

// ============================================================================
// TEE
// ============================================================================

/// Writer that copies every byte to two destinations.
#[derive(Debug)]
pub struct TeeWriter<A: Write, B: Write> {
    primary: A,
    secondary: B,
}

impl<A: Write, B: Write> TeeWriter<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }

    pub fn into_inner(self) -> (A, B) {
        (self.primary, self.secondary)
    }
}

impl<A: Write, B: Write> Write for TeeWriter<A, B> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.primary.write_all(buf)?;
        self.secondary.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.primary.flush()?;
        self.secondary.flush()
    }
}

// =============================================================================
// TESTS
// =============================================================================
