//! ADAE Storage - Dataset Sources
//!
//! Defines the dataset source abstraction and its implementations:
//! - `CsvDatasetSource` reads a header-first CSV file
//! - `InMemoryDatasetSource` serves rows held in memory
//!
//! `load_or_empty` implements the unavailable-dataset policy: a missing
//! source degrades to an empty, correctly shaped table.

use adae_core::{
    AdaeError, AdaeResult, Dataset, DatasetError, Row, Schema, DEFAULT_DATA_PATH,
    SUBJECT_ID_COLUMN,
};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

// ============================================================================
// DATASET SOURCE TRAIT
// ============================================================================

/// Supplier of adverse-event rows.
/// Implementations must be thread-safe (Send + Sync).
pub trait DatasetSource: Send + Sync {
    /// Load the full dataset, normalized against `schema`.
    ///
    /// # Returns
    /// * `Ok(Dataset)` - The loaded rows
    /// * `Err(AdaeError::Dataset(DatasetError::NotFound))` - If the source does not exist
    /// * `Err(AdaeError::Dataset(_))` - If the source exists but cannot be read
    fn load(&self, schema: &Schema) -> AdaeResult<Dataset>;

    /// Human-readable location for logs.
    fn describe(&self) -> String;
}

/// Load a dataset, substituting an empty table when the source is missing.
///
/// Only `NotFound` is absorbed; a source that exists but is unreadable is
/// still an error.
pub fn load_or_empty(source: &dyn DatasetSource, schema: &Schema) -> AdaeResult<Dataset> {
    match source.load(schema) {
        Ok(dataset) => {
            tracing::info!(
                source = %source.describe(),
                rows = dataset.len(),
                "Loaded adverse-event dataset"
            );
            Ok(dataset)
        }
        Err(AdaeError::Dataset(DatasetError::NotFound { path })) => {
            tracing::warn!(
                path = %path,
                "Dataset not found, continuing with an empty table"
            );
            Ok(Dataset::empty(schema))
        }
        Err(e) => Err(e),
    }
}

// ============================================================================
// CSV SOURCE
// ============================================================================

/// Dataset source backed by a CSV file with a header row.
///
/// Every cell is read as a string. Empty cells are nulls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDatasetSource {
    path: PathBuf,
}

impl CsvDatasetSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source at the conventional `data/adae.csv` location.
    pub fn default_location() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, reason: impl ToString) -> AdaeError {
        AdaeError::Dataset(DatasetError::Read {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        })
    }
}

impl DatasetSource for CsvDatasetSource {
    fn load(&self, schema: &Schema) -> AdaeResult<Dataset> {
        let file = File::open(&self.path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AdaeError::Dataset(DatasetError::NotFound {
                path: self.path.display().to_string(),
            }),
            _ => self.read_error(e),
        })?;

        read_csv(file, schema).map_err(|e| match e {
            CsvLoadError::Csv(e) => self.read_error(e),
            CsvLoadError::DuplicateHeader(column) => {
                self.read_error(format!("duplicate header column {}", column))
            }
            CsvLoadError::Dataset(e) => AdaeError::Dataset(e),
        })
    }

    fn describe(&self) -> String {
        format!("csv:{}", self.path.display())
    }
}

#[derive(Debug)]
enum CsvLoadError {
    Csv(csv::Error),
    DuplicateHeader(String),
    Dataset(DatasetError),
}

impl From<csv::Error> for CsvLoadError {
    fn from(e: csv::Error) -> Self {
        CsvLoadError::Csv(e)
    }
}

fn read_csv<R: Read>(input: R, schema: &Schema) -> Result<Dataset, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();
    let mut seen = HashSet::new();
    if let Some(duplicate) = columns.iter().find(|c| !seen.insert(c.as_str())) {
        return Err(CsvLoadError::DuplicateHeader(duplicate.clone()));
    }
    if !columns.iter().any(|c| c == SUBJECT_ID_COLUMN) {
        return Err(CsvLoadError::Dataset(DatasetError::MissingColumn {
            column: SUBJECT_ID_COLUMN.to_string(),
        }));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Row = columns
            .iter()
            .zip(record.iter())
            .filter(|(_, value)| !value.is_empty())
            .map(|(column, value)| (column.as_str(), value))
            .collect();
        rows.push(row);
    }

    Ok(Dataset::new(schema, columns, rows))
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Dataset source serving rows held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryDatasetSource {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl InMemoryDatasetSource {
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Source using the subject column plus every column of `schema`.
    pub fn with_schema_columns(schema: &Schema, rows: Vec<Row>) -> Self {
        Self::new(Dataset::empty(schema).columns().to_vec(), rows)
    }
}

impl DatasetSource for InMemoryDatasetSource {
    fn load(&self, schema: &Schema) -> AdaeResult<Dataset> {
        Ok(Dataset::new(schema, self.columns.clone(), self.rows.clone()))
    }

    fn describe(&self) -> String {
        format!("memory:{} rows", self.rows.len())
    }
}

// =============================================================================
// TESTS
// =============================================================================


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    const HEADER: [&str; 4] = ["USUBJID", "AESEV", "AETERM", "AESOC"];

    fn arb_cell() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), "[A-Za-z ,\"-]{1,12}"]
    }

    fn arb_record() -> impl Strategy<Value = Vec<String>> {
        ("S[0-9]{1,3}", arb_cell(), arb_cell(), arb_cell())
            .prop_map(|(id, sev, term, soc)| vec![id, sev, term, soc])
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Rows written with any quoting load back cell for cell, with empty
        /// cells as nulls and schema columns upper-cased.
        #[test]
        fn prop_csv_cells_survive_loading(records in prop::collection::vec(arb_record(), 0..20)) {
            let mut writer = csv::Writer::from_writer(Vec::new());
            writer.write_record(HEADER).unwrap();
            for record in &records {
                writer.write_record(record).unwrap();
            }
            let bytes = writer.into_inner().unwrap();

            let schema = Schema::adae();
            let loaded = read_csv(bytes.as_slice(), &schema).unwrap();

            let expected_rows: Vec<Row> = records
                .iter()
                .map(|record| {
                    HEADER
                        .iter()
                        .zip(record)
                        .filter(|(_, value)| !value.is_empty())
                        .map(|(column, value)| (*column, value.as_str()))
                        .collect()
                })
                .collect();
            let header: Vec<String> = HEADER.iter().map(|c| c.to_string()).collect();
            let expected = Dataset::new(&schema, header, expected_rows);

            prop_assert_eq!(loaded.columns(), expected.columns());
            prop_assert_eq!(loaded.rows(), expected.rows());
        }
    }
}
