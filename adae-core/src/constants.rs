//! Shared constants.

/// Column holding the subject identifier. Never normalized.
pub const SUBJECT_ID_COLUMN: &str = "USUBJID";

/// Severity / intensity column.
pub const SEVERITY_COLUMN: &str = "AESEV";

/// Reported adverse event term column.
pub const TERM_COLUMN: &str = "AETERM";

/// Primary system organ class column.
pub const ORGAN_CLASS_COLUMN: &str = "AESOC";

/// Filter value emitted when no keyword category matches a question.
pub const UNKNOWN_FILTER_VALUE: &str = "UNKNOWN";

/// Conventional dataset location, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/adae.csv";

/// Default timeout for a single intent resolution, in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default completion budget for intent extraction.
pub const DEFAULT_MAX_TOKENS: i32 = 256;

/// Default request budget per provider.
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 50;

/// Number of identifiers shown per question in the text report.
pub const REPORT_ID_PREVIEW: usize = 5;

/// Questions answered when none are supplied.
pub const DEFAULT_QUESTIONS: [&str; 3] = [
    "Give me the subjects who had Adverse events of Moderate severity.",
    "Which subjects experienced a Headache?",
    "Find subjects with Diarrhoea.",
];
