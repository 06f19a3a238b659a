//! ADAE command-line entry point.
//!
//! Answers each question against the adverse-event dataset and prints a
//! report. With no questions, the three reference questions are run.
//!
//! Exit status: 0 when every question succeeded, 1 when any question failed,
//! 2 when startup (configuration, dataset or provider) failed.

use adae_agents::{
    ClinicalDataAgent, JsonLinesWriter, QueryOutcome, ReportSink, ReportWriter, RuleBasedResolver,
    TeeWriter,
};
use adae_core::{
    AdaeConfig, AdaeResult, ConfigError, IntentResolver, ResolverBackend, Schema,
    DEFAULT_QUESTIONS,
};
use adae_llm::{create_provider_from_env, ModelIntentResolver};
use adae_storage::CsvDatasetSource;
use clap::Parser;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "adae=info,warn";

const EXIT_QUERY_FAILED: u8 = 1;
const EXIT_STARTUP_FAILED: u8 = 2;

/// Natural-language query assistant for adverse-event datasets
#[derive(Parser, Debug)]
#[command(name = "adae", version, about)]
struct Cli {
    /// Questions to answer; the reference questions are used when omitted
    questions: Vec<String>,

    /// TOML configuration file
    #[arg(long, short = 'c', env = "ADAE_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset CSV path
    #[arg(long)]
    data: Option<PathBuf>,

    /// Intent resolver backend: rule or model
    #[arg(long)]
    backend: Option<ResolverBackend>,

    /// Completion provider for the model backend: anthropic or openai
    #[arg(long)]
    provider: Option<String>,

    /// Provider model name
    #[arg(long)]
    model: Option<String>,

    /// Also append the report to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Emit one JSON object per line instead of the text report
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn questions(&self) -> Vec<String> {
        if self.questions.is_empty() {
            DEFAULT_QUESTIONS.iter().map(|q| q.to_string()).collect()
        } else {
            self.questions.clone()
        }
    }
}

/// Layer configuration: file, then environment, then flags.
fn build_config(cli: &Cli) -> Result<AdaeConfig, ConfigError> {
    let base = match &cli.config {
        Some(path) => AdaeConfig::from_path(path)?,
        None => AdaeConfig::default(),
    };
    let mut config = base.apply_env()?;

    if let Some(data) = &cli.data {
        config.data_path = data.clone();
    }
    if let Some(backend) = cli.backend {
        config.resolver = backend;
    }
    if let Some(provider) = &cli.provider {
        config.set_provider_type(provider);
    }
    if let Some(model) = &cli.model {
        config.provider.model = model.clone();
    }
    if let Some(log_file) = &cli.log_file {
        config.log_path = Some(log_file.clone());
    }

    config.validate()?;
    Ok(config)
}

fn build_resolver(config: &AdaeConfig, schema: &Schema) -> AdaeResult<Arc<dyn IntentResolver>> {
    match config.resolver {
        ResolverBackend::Rule => Ok(Arc::new(RuleBasedResolver::for_schema(schema.clone())?)),
        ResolverBackend::Model => {
            let provider = create_provider_from_env(&config.provider)?;
            let resolver = ModelIntentResolver::new(provider, schema.clone())
                .with_generation(config.provider.max_tokens, config.provider.temperature);
            Ok(Arc::new(resolver))
        }
    }
}

fn open_log(path: &Path) -> Result<File, ConfigError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn build_sink(config: &AdaeConfig, json: bool) -> Result<Box<dyn ReportSink>, ConfigError> {
    let out: Box<dyn Write> = match &config.log_path {
        Some(path) => Box::new(TeeWriter::new(io::stdout(), open_log(path)?)),
        None => Box::new(io::stdout()),
    };
    Ok(if json {
        Box::new(JsonLinesWriter::new(out))
    } else {
        Box::new(ReportWriter::new(out))
    })
}

/// 0 when every question succeeded, otherwise `EXIT_QUERY_FAILED`.
fn exit_status(outcomes: &[QueryOutcome]) -> u8 {
    if outcomes.iter().all(QueryOutcome::is_success) {
        0
    } else {
        EXIT_QUERY_FAILED
    }
}

struct Session {
    agent: ClinicalDataAgent,
    sink: Box<dyn ReportSink>,
}

fn start(cli: &Cli) -> AdaeResult<Session> {
    let config = build_config(cli)?;
    tracing::debug!(?config, "Resolved configuration");

    let schema = Schema::adae();
    let resolver = build_resolver(&config, &schema)?;
    let source = CsvDatasetSource::new(&config.data_path);
    let agent = ClinicalDataAgent::from_source(resolver, &source, &schema)?
        .with_resolve_timeout(config.request_timeout());
    let sink = build_sink(&config, cli.json)?;

    Ok(Session { agent, sink })
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut session = match start(&cli) {
        Ok(session) => session,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            eprintln!("adae: {}", e);
            return ExitCode::from(EXIT_STARTUP_FAILED);
        }
    };

    let questions = cli.questions();
    let outcomes = session
        .agent
        .run_batch(questions.as_slice(), session.sink.as_mut())
        .await;

    ExitCode::from(exit_status(&outcomes))
}
