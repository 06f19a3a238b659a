//! ADAE Core - Entity Types
//!
//! Pure data structures shared by every other crate: the filterable schema,
//! structured intents, the adverse-event dataset, and the error taxonomy.
//! This crate contains no I/O beyond reading configuration files.

pub mod config;
pub mod constants;
pub mod dataset;
pub mod error;
pub mod filter;
pub mod intent;
pub mod resolver;
pub mod schema;

pub use config::{AdaeConfig, ProviderConfig, ResolverBackend};
pub use constants::*;
pub use dataset::{Dataset, Row};
pub use error::{
    AdaeError, AdaeResult, ConfigError, DatasetError, ExtractionError, LlmError,
};
pub use filter::ContainsMatcher;
pub use intent::{Intent, IntentPayload, QueryResult};
pub use resolver::IntentResolver;
pub use schema::{Schema, SchemaColumn, ADAE_SCHEMA};
