//! Intent resolver capability.
//!
//! Rule-based and model-backed backends implement this trait and are
//! interchangeable. Implementations live in adae-agents and adae-llm.

use crate::error::AdaeResult;
use crate::intent::Intent;
use async_trait::async_trait;

/// Turns a natural-language question into a schema-valid [`Intent`].
///
/// Implementations must be thread-safe (Send + Sync) and must never return
/// an intent whose column is outside their schema; schema violations from a
/// backend are reported as `ExtractionError`.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Resolve a question into an intent.
    ///
    /// # Returns
    /// * `Ok(Intent)` - A schema-valid intent
    /// * `Err(AdaeError::Extraction)` - If the backend output is unusable
    async fn resolve(&self, question: &str) -> AdaeResult<Intent>;

    /// Short backend identifier for logs and reports.
    fn backend_name(&self) -> &str;
}
