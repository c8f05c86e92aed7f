//! Adapter interfaces for external systems.
//!
//! Adapters provide a unified interface for the external
//! text-understanding service, so alternate providers can be swapped in
//! without touching the pipeline logic.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Interpretation;

// Re-export the Gemini adapter
pub use gemini::GeminiInterpreter;

/// Errors from the enrichment boundary.
///
/// A response that arrives but cannot be parsed is NOT an error: the
/// adapter recovers it into a degraded [`Interpretation`] locally.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// Required credential is missing. Fatal: surfaced before any
    /// network call is attempted.
    #[error("GEMINI_API_KEY is not set. Export it in your environment to enable enrichment")]
    Unconfigured,

    /// Transport failure, timeout, or non-success response. Per-item:
    /// the event stays unprocessed and a later run retries it.
    #[error("enrichment service unavailable: {0}")]
    Unavailable(String),
}

/// Trait for text-understanding providers
#[async_trait]
pub trait Interpreter: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Analyze one utterance, returning a structured interpretation
    async fn interpret(&self, text: &str) -> Result<Interpretation, EnrichError>;
}
