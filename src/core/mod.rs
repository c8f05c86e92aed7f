//! Core pipeline logic.
//!
//! This module contains:
//! - Journal: Append-only JSONL logging
//! - TranscriptQuery: Read-only filters over the transcript log
//! - EnrichmentPipeline: Idempotent interpretation runs

pub mod journal;
pub mod pipeline;
pub mod query;

// Re-export commonly used types
pub use journal::Journal;
pub use pipeline::{EnrichmentPipeline, ProcessOptions, RunSummary};
pub use query::TranscriptQuery;
