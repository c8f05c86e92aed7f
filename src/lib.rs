//! scribe - Event-sourced transcript capture and interpretation pipeline
//!
//! Captures a stream of short speech transcriptions into an append-only
//! log, enriches each one exactly once with structured analysis from the
//! Gemini API, and exposes read-only queries over the raw stream.
//!
//! # Architecture
//!
//! The system is built around two append-only JSONL journals:
//! - The transcript log holds immutable captured utterances
//! - The interpretation log holds one analysis per utterance
//!
//! Idempotency comes from rebuilding a processed-id index from the
//! interpretation log at the start of each run, so repeated or
//! interrupted runs never double-process an event.
//!
//! # Modules
//!
//! - `adapters`: External service integrations (Gemini)
//! - `core`: Journal, query engine, and the enrichment pipeline
//! - `domain`: Data structures (TranscriptEvent, InterpretationRecord)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Interpret unprocessed transcriptions
//! scribe process --limit 5
//!
//! # Inspect the raw log
//! scribe show --search "Derek"
//! scribe show --recent-minutes 5
//!
//! # Display recent interpretations
//! scribe interpretations
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::adapters::{EnrichError, GeminiInterpreter, Interpreter};
pub use crate::core::{EnrichmentPipeline, Journal, ProcessOptions, RunSummary, TranscriptQuery};
pub use crate::domain::{Interpretation, InterpretationRecord, TranscriptEvent};
