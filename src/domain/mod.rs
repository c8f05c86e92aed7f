//! Domain types for the transcript pipeline.
//!
//! This module contains the core data structures:
//! - TranscriptEvent: Immutable captured utterances
//! - InterpretationRecord: Enrichment results with original snapshots

pub mod interpretation;
pub mod transcript;

// Re-export commonly used types
pub use interpretation::{
    Confidence, Interpretation, InterpretationRecord, OriginalTranscription, Sentiment,
};
pub use transcript::TranscriptEvent;
