//! Transcript events captured from an upstream speech-to-text producer.
//!
//! Once appended to the log an event is immutable. It is never rewritten
//! or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One captured utterance.
///
/// Producers deliver `{timestamp, text, source}` records; the optional
/// `id` is the stable identifier for enrichment bookkeeping. Records
/// written by older producers may lack it, in which case the timestamp
/// string stands in (see [`TranscriptEvent::effective_id`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Capture time (ISO 8601)
    pub timestamp: DateTime<Utc>,

    /// Transcribed text. May be empty; empty events are stored but
    /// never enriched.
    pub text: String,

    /// Free-form producer/channel tag (e.g. "assemblyai")
    pub source: String,

    /// Producer-supplied stable identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TranscriptEvent {
    /// Create a new event stamped with the current time and a fresh UUID.
    ///
    /// Events built here never fall back to timestamp identity, so two
    /// captures in the same instant still get distinct ids.
    pub fn new(text: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            text: text.into(),
            source: source.into(),
            id: Some(Uuid::new_v4().to_string()),
        }
    }

    /// The identifier enrichment keys on: the explicit id when present,
    /// otherwise the RFC 3339 timestamp string.
    pub fn effective_id(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => self.timestamp.to_rfc3339(),
        }
    }
}
