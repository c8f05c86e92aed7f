//! Interpretation records produced by the enrichment pipeline.
//!
//! Each record captures the analysis for exactly one transcript event,
//! together with a snapshot of the original so the record stays
//! self-contained if the transcript log is later rotated.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transcript::TranscriptEvent;

/// Structured analysis of one utterance.
///
/// Wire names are camelCase to match the enrichment service's schema.
/// Missing fields default rather than failing the parse; a response whose
/// shape is wrong altogether becomes a degraded record instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    /// Brief summary of what was said
    #[serde(default)]
    pub summary: String,

    /// Important events mentioned, in order
    #[serde(default)]
    pub key_events: Vec<String>,

    #[serde(default)]
    pub sentiment: Sentiment,

    #[serde(default)]
    pub keywords: Vec<String>,

    /// Whether the utterance is relevant to the monitored domain
    #[serde(default)]
    pub domain_relevant: bool,

    #[serde(default)]
    pub insights: String,

    #[serde(default)]
    pub confidence: Confidence,

    /// Full unparsed service output, present only on degraded records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl Interpretation {
    /// Build the fallback record for a response that was received but
    /// could not be parsed into the expected shape. The first 200 chars
    /// stand in for the summary and the full text is kept in `raw`.
    pub fn degraded(raw_text: &str) -> Self {
        let summary: String = raw_text.chars().take(200).collect();

        Self {
            summary,
            key_events: Vec::new(),
            sentiment: Sentiment::Neutral,
            keywords: Vec::new(),
            domain_relevant: false,
            insights: String::new(),
            confidence: Confidence::Medium,
            raw: Some(raw_text.to_string()),
        }
    }

    /// True when this record was synthesized from an unparseable response
    pub fn is_degraded(&self) -> bool {
        self.raw.is_some()
    }
}

/// Overall sentiment of the utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::Neutral
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Service-reported confidence in its own analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Default for Confidence {
    fn default() -> Self {
        Self::Medium
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        };
        f.write_str(s)
    }
}

/// Snapshot of the original event at enrichment time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalTranscription {
    pub timestamp: DateTime<Utc>,
    pub text: String,
    pub source: String,
}

/// One enrichment result, appended to the interpretation log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterpretationRecord {
    /// Identifier of the transcript event this record interprets
    pub transcription_id: String,

    /// When enrichment ran (not when the utterance was captured)
    pub timestamp: DateTime<Utc>,

    pub original_transcription: OriginalTranscription,

    pub interpretation: Interpretation,
}

impl InterpretationRecord {
    /// Wrap an interpretation for an event, stamping the processing time.
    pub fn new(event: &TranscriptEvent, interpretation: Interpretation) -> Self {
        Self {
            transcription_id: event.effective_id(),
            timestamp: Utc::now(),
            original_transcription: OriginalTranscription {
                timestamp: event.timestamp,
                text: event.text.clone(),
                source: event.source.clone(),
            },
            interpretation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_camel_case() {
        let interp = Interpretation {
            summary: "ok".to_string(),
            key_events: vec!["kickoff".to_string()],
            sentiment: Sentiment::Positive,
            keywords: vec!["derek".to_string()],
            domain_relevant: true,
            insights: "momentum shift".to_string(),
            confidence: Confidence::High,
            raw: None,
        };

        let json = serde_json::to_string(&interp).unwrap();
        assert!(json.contains("\"keyEvents\""));
        assert!(json.contains("\"domainRelevant\""));
        assert!(json.contains("\"sentiment\":\"positive\""));
        assert!(json.contains("\"confidence\":\"high\""));
        assert!(!json.contains("\"raw\""));
    }

    #[test]
    fn test_missing_fields_default() {
        let interp: Interpretation =
            serde_json::from_str(r#"{"summary":"short answer"}"#).unwrap();

        assert_eq!(interp.summary, "short answer");
        assert_eq!(interp.sentiment, Sentiment::Neutral);
        assert_eq!(interp.confidence, Confidence::Medium);
        assert!(interp.key_events.is_empty());
        assert!(!interp.domain_relevant);
        assert!(!interp.is_degraded());
    }

    #[test]
    fn test_unknown_sentiment_is_a_parse_error() {
        let result: Result<Interpretation, _> =
            serde_json::from_str(r#"{"summary":"x","sentiment":"mixed"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_degraded_record_shape() {
        let prose = "The speaker seemed excited about the second half. ".repeat(10);
        let interp = Interpretation::degraded(&prose);

        assert!(interp.is_degraded());
        assert_eq!(interp.raw.as_deref(), Some(prose.as_str()));
        assert_eq!(interp.summary.chars().count(), 200);
        assert_eq!(interp.confidence, Confidence::Medium);
        assert_eq!(interp.sentiment, Sentiment::Neutral);
        assert!(interp.key_events.is_empty());
        assert!(!interp.domain_relevant);
    }

    #[test]
    fn test_record_snapshots_original() {
        let event = TranscriptEvent::new("Derek called the play", "booth");
        let record = InterpretationRecord::new(&event, Interpretation::degraded("raw"));

        assert_eq!(record.transcription_id, event.effective_id());
        assert_eq!(record.original_transcription.text, "Derek called the play");
        assert_eq!(record.original_transcription.source, "booth");
        assert_eq!(record.original_transcription.timestamp, event.timestamp);
    }
}
