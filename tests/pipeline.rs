//! Pipeline Semantics Integration Tests
//!
//! Candidate selection, limit handling, empty-text skipping, and log
//! resilience, driven through the public pipeline API with a scripted
//! interpreter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use scribe::adapters::{EnrichError, Interpreter};
use scribe::core::{EnrichmentPipeline, Journal, ProcessOptions};
use scribe::domain::{Interpretation, InterpretationRecord, TranscriptEvent};

/// Interpreter that records every text it is asked to analyze
struct RecordingInterpreter {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Interpreter for RecordingInterpreter {
    fn name(&self) -> &str {
        "recording"
    }

    async fn interpret(&self, text: &str) -> Result<Interpretation, EnrichError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());

        let mut interpretation = Interpretation::degraded("");
        interpretation.summary = format!("analysis of: {}", text);
        interpretation.raw = None;
        Ok(interpretation)
    }
}

struct Harness {
    temp: TempDir,
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Harness {
    fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
            calls: Arc::new(AtomicUsize::new(0)),
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn transcripts(&self) -> Journal<TranscriptEvent> {
        Journal::new(self.temp.path().join("transcriptions.jsonl"))
    }

    fn interpretations(&self) -> Journal<InterpretationRecord> {
        Journal::new(self.temp.path().join("interpretations.jsonl"))
    }

    fn pipeline(&self) -> EnrichmentPipeline {
        EnrichmentPipeline::new(
            self.temp.path().join("transcriptions.jsonl"),
            self.temp.path().join("interpretations.jsonl"),
            self.temp.path().join(".pipeline.lock"),
            Box::new(RecordingInterpreter {
                calls: self.calls.clone(),
                seen: self.seen.clone(),
            }),
        )
    }

    async fn seed(&self, texts: &[&str]) -> Vec<TranscriptEvent> {
        let journal = self.transcripts();
        let mut events = Vec::new();
        for text in texts {
            let event = TranscriptEvent::new(*text, "test");
            journal.append(&event).await.unwrap();
            events.push(event);
        }
        events
    }
}

#[tokio::test]
async fn test_limit_takes_most_recent_candidates() {
    let harness = Harness::new();
    harness.seed(&["one", "two", "three", "four", "five"]).await;

    let summary = harness
        .pipeline()
        .run(ProcessOptions {
            limit: Some(2),
            reprocess_all: false,
        })
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);

    // The two most recent by log order, in log order
    let seen = harness.seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["four".to_string(), "five".to_string()]);
}

#[tokio::test]
async fn test_limit_applies_after_idempotency_filter() {
    let harness = Harness::new();
    let events = harness.seed(&["a", "b", "c", "d"]).await;

    // "d" already processed by an earlier run
    let prior = InterpretationRecord::new(&events[3], Interpretation::degraded("prior"));
    harness.interpretations().append(&prior).await.unwrap();

    let summary = harness
        .pipeline()
        .run(ProcessOptions {
            limit: Some(2),
            reprocess_all: false,
        })
        .await
        .unwrap();

    // Candidates are a, b, c; the most recent two of those are b and c
    assert_eq!(summary.processed, 2);
    let seen = harness.seen.lock().unwrap().clone();
    assert_eq!(seen, vec!["b".to_string(), "c".to_string()]);
}

#[tokio::test]
async fn test_empty_text_never_reaches_the_service() {
    let harness = Harness::new();
    harness.seed(&["real words", "", "more words"]).await;

    let summary = harness
        .pipeline()
        .run(ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 1);
    assert_eq!(harness.calls.load(Ordering::SeqCst), 2);

    // No record exists for the empty event
    let records = harness.interpretations().read_all().await.unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|r| !r.original_transcription.text.is_empty()));
}

#[tokio::test]
async fn test_empty_events_skipped_again_on_every_run() {
    let harness = Harness::new();
    harness.seed(&[""]).await;

    for _ in 0..2 {
        let summary = harness
            .pipeline()
            .run(ProcessOptions::default())
            .await
            .unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.processed, 0);
    }

    assert_eq!(harness.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_transcript_line_does_not_stop_the_run() {
    let harness = Harness::new();
    harness.seed(&["good one"]).await;

    // Corrupt the log by hand, then append another valid event
    let path = harness.transcripts().path().to_path_buf();
    let mut raw = std::fs::read_to_string(&path).unwrap();
    raw.push_str("{truncated garbage\n");
    std::fs::write(&path, raw).unwrap();

    harness.seed(&["good two"]).await;

    let summary = harness
        .pipeline()
        .run(ProcessOptions::default())
        .await
        .unwrap();

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_records_snapshot_the_original_event() {
    let harness = Harness::new();
    let events = harness.seed(&["Derek called the play"]).await;

    harness
        .pipeline()
        .run(ProcessOptions::default())
        .await
        .unwrap();

    let records = harness.interpretations().read_all().await.unwrap();
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record.transcription_id, events[0].effective_id());
    assert_eq!(record.original_transcription.text, "Derek called the play");
    assert_eq!(record.original_transcription.source, "test");
    assert_eq!(record.original_transcription.timestamp, events[0].timestamp);
    assert!(record.timestamp >= events[0].timestamp);
    assert_eq!(
        record.interpretation.summary,
        "analysis of: Derek called the play"
    );
}
