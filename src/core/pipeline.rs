//! Idempotent enrichment pipeline.
//!
//! Drives interpretation over the transcript log exactly once per
//! identifier across repeated runs. The processed-id index is rebuilt
//! from the interpretation log on every run, so a run interrupted
//! between two candidates picks up exactly where it left off.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fs2::FileExt;
use tracing::{info, instrument, warn};

use crate::adapters::{EnrichError, Interpreter};
use crate::domain::{InterpretationRecord, TranscriptEvent};

use super::journal::Journal;

/// Options for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Restrict to the most recent N candidates (by log order)
    pub limit: Option<usize>,

    /// Re-interpret everything, ignoring the processed index
    pub reprocess_all: bool,
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Interpretations appended
    pub processed: usize,

    /// Candidates skipped (empty text)
    pub skipped: usize,

    /// Enrichment calls that failed; these stay unprocessed and are
    /// retried by the next run
    pub failed: usize,
}

/// Enrichment pipeline over the two journals
pub struct EnrichmentPipeline {
    transcripts: Journal<TranscriptEvent>,
    interpretations: Journal<InterpretationRecord>,
    lock_path: PathBuf,
    interpreter: Box<dyn Interpreter>,
}

impl EnrichmentPipeline {
    pub fn new(
        transcripts_path: impl Into<PathBuf>,
        interpretations_path: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
        interpreter: Box<dyn Interpreter>,
    ) -> Self {
        Self {
            transcripts: Journal::new(transcripts_path),
            interpretations: Journal::new(interpretations_path),
            lock_path: lock_path.into(),
            interpreter,
        }
    }

    /// Run the pipeline once.
    ///
    /// Concurrent runs against the same interpretation log could both see
    /// an id as unprocessed, so the whole run holds an exclusive advisory
    /// lock; a second simultaneous invocation fails fast instead of
    /// duplicating work.
    #[instrument(skip(self), fields(interpreter = self.interpreter.name()))]
    pub async fn run(&self, options: ProcessOptions) -> Result<RunSummary> {
        let _lock = self.acquire_run_lock()?;

        let processed_ids = if options.reprocess_all {
            HashSet::new()
        } else {
            self.load_processed_ids().await?
        };

        let events = self.transcripts.read_all().await?;
        if events.is_empty() {
            info!("No transcriptions found to process");
            return Ok(RunSummary::default());
        }

        let mut candidates: Vec<TranscriptEvent> = events
            .into_iter()
            .filter(|e| !processed_ids.contains(&e.effective_id()))
            .collect();

        if candidates.is_empty() {
            info!("All transcriptions have already been processed");
            return Ok(RunSummary::default());
        }

        // Most recent N by log order
        if let Some(limit) = options.limit {
            let start = candidates.len().saturating_sub(limit);
            candidates = candidates.split_off(start);
        }

        info!(count = candidates.len(), "Processing transcriptions");

        let total = candidates.len();
        let mut summary = RunSummary::default();

        for (i, event) in candidates.iter().enumerate() {
            let id = event.effective_id();

            if event.text.is_empty() {
                info!("[{}/{}] Skipping empty transcription {}", i + 1, total, id);
                summary.skipped += 1;
                continue;
            }

            let preview: String = event.text.chars().take(50).collect();
            info!("[{}/{}] Processing: {}...", i + 1, total, preview);

            match self.interpreter.interpret(&event.text).await {
                Ok(interpretation) => {
                    let record = InterpretationRecord::new(event, interpretation);
                    self.interpretations.append(&record).await?;
                    summary.processed += 1;
                }
                Err(e @ EnrichError::Unconfigured) => {
                    // Credential problems abort the run outright
                    return Err(e.into());
                }
                Err(EnrichError::Unavailable(reason)) => {
                    warn!(
                        transcription_id = %id,
                        %reason,
                        "Failed to interpret, will retry on a later run"
                    );
                    summary.failed += 1;
                }
            }
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "Pipeline run complete"
        );

        Ok(summary)
    }

    /// Scan the interpretation log and collect every processed id
    async fn load_processed_ids(&self) -> Result<HashSet<String>> {
        let records = self.interpretations.read_all().await?;
        Ok(records.into_iter().map(|r| r.transcription_id).collect())
    }

    /// Take the whole-run exclusive lock. Released when the returned
    /// handle drops.
    fn acquire_run_lock(&self) -> Result<std::fs::File> {
        if let Some(parent) = self.lock_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create lock directory: {}", parent.display())
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&self.lock_path)
            .with_context(|| format!("Failed to open lock file: {}", self.lock_path.display()))?;

        file.try_lock_exclusive().with_context(|| {
            format!(
                "Another pipeline run is already active (lock: {})",
                self.lock_path.display()
            )
        })?;

        Ok(file)
    }
}
