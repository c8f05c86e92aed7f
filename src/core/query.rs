//! Read-only views over the transcript log.
//!
//! These are the inspection queries: last-N, case-insensitive text
//! search, and a recency window. All of them return events in log order
//! and treat a missing log as an empty one.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};

use crate::domain::TranscriptEvent;

use super::journal::Journal;

/// Query engine over a transcript journal
pub struct TranscriptQuery {
    journal: Journal<TranscriptEvent>,
}

impl TranscriptQuery {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            journal: Journal::new(path),
        }
    }

    /// All events in log order
    pub async fn all(&self) -> Result<Vec<TranscriptEvent>> {
        self.journal.read_all().await
    }

    /// The last `n` events in log order. Asking for more than the log
    /// holds returns the whole log.
    pub async fn latest(&self, n: usize) -> Result<Vec<TranscriptEvent>> {
        let mut events = self.all().await?;
        let start = events.len().saturating_sub(n);
        Ok(events.split_off(start))
    }

    /// Events whose text contains `needle`, case-insensitively
    pub async fn search(&self, needle: &str) -> Result<Vec<TranscriptEvent>> {
        let needle = needle.to_lowercase();
        let events = self.all().await?;

        Ok(events
            .into_iter()
            .filter(|e| e.text.to_lowercase().contains(&needle))
            .collect())
    }

    /// Events captured within `window` of the current wall clock.
    ///
    /// Time-relative by design: the same call returns different results
    /// as the clock advances.
    pub async fn recent_since(&self, window: Duration) -> Result<Vec<TranscriptEvent>> {
        self.recent_since_at(window, Utc::now()).await
    }

    /// Recency filter against an explicit `now`, so tests can pin the
    /// clock.
    pub async fn recent_since_at(
        &self,
        window: Duration,
        now: DateTime<Utc>,
    ) -> Result<Vec<TranscriptEvent>> {
        let cutoff = now - window;
        let events = self.all().await?;

        Ok(events
            .into_iter()
            .filter(|e| e.timestamp >= cutoff)
            .collect())
    }
}
