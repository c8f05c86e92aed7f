//! Append-only journal with file-based persistence.
//!
//! Records are stored as newline-delimited JSON (JSONL) for simplicity
//! and easy debugging/inspection. The transcript log and the
//! interpretation log both use this store; only the record type differs.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// File-based append-only store using JSONL format
pub struct Journal<T> {
    /// Path to the backing .jsonl file
    path: PathBuf,

    _record: PhantomData<T>,
}

impl<T> Journal<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create a journal over the given file. The file itself is created
    /// lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    /// Get the path to the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record to the log.
    ///
    /// The serialized line including its terminator goes out in a single
    /// write, so a reader never observes a partial record.
    pub async fn append(&self, record: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create journal directory: {}", parent.display())
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let mut line = serde_json::to_string(record).context("Failed to serialize record")?;
        line.push('\n');
        file.write_all(line.as_bytes())
            .await
            .context("Failed to write record")?;
        file.flush().await.context("Failed to flush record")?;

        Ok(())
    }

    /// Read all records in file order.
    ///
    /// A missing file means no data yet, not an error. Malformed lines
    /// are skipped with a warning so one corrupt line never makes the
    /// whole log unreadable.
    pub async fn read_all(&self) -> Result<Vec<T>> {
        let (records, _) = self.read_all_counted().await?;
        Ok(records)
    }

    /// Read all records, also reporting how many lines failed to parse.
    pub async fn read_all_counted(&self) -> Result<(Vec<T>, usize)> {
        if !self.path.exists() {
            return Ok((Vec::new(), 0));
        }

        let file = File::open(&self.path)
            .await
            .with_context(|| format!("Failed to open journal: {}", self.path.display()))?;

        let reader = BufReader::new(file);
        let mut lines = reader.lines();
        let mut records = Vec::new();
        let mut malformed = 0usize;

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    malformed += 1;
                    warn!(
                        journal = %self.path.display(),
                        error = %e,
                        "Skipping malformed journal line"
                    );
                }
            }
        }

        Ok((records, malformed))
    }
}
