//! Command-line interface for scribe.
//!
//! Provides commands for running the enrichment pipeline, inspecting the
//! transcript log, displaying interpretations, and appending events by
//! hand.

use anyhow::{Context, Result};
use chrono::Duration;
use clap::{Parser, Subcommand};

use crate::adapters::GeminiInterpreter;
use crate::config;
use crate::core::{EnrichmentPipeline, Journal, ProcessOptions, TranscriptQuery};
use crate::domain::{InterpretationRecord, TranscriptEvent};

/// scribe - Event-sourced transcript capture and interpretation pipeline
#[derive(Parser, Debug)]
#[command(name = "scribe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interpret unprocessed transcriptions
    Process {
        /// Only process the most recent N candidates
        #[arg(short, long)]
        limit: Option<usize>,

        /// Reprocess everything, even already-interpreted entries
        #[arg(long)]
        all: bool,
    },

    /// Show transcriptions from the log
    Show {
        /// Show the last N transcriptions
        #[arg(short, long, default_value = "10")]
        latest: usize,

        /// Show transcriptions containing this text (case-insensitive)
        #[arg(short, long, conflicts_with = "recent_minutes")]
        search: Option<String>,

        /// Show transcriptions from the last N minutes
        #[arg(short, long, conflicts_with = "search")]
        recent_minutes: Option<i64>,
    },

    /// Display recent interpretations
    Interpretations {
        /// Maximum number of interpretations to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Append a transcription to the log by hand
    Append {
        /// The transcribed text
        text: String,

        /// Producer/channel tag
        #[arg(short, long, default_value = "manual")]
        source: String,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Process { limit, all } => process(limit, all).await,
            Commands::Show {
                latest,
                search,
                recent_minutes,
            } => show(latest, search, recent_minutes).await,
            Commands::Interpretations { limit } => show_interpretations(limit).await,
            Commands::Append { text, source } => append(text, source).await,
            Commands::Config => show_config(),
        }
    }
}

/// Run the enrichment pipeline
async fn process(limit: Option<usize>, all: bool) -> Result<()> {
    let cfg = config::config()?;

    // Missing credential fails here, before any log is read
    let interpreter = GeminiInterpreter::from_env(&cfg.enrichment)
        .context("Cannot run enrichment")?;

    let pipeline = EnrichmentPipeline::new(
        cfg.transcripts_path(),
        cfg.interpretations_path(),
        cfg.pipeline_lock_path(),
        Box::new(interpreter),
    );

    let summary = pipeline
        .run(ProcessOptions {
            limit,
            reprocess_all: all,
        })
        .await?;

    println!("\nDone. Interpretations saved to {}", cfg.interpretations_path().display());
    println!("  Processed: {}", summary.processed);
    println!("  Skipped (empty): {}", summary.skipped);
    println!("  Failed: {}", summary.failed);

    Ok(())
}

/// Show transcriptions, filtered by search text or recency
async fn show(latest: usize, search: Option<String>, recent_minutes: Option<i64>) -> Result<()> {
    let query = TranscriptQuery::new(config::transcripts_path()?);

    let events = if let Some(needle) = search {
        query.search(&needle).await?
    } else if let Some(minutes) = recent_minutes {
        query.recent_since(Duration::minutes(minutes)).await?
    } else {
        query.latest(latest).await?
    };

    display_transcripts(&events);
    Ok(())
}

fn display_transcripts(events: &[TranscriptEvent]) {
    if events.is_empty() {
        println!("No transcriptions found.");
        return;
    }

    println!("\nFound {} transcription(s):\n", events.len());
    println!("{}", "-".repeat(80));

    for event in events {
        println!(
            "[{}] ({})",
            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
            event.source
        );
        println!("  {}", event.text);
        println!("{}", "-".repeat(80));
    }
}

/// Display recent interpretation records
async fn show_interpretations(limit: usize) -> Result<()> {
    let journal: Journal<InterpretationRecord> =
        Journal::new(config::interpretations_path()?);

    let mut records = journal.read_all().await?;
    let start = records.len().saturating_sub(limit);
    let records = records.split_off(start);

    if records.is_empty() {
        println!("No interpretations found.");
        return Ok(());
    }

    println!("\n{}", "=".repeat(80));
    println!("Recent Interpretations ({} shown)", records.len());
    println!("{}\n", "=".repeat(80));

    for record in records {
        let original = &record.original_transcription;
        let interp = &record.interpretation;

        let original_preview: String = original.text.chars().take(100).collect();

        println!("[{}]", record.timestamp.to_rfc3339());
        println!("Original: {}...", original_preview);
        println!("Summary: {}", interp.summary);
        println!(
            "Sentiment: {} | Confidence: {}",
            interp.sentiment, interp.confidence
        );
        if !interp.key_events.is_empty() {
            let shown: Vec<&str> = interp
                .key_events
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            println!("Key Events: {}", shown.join(", "));
        }
        println!("{}\n", "-".repeat(80));
    }

    Ok(())
}

/// Append one event to the transcript log
async fn append(text: String, source: String) -> Result<()> {
    let journal: Journal<TranscriptEvent> = Journal::new(config::transcripts_path()?);

    let event = TranscriptEvent::new(text, source);
    journal.append(&event).await?;

    println!("Appended transcription {}", event.effective_id());
    Ok(())
}

/// Print resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("Home: {}", cfg.home.display());
    println!("Transcript log: {}", cfg.transcripts_path().display());
    println!("Interpretation log: {}", cfg.interpretations_path().display());
    match &cfg.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none found)"),
    }
    println!("Model: {}", cfg.enrichment.model);
    println!("Temperature: {}", cfg.enrichment.temperature);
    println!("Max output tokens: {}", cfg.enrichment.max_output_tokens);
    println!("Timeout: {}s", cfg.enrichment.timeout_seconds);

    let key_set = std::env::var("GEMINI_API_KEY")
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false);
    println!("GEMINI_API_KEY: {}", if key_set { "set" } else { "NOT SET" });

    Ok(())
}
