//! Configuration for scribe paths and enrichment settings.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (SCRIBE_HOME, SCRIBE_TRANSCRIPTS)
//! 2. Config file (.scribe/config.yaml)
//! 3. Defaults (~/.scribe)
//!
//! Config file discovery:
//! - Searches current directory and parents for .scribe/config.yaml
//! - Paths in config file are relative to the config file's parent directory
//!
//! The enrichment credential (GEMINI_API_KEY) is only ever read from the
//! environment; it never lives in the config file.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<std::result::Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub enrichment: Option<EnrichmentConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Scribe state directory (relative to config file)
    pub home: Option<String>,
    /// Transcript log directory (relative to config file)
    pub transcripts: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_output_tokens: Option<u32>,
    pub timeout_seconds: Option<u64>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to scribe home (state directory)
    pub home: PathBuf,
    /// Absolute path to the directory holding both journals
    pub transcripts_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Enrichment service settings
    pub enrichment: EnrichmentSettings,
}

/// Settings for the enrichment service call
#[derive(Debug, Clone)]
pub struct EnrichmentSettings {
    pub model: String,
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for EnrichmentSettings {
    fn default() -> Self {
        Self {
            model: "gemini-pro".to_string(),
            temperature: 0.4,
            max_output_tokens: 500,
            timeout_seconds: 30,
        }
    }
}

impl ResolvedConfig {
    /// Path to the transcript event log
    pub fn transcripts_path(&self) -> PathBuf {
        self.transcripts_dir.join("transcriptions.jsonl")
    }

    /// Path to the interpretation log
    pub fn interpretations_path(&self) -> PathBuf {
        self.transcripts_dir.join("interpretations.jsonl")
    }

    /// Path to the pipeline mutual-exclusion lock file
    pub fn pipeline_lock_path(&self) -> PathBuf {
        self.transcripts_dir.join(".pipeline.lock")
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".scribe").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn settings_from(config: Option<&EnrichmentConfig>) -> EnrichmentSettings {
    let defaults = EnrichmentSettings::default();

    match config {
        Some(c) => EnrichmentSettings {
            model: c.model.clone().unwrap_or(defaults.model),
            temperature: c.temperature.unwrap_or(defaults.temperature),
            max_output_tokens: c.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            timeout_seconds: c.timeout_seconds.unwrap_or(defaults.timeout_seconds),
        },
        None => defaults,
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    // Default home directory
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".scribe");

    // Check for config file
    let config_file = find_config_file();

    let (home, transcripts_dir, enrichment) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Base directory is the parent of .scribe/ (i.e., grandparent of config.yaml)
        let base_dir = config_path
            .parent()
            .and_then(|p| p.parent())
            .unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("SCRIBE_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            // home is relative to the .scribe/ directory
            let scribe_dir = config_path.parent().unwrap_or(Path::new("."));
            resolve_path(scribe_dir, home_path)
        } else {
            default_home.clone()
        };

        let transcripts_dir = if let Ok(env_dir) = std::env::var("SCRIBE_TRANSCRIPTS") {
            PathBuf::from(env_dir)
        } else if let Some(ref dir) = config.paths.transcripts {
            resolve_path(base_dir, dir)
        } else {
            home.join("transcripts")
        };

        let enrichment = settings_from(config.enrichment.as_ref());

        (home, transcripts_dir, enrichment)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("SCRIBE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let transcripts_dir = std::env::var("SCRIBE_TRANSCRIPTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("transcripts"));

        (home, transcripts_dir, EnrichmentSettings::default())
    };

    Ok(ResolvedConfig {
        home,
        transcripts_dir,
        config_file,
        enrichment,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the scribe home directory
pub fn scribe_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the transcript event log path
pub fn transcripts_path() -> Result<PathBuf> {
    Ok(config()?.transcripts_path())
}

/// Get the interpretation log path
pub fn interpretations_path() -> Result<PathBuf> {
    Ok(config()?.interpretations_path())
}

/// Get the pipeline lock file path
pub fn pipeline_lock_path() -> Result<PathBuf> {
    Ok(config()?.pipeline_lock_path())
}

/// Get the enrichment service settings
pub fn enrichment_settings() -> Result<EnrichmentSettings> {
    Ok(config()?.enrichment.clone())
}
