//! Gemini adapter for transcript interpretation.
//!
//! One bounded HTTP round-trip per utterance against the
//! `generateContent` endpoint. The service's output is treated as
//! untrusted: answers may arrive fenced in a code block or as free-form
//! prose, and anything that fails strict parsing is recovered into a
//! degraded record rather than failing the call.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::EnrichmentSettings;
use crate::domain::Interpretation;

use super::{EnrichError, Interpreter};

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client
pub struct GeminiInterpreter {
    api_key: String,
    model: String,
    temperature: f64,
    max_output_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f64,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiInterpreter {
    /// Create a client with an explicit API key
    pub fn new(api_key: impl Into<String>, settings: &EnrichmentSettings) -> Self {
        Self {
            api_key: api_key.into(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
            timeout: Duration::from_secs(settings.timeout_seconds),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the `GEMINI_API_KEY` environment variable.
    ///
    /// Fails fast with [`EnrichError::Unconfigured`] so a missing
    /// credential aborts before the first network call, not per item.
    pub fn from_env(settings: &EnrichmentSettings) -> Result<Self, EnrichError> {
        match std::env::var("GEMINI_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key, settings)),
            _ => Err(EnrichError::Unconfigured),
        }
    }

    /// Build API URL for the configured model
    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE, self.model, self.api_key
        )
    }

    /// Build the analysis prompt for one utterance
    fn build_prompt(text: &str) -> String {
        format!(
            r#"Analyze this transcription/commentary and provide insights:

Transcription: "{text}"

Provide a JSON analysis with the following structure:
{{
  "summary": "Brief summary of what was said",
  "keyEvents": ["list of important events mentioned"],
  "sentiment": "positive/negative/neutral",
  "keywords": ["relevant keywords extracted"],
  "domainRelevant": true/false,
  "insights": "Any domain-relevant insights",
  "confidence": "high/medium/low"
}}

Only return valid JSON, no additional text."#
        )
    }
}

/// Strip an enclosing fenced code block, preferring one explicitly
/// marked as JSON. Text without a fence passes through unchanged.
fn strip_code_fence(text: &str) -> &str {
    if let Some(start) = text.find("```json") {
        let body = &text[start + "```json".len()..];
        let end = body.find("```").unwrap_or(body.len());
        return body[..end].trim();
    }
    if let Some(start) = text.find("```") {
        let body = &text[start + "```".len()..];
        let end = body.find("```").unwrap_or(body.len());
        return body[..end].trim();
    }
    text
}

/// Parse the service's answer into an [`Interpretation`].
///
/// Parse failure is a content problem, not a transport failure: the
/// text is preserved in a degraded record instead of erroring.
fn parse_interpretation(raw: &str) -> Interpretation {
    let candidate = strip_code_fence(raw);

    match serde_json::from_str::<Interpretation>(candidate) {
        Ok(interpretation) => interpretation,
        Err(e) => {
            warn!(error = %e, "Response was not valid interpretation JSON, keeping raw text");
            Interpretation::degraded(candidate)
        }
    }
}

#[async_trait]
impl Interpreter for GeminiInterpreter {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn interpret(&self, text: &str) -> Result<Interpretation, EnrichError> {
        let request = GenerateRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: Self::build_prompt(text),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.api_url())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| EnrichError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                body.trim()
            )));
        }

        let data: GenerateResponse = response
            .json()
            .await
            .map_err(|e| EnrichError::Unavailable(format!("bad response body: {}", e)))?;

        let answer = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if answer.is_empty() {
            return Err(EnrichError::Unavailable("empty response".to_string()));
        }

        Ok(parse_interpretation(&answer))
    }
}
