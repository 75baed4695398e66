//! Answer synthesizer abstraction and implementations.
//!
//! Defines the [`Synthesizer`] trait and concrete implementations:
//! - **[`DisabledSynthesizer`]**: always fails; used when no model is configured.
//! - **[`GeminiSynthesizer`]**: calls the Gemini `generateContent` REST endpoint.
//!
//! A synthesizer receives one fully composed prompt and returns one text
//! answer. There is no retry: a failed call is reported once and the
//! session moves on.
//!
//! # Provider Selection
//!
//! Use [`create_synthesizer`] to build the provider named in the config:
//!
//! ```rust
//! # use docent::config::SynthesizerConfig;
//! # use docent::synthesizer::create_synthesizer;
//! let mut config = SynthesizerConfig::default();
//! config.provider = "disabled".to_string();
//! let synth = create_synthesizer(&config).unwrap();
//! assert_eq!(synth.name(), "disabled");
//! ```

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use crate::config::SynthesizerConfig;

/// Environment variables searched, in order, for the Gemini API key.
pub const GEMINI_KEY_ENV: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum SynthesizeError {
    #[error("answer synthesis is disabled")]
    Disabled,
    #[error("{0}")]
    Http(String),
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Narrow boundary to the hosted language model.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Provider identifier (e.g. `"gemini"`).
    fn name(&self) -> &str;

    /// Sends `prompt` and returns the model's text answer.
    async fn synthesize(&self, prompt: &str) -> Result<String, SynthesizeError>;
}

// ============ Disabled ============

pub struct DisabledSynthesizer;

#[async_trait]
impl Synthesizer for DisabledSynthesizer {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn synthesize(&self, _prompt: &str) -> Result<String, SynthesizeError> {
        Err(SynthesizeError::Disabled)
    }
}

// ============ Gemini ============

/// Synthesizer backed by the Gemini Generative Language API.
///
/// Sends `POST {endpoint}/models/{model}:generateContent` with the prompt
/// as a single user part and concatenates the text parts of the first
/// candidate.
pub struct GeminiSynthesizer {
    model: String,
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GeminiSynthesizer {
    pub fn new(config: &SynthesizerConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Builds the synthesizer with the key from `GEMINI_API_KEY` or `API_KEY`.
    pub fn from_env(config: &SynthesizerConfig) -> Result<Self> {
        let api_key = GEMINI_KEY_ENV
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|v| !v.is_empty()));
        match api_key {
            Some(key) => Self::new(config, key),
            None => bail!("GEMINI_API_KEY environment variable not set"),
        }
    }
}

#[async_trait]
impl Synthesizer for GeminiSynthesizer {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn synthesize(&self, prompt: &str) -> Result<String, SynthesizeError> {
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({
            "contents": [
                { "role": "user", "parts": [ { "text": prompt } ] }
            ]
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesizeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesizeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SynthesizeError::InvalidResponse(e.to_string()))?;
        parse_gemini_response(&json)
    }
}

/// Extracts the answer text from a `generateContent` response.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String, SynthesizeError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| {
            SynthesizeError::InvalidResponse("missing candidates[0].content.parts".to_string())
        })?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() {
        return Err(SynthesizeError::InvalidResponse(
            "response contained no text".to_string(),
        ));
    }
    Ok(text)
}

/// Create the [`Synthesizer`] named by `config.provider`.
///
/// | Config Value | Provider |
/// |-------------|----------|
/// | `"disabled"` | [`DisabledSynthesizer`] |
/// | `"gemini"` | [`GeminiSynthesizer`] |
pub fn create_synthesizer(config: &SynthesizerConfig) -> Result<Box<dyn Synthesizer>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledSynthesizer)),
        "gemini" => Ok(Box::new(GeminiSynthesizer::from_env(config)?)),
        other => bail!("Unknown synthesizer provider: {}", other),
    }
}
