//! TOML configuration.
//!
//! Every section is optional; a missing file or section falls back to the
//! defaults below, which reproduce the behaviour Docent ships with.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub synthesizer: SynthesizerConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
}

/// Tunable retrieval policy. The defaults are the historical values.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RetrievalConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Keywords must be strictly longer than this many characters.
    #[serde(default = "default_min_keyword_len")]
    pub min_keyword_len: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            min_keyword_len: default_min_keyword_len(),
        }
    }
}

fn default_top_k() -> usize {
    5
}
fn default_min_keyword_len() -> usize {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct SynthesizerConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            endpoint: default_gemini_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SynthesizerConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted request body, in bytes. Uploads are base64, so a
    /// file may be at most about three quarters of this.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:7340".to_string()
}
fn default_max_body_bytes() -> usize {
    64 * 1024 * 1024
}

#[derive(Debug, Deserialize, Clone)]
pub struct DriveConfig {
    #[serde(default = "default_drive_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the OAuth access token.
    #[serde(default = "default_drive_token_env")]
    pub token_env: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            endpoint: default_drive_endpoint(),
            token_env: default_drive_token_env(),
        }
    }
}

fn default_drive_endpoint() -> String {
    "https://www.googleapis.com/drive/v3".to_string()
}
fn default_drive_token_env() -> String {
    "DOCENT_DRIVE_TOKEN".to_string()
}

/// Directory scanning rules for `--dir`.
#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            include_globs: default_include_globs(),
            exclude_globs: Vec::new(),
            follow_symlinks: false,
        }
    }
}

fn default_include_globs() -> Vec<String> {
    vec![
        "**/*.md".to_string(),
        "**/*.txt".to_string(),
        "**/*.pdf".to_string(),
    ]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

/// Loads the config at `path`, or the defaults when the file does not exist.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;

    if config.retrieval.top_k == 0 {
        anyhow::bail!("retrieval.top_k must be >= 1");
    }

    if config.server.max_body_bytes == 0 {
        anyhow::bail!("server.max_body_bytes must be > 0");
    }

    if config.synthesizer.timeout_secs == 0 {
        anyhow::bail!("synthesizer.timeout_secs must be > 0");
    }

    match config.synthesizer.provider.as_str() {
        "disabled" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown synthesizer provider: '{}'. Must be gemini or disabled.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.retrieval.min_keyword_len, 2);
        assert_eq!(config.synthesizer.provider, "gemini");
        assert_eq!(config.synthesizer.model, "gemini-2.5-flash");
        assert_eq!(config.server.bind, "127.0.0.1:7340");
        assert_eq!(config.server.max_body_bytes, 64 * 1024 * 1024);
        assert_eq!(config.sources.include_globs.len(), 3);
    }

    #[test]
    fn test_overrides() {
        let config = parse_config(
            r#"
[retrieval]
top_k = 3
min_keyword_len = 3

[synthesizer]
provider = "disabled"
"#,
        )
        .unwrap();
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.retrieval.min_keyword_len, 3);
        assert!(!config.synthesizer.is_enabled());
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let err = parse_config("[retrieval]\ntop_k = 0\n").unwrap_err();
        assert!(err.to_string().contains("top_k"));
    }

    #[test]
    fn test_rejects_unknown_provider() {
        let err = parse_config("[synthesizer]\nprovider = \"openai\"\n").unwrap_err();
        assert!(err.to_string().contains("Unknown synthesizer provider"));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config_or_default(Path::new("/nonexistent/docent.toml")).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config = parse_config(include_str!("../config/docent.example.toml")).unwrap();
        let defaults = Config::default();
        assert_eq!(config.retrieval.top_k, defaults.retrieval.top_k);
        assert_eq!(config.synthesizer.model, defaults.synthesizer.model);
        assert_eq!(config.server.bind, defaults.server.bind);
        assert_eq!(config.server.max_body_bytes, defaults.server.max_body_bytes);
        assert_eq!(config.sources.include_globs, defaults.sources.include_globs);
    }

    #[test]
    fn test_rejects_zero_body_limit() {
        let err = parse_config("[server]\nmax_body_bytes = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_body_bytes"));
    }
}
