//! Global configuration models for `.appforge/config.toml`.
//!
//! This module defines the structure of the global configuration file that
//! controls how generation runs are shaped and how stages reach the
//! inference service.

use crate::generation_models::PipelineMode;
use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

fn default_min_review_length() -> usize {
    50
}

fn default_notify_interval_ms() -> u64 {
    100
}

/// Represents global settings from `.appforge/config.toml`.
///
/// # Example
///
/// ```toml
/// # .appforge/config.toml
/// mode = "multi"
/// min_review_length = 50
///
/// [api]
/// api_key_env = "APPFORGE_API_KEY"
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GlobalConfig {
    /// Pipeline shape used when the caller does not pick one.
    #[serde(default)]
    pub mode: PipelineMode,

    /// Reviewer output shorter than this (after trimming) is discarded.
    #[serde(default = "default_min_review_length")]
    pub min_review_length: usize,

    /// Minimum spacing between state notifications delivered to observers.
    #[serde(default = "default_notify_interval_ms")]
    pub notify_interval_ms: u64,

    /// Free-form text appended to every stage request.
    #[serde(default)]
    pub extra_instructions: Option<String>,

    #[serde(default)]
    pub api: ApiConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            mode: PipelineMode::default(),
            min_review_length: default_min_review_length(),
            notify_interval_ms: default_notify_interval_ms(),
            extra_instructions: None,
            api: ApiConfig::default(),
        }
    }
}

/// Connection settings for the inference service.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ApiConfig {
    /// Chat-completions endpoint (OpenAI-compatible).
    pub base_url: String,

    /// Name of the environment variable holding the API key.
    ///
    /// The key itself is never stored in the config file.
    pub api_key_env: String,

    /// Per-request timeout.
    pub timeout_secs: u64,

    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,

    pub max_tokens: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key_env: "APPFORGE_API_KEY".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            max_tokens: 8192,
        }
    }
}
