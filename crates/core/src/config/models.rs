//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `AppConfig` structure that combines
//! global settings and per-stage instructions into a single configuration
//! object.

use af_protocol::config_models::GlobalConfig;
use af_protocol::generation_models::PipelineMode;
use af_protocol::stage_models::{StageInstructions, StageKind};

/// Unified application configuration loaded from `.appforge/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Global settings
/// - `stages/*.md`: Stage instructions
///
/// # Example
///
/// ```rust,no_run
/// use af_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Default mode: {:?}", config.global.mode);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Global settings from `config.toml`.
    pub global: GlobalConfig,

    /// Instructions for every stage, in stage order.
    pub stages: Vec<StageInstructions>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            global: GlobalConfig::default(),
            stages: StageKind::ALL
                .iter()
                .map(|stage| StageInstructions::defaults_for(*stage))
                .collect(),
        }
    }
}

impl AppConfig {
    /// Instructions for `stage`, or the stage defaults if none were loaded.
    pub fn instructions_for(&self, stage: StageKind) -> StageInstructions {
        self.stages
            .iter()
            .find(|s| s.stage == stage)
            .cloned()
            .unwrap_or_else(|| StageInstructions::defaults_for(stage))
    }

    /// The mode for a run: an explicit choice wins over the configured one.
    pub fn resolve_mode(&self, requested: Option<PipelineMode>) -> PipelineMode {
        requested.unwrap_or(self.global.mode)
    }
}
