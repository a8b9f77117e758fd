//! Configuration file loader for `.appforge/` directory structure.
//!
//! This module provides functionality to load and parse all configuration files
//! from the `.appforge/` directory, including:
//! - `config.toml`: Global settings
//! - `stages/*.md`: Stage instructions with YAML front matter
//!
//! Stages without a file of their own use the embedded default templates.

use crate::config::error::ConfigError;
use crate::config::error::ConfigResult;
use crate::config::models::AppConfig;
use crate::init::templates::get_template;
use af_protocol::config_models::GlobalConfig;
use af_protocol::stage_models::{StageInstructions, StageKind};
use gray_matter::engine::YAML;
use gray_matter::Matter;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Name of the per-project configuration directory.
pub const CONFIG_DIR: &str = ".appforge";

/// Loads all configuration from the `.appforge/` directory.
///
/// # Arguments
///
/// * `root` - Root directory containing the `.appforge/` folder
///
/// # Returns
///
/// An `AppConfig` containing all loaded configuration. If directories or files
/// are missing (but the root exists), the defaults and embedded stage
/// templates are used rather than returning an error.
///
/// # Errors
///
/// Returns `ConfigError` if:
/// - Files exist but cannot be read
/// - Files have invalid syntax (TOML or Markdown front matter)
/// - Two stage files define the same stage
///
/// # Example
///
/// ```rust,no_run
/// use af_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} stages", config.stages.len());
/// # Ok(())
/// # }
/// ```
pub async fn load_config(root: &Path) -> ConfigResult<AppConfig> {
    let config_dir = root.join(CONFIG_DIR);

    // If .appforge doesn't exist, use defaults everywhere
    if !config_dir.exists() {
        debug!(root = %root.display(), "no {CONFIG_DIR} directory, using defaults");
        return Ok(AppConfig {
            global: GlobalConfig::default(),
            stages: fill_missing_stages(HashMap::new())?,
        });
    }

    let global = load_global_config(&config_dir)?;
    let stages = fill_missing_stages(load_stage_files(&config_dir)?)?;

    Ok(AppConfig { global, stages })
}

/// Loads global configuration from `config.toml`.
fn load_global_config(config_dir: &Path) -> ConfigResult<GlobalConfig> {
    let config_path = config_dir.join("config.toml");

    // If config.toml doesn't exist, return default
    if !config_path.exists() {
        return Ok(GlobalConfig::default());
    }

    let content =
        std::fs::read_to_string(&config_path).map_err(|source| ConfigError::FileRead {
            path: config_path.clone(),
            source,
        })?;

    let config: GlobalConfig =
        toml::from_str(&content).map_err(|source| ConfigError::TomlParse {
            path: config_path,
            source,
        })?;

    Ok(config)
}

/// Loads every stage definition from `stages/*.md`.
fn load_stage_files(config_dir: &Path) -> ConfigResult<HashMap<StageKind, StageInstructions>> {
    let stages_dir = config_dir.join("stages");
    let mut stages = HashMap::new();

    if !stages_dir.exists() {
        return Ok(stages);
    }

    let mut defined_in: HashMap<StageKind, PathBuf> = HashMap::new();

    for entry in WalkDir::new(&stages_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|source| ConfigError::FileRead {
            path: stages_dir.clone(),
            source: source.into(),
        })?;

        let path = entry.path();

        // Only process .md files
        if path.extension().and_then(|s| s.to_str()) != Some("md") {
            continue;
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;

        let instructions = parse_stage_file(path, &content)?;

        if let Some(previous) = defined_in.get(&instructions.stage) {
            return Err(ConfigError::DuplicateStage {
                stage: instructions.stage,
                first: previous.clone(),
                second: path.to_path_buf(),
            });
        }

        defined_in.insert(instructions.stage, path.to_path_buf());
        stages.insert(instructions.stage, instructions);
    }

    Ok(stages)
}

/// Parse a Markdown stage file: YAML front matter plus the system prompt body.
pub fn parse_stage_file(path: &Path, content: &str) -> ConfigResult<StageInstructions> {
    let matter = Matter::<YAML>::new();
    let result = matter.parse(content);

    let mut instructions: StageInstructions = result
        .data
        .ok_or_else(|| ConfigError::StageParse {
            path: path.to_path_buf(),
            reason: "Missing YAML front matter".to_string(),
        })?
        .deserialize()
        .map_err(|e| ConfigError::StageParse {
            path: path.to_path_buf(),
            reason: format!("Failed to deserialize front matter: {e}"),
        })?;

    // The body is passed to the stage untouched
    instructions.system_prompt = result.content;

    Ok(instructions)
}

/// Complete the loaded set with embedded templates and return it in stage order.
fn fill_missing_stages(
    mut loaded: HashMap<StageKind, StageInstructions>,
) -> ConfigResult<Vec<StageInstructions>> {
    let mut stages = Vec::with_capacity(StageKind::ALL.len());

    for stage in StageKind::ALL {
        let instructions = match loaded.remove(&stage) {
            Some(instructions) => instructions,
            None => embedded_stage(stage)?,
        };
        stages.push(instructions);
    }

    Ok(stages)
}

fn embedded_stage(stage: StageKind) -> ConfigResult<StageInstructions> {
    let template_path = format!("stages/{}.md", stage.slug());
    match get_template(&template_path) {
        Some(content) => parse_stage_file(Path::new(&template_path), &content),
        None => Ok(StageInstructions::defaults_for(stage)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_protocol::generation_models::PipelineMode;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_load_config_acceptance() {
        // Setup: Create temporary .appforge directory structure
        let dir = tempdir().expect("Failed to create temp dir");
        let root = dir.path();
        let config_dir = root.join(CONFIG_DIR);

        fs::create_dir_all(config_dir.join("stages")).expect("Failed to create stages dir");

        let config_toml = r#"
mode = "single"
min_review_length = 120

[api]
api_key_env = "MY_KEY"
"#;
        fs::write(config_dir.join("config.toml"), config_toml).expect("Failed to write config.toml");

        let planner_md = r#"---
stage: planner
model: mock-planner
temperature: 0.7
---

You are a product planner. List the features."#;
        fs::write(config_dir.join("stages/planner.md"), planner_md)
            .expect("Failed to write stage file");

        let config = load_config(root).await.expect("Failed to load config");

        assert_eq!(config.global.mode, PipelineMode::Single);
        assert_eq!(config.global.min_review_length, 120);
        assert_eq!(config.global.api.api_key_env, "MY_KEY");

        assert_eq!(config.stages.len(), 4, "Every stage is present");
        let planner = config.instructions_for(StageKind::Planner);
        assert_eq!(planner.model, "mock-planner");
        assert_eq!(planner.temperature, Some(0.7));
        assert!(
            planner.system_prompt.contains("product planner"),
            "System prompt should be loaded from markdown body"
        );

        // Stages are returned in execution order
        let order: Vec<StageKind> = config.stages.iter().map(|s| s.stage).collect();
        assert_eq!(order, StageKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_load_config_empty_directory() {
        let dir = tempdir().expect("Failed to create temp dir");

        let config = load_config(dir.path())
            .await
            .expect("Should handle missing .appforge");

        assert_eq!(config.global, GlobalConfig::default());
        assert_eq!(config.stages.len(), 4);
        // Embedded templates provide the stage instructions
        assert!(config
            .stages
            .iter()
            .all(|s| !s.system_prompt.trim().is_empty()));
    }

    #[tokio::test]
    async fn test_load_config_partial() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).expect("Failed to create .appforge");

        fs::write(config_dir.join("config.toml"), "notify_interval_ms = 250")
            .expect("Failed to write config.toml");

        let config = load_config(dir.path())
            .await
            .expect("Should handle partial config");

        assert_eq!(config.global.notify_interval_ms, 250);
        assert_eq!(config.global.mode, PipelineMode::Multi);
        assert_eq!(config.stages.len(), 4);
    }

    #[tokio::test]
    async fn test_load_config_invalid_toml() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).expect("Failed to create .appforge");

        fs::write(config_dir.join("config.toml"), "mode = [invalid toml")
            .expect("Failed to write config.toml");

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::TomlParse { path, .. }) = result {
            assert!(path.ends_with("config.toml"));
        } else {
            panic!("Expected TomlParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_unknown_mode_is_rejected() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(&config_dir).expect("Failed to create .appforge");

        fs::write(config_dir.join("config.toml"), "mode = \"parallel\"")
            .expect("Failed to write config.toml");

        let result = load_config(dir.path()).await;
        assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
    }

    #[tokio::test]
    async fn test_load_config_stage_no_frontmatter() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("stages")).expect("Failed to create stages dir");

        fs::write(config_dir.join("stages/coder.md"), "Just plain markdown content")
            .expect("Failed to write stage file");

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::StageParse { path, reason }) = result {
            assert!(path.ends_with("coder.md"));
            assert!(reason.contains("Missing YAML front matter"));
        } else {
            panic!("Expected StageParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_stage_unknown_kind() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("stages")).expect("Failed to create stages dir");

        let stage_md = r#"---
stage: deployer
model: gpt-4o
---

Deploy it"#;
        fs::write(config_dir.join("stages/deployer.md"), stage_md)
            .expect("Failed to write stage file");

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::StageParse { reason, .. }) = result {
            assert!(reason.contains("Failed to deserialize"));
        } else {
            panic!("Expected StageParse error");
        }
    }

    #[tokio::test]
    async fn test_load_config_duplicate_stage() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("stages")).expect("Failed to create stages dir");

        for name in ["a.md", "b.md"] {
            let stage_md = "---\nstage: themer\nmodel: mock\n---\n\nTheme it";
            fs::write(config_dir.join("stages").join(name), stage_md)
                .expect("Failed to write stage file");
        }

        let result = load_config(dir.path()).await;

        if let Err(ConfigError::DuplicateStage {
            stage,
            first,
            second,
        }) = result
        {
            assert_eq!(stage, StageKind::Themer);
            assert!(first.ends_with("a.md"));
            assert!(second.ends_with("b.md"));
        } else {
            panic!("Expected DuplicateStage error");
        }
    }

    #[tokio::test]
    async fn test_load_config_ignores_non_matching_files() {
        let dir = tempdir().expect("Failed to create temp dir");
        let config_dir = dir.path().join(CONFIG_DIR);
        fs::create_dir_all(config_dir.join("stages")).expect("Failed to create stages dir");

        fs::write(config_dir.join("stages/readme.txt"), "Not a markdown file")
            .expect("Failed to write txt file");

        let config = load_config(dir.path())
            .await
            .expect("Should ignore non-matching files");

        assert_eq!(config.stages.len(), 4);
    }
}
