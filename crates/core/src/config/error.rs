//! Errors raised while loading `.appforge/`.

use af_protocol::stage_models::StageKind;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    /// `config.toml` or a stage file could not be read, or `stages/` could not be listed.
    #[error("Failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse TOML file at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Stage file front matter is missing or does not describe a known stage.
    #[error("Invalid stage file {path}: {reason}")]
    StageParse { path: PathBuf, reason: String },

    #[error("Stage '{stage}' is defined in both {first} and {second}")]
    DuplicateStage {
        stage: StageKind,
        first: PathBuf,
        second: PathBuf,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
