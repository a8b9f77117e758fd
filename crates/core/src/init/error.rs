//! Errors raised by `appforge init`.

use std::path::PathBuf;
use thiserror::Error;

pub type InitResult<T> = Result<T, InitError>;

#[derive(Debug, Error)]
pub enum InitError {
    /// `.appforge/` already exists and `force` was not set.
    #[error(".appforge directory already exists at {0:?}. Use --force to overwrite.")]
    DirectoryExists(PathBuf),

    #[error("Failed to write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
