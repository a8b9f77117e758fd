//! Directory structure and file generation for `.appforge` initialization.

use super::error::{InitError, InitResult};
use super::templates::{get_template, list_templates};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Options for initializing a `.appforge` directory.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Target directory where `.appforge` will be created.
    pub target_dir: PathBuf,

    /// Overwrite existing `.appforge` directory if it exists.
    pub force: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            target_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            force: false,
        }
    }
}

/// Generate a complete `.appforge` directory structure with templates.
///
/// This function creates the following structure:
/// ```text
/// .appforge/
/// ├── config.toml
/// └── stages/
///     ├── coder.md
///     ├── planner.md
///     ├── reviewer.md
///     └── themer.md
/// ```
///
/// # Arguments
/// * `options` - Configuration for the initialization process
///
/// # Returns
/// The paths written, or an `InitError` if the `.appforge` directory already
/// exists without the force flag or a write fails.
pub async fn generate_appforge_structure(options: InitOptions) -> InitResult<Vec<PathBuf>> {
    let af_dir = options.target_dir.join(".appforge");

    if af_dir.exists() && !options.force {
        return Err(InitError::DirectoryExists(af_dir));
    }

    let mut written = Vec::new();
    for template_path in list_templates("") {
        let Some(content) = get_template(&template_path) else {
            continue;
        };
        written.push(write_template_file(&af_dir, &template_path, &content)?);
    }

    debug!(dir = %af_dir.display(), files = written.len(), "initialized appforge directory");
    Ok(written)
}

/// Write one template below `af_dir`, returning the written path.
fn write_template_file(af_dir: &Path, template_path: &str, content: &str) -> InitResult<PathBuf> {
    let target_path = af_dir.join(template_path);

    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|source| InitError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&target_path, content).map_err(|source| InitError::Write {
        path: target_path.clone(),
        source,
    })?;

    Ok(target_path)
}
