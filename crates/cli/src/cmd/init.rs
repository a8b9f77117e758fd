use af_core::init::{generate_appforge_structure, InitOptions};
use colored::Colorize;
use std::path::Path;

pub async fn run(root: &Path, force: bool) -> color_eyre::Result<()> {
    let written = generate_appforge_structure(InitOptions {
        target_dir: root.to_path_buf(),
        force,
    })
    .await?;

    for path in &written {
        let shown = path.strip_prefix(root).unwrap_or(path);
        eprintln!("  {} {}", "created".green(), shown.display());
    }
    eprintln!(
        "{} Set {} and run {}",
        "Initialized appforge.".bold(),
        "APPFORGE_API_KEY".cyan(),
        "appforge generate \"<prompt>\"".cyan()
    );
    Ok(())
}
