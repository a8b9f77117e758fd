use af_core::config::loader::load_config;
use af_core::stages::ClientKind;
use colored::Colorize;
use std::path::Path;

pub async fn run(root: &Path) -> color_eyre::Result<()> {
    let config = load_config(root).await?;

    println!("Default mode: {:?}", config.global.mode);
    for (position, instructions) in config.stages.iter().enumerate() {
        let stage = instructions.stage;
        let client = ClientKind::from_model_name(&instructions.model);
        println!(
            "{}. {:<9} {} ({})",
            position + 1,
            stage.label().bold(),
            instructions.model.cyan(),
            client.name()
        );
        println!("   {}", stage.description().dimmed());
    }
    Ok(())
}
