use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod cmd;
mod progress;

#[derive(Parser)]
#[command(name = "appforge")]
#[command(version, about = "Turn a prompt into a runnable single-page app")]
pub struct Cli {
    /// Log level for diagnostics on stderr (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Project directory containing `.appforge/`
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create `.appforge/` with the default configuration and stage files
    Init {
        /// Overwrite an existing `.appforge/` directory
        #[arg(long)]
        force: bool,
    },
    /// Generate an application from a prompt
    Generate {
        /// What to build
        prompt: String,

        /// Pipeline shape; defaults to the configured mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Write the artifact here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not print stage progress
        #[arg(short, long)]
        quiet: bool,

        /// Print the final state as JSON instead of the artifact
        #[arg(long)]
        json: bool,
    },
    /// List the configured stages
    Stages,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Single,
    Multi,
}

impl From<ModeArg> for af_protocol::generation_models::PipelineMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => Self::Single,
            ModeArg::Multi => Self::Multi,
        }
    }
}

fn init_tracing(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let root = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { force } => cmd::init::run(&root, force).await,
        Commands::Generate {
            prompt,
            mode,
            output,
            quiet,
            json,
        } => {
            let options = cmd::generate::GenerateOptions {
                prompt,
                mode: mode.map(Into::into),
                output,
                quiet,
                json,
            };
            cmd::generate::run(&root, options).await
        }
        Commands::Stages => cmd::stages::run(&root).await,
    }
}
