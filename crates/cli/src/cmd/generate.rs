use crate::progress::ProgressPrinter;
use af_core::config::loader::load_config;
use af_core::engine::{CancellationFlag, PipelineOrchestrator};
use af_core::logging::{ChannelLogger, GenerationLogger, TracingLogger};
use af_core::state::{StateStore, ThrottledPublisher};
use af_protocol::generation_models::PipelineMode;
use af_protocol::ipc::Event;
use color_eyre::eyre::{eyre, WrapErr};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

const EVENT_BUFFER: usize = 256;

pub struct GenerateOptions {
    pub prompt: String,
    pub mode: Option<PipelineMode>,
    pub output: Option<PathBuf>,
    pub quiet: bool,
    pub json: bool,
}

pub async fn run(root: &Path, options: GenerateOptions) -> color_eyre::Result<()> {
    if options.prompt.trim().is_empty() {
        return Err(eyre!("prompt must not be empty"));
    }

    let config = load_config(root)
        .await
        .wrap_err_with(|| format!("failed to load configuration from {}", root.display()))?;
    let mode = config.resolve_mode(options.mode);
    debug!(?mode, "resolved pipeline mode");

    let store = Arc::new(StateStore::new());
    let (events_tx, events_rx) = mpsc::channel::<Event>(EVENT_BUFFER);

    let mut publisher = None;
    let mut printer = None;
    let logger: Arc<dyn GenerationLogger> = if options.quiet {
        Arc::new(TracingLogger::new())
    } else {
        publisher = Some(ThrottledPublisher::spawn(
            store.subscribe(),
            Duration::from_millis(config.global.notify_interval_ms),
            events_tx.clone(),
        ));
        printer = Some(tokio::spawn(ProgressPrinter::new().run(events_rx)));
        Arc::new(ChannelLogger::new(events_tx))
    };

    let orchestrator = PipelineOrchestrator::from_config(&config, Arc::clone(&store), logger)
        .map_err(|e| eyre!(e))?;

    let cancel = CancellationFlag::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "Cancelling after the current stage...".yellow());
                cancel.cancel();
            }
        })
    };

    let state = orchestrator
        .generate_with_cancel(&options.prompt, mode, &cancel)
        .await;
    ctrl_c.abort();

    // Dropping the store lets the publisher flush the final state and finish
    drop(orchestrator);
    drop(store);
    if let Some(publisher) = publisher {
        publisher.await?;
    }
    if let Some(printer) = printer {
        printer.await?;
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
        return match state.error {
            Some(error) => Err(eyre!("generation failed: {error}")),
            None => Ok(()),
        };
    }

    match (state.final_artifact, state.error) {
        (Some(artifact), _) => {
            match options.output {
                Some(path) => {
                    std::fs::write(&path, &artifact)
                        .wrap_err_with(|| format!("failed to write {}", path.display()))?;
                    eprintln!("{} {}", "Wrote".green(), path.display());
                }
                None => println!("{artifact}"),
            }
            Ok(())
        }
        (None, Some(error)) => Err(eyre!("generation failed: {error}")),
        (None, None) => Err(eyre!("generation finished without a result")),
    }
}
