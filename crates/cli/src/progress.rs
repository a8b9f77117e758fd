//! Stage progress on stderr, rendered from the event channel.

use af_protocol::generation_models::{GenerationStatus, PipelineMode};
use af_protocol::ipc::Event;
use colored::Colorize;
use tokio::sync::mpsc;

/// Turns events into human-readable progress lines.
#[derive(Default)]
pub struct ProgressPrinter {
    last_description: Option<&'static str>,
}

impl ProgressPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Print until every sender is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        while let Some(event) = events.recv().await {
            if let Some(line) = self.render(&event) {
                eprintln!("{line}");
            }
        }
    }

    /// The line to print for `event`, if any.
    ///
    /// State snapshots only produce a line when the phase description changes.
    pub fn render(&mut self, event: &Event) -> Option<String> {
        match event {
            Event::StateChanged { state } => {
                if state.status == GenerationStatus::Idle {
                    return None;
                }
                let description = state.phase_description();
                if self.last_description == Some(description) {
                    return None;
                }
                self.last_description = Some(description);
                let percent = (state.progress_fraction() * 100.0).round() as u32;
                Some(format!("[{percent:>3}%] {description}").dimmed().to_string())
            }
            Event::SessionStarted { mode, .. } => {
                let shape = match mode {
                    PipelineMode::Single => "single-stage",
                    PipelineMode::Multi => "multi-stage",
                };
                Some(format!("{} {shape} generation", "Starting".bold()))
            }
            Event::StageStarted { stage, .. } => Some(format!("  {} {}...", "→".cyan(), stage)),
            Event::StageCompleted { record, .. } => Some(format!(
                "  {} {} ({:.1}s)",
                "✓".green(),
                record.stage,
                record.duration_seconds
            )),
            Event::StageFailed {
                stage,
                error,
                duration_seconds,
                ..
            } => Some(format!(
                "  {} {} ({duration_seconds:.1}s): {error}",
                "✗".red(),
                stage
            )),
            Event::FallbackTriggered { original_error, .. } => Some(format!(
                "{} falling back to single-stage generation ({original_error})",
                "↺".yellow()
            )),
            Event::SessionCompleted { state, .. } => {
                let elapsed = state.elapsed_seconds().unwrap_or_default();
                Some(match state.status {
                    GenerationStatus::Success => {
                        format!("{} in {elapsed:.1}s", "Generation complete".green().bold())
                    }
                    _ => format!("{} after {elapsed:.1}s", "Generation failed".red().bold()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_protocol::generation_models::GenerationState;
    use af_protocol::stage_models::StageKind;

    fn plain() {
        colored::control::set_override(false);
    }

    fn generating() -> GenerationState {
        GenerationState {
            status: GenerationStatus::Generating,
            mode: PipelineMode::Single,
            ..GenerationState::idle()
        }
    }

    #[test]
    fn test_repeated_descriptions_are_skipped() {
        plain();
        let mut printer = ProgressPrinter::new();
        let event = Event::StateChanged {
            state: generating(),
        };

        assert_eq!(
            printer.render(&event).as_deref(),
            Some("[ 50%] Generating application...")
        );
        assert_eq!(printer.render(&event), None);
    }

    #[test]
    fn test_idle_state_is_silent() {
        let mut printer = ProgressPrinter::new();
        let event = Event::StateChanged {
            state: GenerationState::idle(),
        };
        assert_eq!(printer.render(&event), None);
    }

    #[test]
    fn test_stage_failure_line() {
        plain();
        let mut printer = ProgressPrinter::new();
        let line = printer
            .render(&Event::StageFailed {
                session_id: uuid_nil(),
                stage: StageKind::Reviewer,
                error: "timed out".to_string(),
                duration_seconds: 2.0,
            })
            .unwrap();
        assert_eq!(line, "  ✗ Reviewer (2.0s): timed out");
    }

    fn uuid_nil() -> af_protocol::Uuid {
        af_protocol::Uuid::nil()
    }
}
