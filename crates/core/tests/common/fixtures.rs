//! Test fixtures for creating sample configurations and orchestrators.

use af_core::engine::{PipelineOrchestrator, PipelineSettings};
use af_core::logging::GenerationLogger;
use af_core::stages::{MockStage, StageRegistry};
use af_core::state::StateStore;
use af_protocol::stage_models::StageKind;
use std::sync::Arc;
use tempfile::TempDir;

pub const PLAN: &str = "1. Countdown display\n2. Start and reset buttons";
pub const THEME: &str = "Dark background #111827, accent #f59e0b, font Inter";
pub const CODE: &str = "<!DOCTYPE html><html><body><h1 id=\"t\">00:00</h1><button>Start</button></body></html>";
pub const REVIEWED: &str = "<!DOCTYPE html><html><body><h1 id=\"t\">00:00</h1><button>Start</button><button>Reset</button></body></html>";

/// One mock client per stage, all succeeding with the constants above.
#[allow(dead_code)]
pub struct MockStages {
    pub planner: MockStage,
    pub themer: MockStage,
    pub coder: MockStage,
    pub reviewer: MockStage,
}

impl Default for MockStages {
    fn default() -> Self {
        Self {
            planner: MockStage::success(PLAN),
            themer: MockStage::success(THEME),
            coder: MockStage::success(CODE),
            reviewer: MockStage::success(REVIEWED),
        }
    }
}

impl MockStages {
    #[allow(dead_code)]
    pub fn registry(&self) -> StageRegistry {
        StageRegistry::new()
            .with_client(StageKind::Planner, Arc::new(self.planner.clone()))
            .with_client(StageKind::Themer, Arc::new(self.themer.clone()))
            .with_client(StageKind::Coder, Arc::new(self.coder.clone()))
            .with_client(StageKind::Reviewer, Arc::new(self.reviewer.clone()))
    }

    /// Total calls across all four stages.
    #[allow(dead_code)]
    pub fn total_calls(&self) -> usize {
        self.planner.call_count()
            + self.themer.call_count()
            + self.coder.call_count()
            + self.reviewer.call_count()
    }
}

/// Build an orchestrator over `stages` with default settings and a fresh store.
#[allow(dead_code)]
pub fn build_orchestrator(
    stages: &MockStages,
    logger: Arc<dyn GenerationLogger>,
) -> PipelineOrchestrator {
    build_orchestrator_with(stages, logger, PipelineSettings::default())
}

#[allow(dead_code)]
pub fn build_orchestrator_with(
    stages: &MockStages,
    logger: Arc<dyn GenerationLogger>,
    settings: PipelineSettings,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        stages.registry(),
        Arc::new(StateStore::new()),
        logger,
        settings,
    )
}

/// Create a temporary project whose `.appforge` config uses offline models.
///
/// `coder_model` selects the Coder client (`mock` or `mock-fail`).
///
/// Returns a TempDir that must be kept alive for the test duration.
#[allow(dead_code)]
pub fn create_test_project(coder_model: &str) -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let stages_dir = temp_dir.path().join(".appforge/stages");
    std::fs::create_dir_all(&stages_dir)?;

    std::fs::write(
        temp_dir.path().join(".appforge/config.toml"),
        "mode = \"multi\"\nmin_review_length = 50\nnotify_interval_ms = 5\n",
    )?;

    for stage in StageKind::ALL {
        let model = if stage == StageKind::Coder {
            coder_model
        } else {
            "mock"
        };
        let content = format!(
            "---\nstage: {}\nmodel: {model}\n---\n\nYou are the {} stage.",
            stage.slug(),
            stage.slug()
        );
        std::fs::write(stages_dir.join(format!("{}.md", stage.slug())), content)?;
    }

    Ok(temp_dir)
}
