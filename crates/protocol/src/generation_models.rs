//! Top-level generation state shared with observers.
//!
//! [`GenerationState`] is the single aggregate describing a generation run. It is
//! owned by the state store in `af-core`; everything here is plain data plus the
//! read-only views derived from it.

use crate::stage_models::{ExecutionRecord, StageKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which pipeline shape a run uses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum PipelineMode {
    /// Only the Coder capability, invoked directly on the prompt.
    Single,

    /// The full Planner → Themer → Coder → Reviewer sequence.
    #[default]
    Multi,
}

/// Progress phase of a multi-stage run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelinePhase {
    Idle,
    PlannerPhase,
    ThemerPhase,
    CoderPhase,
    ReviewerPhase,
    Completed,
    Failed,
}

impl PipelinePhase {
    /// The phase during which `stage` runs.
    pub fn for_stage(stage: StageKind) -> Self {
        match stage {
            StageKind::Planner => Self::PlannerPhase,
            StageKind::Themer => Self::ThemerPhase,
            StageKind::Coder => Self::CoderPhase,
            StageKind::Reviewer => Self::ReviewerPhase,
        }
    }

    pub fn progress_fraction(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::PlannerPhase => 0.25,
            Self::ThemerPhase => 0.5,
            Self::CoderPhase => 0.75,
            Self::ReviewerPhase => 0.9,
            Self::Completed => 1.0,
            Self::Failed => 0.0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Overall status of a generation run.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Generating,
    Success,
    Error,
}

/// Aggregate state of one generation run.
///
/// Invariants maintained by the state store:
/// - `status == Success` implies `final_artifact.is_some() && error.is_none()`
/// - `status == Error` implies `error.is_some() && final_artifact.is_none()`
/// - `active_phase` and `current_stage` are only set in multi mode
/// - `executions` is append-only within a run
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct GenerationState {
    pub status: GenerationStatus,
    pub mode: PipelineMode,
    pub prompt: String,
    pub final_artifact: Option<String>,
    pub error: Option<String>,

    #[ts(type = "string | null")]
    pub start_time: Option<DateTime<Utc>>,

    #[ts(type = "string | null")]
    pub end_time: Option<DateTime<Utc>>,

    pub active_phase: Option<PipelinePhase>,
    pub current_stage: Option<StageKind>,
    pub executions: Vec<ExecutionRecord>,
}

impl Default for GenerationState {
    fn default() -> Self {
        Self::idle()
    }
}

impl GenerationState {
    /// A fresh state with nothing running.
    ///
    /// Contains no timestamps, so two idle states always compare equal.
    pub fn idle() -> Self {
        Self {
            status: GenerationStatus::Idle,
            mode: PipelineMode::default(),
            prompt: String::new(),
            final_artifact: None,
            error: None,
            start_time: None,
            end_time: None,
            active_phase: None,
            current_stage: None,
            executions: Vec::new(),
        }
    }

    pub fn is_generating(&self) -> bool {
        self.status == GenerationStatus::Generating
    }

    pub fn has_error(&self) -> bool {
        self.status == GenerationStatus::Error
    }

    pub fn has_success(&self) -> bool {
        self.status == GenerationStatus::Success
    }

    /// Progress in `[0, 1]`.
    ///
    /// Multi-mode runs report the phase mapping. Single-mode runs have no phases
    /// and report by status instead.
    pub fn progress_fraction(&self) -> f64 {
        if let Some(phase) = self.active_phase {
            return phase.progress_fraction();
        }
        match self.status {
            GenerationStatus::Idle => 0.0,
            GenerationStatus::Generating => 0.5,
            GenerationStatus::Success => 1.0,
            GenerationStatus::Error => 0.0,
        }
    }

    /// Human-readable status line for progress displays.
    pub fn phase_description(&self) -> &'static str {
        match (self.mode, self.active_phase, self.status) {
            (_, _, GenerationStatus::Idle) => "Ready",
            (PipelineMode::Multi, Some(PipelinePhase::Idle), _) => "Preparing pipeline...",
            (PipelineMode::Multi, Some(PipelinePhase::PlannerPhase), _) => {
                "Planning the application..."
            }
            (PipelineMode::Multi, Some(PipelinePhase::ThemerPhase), _) => {
                "Designing the visual theme..."
            }
            (PipelineMode::Multi, Some(PipelinePhase::CoderPhase), _) => "Writing the code...",
            (PipelineMode::Multi, Some(PipelinePhase::ReviewerPhase), _) => {
                "Reviewing and polishing..."
            }
            (PipelineMode::Multi, Some(PipelinePhase::Completed), _) => "Pipeline complete",
            (PipelineMode::Multi, Some(PipelinePhase::Failed), _) => "Pipeline failed",
            (_, _, GenerationStatus::Generating) => "Generating application...",
            (_, _, GenerationStatus::Success) => "Generation complete",
            (_, _, GenerationStatus::Error) => "Generation failed",
        }
    }

    /// Total wall-clock time of the run, once it has ended.
    pub fn elapsed_seconds(&self) -> Option<f64> {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => {
                Some((end - start).num_milliseconds().max(0) as f64 / 1000.0)
            }
            _ => None,
        }
    }
}
