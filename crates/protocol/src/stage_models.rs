//! Stage definitions and per-stage execution records.
//!
//! A generation run in multi-stage mode walks a fixed, closed set of stages
//! (Planner → Themer → Coder → Reviewer). Each attempt at a stage produces one
//! immutable [`ExecutionRecord`], and each stage is fed a [`ContextAccumulator`]
//! snapshot assembled from the records that came before it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

/// One step of the multi-stage generation sequence.
///
/// The declaration order is the execution order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    /// Turns the prompt into a structured build plan.
    Planner,

    /// Derives a visual theme for the plan.
    Themer,

    /// Produces the runnable artifact. Also the only stage used in single mode.
    Coder,

    /// Optional polish pass over the Coder's artifact.
    Reviewer,
}

impl StageKind {
    /// All stages in execution order.
    pub const ALL: [StageKind; 4] = [
        StageKind::Planner,
        StageKind::Themer,
        StageKind::Coder,
        StageKind::Reviewer,
    ];

    /// Human-readable label for progress displays.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planner => "Planner",
            Self::Themer => "Themer",
            Self::Coder => "Coder",
            Self::Reviewer => "Reviewer",
        }
    }

    /// Logical model identifier used when no stage file overrides it.
    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Planner => "gpt-4o",
            Self::Themer => "gpt-4o-mini",
            Self::Coder => "gpt-4o",
            Self::Reviewer => "gpt-4o-mini",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Planner => "Breaks the request down into features, layout and behaviour",
            Self::Themer => "Chooses colours, typography and spacing for the plan",
            Self::Coder => "Writes the complete single-file application",
            Self::Reviewer => "Checks the application for bugs and polishes the result",
        }
    }

    /// Lowercase identifier used in file names and front matter.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Planner => "planner",
            Self::Themer => "themer",
            Self::Coder => "coder",
            Self::Reviewer => "reviewer",
        }
    }

    /// Whether a failure at this stage aborts the multi-stage run.
    ///
    /// Only the Reviewer is allowed to fail without triggering the fallback.
    pub fn is_fatal_on_failure(&self) -> bool {
        !matches!(self, Self::Reviewer)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle status of a single stage execution.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Idle,
    Preparing,
    Executing,
    Completed,
    Failed,
}

/// Immutable outcome of one stage attempt.
///
/// Records are only ever created finalized (`Completed` or `Failed`) through
/// [`ExecutionRecord::completed`] and [`ExecutionRecord::failed`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct ExecutionRecord {
    pub stage: StageKind,
    pub status: ExecutionStatus,

    /// Stage output. Present on `Completed` records, and on `Failed` records
    /// whose output was received but rejected.
    pub content: Option<String>,

    pub error: Option<String>,

    /// Wall-clock duration of the stage call. Never negative.
    pub duration_seconds: f64,

    #[ts(type = "string")]
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    pub fn completed(stage: StageKind, content: String, duration_seconds: f64) -> Self {
        Self {
            stage,
            status: ExecutionStatus::Completed,
            content: Some(content),
            error: None,
            duration_seconds: duration_seconds.max(0.0),
            timestamp: Utc::now(),
        }
    }

    pub fn failed(stage: StageKind, error: String, duration_seconds: f64) -> Self {
        Self {
            stage,
            status: ExecutionStatus::Failed,
            content: None,
            error: Some(error),
            duration_seconds: duration_seconds.max(0.0),
            timestamp: Utc::now(),
        }
    }

    /// Keep the rejected output on a failed record for audit purposes.
    pub fn with_rejected_content(mut self, content: String) -> Self {
        self.content = Some(content);
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

/// Snapshot of everything a stage needs to build its request.
///
/// Built fresh before each stage invocation and never shared mutably.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ContextAccumulator {
    pub original_prompt: String,
    pub planner_output: Option<String>,
    pub themer_output: Option<String>,
    pub coder_output: Option<String>,
    pub current_stage: StageKind,
    pub extra_instructions: Option<String>,
}

impl ContextAccumulator {
    /// Context for the single-stage path: the prompt and nothing else.
    pub fn single(original_prompt: impl Into<String>) -> Self {
        Self {
            original_prompt: original_prompt.into(),
            planner_output: None,
            themer_output: None,
            coder_output: None,
            current_stage: StageKind::Coder,
            extra_instructions: None,
        }
    }

    /// Build the context for `current_stage` from the records executed so far.
    ///
    /// Only completed records feed a slot. If a stage appears more than once the
    /// latest completed record wins.
    pub fn from_records(
        original_prompt: impl Into<String>,
        current_stage: StageKind,
        records: &[ExecutionRecord],
    ) -> Self {
        let mut context = Self {
            original_prompt: original_prompt.into(),
            planner_output: None,
            themer_output: None,
            coder_output: None,
            current_stage,
            extra_instructions: None,
        };

        for record in records.iter().filter(|r| r.is_completed()) {
            let content = record.content.clone();
            match record.stage {
                StageKind::Planner => context.planner_output = content,
                StageKind::Themer => context.themer_output = content,
                StageKind::Coder => context.coder_output = content,
                StageKind::Reviewer => {}
            }
        }

        context
    }

    pub fn with_extra_instructions(mut self, extra: Option<String>) -> Self {
        self.extra_instructions = extra.filter(|s| !s.trim().is_empty());
        self
    }
}

/// Static, per-stage instructions loaded from `.appforge/stages/*.md`.
///
/// The body of the Markdown file is the system prompt; it is opaque to the
/// pipeline and passed to the stage client untouched.
///
/// # Example
///
/// ```markdown
/// ---
/// stage: planner
/// model: gpt-4o
/// temperature: 0.4
/// ---
///
/// You are a product planner. Describe the features of the requested app.
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StageInstructions {
    pub stage: StageKind,

    /// Model identifier sent to the inference service.
    pub model: String,

    #[serde(default)]
    pub temperature: Option<f32>,

    /// Body of the stage file. Not part of the front matter.
    #[serde(skip)]
    pub system_prompt: String,
}

impl StageInstructions {
    /// Instructions with the stage's default model and no system prompt.
    pub fn defaults_for(stage: StageKind) -> Self {
        Self {
            stage,
            model: stage.default_model().to_string(),
            temperature: None,
            system_prompt: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order_is_sorted() {
        let mut sorted = StageKind::ALL;
        sorted.sort();
        assert_eq!(sorted, StageKind::ALL);
    }

    #[test]
    fn test_only_reviewer_is_non_fatal() {
        assert!(StageKind::Planner.is_fatal_on_failure());
        assert!(StageKind::Themer.is_fatal_on_failure());
        assert!(StageKind::Coder.is_fatal_on_failure());
        assert!(!StageKind::Reviewer.is_fatal_on_failure());
    }

    #[test]
    fn test_failed_record_clamps_duration() {
        let record = ExecutionRecord::failed(StageKind::Coder, "boom".to_string(), -1.0);
        assert_eq!(record.status, ExecutionStatus::Failed);
        assert_eq!(record.duration_seconds, 0.0);
        assert!(record.content.is_none());
        assert_eq!(record.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_context_from_records_fills_named_slots() {
        let records = vec![
            ExecutionRecord::completed(StageKind::Planner, "plan".to_string(), 1.0),
            ExecutionRecord::completed(StageKind::Themer, "theme".to_string(), 1.0),
        ];

        let context = ContextAccumulator::from_records("Build a timer", StageKind::Coder, &records);

        assert_eq!(context.original_prompt, "Build a timer");
        assert_eq!(context.planner_output.as_deref(), Some("plan"));
        assert_eq!(context.themer_output.as_deref(), Some("theme"));
        assert!(context.coder_output.is_none());
        assert_eq!(context.current_stage, StageKind::Coder);
    }

    #[test]
    fn test_context_ignores_failed_records() {
        let records = vec![
            ExecutionRecord::completed(StageKind::Coder, "<html></html>".to_string(), 1.0),
            ExecutionRecord::failed(StageKind::Reviewer, "timeout".to_string(), 1.0)
                .with_rejected_content("short".to_string()),
        ];

        let context = ContextAccumulator::from_records("p", StageKind::Reviewer, &records);
        assert_eq!(context.coder_output.as_deref(), Some("<html></html>"));
        assert!(context.planner_output.is_none());
    }

    #[test]
    fn test_single_context_has_only_prompt() {
        let context = ContextAccumulator::single("Build a timer");
        assert_eq!(context.current_stage, StageKind::Coder);
        assert!(context.planner_output.is_none());
        assert!(context.themer_output.is_none());
        assert!(context.coder_output.is_none());
        assert!(context.extra_instructions.is_none());
    }

    #[test]
    fn test_blank_extra_instructions_are_dropped() {
        let context =
            ContextAccumulator::single("p").with_extra_instructions(Some("   ".to_string()));
        assert!(context.extra_instructions.is_none());
    }
}
