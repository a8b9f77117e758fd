//! Logging collaborator trait and shared types.

use af_protocol::generation_models::{GenerationState, PipelineMode};
use af_protocol::stage_models::{ContextAccumulator, ExecutionRecord, StageKind};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifies one logging session, i.e. one `generate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Errors a logger may report. None of them affect the pipeline outcome.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogError {
    #[error("Log sink is closed")]
    SinkClosed,

    #[error("Log sink is full, event dropped")]
    SinkFull,

    #[error("Failed to write log entry: {0}")]
    WriteFailed(String),
}

/// Receives the lifecycle of every generation run.
///
/// All methods are synchronous and must not block for long; they are called
/// inline between stage invocations.
pub trait GenerationLogger: Send + Sync {
    /// A run has started. The returned id is passed to every later call.
    fn session_start(&self, prompt: &str, mode: PipelineMode) -> Result<SessionId, LogError>;

    /// A stage is about to be invoked with `context`.
    fn stage_start(
        &self,
        session: &SessionId,
        stage: StageKind,
        context: &ContextAccumulator,
    ) -> Result<(), LogError>;

    /// A stage returned usable content.
    fn stage_complete(&self, session: &SessionId, record: &ExecutionRecord) -> Result<(), LogError>;

    /// A stage failed, or its content was rejected.
    fn stage_failed(
        &self,
        session: &SessionId,
        stage: StageKind,
        error: &str,
        duration_seconds: f64,
    ) -> Result<(), LogError>;

    /// The multi-stage run was abandoned in favour of `fallback_stage` alone.
    fn fallback(
        &self,
        session: &SessionId,
        original_error: &str,
        fallback_stage: StageKind,
    ) -> Result<(), LogError>;

    /// The run has finished with `final_state`.
    fn session_complete(
        &self,
        session: &SessionId,
        final_state: &GenerationState,
    ) -> Result<(), LogError>;
}
