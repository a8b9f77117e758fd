//! Logger that writes the run lifecycle as structured `tracing` events.

use super::base::{GenerationLogger, LogError, SessionId};
use af_protocol::generation_models::{GenerationState, PipelineMode};
use af_protocol::stage_models::{ContextAccumulator, ExecutionRecord, StageKind};
use tracing::{info, warn};

/// Target used for every audit event, so it can be filtered on its own
/// (`RUST_LOG=appforge::audit=info`).
pub const AUDIT_TARGET: &str = "appforge::audit";

/// Writes one `tracing` event per lifecycle call under [`AUDIT_TARGET`].
#[derive(Debug, Default, Clone)]
pub struct TracingLogger;

impl TracingLogger {
    pub fn new() -> Self {
        Self
    }
}

impl GenerationLogger for TracingLogger {
    fn session_start(&self, prompt: &str, mode: PipelineMode) -> Result<SessionId, LogError> {
        let session = SessionId::new();
        info!(
            target: AUDIT_TARGET,
            session = %session,
            mode = ?mode,
            prompt_chars = prompt.chars().count(),
            "session started"
        );
        Ok(session)
    }

    fn stage_start(
        &self,
        session: &SessionId,
        stage: StageKind,
        context: &ContextAccumulator,
    ) -> Result<(), LogError> {
        info!(
            target: AUDIT_TARGET,
            session = %session,
            stage = %stage,
            has_plan = context.planner_output.is_some(),
            has_theme = context.themer_output.is_some(),
            has_code = context.coder_output.is_some(),
            "stage started"
        );
        Ok(())
    }

    fn stage_complete(&self, session: &SessionId, record: &ExecutionRecord) -> Result<(), LogError> {
        info!(
            target: AUDIT_TARGET,
            session = %session,
            stage = %record.stage,
            duration_seconds = record.duration_seconds,
            content_chars = record.content.as_deref().map_or(0, |c| c.chars().count()),
            "stage completed"
        );
        Ok(())
    }

    fn stage_failed(
        &self,
        session: &SessionId,
        stage: StageKind,
        error: &str,
        duration_seconds: f64,
    ) -> Result<(), LogError> {
        warn!(
            target: AUDIT_TARGET,
            session = %session,
            stage = %stage,
            duration_seconds,
            error,
            "stage failed"
        );
        Ok(())
    }

    fn fallback(
        &self,
        session: &SessionId,
        original_error: &str,
        fallback_stage: StageKind,
    ) -> Result<(), LogError> {
        warn!(
            target: AUDIT_TARGET,
            session = %session,
            fallback_stage = %fallback_stage,
            original_error,
            "falling back to single-stage generation"
        );
        Ok(())
    }

    fn session_complete(
        &self,
        session: &SessionId,
        final_state: &GenerationState,
    ) -> Result<(), LogError> {
        info!(
            target: AUDIT_TARGET,
            session = %session,
            status = ?final_state.status,
            mode = ?final_state.mode,
            executions = final_state.executions.len(),
            elapsed_seconds = final_state.elapsed_seconds().unwrap_or_default(),
            error = final_state.error.as_deref().unwrap_or(""),
            "session completed"
        );
        Ok(())
    }
}
