//! Logger implementations for observing and disturbing the orchestrator.

use af_core::logging::{GenerationLogger, LogError, SessionId};
use af_protocol::generation_models::{GenerationState, PipelineMode};
use af_protocol::stage_models::{ContextAccumulator, ExecutionRecord, StageKind};
use std::sync::{Arc, Mutex};

/// One call received by a [`RecordingLogger`].
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum LogCall {
    SessionStart {
        prompt: String,
        mode: PipelineMode,
    },
    StageStart {
        stage: StageKind,
        context: ContextAccumulator,
    },
    StageComplete(ExecutionRecord),
    StageFailed {
        stage: StageKind,
        error: String,
    },
    Fallback {
        original_error: String,
        fallback_stage: StageKind,
    },
    SessionComplete(GenerationState),
}

/// Records every call it receives, in order.
#[derive(Clone, Default)]
pub struct RecordingLogger {
    calls: Arc<Mutex<Vec<LogCall>>>,
    session: SessionId,
}

#[allow(dead_code)]
impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LogCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fallback_calls(&self) -> Vec<(String, StageKind)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LogCall::Fallback {
                    original_error,
                    fallback_stage,
                } => Some((original_error, fallback_stage)),
                _ => None,
            })
            .collect()
    }

    pub fn failed_stages(&self) -> Vec<(StageKind, String)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LogCall::StageFailed { stage, error } => Some((stage, error)),
                _ => None,
            })
            .collect()
    }

    pub fn started_contexts(&self) -> Vec<ContextAccumulator> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                LogCall::StageStart { context, .. } => Some(context),
                _ => None,
            })
            .collect()
    }

    pub fn completed_session(&self) -> Option<GenerationState> {
        self.calls().into_iter().find_map(|call| match call {
            LogCall::SessionComplete(state) => Some(state),
            _ => None,
        })
    }

    fn push(&self, call: LogCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl GenerationLogger for RecordingLogger {
    fn session_start(&self, prompt: &str, mode: PipelineMode) -> Result<SessionId, LogError> {
        self.push(LogCall::SessionStart {
            prompt: prompt.to_string(),
            mode,
        });
        Ok(self.session)
    }

    fn stage_start(
        &self,
        _session: &SessionId,
        stage: StageKind,
        context: &ContextAccumulator,
    ) -> Result<(), LogError> {
        self.push(LogCall::StageStart {
            stage,
            context: context.clone(),
        });
        Ok(())
    }

    fn stage_complete(&self, _session: &SessionId, record: &ExecutionRecord) -> Result<(), LogError> {
        self.push(LogCall::StageComplete(record.clone()));
        Ok(())
    }

    fn stage_failed(
        &self,
        _session: &SessionId,
        stage: StageKind,
        error: &str,
        _duration_seconds: f64,
    ) -> Result<(), LogError> {
        self.push(LogCall::StageFailed {
            stage,
            error: error.to_string(),
        });
        Ok(())
    }

    fn fallback(
        &self,
        _session: &SessionId,
        original_error: &str,
        fallback_stage: StageKind,
    ) -> Result<(), LogError> {
        self.push(LogCall::Fallback {
            original_error: original_error.to_string(),
            fallback_stage,
        });
        Ok(())
    }

    fn session_complete(
        &self,
        _session: &SessionId,
        final_state: &GenerationState,
    ) -> Result<(), LogError> {
        self.push(LogCall::SessionComplete(final_state.clone()));
        Ok(())
    }
}

/// Fails every call.
#[allow(dead_code)]
pub struct FailingLogger;

impl GenerationLogger for FailingLogger {
    fn session_start(&self, _prompt: &str, _mode: PipelineMode) -> Result<SessionId, LogError> {
        Err(LogError::WriteFailed("disk full".to_string()))
    }

    fn stage_start(
        &self,
        _session: &SessionId,
        _stage: StageKind,
        _context: &ContextAccumulator,
    ) -> Result<(), LogError> {
        Err(LogError::SinkClosed)
    }

    fn stage_complete(&self, _session: &SessionId, _record: &ExecutionRecord) -> Result<(), LogError> {
        Err(LogError::SinkFull)
    }

    fn stage_failed(
        &self,
        _session: &SessionId,
        _stage: StageKind,
        _error: &str,
        _duration_seconds: f64,
    ) -> Result<(), LogError> {
        Err(LogError::SinkClosed)
    }

    fn fallback(
        &self,
        _session: &SessionId,
        _original_error: &str,
        _fallback_stage: StageKind,
    ) -> Result<(), LogError> {
        Err(LogError::SinkClosed)
    }

    fn session_complete(
        &self,
        _session: &SessionId,
        _final_state: &GenerationState,
    ) -> Result<(), LogError> {
        Err(LogError::WriteFailed("disk full".to_string()))
    }
}
