//! Logger that forwards the run lifecycle as [`Event`]s over a channel.

use super::base::{GenerationLogger, LogError, SessionId};
use af_protocol::generation_models::{GenerationState, PipelineMode};
use af_protocol::ipc::Event;
use af_protocol::stage_models::{ContextAccumulator, ExecutionRecord, StageKind};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::trace;

/// Sends one [`Event`] per lifecycle call.
///
/// Uses `try_send`, so a slow receiver causes dropped events
/// ([`LogError::SinkFull`]) instead of stalling the pipeline.
#[derive(Debug, Clone)]
pub struct ChannelLogger {
    events: mpsc::Sender<Event>,
}

impl ChannelLogger {
    pub fn new(events: mpsc::Sender<Event>) -> Self {
        Self { events }
    }

    fn send(&self, event: Event) -> Result<(), LogError> {
        trace!(?event, "forwarding lifecycle event");
        self.events.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => LogError::SinkFull,
            TrySendError::Closed(_) => LogError::SinkClosed,
        })
    }
}

impl GenerationLogger for ChannelLogger {
    fn session_start(&self, prompt: &str, mode: PipelineMode) -> Result<SessionId, LogError> {
        let session = SessionId::new();
        self.send(Event::SessionStarted {
            session_id: session.as_uuid(),
            prompt: prompt.to_string(),
            mode,
        })?;
        Ok(session)
    }

    fn stage_start(
        &self,
        session: &SessionId,
        stage: StageKind,
        _context: &ContextAccumulator,
    ) -> Result<(), LogError> {
        self.send(Event::StageStarted {
            session_id: session.as_uuid(),
            stage,
        })
    }

    fn stage_complete(&self, session: &SessionId, record: &ExecutionRecord) -> Result<(), LogError> {
        self.send(Event::StageCompleted {
            session_id: session.as_uuid(),
            record: record.clone(),
        })
    }

    fn stage_failed(
        &self,
        session: &SessionId,
        stage: StageKind,
        error: &str,
        duration_seconds: f64,
    ) -> Result<(), LogError> {
        self.send(Event::StageFailed {
            session_id: session.as_uuid(),
            stage,
            error: error.to_string(),
            duration_seconds,
        })
    }

    fn fallback(
        &self,
        session: &SessionId,
        original_error: &str,
        fallback_stage: StageKind,
    ) -> Result<(), LogError> {
        self.send(Event::FallbackTriggered {
            session_id: session.as_uuid(),
            original_error: original_error.to_string(),
            fallback_stage,
        })
    }

    fn session_complete(
        &self,
        session: &SessionId,
        final_state: &GenerationState,
    ) -> Result<(), LogError> {
        self.send(Event::SessionCompleted {
            session_id: session.as_uuid(),
            state: final_state.clone(),
        })
    }
}
