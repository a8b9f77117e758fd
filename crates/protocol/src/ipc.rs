//! Observer events.
//!
//! Events flow one way, from the core to whatever is watching a generation run
//! (the CLI progress printer, a UI, an audit sink). They carry either a full
//! state snapshot or one lifecycle step of a logging session.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "type": "stageStarted",
//!   "payload": {
//!     "session_id": "uuid-here",
//!     "stage": "planner"
//!   }
//! }
//! ```

use crate::generation_models::{GenerationState, PipelineMode};
use crate::stage_models::{ExecutionRecord, StageKind};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The state store holds a new snapshot.
    ///
    /// Delivery may be throttled; the last one delivered for a run always
    /// reflects its final state.
    StateChanged { state: GenerationState },

    /// A logging session has started for a new run.
    SessionStarted {
        #[ts(type = "string")]
        session_id: Uuid,
        prompt: String,
        mode: PipelineMode,
    },

    /// A stage is about to be invoked.
    StageStarted {
        #[ts(type = "string")]
        session_id: Uuid,
        stage: StageKind,
    },

    /// A stage returned usable content.
    StageCompleted {
        #[ts(type = "string")]
        session_id: Uuid,
        record: ExecutionRecord,
    },

    /// A stage failed or its output was rejected.
    StageFailed {
        #[ts(type = "string")]
        session_id: Uuid,
        stage: StageKind,
        error: String,
        duration_seconds: f64,
    },

    /// The multi-stage run was abandoned and restarted in single mode.
    FallbackTriggered {
        #[ts(type = "string")]
        session_id: Uuid,
        original_error: String,
        fallback_stage: StageKind,
    },

    /// The run has finished, successfully or not.
    SessionCompleted {
        #[ts(type = "string")]
        session_id: Uuid,
        state: GenerationState,
    },
}

impl Event {
    /// Whether this event closes a logging session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::SessionCompleted { .. })
    }
}
