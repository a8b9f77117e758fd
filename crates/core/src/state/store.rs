//! Authoritative holder of the current [`GenerationState`].
//!
//! The `StateStore` is the only place a `GenerationState` is mutated. Every
//! change goes through one of the transition operations below, each applied
//! atomically to the value inside a `tokio::sync::watch` channel, so readers
//! never observe a half-applied transition. Observers subscribe to the channel;
//! a transition that leaves the state unchanged does not notify them.

use af_protocol::generation_models::{
    GenerationState, GenerationStatus, PipelineMode, PipelinePhase,
};
use af_protocol::stage_models::{ExecutionRecord, StageKind};
use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Owns the current generation state and publishes every change.
#[derive(Debug)]
pub struct StateStore {
    tx: watch::Sender<GenerationState>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store holding an idle state.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(GenerationState::idle());
        Self { tx }
    }

    /// Subscribe to state changes.
    ///
    /// The current value is marked as seen; the receiver wakes on the next
    /// transition.
    pub fn subscribe(&self) -> watch::Receiver<GenerationState> {
        self.tx.subscribe()
    }

    /// A consistent copy of the current state.
    pub fn snapshot(&self) -> GenerationState {
        self.tx.borrow().clone()
    }

    /// Start a new run, discarding everything from the previous one.
    ///
    /// Multi-mode runs start in the planner phase.
    pub fn begin_generation(&self, prompt: &str, mode: PipelineMode) {
        self.apply("begin_generation", |state| {
            *state = GenerationState {
                status: GenerationStatus::Generating,
                mode,
                prompt: prompt.to_string(),
                start_time: Some(Utc::now()),
                ..GenerationState::idle()
            };
            if mode == PipelineMode::Multi {
                state.active_phase = Some(PipelinePhase::PlannerPhase);
                state.current_stage = Some(StageKind::Planner);
            }
        });
    }

    /// Move a running multi-stage pipeline to `phase`.
    ///
    /// Ignored outside a running multi-stage pipeline and for phases earlier
    /// than the current one. The terminal phases only apply once the matching
    /// outcome is present; use [`StateStore::succeed`] and [`StateStore::fail`]
    /// to finish a run.
    pub fn set_phase(&self, phase: PipelinePhase, current_stage: Option<StageKind>) {
        self.apply("set_phase", |state| {
            if state.mode != PipelineMode::Multi || !state.is_generating() {
                warn!(
                    ?phase,
                    mode = ?state.mode,
                    status = ?state.status,
                    "set_phase ignored: no multi-stage run in progress"
                );
                return;
            }
            if let Some(active) = state.active_phase {
                if phase_rank(phase) < phase_rank(active) {
                    warn!(?phase, ?active, "set_phase ignored: phases only move forward");
                    return;
                }
            }

            match phase {
                PipelinePhase::Completed => {
                    if state.final_artifact.is_some() {
                        finish(state, GenerationStatus::Success, PipelinePhase::Completed);
                    } else {
                        warn!("set_phase(Completed) ignored: no final artifact");
                    }
                }
                PipelinePhase::Failed => {
                    if state.error.is_some() {
                        finish(state, GenerationStatus::Error, PipelinePhase::Failed);
                    } else {
                        warn!("set_phase(Failed) ignored: no error");
                    }
                }
                _ => {
                    state.active_phase = Some(phase);
                    state.current_stage = current_stage;
                }
            }
        });
    }

    /// Append one execution record to the running pipeline.
    ///
    /// Records are never replaced or removed. Ignored when nothing is running.
    pub fn record_execution(&self, record: ExecutionRecord) {
        self.apply("record_execution", |state| {
            if !state.is_generating() {
                warn!(stage = %record.stage, "record_execution ignored: no run in progress");
                return;
            }
            state.executions.push(record);
        });
    }

    /// Finish the run successfully with `artifact`.
    pub fn succeed(&self, artifact: String) {
        self.apply("succeed", |state| {
            state.final_artifact = Some(artifact);
            state.error = None;
            finish(state, GenerationStatus::Success, PipelinePhase::Completed);
        });
    }

    /// Finish the run with `error`.
    pub fn fail(&self, error: String) {
        self.apply("fail", |state| {
            state.error = Some(error);
            state.final_artifact = None;
            finish(state, GenerationStatus::Error, PipelinePhase::Failed);
        });
    }

    /// Replace the state with a fresh idle one.
    pub fn reset(&self) {
        self.apply("reset", |state| *state = GenerationState::idle());
    }

    /// Apply `transition` and notify subscribers only if the state changed.
    fn apply(&self, name: &str, transition: impl FnOnce(&mut GenerationState)) {
        let changed = self.tx.send_if_modified(|state| {
            let before = state.clone();
            transition(state);
            *state != before
        });
        debug!(transition = name, changed, "state transition");
    }
}

/// Shared tail of `succeed`, `fail` and the terminal `set_phase` calls.
fn finish(state: &mut GenerationState, status: GenerationStatus, phase: PipelinePhase) {
    state.status = status;
    state.end_time = Some(Utc::now());
    if state.mode == PipelineMode::Multi {
        state.active_phase = Some(phase);
        state.current_stage = None;
    }
}

fn phase_rank(phase: PipelinePhase) -> u8 {
    match phase {
        PipelinePhase::Idle => 0,
        PipelinePhase::PlannerPhase => 1,
        PipelinePhase::ThemerPhase => 2,
        PipelinePhase::CoderPhase => 3,
        PipelinePhase::ReviewerPhase => 4,
        PipelinePhase::Completed | PipelinePhase::Failed => 5,
    }
}
