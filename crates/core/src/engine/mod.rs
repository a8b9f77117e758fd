//! Pipeline orchestration.
//!
//! The `PipelineOrchestrator` turns a prompt into an artifact. In multi-stage
//! mode it runs Planner, Themer, Coder and Reviewer strictly in order, each
//! stage seeing the outputs of the ones before it. A hard failure of any of
//! the first three stages abandons the run and restarts it in single-stage
//! mode on the original prompt. The Reviewer is optional polish: when it fails
//! or returns something too short to be an artifact, the Coder output is used.

pub mod cancellation;

pub use cancellation::{CancellationFlag, CANCELLED_MESSAGE};

use crate::config::models::AppConfig;
use crate::logging::{GenerationLogger, LogError, SessionId};
use crate::stages::StageRegistry;
use crate::state::StateStore;
use af_protocol::config_models::GlobalConfig;
use af_protocol::generation_models::{GenerationState, PipelineMode, PipelinePhase};
use af_protocol::stage_models::{ContextAccumulator, ExecutionRecord, StageKind};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-run tuning taken from the global configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    /// Reviewer output with fewer trimmed characters than this is discarded.
    pub min_review_length: usize,

    /// Appended to every stage request when present.
    pub extra_instructions: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from_global(&GlobalConfig::default())
    }
}

impl PipelineSettings {
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            min_review_length: global.min_review_length,
            extra_instructions: global.extra_instructions.clone(),
        }
    }
}

/// How the multi-stage loop ended.
enum MultiOutcome {
    /// The run produced an artifact.
    Completed(String),
    /// A fatal stage failed; the run must fall back.
    Aborted {
        stage: StageKind,
        error: String,
        duration_seconds: f64,
    },
    Cancelled,
}

/// Drives one generation run at a time against a shared [`StateStore`].
///
/// The orchestrator does not serialize concurrent `generate` calls. Callers
/// that run generations concurrently must give each its own store.
pub struct PipelineOrchestrator {
    registry: StageRegistry,
    store: Arc<StateStore>,
    logger: Arc<dyn GenerationLogger>,
    settings: PipelineSettings,
}

impl PipelineOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Arguments
    ///
    /// * `registry` - Clients and instructions for every stage
    /// * `store` - Store receiving every state transition
    /// * `logger` - Lifecycle logging collaborator
    /// * `settings` - Review threshold and extra instructions
    pub fn new(
        registry: StageRegistry,
        store: Arc<StateStore>,
        logger: Arc<dyn GenerationLogger>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            registry,
            store,
            logger,
            settings,
        }
    }

    /// Create an orchestrator with one client per configured stage.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage client cannot be constructed.
    pub fn from_config(
        config: &AppConfig,
        store: Arc<StateStore>,
        logger: Arc<dyn GenerationLogger>,
    ) -> Result<Self> {
        let registry = StageRegistry::from_config(config)?;
        Ok(Self::new(
            registry,
            store,
            logger,
            PipelineSettings::from_global(&config.global),
        ))
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run a generation to completion and return its final state.
    ///
    /// The returned state is the store's snapshot at the end of the run.
    /// Exactly one of `final_artifact` and `error` is set on it.
    pub async fn generate(&self, prompt: &str, mode: PipelineMode) -> GenerationState {
        self.generate_with_cancel(prompt, mode, &CancellationFlag::new())
            .await
    }

    /// Like [`generate`](Self::generate), stopping between stages once `cancel`
    /// is set.
    ///
    /// A cancelled run ends in the error state with [`CANCELLED_MESSAGE`] and
    /// keeps the records of the stages that finished.
    pub async fn generate_with_cancel(
        &self,
        prompt: &str,
        mode: PipelineMode,
        cancel: &CancellationFlag,
    ) -> GenerationState {
        info!(?mode, prompt_chars = prompt.chars().count(), "starting generation");

        self.store.begin_generation(prompt, mode);
        let session = match self.logger.session_start(prompt, mode) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "logger failed to start a session, continuing with a local id");
                SessionId::new()
            }
        };

        match mode {
            PipelineMode::Single => self.run_single(&session, prompt, cancel).await,
            PipelineMode::Multi => match self.run_multi(&session, prompt, cancel).await {
                MultiOutcome::Completed(artifact) => self.store.succeed(artifact),
                MultiOutcome::Cancelled => self.store.fail(CANCELLED_MESSAGE.to_string()),
                MultiOutcome::Aborted {
                    stage,
                    error,
                    duration_seconds,
                } => {
                    self.fall_back(&session, prompt, stage, error, duration_seconds, cancel)
                        .await
                }
            },
        }

        let final_state = self.store.snapshot();
        info!(
            status = ?final_state.status,
            mode = ?final_state.mode,
            executions = final_state.executions.len(),
            "generation finished"
        );
        self.log(
            "session_complete",
            self.logger.session_complete(&session, &final_state),
        );
        final_state
    }

    /// The single-stage path: the Coder alone on the original prompt.
    async fn run_single(&self, session: &SessionId, prompt: &str, cancel: &CancellationFlag) {
        if cancel.is_cancelled() {
            self.store.fail(CANCELLED_MESSAGE.to_string());
            return;
        }

        let context = ContextAccumulator::single(prompt)
            .with_extra_instructions(self.settings.extra_instructions.clone());
        let (result, duration_seconds) = self.invoke_stage(session, &context).await;

        match result {
            Ok(content) => {
                self.record_success(session, StageKind::Coder, content.clone(), duration_seconds);
                self.store.succeed(content);
            }
            Err(error) => {
                self.record_failure(session, StageKind::Coder, &error, duration_seconds, None);
                self.store.fail(error);
            }
        }
    }

    async fn run_multi(
        &self,
        session: &SessionId,
        prompt: &str,
        cancel: &CancellationFlag,
    ) -> MultiOutcome {
        for stage in StageKind::ALL.into_iter().filter(StageKind::is_fatal_on_failure) {
            if cancel.is_cancelled() {
                return MultiOutcome::Cancelled;
            }

            let context = self.enter_stage(prompt, stage);
            let (result, duration_seconds) = self.invoke_stage(session, &context).await;

            match result {
                Ok(content) => self.record_success(session, stage, content, duration_seconds),
                Err(error) => {
                    return MultiOutcome::Aborted {
                        stage,
                        error,
                        duration_seconds,
                    }
                }
            }
        }

        if cancel.is_cancelled() {
            return MultiOutcome::Cancelled;
        }

        let context = self.enter_stage(prompt, StageKind::Reviewer);
        let coder_output = context.coder_output.clone().unwrap_or_default();
        let (result, duration_seconds) = self.invoke_stage(session, &context).await;

        let rejection = match result {
            Ok(content) => match self.review_rejection(&content) {
                None => {
                    self.record_success(
                        session,
                        StageKind::Reviewer,
                        content.clone(),
                        duration_seconds,
                    );
                    return MultiOutcome::Completed(content);
                }
                Some(reason) => (reason, Some(content)),
            },
            Err(error) => (error, None),
        };

        let (reason, rejected_content) = rejection;
        warn!(error = %reason, "reviewer output discarded, using coder output");
        self.record_failure(
            session,
            StageKind::Reviewer,
            &reason,
            duration_seconds,
            rejected_content,
        );
        MultiOutcome::Completed(coder_output)
    }

    /// Abandon the multi-stage run after `stage` failed and restart it as a
    /// single-stage run on the original prompt.
    async fn fall_back(
        &self,
        session: &SessionId,
        prompt: &str,
        stage: StageKind,
        error: String,
        duration_seconds: f64,
        cancel: &CancellationFlag,
    ) {
        warn!(%stage, %error, "stage failed, falling back to single-stage generation");
        self.record_failure(session, stage, &error, duration_seconds, None);

        if cancel.is_cancelled() {
            self.store.fail(CANCELLED_MESSAGE.to_string());
            return;
        }

        self.log(
            "fallback",
            self.logger.fallback(session, &error, StageKind::Coder),
        );
        self.store.begin_generation(prompt, PipelineMode::Single);
        self.run_single(session, prompt, cancel).await;
    }

    /// Move the store to `stage` and build its context from the records so far.
    fn enter_stage(&self, prompt: &str, stage: StageKind) -> ContextAccumulator {
        self.store
            .set_phase(PipelinePhase::for_stage(stage), Some(stage));
        let executions = self.store.snapshot().executions;
        ContextAccumulator::from_records(prompt, stage, &executions)
            .with_extra_instructions(self.settings.extra_instructions.clone())
    }

    /// Invoke the stage for `context`, returning the outcome and its duration.
    async fn invoke_stage(
        &self,
        session: &SessionId,
        context: &ContextAccumulator,
    ) -> (Result<String, String>, f64) {
        let stage = context.current_stage;
        self.log(
            "stage_start",
            self.logger.stage_start(session, stage, context),
        );

        debug!(%stage, "invoking stage");
        let started = Instant::now();
        let result = self.registry.invoke(context).await;
        let duration_seconds = started.elapsed().as_secs_f64();

        (result.map_err(|e| e.to_string()), duration_seconds)
    }

    /// Why a Reviewer output cannot be used, if it cannot.
    fn review_rejection(&self, content: &str) -> Option<String> {
        let length = content.trim().chars().count();
        if length < self.settings.min_review_length {
            Some(format!(
                "Reviewer output rejected: {length} characters is below the minimum of {}",
                self.settings.min_review_length
            ))
        } else {
            None
        }
    }

    fn record_success(
        &self,
        session: &SessionId,
        stage: StageKind,
        content: String,
        duration_seconds: f64,
    ) {
        info!(%stage, duration_seconds, "stage completed");
        let record = ExecutionRecord::completed(stage, content, duration_seconds);
        self.store.record_execution(record.clone());
        self.log(
            "stage_complete",
            self.logger.stage_complete(session, &record),
        );
    }

    fn record_failure(
        &self,
        session: &SessionId,
        stage: StageKind,
        error: &str,
        duration_seconds: f64,
        rejected_content: Option<String>,
    ) {
        let mut record = ExecutionRecord::failed(stage, error.to_string(), duration_seconds);
        if let Some(content) = rejected_content {
            record = record.with_rejected_content(content);
        }
        self.store.record_execution(record);
        self.log(
            "stage_failed",
            self.logger
                .stage_failed(session, stage, error, duration_seconds),
        );
    }

    /// Logging never affects the run; failures are only reported.
    fn log(&self, call: &'static str, result: Result<(), LogError>) {
        if let Err(e) = result {
            warn!(call, error = %e, "logger call failed");
        }
    }
}
