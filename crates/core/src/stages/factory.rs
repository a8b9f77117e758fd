//! Stage client factory for creating clients from stage instructions.

use crate::stages::adapters::{HttpStageClient, MockStage};
use crate::stages::base::StageClient;
use af_protocol::config_models::ApiConfig;
use af_protocol::stage_models::{StageInstructions, StageKind};
use anyhow::Result;
use std::sync::Arc;

/// Which client implementation serves a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientKind {
    /// Remote chat-completions endpoint.
    Http,
    /// Canned offline responses.
    Mock,
    /// Offline client that always fails.
    MockFailure,
}

impl ClientKind {
    /// Infer the client kind from a model name.
    ///
    /// # Examples
    ///
    /// ```
    /// use af_core::stages::ClientKind;
    ///
    /// assert_eq!(ClientKind::from_model_name("gpt-4o"), ClientKind::Http);
    /// assert_eq!(ClientKind::from_model_name("mock"), ClientKind::Mock);
    /// assert_eq!(ClientKind::from_model_name("mock-fail"), ClientKind::MockFailure);
    /// ```
    pub fn from_model_name(model: &str) -> Self {
        let model_lower = model.trim().to_lowercase();

        if model_lower == "mock-fail" || model_lower == "mock-failure" {
            Self::MockFailure
        } else if model_lower.starts_with("mock") {
            Self::Mock
        } else {
            Self::Http
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::Mock => "Mock",
            Self::MockFailure => "Mock (failing)",
        }
    }
}

/// Factory for creating stage clients based on configuration.
pub struct StageClientFactory;

impl StageClientFactory {
    /// Create the client serving `instructions.stage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn create(instructions: &StageInstructions, api: &ApiConfig) -> Result<Arc<dyn StageClient>> {
        match ClientKind::from_model_name(&instructions.model) {
            ClientKind::Http => {
                let client = HttpStageClient::new(api.clone())?;
                Ok(Arc::new(client))
            }
            ClientKind::Mock => Ok(Arc::new(MockStage::success(mock_output(instructions.stage)))),
            ClientKind::MockFailure => Ok(Arc::new(MockStage::failing(format!(
                "{} mock failure",
                instructions.stage
            )))),
        }
    }
}

/// Canned output used by `mock` models so the pipeline runs end to end offline.
fn mock_output(stage: StageKind) -> String {
    match stage {
        StageKind::Planner => "1. A large countdown display\n2. Start, pause and reset buttons\n3. Minute and second inputs".to_string(),
        StageKind::Themer => "Background #0f172a, accent #38bdf8, font Inter, 8px spacing grid, rounded buttons".to_string(),
        StageKind::Coder | StageKind::Reviewer => concat!(
            "<!DOCTYPE html>\n<html>\n<head><title>Mock App</title></head>\n",
            "<body>\n<h1 id=\"display\">00:00</h1>\n<button id=\"start\">Start</button>\n",
            "</body>\n</html>"
        )
        .to_string(),
    }
}
