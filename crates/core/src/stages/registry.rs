//! Stage registry mapping each stage to the client that serves it.
//!
//! The `StageRegistry` is responsible for:
//! - Holding one client and one set of static instructions per stage
//! - Shaping each stage request from a context snapshot
//! - Turning blank content into a typed failure

use crate::config::models::AppConfig;
use crate::stages::base::{StageClient, StageError};
use crate::stages::factory::StageClientFactory;
use crate::stages::request::build_request;
use af_protocol::stage_models::{ContextAccumulator, StageInstructions, StageKind};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Registered stage clients and their instructions.
#[derive(Default)]
pub struct StageRegistry {
    clients: HashMap<StageKind, Arc<dyn StageClient>>,
    instructions: HashMap<StageKind, StageInstructions>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry with one client per stage from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be constructed.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let mut registry = Self::new();
        for stage in StageKind::ALL {
            let instructions = config.instructions_for(stage);
            let client = StageClientFactory::create(&instructions, &config.global.api)?;
            registry = registry
                .with_client(stage, client)
                .with_instructions(instructions);
        }
        Ok(registry)
    }

    /// Register the client for `stage`, replacing any previous one.
    pub fn with_client(mut self, stage: StageKind, client: Arc<dyn StageClient>) -> Self {
        self.clients.insert(stage, client);
        self
    }

    /// Register static instructions for `instructions.stage`.
    pub fn with_instructions(mut self, instructions: StageInstructions) -> Self {
        self.instructions.insert(instructions.stage, instructions);
        self
    }

    /// Instructions for `stage`, falling back to the stage defaults.
    pub fn instructions(&self, stage: StageKind) -> StageInstructions {
        self.instructions
            .get(&stage)
            .cloned()
            .unwrap_or_else(|| StageInstructions::defaults_for(stage))
    }

    /// Invoke the client for `context.current_stage`.
    ///
    /// # Behavior
    ///
    /// 1. Look up the client for the stage
    /// 2. Check that it is available
    /// 3. Build the request from the context and the stage instructions
    /// 4. Execute it and reject blank content
    pub async fn invoke(&self, context: &ContextAccumulator) -> Result<String, StageError> {
        let stage = context.current_stage;
        let client = self.clients.get(&stage).ok_or_else(|| {
            StageError::NotAvailable(format!("No client registered for stage '{stage}'"))
        })?;

        if !client.check_availability().await {
            return Err(StageError::NotAvailable(format!(
                "Client for stage '{stage}' is not available"
            )));
        }

        let request = build_request(context, &self.instructions(stage));
        let content = client.execute(&request).await?;

        if content.trim().is_empty() {
            return Err(StageError::EmptyContent(stage));
        }
        Ok(content)
    }
}
