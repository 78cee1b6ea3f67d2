//! Translate a task into a shell command
//!
//! Prompt Builder -> Model Client -> Response Parser, exactly one model
//! round trip per call and no caching. Errors from each stage propagate
//! unchanged.

use crate::core::error::Result;
use crate::core::task::Task;
use crate::llm::client::ModelClient;
use crate::llm::parser::{self, TranslationResult};
use crate::llm::prompt::PromptBuilder;

/// Turns natural-language tasks into commands with a model
pub struct TranslateAgent<C> {
    prompts: PromptBuilder,
    client: C,
}

impl<C: ModelClient> TranslateAgent<C> {
    pub fn new(prompts: PromptBuilder, client: C) -> Self {
        Self { prompts, client }
    }

    /// Build the prompt, ask the model once, and parse its answer
    pub fn translate(&self, task: &Task) -> Result<TranslationResult> {
        let prompt = self.prompts.build(task)?;
        tracing::debug!("Prompt built ({} bytes) for task: {}", prompt.len(), task);

        let raw = self.client.send(&prompt)?;
        tracing::debug!("Model response: {:?}", raw);

        let result = parser::parse(&raw)?;
        tracing::info!("Translated {:?} -> {:?}", task.as_str(), result.command);
        Ok(result)
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}
