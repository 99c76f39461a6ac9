//! Bounded multi-turn tool-calling loop.
//!
//! Drives one conversation forward: submit the history to the completion
//! API, execute any requested tool calls, append the results, and repeat
//! until the model answers without tools or the iteration ceiling is hit.

use serde_json::Value;
use std::sync::Arc;

use crate::error::LlmError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::tools::{catalog_schema, ToolDispatch};

/// Fixed iteration ceiling of the loop.
pub const MAX_ITERATIONS: usize = 10;

/// Answer emitted when the ceiling is reached without a final answer. The
/// last partial assistant content is deliberately discarded.
pub const EXHAUSTION_SENTINEL: &str = "Maximum iterations reached. Unable to complete task.";

/// Configuration of the loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Model for completion calls. Empty selects the provider default.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens per completion.
    pub max_tokens: u32,
    /// Iteration ceiling.
    pub max_iterations: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: 4096,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl LoopConfig {
    /// Set the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Outcome of one loop run.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// The final answer text.
    pub final_text: String,
    /// Completion calls made.
    pub iterations: usize,
    /// Whether the iteration ceiling was hit.
    pub exhausted: bool,
}

/// The tool-calling loop.
pub struct ToolCallingLoop {
    llm_client: Arc<dyn LlmProvider>,
    tools: ToolDispatch,
    config: LoopConfig,
}

impl ToolCallingLoop {
    /// Create a loop over the given provider and configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: LoopConfig) -> Self {
        Self {
            llm_client,
            tools: ToolDispatch::new(),
            config,
        }
    }

    /// Drive `messages` forward until the model emits a final answer or the
    /// ceiling is reached.
    ///
    /// Each cycle appends exactly one assistant turn and, if that turn
    /// requested tools, one tool-result turn per requested call; all calls
    /// of a turn are executed before the next completion. Tool faults are
    /// data in the conversation, never errors; only completion failures
    /// propagate.
    pub async fn run(&self, messages: &mut Vec<ChatMessage>) -> Result<LoopOutcome, LlmError> {
        for iteration in 1..=self.config.max_iterations {
            let request =
                CompletionRequest::new(self.config.model.clone(), messages.clone())
                    .with_temperature(self.config.temperature)
                    .with_max_tokens(self.config.max_tokens)
                    .with_tools(catalog_schema());

            let response = self.llm_client.complete(request).await?;
            let assistant = response
                .first_message()
                .cloned()
                .ok_or_else(|| LlmError::ParseError("Empty completion response".to_string()))?;

            messages.push(assistant.clone());

            let Some(tool_calls) = assistant.tool_calls.filter(|calls| !calls.is_empty())
            else {
                // Final answer: no tool calls requested.
                return Ok(LoopOutcome {
                    final_text: assistant.content.unwrap_or_default(),
                    iterations: iteration,
                    exhausted: false,
                });
            };

            for call in &tool_calls {
                let args: Value = serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                let result = self.tools.execute(&call.function.name, &args).await;
                tracing::debug!(
                    tool = %call.function.name,
                    result_len = result.len(),
                    "Tool call completed"
                );
                messages.push(ChatMessage::tool(&call.id, &call.function.name, result));
            }
        }

        tracing::warn!(
            max_iterations = self.config.max_iterations,
            "Tool-calling loop exhausted its iteration ceiling"
        );
        Ok(LoopOutcome {
            final_text: EXHAUSTION_SENTINEL.to_string(),
            iterations: self.config.max_iterations,
            exhausted: true,
        })
    }
}
