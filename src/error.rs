//! Error types for gaia-bench operations.
//!
//! Defines error types for the major subsystems:
//! - LLM API interactions
//! - Agent-to-agent messaging transport
//! - Dataset loading and batch resolution
//! - Evaluation runs
//! - Process lifecycle management

use thiserror::Error;

/// Errors that can occur during LLM operations.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: LITELLM_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("Missing API base URL: LITELLM_API_BASE environment variable not set")]
    MissingApiBase,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur on the agent-to-agent messaging transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request to '{url}' failed: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("Agent at '{url}' returned status {code}: {body}")]
    BadStatus { url: String, code: u16, body: String },

    #[error("Failed to decode agent response: {0}")]
    Decode(String),
}

/// Errors that can occur while resolving a task batch.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Level must be 1, 2, or 3, got {0}")]
    InvalidLevel(u8),

    #[error("Split must be 'validation' or 'test', got '{0}'")]
    InvalidSplit(String),

    #[error("Task index {index} out of range for dataset with {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during an evaluation run.
///
/// Per-task failures never surface here: they are recorded as data in the
/// corresponding `TaskResult`. Anything that reaches this type fails the
/// whole run.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Invalid evaluation request: {0}")]
    Validation(String),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while launching and coordinating agent processes.
#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Failed to spawn {agent} agent: {source}")]
    Spawn {
        agent: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{agent} agent not ready within {timeout_secs}s")]
    NotReady {
        agent: &'static str,
        timeout_secs: u64,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
