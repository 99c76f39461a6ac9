//! LLM client for tool-calling chat completions.

pub mod litellm;

pub use litellm::{
    ChatMessage, Choice, CompletionRequest, CompletionResponse, FunctionCall, LiteLlmClient,
    LlmProvider, ToolCallRequest, Usage,
};
