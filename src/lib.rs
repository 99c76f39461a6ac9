//! gaia-bench: GAIA benchmark evaluation harness for tool-calling agents.
//!
//! This library provides a two-agent evaluation pipeline: an evaluator that
//! drives GAIA task batches and scores answers, and an executor that solves
//! tasks with a bounded LLM tool-calling loop. The agents talk over a small
//! HTTP messaging protocol, so either side can be swapped for an external
//! implementation.

// Core modules
pub mod cli;
pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod executor;
pub mod launcher;
pub mod llm;
pub mod scoring;
pub mod tools;
pub mod transport;
pub mod utils;

// Re-export commonly used error types
pub use error::{DatasetError, EvalError, LaunchError, LlmError, TransportError};
