//! Command-line interface for gaia-bench.
//!
//! Provides commands for one-shot benchmark runs and for serving the
//! evaluator and executor agents standalone.

mod commands;

pub use commands::{parse_cli, run_with_cli, Cli, Commands};
