//! CLI command definitions for gaia-bench.
//!
//! Three subcommands cover the two deployment shapes: `run` spawns both
//! agents and performs a one-shot benchmark, while `evaluator` and
//! `executor` serve a single agent standalone for externally coordinated
//! setups.

use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::dataset::{JsonlTaskSource, RunConfig, Split};
use crate::evaluator::{self, EvaluatorAgent};
use crate::executor::{self, ExecutorAgent, LoopConfig};
use crate::launcher::{
    run_benchmark, LauncherConfig, DEFAULT_EVALUATOR_PORT, DEFAULT_EXECUTOR_PORT,
};
use crate::llm::LiteLlmClient;

/// Default directory holding the local dataset snapshot.
const DEFAULT_DATA_DIR: &str = "./data/gaia";

/// GAIA benchmark evaluation harness for tool-calling agents.
#[derive(Parser)]
#[command(name = "gaia-bench")]
#[command(about = "Evaluate tool-calling LLM agents on the GAIA benchmark")]
#[command(version)]
#[command(
    long_about = "gaia-bench runs GAIA benchmark evaluations against a tool-calling executor agent.\n\nThe evaluator and executor communicate over a small HTTP messaging protocol, so either side can be swapped for an external implementation.\n\nExample usage:\n  gaia-bench run --level 1 --split validation --task-indices 0,1,2"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Spawn both agents, run the configured task batch, and print results.
    Run(RunArgs),

    /// Serve the evaluator agent standalone.
    Evaluator(EvaluatorArgs),

    /// Serve the executor agent standalone.
    Executor(ExecutorArgs),
}

/// Arguments for `gaia-bench run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// GAIA difficulty level to evaluate (1, 2, or 3).
    // Short must stay clear of the global -l (log level).
    #[arg(short = 'L', long, default_value = "1")]
    pub level: u8,

    /// Dataset split to draw tasks from (validation or test).
    #[arg(short, long, default_value = "validation")]
    pub split: Split,

    /// Comma-separated task indices to evaluate, in order.
    #[arg(short, long, default_value = "0", value_delimiter = ',')]
    pub task_indices: Vec<usize>,

    /// Directory holding the local dataset snapshot.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,

    /// Port the evaluator agent binds to.
    #[arg(long, default_value_t = DEFAULT_EVALUATOR_PORT)]
    pub evaluator_port: u16,

    /// Port the executor agent binds to.
    #[arg(long, default_value_t = DEFAULT_EXECUTOR_PORT)]
    pub executor_port: u16,

    /// Seconds to wait for each agent's readiness signal.
    #[arg(long, default_value = "15")]
    pub readiness_timeout: u64,

    /// LLM model for the executor (defaults to LITELLM_DEFAULT_MODEL).
    #[arg(short, long)]
    pub model: Option<String>,
}

/// Arguments for `gaia-bench evaluator`.
#[derive(Parser, Debug)]
pub struct EvaluatorArgs {
    /// Host to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = DEFAULT_EVALUATOR_PORT)]
    pub port: u16,

    /// Directory holding the local dataset snapshot.
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: String,
}

/// Arguments for `gaia-bench executor`.
#[derive(Parser, Debug)]
pub struct ExecutorArgs {
    /// Host to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind to.
    #[arg(short, long, default_value_t = DEFAULT_EXECUTOR_PORT)]
    pub port: u16,

    /// LLM model to answer with (defaults to LITELLM_DEFAULT_MODEL).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature for completion calls.
    #[arg(long, default_value = "0.0")]
    pub temperature: f64,
}

/// Parse CLI arguments without running.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Execute the parsed CLI command.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_command(args).await,
        Commands::Evaluator(args) => evaluator_command(args).await,
        Commands::Executor(args) => executor_command(args).await,
    }
}

async fn run_command(args: RunArgs) -> anyhow::Result<()> {
    let run = RunConfig {
        level: args.level,
        split: args.split,
        task_indices: args.task_indices,
    };
    run.validate()?;

    let mut config = LauncherConfig::new(run, &args.data_dir);
    config.evaluator_port = args.evaluator_port;
    config.executor_port = args.executor_port;
    config.readiness_timeout = Duration::from_secs(args.readiness_timeout);
    config.model = args.model.unwrap_or_default();

    let summary = run_benchmark(&config).await?;
    println!("{}", evaluator::digest(&summary));
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn evaluator_command(args: EvaluatorArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let source = Arc::new(JsonlTaskSource::new(&args.data_dir));
    let agent = EvaluatorAgent::new(source);

    info!(%addr, data_dir = %args.data_dir, "Starting evaluator agent");
    evaluator::serve(addr, agent).await?;
    Ok(())
}

async fn executor_command(args: ExecutorArgs) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let llm_client = Arc::new(LiteLlmClient::from_env()?);
    let config = LoopConfig::default()
        .with_model(args.model.unwrap_or_default())
        .with_temperature(args.temperature);
    let agent = ExecutorAgent::new(llm_client, config);

    info!(%addr, "Starting executor agent");
    executor::serve(addr, agent).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_structure_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["gaia-bench", "run"]).expect("parses");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.level, 1);
        assert_eq!(args.split, Split::Validation);
        assert_eq!(args.task_indices, vec![0]);
        assert_eq!(args.readiness_timeout, 15);
    }

    #[test]
    fn test_run_parses_comma_separated_indices() {
        let cli = Cli::try_parse_from([
            "gaia-bench",
            "run",
            "--level",
            "2",
            "--split",
            "test",
            "--task-indices",
            "0,3,7",
        ])
        .expect("parses");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.level, 2);
        assert_eq!(args.split, Split::Test);
        assert_eq!(args.task_indices, vec![0, 3, 7]);
    }

    #[test]
    fn test_level_short_distinct_from_log_level() {
        let cli = Cli::try_parse_from(["gaia-bench", "run", "-L", "3", "-l", "debug"])
            .expect("parses");
        assert_eq!(cli.log_level, "debug");
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.level, 3);
    }

    #[test]
    fn test_agent_subcommands_parse_endpoints() {
        let cli = Cli::try_parse_from([
            "gaia-bench",
            "evaluator",
            "--host",
            "0.0.0.0",
            "--port",
            "9100",
        ])
        .expect("parses");
        let Commands::Evaluator(args) = cli.command else {
            panic!("expected evaluator command");
        };
        assert_eq!(args.host, "0.0.0.0");
        assert_eq!(args.port, 9100);

        let cli = Cli::try_parse_from(["gaia-bench", "executor", "--model", "gpt-4o"])
            .expect("parses");
        let Commands::Executor(args) = cli.command else {
            panic!("expected executor command");
        };
        assert_eq!(args.port, DEFAULT_EXECUTOR_PORT);
        assert_eq!(args.model.as_deref(), Some("gpt-4o"));
    }
}
