//! One-shot benchmark runs: spawn both agents, wait for readiness, submit
//! the run request, and tear everything down.
//!
//! Child processes are re-invocations of the current executable with the
//! `evaluator` and `executor` subcommands. Teardown is unconditional: the
//! agents are terminated whether the run succeeded, failed validation, or
//! never got off the ground.

use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::{Child, Command};

use crate::dataset::RunConfig;
use crate::error::LaunchError;
use crate::evaluator::{build_run_request, RunSummary};
use crate::transport::AgentClient;

/// Default evaluator port.
pub const DEFAULT_EVALUATOR_PORT: u16 = 9001;

/// Default executor port.
pub const DEFAULT_EXECUTOR_PORT: u16 = 9002;

/// Default per-agent readiness timeout.
pub const DEFAULT_READINESS_TIMEOUT: Duration = Duration::from_secs(15);

/// Configuration of a launched benchmark run.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Host both agents bind to.
    pub host: String,
    pub evaluator_port: u16,
    pub executor_port: u16,
    /// How long to wait for each agent's readiness signal.
    pub readiness_timeout: Duration,
    /// The evaluation run to perform.
    pub run: RunConfig,
    /// Directory holding the local dataset snapshot.
    pub data_dir: PathBuf,
    /// Model override for the executor; empty selects the provider default.
    pub model: String,
}

impl LauncherConfig {
    /// Configuration for a run with default ports and timeout.
    pub fn new(run: RunConfig, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            evaluator_port: DEFAULT_EVALUATOR_PORT,
            executor_port: DEFAULT_EXECUTOR_PORT,
            readiness_timeout: DEFAULT_READINESS_TIMEOUT,
            run,
            data_dir: data_dir.into(),
            model: String::new(),
        }
    }

    fn evaluator_url(&self) -> String {
        format!("http://{}:{}", self.host, self.evaluator_port)
    }

    fn executor_url(&self) -> String {
        format!("http://{}:{}", self.host, self.executor_port)
    }
}

/// A spawned agent process. Killed on drop as a last resort; prefer
/// `shutdown` for an awaited exit.
pub struct ManagedProcess {
    agent: &'static str,
    child: Child,
}

impl ManagedProcess {
    /// Spawn `program` with the given subcommand and arguments.
    pub fn spawn(
        agent: &'static str,
        program: &Path,
        args: &[String],
    ) -> Result<Self, LaunchError> {
        let child = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn { agent, source })?;

        tracing::info!(agent, pid = child.id(), "Spawned agent process");
        Ok(Self { agent, child })
    }

    /// Terminate the process and await its exit.
    pub async fn shutdown(mut self) {
        if let Err(e) = self.child.start_kill() {
            tracing::warn!(agent = self.agent, error = %e, "Failed to signal agent process");
        }
        match self.child.wait().await {
            Ok(status) => {
                tracing::info!(agent = self.agent, %status, "Agent process terminated");
            }
            Err(e) => {
                tracing::warn!(agent = self.agent, error = %e, "Failed to reap agent process");
            }
        }
    }
}

/// Run the full benchmark lifecycle: spawn evaluator and executor, wait for
/// both to become ready, submit the run request, and tear both down before
/// returning the summary.
pub async fn run_benchmark(config: &LauncherConfig) -> Result<RunSummary, LaunchError> {
    let program = std::env::current_exe()?;
    run_benchmark_with_program(config, &program).await
}

async fn run_benchmark_with_program(
    config: &LauncherConfig,
    program: &Path,
) -> Result<RunSummary, LaunchError> {
    let evaluator = ManagedProcess::spawn("evaluator", program, &evaluator_args(config))?;

    let client = AgentClient::new();
    if !client
        .wait_agent_ready(&config.evaluator_url(), config.readiness_timeout)
        .await
    {
        evaluator.shutdown().await;
        return Err(LaunchError::NotReady {
            agent: "evaluator",
            timeout_secs: config.readiness_timeout.as_secs(),
        });
    }

    let executor = match ManagedProcess::spawn("executor", program, &executor_args(config)) {
        Ok(executor) => executor,
        Err(e) => {
            evaluator.shutdown().await;
            return Err(e);
        }
    };

    if !client
        .wait_agent_ready(&config.executor_url(), config.readiness_timeout)
        .await
    {
        executor.shutdown().await;
        evaluator.shutdown().await;
        return Err(LaunchError::NotReady {
            agent: "executor",
            timeout_secs: config.readiness_timeout.as_secs(),
        });
    }

    tracing::info!("Both agents ready, submitting run request");
    let outcome = submit_run(&client, config).await;

    // Teardown happens regardless of the run outcome.
    executor.shutdown().await;
    evaluator.shutdown().await;

    outcome
}

async fn submit_run(
    client: &AgentClient,
    config: &LauncherConfig,
) -> Result<RunSummary, LaunchError> {
    let request = build_run_request(&config.executor_url(), &config.run)
        .map_err(|e| LaunchError::Protocol(e.to_string()))?;

    let response = client
        .send_message(&config.evaluator_url(), request, None)
        .await?;

    let data: &Value = response
        .data()
        .ok_or_else(|| LaunchError::Protocol("Evaluator response has no data part".to_string()))?;
    let summary: RunSummary = serde_json::from_value(data.clone())?;
    Ok(summary)
}

fn evaluator_args(config: &LauncherConfig) -> Vec<String> {
    vec![
        "evaluator".to_string(),
        "--host".to_string(),
        config.host.clone(),
        "--port".to_string(),
        config.evaluator_port.to_string(),
        "--data-dir".to_string(),
        config.data_dir.display().to_string(),
    ]
}

fn executor_args(config: &LauncherConfig) -> Vec<String> {
    let mut args = vec![
        "executor".to_string(),
        "--host".to_string(),
        config.host.clone(),
        "--port".to_string(),
        config.executor_port.to_string(),
    ];
    if !config.model.is_empty() {
        args.push("--model".to_string());
        args.push(config.model.clone());
    }
    args
}
