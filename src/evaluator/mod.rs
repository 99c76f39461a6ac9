//! The evaluator agent: parses evaluation requests, drives the task batch
//! against the executor, and reports aggregate results.
//!
//! The inbound request arrives as a text message carrying tagged blocks: the
//! executor endpoint in `<purple_agent_url>` and the run configuration JSON
//! in `<eval_config>`. The response carries a human-readable digest as a
//! text part and the full summary as a data part.

pub mod runner;

pub use runner::{build_task_prompt, extract_answer, TaskResult, TaskRunner};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::dataset::{RunConfig, TaskSource};
use crate::error::{EvalError, TransportError};
use crate::transport::{
    AgentCard, AgentClient, AgentSkill, Part, SendMessageRequest, SendMessageResponse,
    AGENT_CARD_PATH, MESSAGES_PATH,
};
use crate::utils::extract_tags;

/// Role name the executor endpoint must be registered under.
pub const EXECUTOR_ROLE: &str = "executor";

/// Tag carrying the executor endpoint in a run request.
pub const EXECUTOR_URL_TAG: &str = "purple_agent_url";

/// Tag carrying the run configuration JSON in a run request.
pub const EVAL_CONFIG_TAG: &str = "eval_config";

const REQUIRED_CONFIG_KEYS: [&str; 2] = ["level", "split"];

/// A parsed and validated evaluation request.
#[derive(Debug, Clone)]
pub struct EvalRequest {
    /// Participant endpoints keyed by role.
    pub participants: HashMap<String, String>,
    /// The run configuration.
    pub config: RunConfig,
}

impl EvalRequest {
    /// Parse a run request out of tagged message text and validate it.
    ///
    /// A missing executor endpoint, missing required config keys, malformed
    /// config JSON, or an out-of-domain level all fail here, before any task
    /// is touched.
    pub fn parse(text: &str) -> Result<Self, EvalError> {
        let mut tags = extract_tags(text);

        let mut participants = HashMap::new();
        if let Some(url) = tags.remove(EXECUTOR_URL_TAG) {
            participants.insert(EXECUTOR_ROLE.to_string(), url);
        }
        if !participants.contains_key(EXECUTOR_ROLE) {
            return Err(EvalError::Validation(format!(
                "Missing required roles: {EXECUTOR_ROLE}"
            )));
        }

        let raw_config: Value = match tags.remove(EVAL_CONFIG_TAG) {
            Some(json) => serde_json::from_str(&json).map_err(|e| {
                EvalError::Validation(format!("Config block is not valid JSON: {e}"))
            })?,
            None => Value::Object(serde_json::Map::new()),
        };

        let missing: Vec<&str> = REQUIRED_CONFIG_KEYS
            .iter()
            .filter(|key| raw_config.get(**key).is_none())
            .copied()
            .collect();
        if !missing.is_empty() {
            return Err(EvalError::Validation(format!(
                "Missing required config keys: {}",
                missing.join(", ")
            )));
        }

        let config: RunConfig = serde_json::from_value(raw_config)
            .map_err(|e| EvalError::Validation(format!("Invalid config: {e}")))?;
        config
            .validate()
            .map_err(|e| EvalError::Validation(e.to_string()))?;

        Ok(Self {
            participants,
            config,
        })
    }

    /// The executor endpoint. Guaranteed present after `parse`.
    pub fn executor_url(&self) -> &str {
        self.participants
            .get(EXECUTOR_ROLE)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Aggregate outcome of one evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub level: u8,
    pub split: String,
    pub total_tasks: usize,
    pub correct_tasks: usize,
    pub error_tasks: usize,
    /// Fraction of tasks scored correct, in [0, 1].
    pub accuracy: f64,
    /// Mean wall-clock seconds per task.
    pub avg_time: f64,
    /// Total wall-clock seconds of the run.
    pub time_used: f64,
    /// Per-task results keyed by task identifier.
    pub task_results: BTreeMap<String, TaskResult>,
}

/// Aggregate per-task results into a run summary.
pub fn summarize(
    config: &RunConfig,
    task_results: BTreeMap<String, TaskResult>,
    time_used: f64,
) -> RunSummary {
    let total_tasks = task_results.len();
    let correct_tasks = task_results
        .values()
        .filter(|r| r.is_correct == Some(true))
        .count();
    let error_tasks = task_results.values().filter(|r| r.error.is_some()).count();

    let (accuracy, avg_time) = if total_tasks == 0 {
        (0.0, 0.0)
    } else {
        (
            correct_tasks as f64 / total_tasks as f64,
            time_used / total_tasks as f64,
        )
    };

    RunSummary {
        level: config.level,
        split: config.split.to_string(),
        total_tasks,
        correct_tasks,
        error_tasks,
        accuracy,
        avg_time,
        time_used,
        task_results,
    }
}

/// Render the human-readable result digest for a summary.
pub fn digest(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("GAIA Benchmark Results\n");
    out.push_str(&format!(
        "Level {} | Split: {}\n",
        summary.level, summary.split
    ));
    out.push_str(&format!(
        "Tasks: {} | Correct: {} | Errors: {}\n",
        summary.total_tasks, summary.correct_tasks, summary.error_tasks
    ));
    out.push_str(&format!(
        "Accuracy: {:.1}% | Avg time: {:.1}s | Total time: {:.1}s\n",
        summary.accuracy * 100.0,
        summary.avg_time,
        summary.time_used
    ));

    for (task_id, result) in &summary.task_results {
        let mark = match result.is_correct {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "?",
        };
        match &result.error {
            Some(error) => {
                out.push_str(&format!("  {mark} {task_id}: error: {error}\n"));
            }
            None => {
                out.push_str(&format!(
                    "  {mark} {task_id}: {} ({:.1}s)\n",
                    result.predicted_answer.as_deref().unwrap_or("<no answer>"),
                    result.elapsed_time
                ));
            }
        }
    }
    out
}

/// The benchmark evaluator agent.
pub struct EvaluatorAgent {
    source: Arc<dyn TaskSource>,
    runner: TaskRunner,
}

impl EvaluatorAgent {
    /// Create an evaluator drawing tasks from `source`.
    pub fn new(source: Arc<dyn TaskSource>) -> Self {
        Self {
            source,
            runner: TaskRunner::new(AgentClient::new()),
        }
    }

    /// Execute a validated evaluation run: resolve the task batch, evaluate
    /// each task in order against the executor, and aggregate.
    ///
    /// Per-task faults are recorded on their results; a batch resolution
    /// failure fails the whole run.
    pub async fn run_eval(&self, request: &EvalRequest) -> Result<RunSummary, EvalError> {
        let config = &request.config;
        let tasks = self
            .source
            .get_task_batch(config.level, config.split, &config.task_indices)
            .await?;

        tracing::info!(
            level = config.level,
            split = %config.split,
            task_count = tasks.len(),
            executor_url = %request.executor_url(),
            "Starting evaluation run"
        );

        let started = Instant::now();
        let mut task_results = BTreeMap::new();
        for task in &tasks {
            let result = self.runner.run(request.executor_url(), task).await;
            task_results.insert(task.task_id.clone(), result);
        }
        let time_used = started.elapsed().as_secs_f64();

        let summary = summarize(config, task_results, time_used);
        tracing::info!(
            total = summary.total_tasks,
            correct = summary.correct_tasks,
            errors = summary.error_tasks,
            accuracy = summary.accuracy,
            "Evaluation run complete"
        );
        Ok(summary)
    }

    /// Handle one inbound run request message end to end.
    pub async fn handle_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, EvalError> {
        let eval_request = EvalRequest::parse(&request.message)?;
        let summary = self.run_eval(&eval_request).await?;

        let context_id = request
            .context_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Ok(SendMessageResponse {
            context_id,
            parts: vec![
                Part::Text {
                    text: digest(&summary),
                },
                Part::Data {
                    data: serde_json::to_value(&summary)?,
                },
            ],
        })
    }

    /// Capability card advertised by this agent.
    pub fn card(url: &str) -> AgentCard {
        AgentCard {
            name: "gaia_evaluator_agent".to_string(),
            description: "Evaluates executor agents on GAIA benchmark tasks and reports \
                          accuracy"
                .to_string(),
            url: url.to_string(),
            version: "1.0.0".to_string(),
            skills: vec![AgentSkill {
                id: "gaia_evaluation".to_string(),
                name: "GAIA Evaluation".to_string(),
                description: "Runs a configured GAIA task batch against an executor agent \
                              and scores the answers"
                    .to_string(),
                tags: vec![
                    "gaia".to_string(),
                    "benchmark".to_string(),
                    "evaluation".to_string(),
                ],
            }],
        }
    }
}

struct ServerState {
    agent: EvaluatorAgent,
    card: AgentCard,
}

/// Serve the evaluator agent on `addr` until the process is terminated.
pub async fn serve(addr: SocketAddr, agent: EvaluatorAgent) -> Result<(), TransportError> {
    let url = format!("http://{addr}");
    let state = Arc::new(ServerState {
        agent,
        card: EvaluatorAgent::card(&url),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::RequestFailed {
            url,
            reason: format!("bind failed: {e}"),
        })?;

    tracing::info!(%addr, "Evaluator agent listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| TransportError::RequestFailed {
            url: format!("http://{addr}"),
            reason: e.to_string(),
        })
}

fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route(AGENT_CARD_PATH, get(card_handler))
        .route(MESSAGES_PATH, post(messages_handler))
        .with_state(state)
}

async fn card_handler(State(state): State<Arc<ServerState>>) -> Json<AgentCard> {
    Json(state.card.clone())
}

async fn messages_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, (StatusCode, String)> {
    state
        .agent
        .handle_message(request)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!(error = %e, "Evaluator failed to handle message");
            let status = match e {
                EvalError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (status, e.to_string())
        })
}

/// Build the run request text a launcher sends to the evaluator.
pub fn build_run_request(executor_url: &str, config: &RunConfig) -> Result<String, EvalError> {
    let config_json = serde_json::to_string(config)?;
    Ok(format!(
        "Run the GAIA benchmark evaluation.\n\
         <{EXECUTOR_URL_TAG}>{executor_url}</{EXECUTOR_URL_TAG}>\n\
         <{EVAL_CONFIG_TAG}>{config_json}</{EVAL_CONFIG_TAG}>"
    ))
}
