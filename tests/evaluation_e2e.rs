//! End-to-end evaluation tests over the real HTTP transport.
//!
//! Spins up in-process agent servers on ephemeral ports and drives full
//! evaluation runs through them, with the LLM behind a scripted provider.

use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gaia_bench::dataset::{InMemoryTaskSource, RunConfig, Split, Task};
use gaia_bench::error::{LlmError, TransportError};
use gaia_bench::evaluator::{self, build_run_request, EvaluatorAgent, RunSummary, TaskRunner};
use gaia_bench::executor::{self, ExecutorAgent, LoopConfig};
use gaia_bench::llm::{ChatMessage, Choice, CompletionRequest, CompletionResponse, LlmProvider};
use gaia_bench::transport::{AgentClient, SendMessageRequest};

/// Provider that always answers with the same text.
struct FixedProvider(String);

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Ok(CompletionResponse {
            id: "fixed".to_string(),
            model: "fixed".to_string(),
            choices: vec![Choice {
                index: 0,
                message: ChatMessage::assistant(self.0.clone()),
                finish_reason: Some("stop".to_string()),
            }],
            usage: None,
        })
    }
}

fn free_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    listener.local_addr().expect("local addr")
}

fn task(id: &str, ground_truth: Option<&str>) -> Task {
    Task {
        task_id: id.to_string(),
        question: format!("Question for {id}"),
        ground_truth: ground_truth.map(String::from),
        level: 1,
        attached_file: None,
    }
}

fn run_config() -> RunConfig {
    RunConfig {
        level: 1,
        split: Split::Validation,
        task_indices: vec![0],
    }
}

async fn start_executor(answer: &str) -> String {
    let addr = free_addr();
    let agent = ExecutorAgent::new(
        Arc::new(FixedProvider(answer.to_string())),
        LoopConfig::default(),
    );
    tokio::spawn(async move {
        let _ = executor::serve(addr, agent).await;
    });

    let url = format!("http://{addr}");
    let ready = AgentClient::new()
        .wait_agent_ready(&url, Duration::from_secs(5))
        .await;
    assert!(ready, "executor did not become ready");
    url
}

#[tokio::test]
async fn test_full_run_scores_correct_answer() {
    let executor_url = start_executor("I looked it up.\n<answer>42</answer>").await;

    let evaluator = EvaluatorAgent::new(Arc::new(InMemoryTaskSource::new(vec![task(
        "t-1",
        Some("42"),
    )])));
    let request = build_run_request(&executor_url, &run_config()).expect("builds request");

    let response = evaluator
        .handle_message(SendMessageRequest {
            message: request,
            context_id: None,
        })
        .await
        .expect("run succeeds");

    let summary: RunSummary =
        serde_json::from_value(response.data().expect("data part").clone()).expect("summary");
    assert_eq!(summary.total_tasks, 1);
    assert_eq!(summary.correct_tasks, 1);
    assert_eq!(summary.error_tasks, 0);
    assert!((summary.accuracy - 1.0).abs() < 1e-9);

    let result = summary.task_results.get("t-1").expect("task result");
    assert_eq!(result.predicted_answer.as_deref(), Some("42"));
    assert_eq!(result.is_correct, Some(true));

    assert!(response.text().contains("Accuracy: 100.0%"));
}

#[tokio::test]
async fn test_hidden_ground_truth_yields_unscored_result() {
    let executor_url = start_executor("<answer>42</answer>").await;
    let runner = TaskRunner::new(AgentClient::new());

    let result = runner.run(&executor_url, &task("t-1", None)).await;

    assert_eq!(result.predicted_answer.as_deref(), Some("42"));
    assert_eq!(result.is_correct, None);
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_unreachable_executor_recorded_per_task() {
    let evaluator = EvaluatorAgent::new(Arc::new(InMemoryTaskSource::new(vec![task(
        "t-1",
        Some("42"),
    )])));
    let request = build_run_request("http://127.0.0.1:1", &run_config()).expect("builds request");

    let response = evaluator
        .handle_message(SendMessageRequest {
            message: request,
            context_id: None,
        })
        .await
        .expect("run completes despite task failure");

    let summary: RunSummary =
        serde_json::from_value(response.data().expect("data part").clone()).expect("summary");
    assert_eq!(summary.total_tasks, 1);
    assert_eq!(summary.correct_tasks, 0);
    assert_eq!(summary.error_tasks, 1);
    assert_eq!(summary.accuracy, 0.0);

    let result = summary.task_results.get("t-1").expect("task result");
    assert_eq!(result.is_correct, Some(false));
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_evaluator_server_rejects_invalid_request() {
    let addr = free_addr();
    let agent = EvaluatorAgent::new(Arc::new(InMemoryTaskSource::new(vec![])));
    tokio::spawn(async move {
        let _ = evaluator::serve(addr, agent).await;
    });

    let url = format!("http://{addr}");
    let client = AgentClient::new();
    assert!(client.wait_agent_ready(&url, Duration::from_secs(5)).await);

    // No executor endpoint tag: must fail validation with a client error.
    let err = client
        .send_message(&url, "please evaluate", None)
        .await
        .expect_err("validation failure");
    match err {
        TransportError::BadStatus { code, .. } => assert_eq!(code, 400),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_executor_card_served_over_http() {
    let executor_url = start_executor("<answer>ok</answer>").await;
    let card = AgentClient::new()
        .fetch_card(&executor_url)
        .await
        .expect("card");
    assert_eq!(card.name, "gaia_executor_agent");
    assert!(!card.skills.is_empty());
}
