//! Single-task execution against the executor agent.
//!
//! Builds the task prompt, sends it as a fresh conversation, extracts the
//! predicted answer, scores it, and records timing. Transport and protocol
//! faults are converted to per-task data here and never propagate: a failed
//! task must not abort the rest of the batch.

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::dataset::Task;
use crate::scoring::{is_correct, DEFAULT_TOLERANCE};
use crate::transport::AgentClient;
use crate::utils::extract_tags;

/// Outcome of one task evaluation. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    pub task_id: String,
    pub question: String,
    /// Absent when the task failed before an answer was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ground_truth: Option<String>,
    /// Absent when no ground truth was available for comparison.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_correct: Option<bool>,
    /// Wall-clock seconds spent on this task.
    pub elapsed_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Build the task prompt sent to the executor.
pub fn build_task_prompt(question: &str) -> String {
    format!(
        "You are solving a GAIA benchmark task. Provide your final answer clearly.\n\
         \n\
         Question: {question}\n\
         \n\
         Use the available tools (web_search, calculator) as needed to solve this task.\n\
         Once you have the answer, provide it in this format:\n\
         <answer>YOUR_ANSWER_HERE</answer>"
    )
}

/// Extract the predicted answer from the executor's raw response text: the
/// `<answer>` tag when present, otherwise the full response (fallback, not
/// an error).
pub fn extract_answer(response: &str) -> String {
    extract_tags(response)
        .remove("answer")
        .unwrap_or_else(|| response.to_string())
}

/// Runs one benchmark task against an executor endpoint.
pub struct TaskRunner {
    client: AgentClient,
}

impl TaskRunner {
    /// Create a runner over the given transport client.
    pub fn new(client: AgentClient) -> Self {
        Self { client }
    }

    /// Evaluate `task` against the executor at `executor_url`.
    ///
    /// Every task starts a fresh conversation; no task observes another
    /// task's tool-calling history. Never fails: faults are recorded on the
    /// returned result with `is_correct = Some(false)`.
    pub async fn run(&self, executor_url: &str, task: &Task) -> TaskResult {
        let prompt = build_task_prompt(&task.question);
        let started = Instant::now();

        tracing::info!(task_id = %task.task_id, "Running task");

        match self.client.send_message(executor_url, prompt, None).await {
            Ok(response) => {
                let elapsed_time = started.elapsed().as_secs_f64();
                let response_text = response.text();
                let predicted_answer = extract_answer(&response_text);

                let is_correct = task.ground_truth.as_deref().map(|ground_truth| {
                    let correct = is_correct(&predicted_answer, ground_truth, DEFAULT_TOLERANCE);
                    tracing::info!(
                        task_id = %task.task_id,
                        predicted = %predicted_answer,
                        ground_truth = %ground_truth,
                        correct,
                        "Scored task"
                    );
                    correct
                });

                TaskResult {
                    task_id: task.task_id.clone(),
                    question: task.question.clone(),
                    predicted_answer: Some(predicted_answer),
                    ground_truth: task.ground_truth.clone(),
                    is_correct,
                    elapsed_time,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(task_id = %task.task_id, error = %e, "Task failed");
                TaskResult {
                    task_id: task.task_id.clone(),
                    question: task.question.clone(),
                    predicted_answer: None,
                    ground_truth: task.ground_truth.clone(),
                    is_correct: Some(false),
                    elapsed_time: started.elapsed().as_secs_f64(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
