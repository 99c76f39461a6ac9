//! The executor agent: answers task prompts with a tool-calling loop.
//!
//! Exposes the messaging transport surface over HTTP and keeps one
//! conversation-history bucket per inbound conversation identifier.

pub mod agent_loop;
pub mod history;

pub use agent_loop::{LoopConfig, LoopOutcome, ToolCallingLoop, EXHAUSTION_SENTINEL, MAX_ITERATIONS};
pub use history::{ConversationStore, EvictionPolicy};

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::{LlmError, TransportError};
use crate::llm::{ChatMessage, LlmProvider};
use crate::transport::{
    AgentCard, AgentSkill, Part, SendMessageRequest, SendMessageResponse, AGENT_CARD_PATH,
    MESSAGES_PATH,
};

/// The task executor agent.
pub struct ExecutorAgent {
    agent_loop: ToolCallingLoop,
    store: Mutex<ConversationStore>,
}

impl ExecutorAgent {
    /// Create an executor over the given provider and loop configuration.
    pub fn new(llm_client: Arc<dyn LlmProvider>, config: LoopConfig) -> Self {
        Self::with_eviction(llm_client, config, EvictionPolicy::Unbounded)
    }

    /// Create an executor with an explicit conversation eviction policy.
    pub fn with_eviction(
        llm_client: Arc<dyn LlmProvider>,
        config: LoopConfig,
        policy: EvictionPolicy,
    ) -> Self {
        Self {
            agent_loop: ToolCallingLoop::new(llm_client, config),
            store: Mutex::new(ConversationStore::new(policy)),
        }
    }

    /// Handle one inbound message: append it to the conversation's history,
    /// run the tool-calling loop, and return the final answer as a text
    /// part. An absent conversation identifier starts a fresh conversation.
    pub async fn handle_message(
        &self,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, LlmError> {
        let context_id = request
            .context_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut messages = self.store.lock().await.history(&context_id);
        messages.push(ChatMessage::user(request.message));

        let outcome = self.agent_loop.run(&mut messages).await?;
        tracing::info!(
            context_id = %context_id,
            iterations = outcome.iterations,
            exhausted = outcome.exhausted,
            "Executor completed a message"
        );

        self.store.lock().await.replace(&context_id, messages);

        Ok(SendMessageResponse {
            context_id,
            parts: vec![Part::Text {
                text: outcome.final_text,
            }],
        })
    }

    /// Capability card advertised by this agent.
    pub fn card(url: &str) -> AgentCard {
        AgentCard {
            name: "gaia_executor_agent".to_string(),
            description: "Executes GAIA benchmark tasks with web search, calculation, and \
                          multi-step reasoning"
                .to_string(),
            url: url.to_string(),
            version: "1.0.0".to_string(),
            skills: vec![AgentSkill {
                id: "gaia_task_execution".to_string(),
                name: "GAIA Task Execution".to_string(),
                description: "Answers benchmark questions using a bounded tool-calling loop"
                    .to_string(),
                tags: vec![
                    "gaia".to_string(),
                    "reasoning".to_string(),
                    "tools".to_string(),
                ],
            }],
        }
    }
}

struct ServerState {
    agent: ExecutorAgent,
    card: AgentCard,
}

/// Serve the executor agent on `addr` until the process is terminated.
pub async fn serve(
    addr: SocketAddr,
    agent: ExecutorAgent,
) -> Result<(), TransportError> {
    let url = format!("http://{addr}");
    let state = Arc::new(ServerState {
        agent,
        card: ExecutorAgent::card(&url),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TransportError::RequestFailed {
            url,
            reason: format!("bind failed: {e}"),
        })?;

    tracing::info!(%addr, "Executor agent listening");
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
            tracing::error!(error = %e, "Executor failed to handle message");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{Choice, CompletionRequest, CompletionResponse};
    use async_trait::async_trait;

    /// Provider that always answers with the same text.
    struct FixedProvider(String);

    #[async_trait]
    impl LlmProvider for FixedProvider {
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
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

    #[tokio::test]
    async fn test_fresh_conversation_gets_generated_context_id() {
        let agent = ExecutorAgent::new(
            Arc::new(FixedProvider("<answer>42</answer>".to_string())),
            LoopConfig::default(),
        );

        let response = agent
            .handle_message(SendMessageRequest {
                message: "What is 6 * 7?".to_string(),
                context_id: None,
            })
            .await
            .expect("handled");

        assert!(!response.context_id.is_empty());
        assert_eq!(response.text(), "<answer>42</answer>");
    }

    #[tokio::test]
    async fn test_conversation_history_accumulates_per_context() {
        let agent = ExecutorAgent::new(
            Arc::new(FixedProvider("ok".to_string())),
            LoopConfig::default(),
        );

        let first = agent
            .handle_message(SendMessageRequest {
                message: "one".to_string(),
                context_id: Some("ctx".to_string()),
            })
            .await
            .expect("handled");
        let second = agent
            .handle_message(SendMessageRequest {
                message: "two".to_string(),
                context_id: Some("ctx".to_string()),
            })
            .await
            .expect("handled");

        assert_eq!(first.context_id, "ctx");
        assert_eq!(second.context_id, "ctx");

        let history = agent.store.lock().await.history("ctx");
        // Two user turns and two assistant turns.
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content_or_empty(), "one");
        assert_eq!(history[2].content_or_empty(), "two");
    }

    #[tokio::test]
    async fn test_conversations_are_isolated() {
        let agent = ExecutorAgent::new(
            Arc::new(FixedProvider("ok".to_string())),
            LoopConfig::default(),
        );

        agent
            .handle_message(SendMessageRequest {
                message: "task one".to_string(),
                context_id: Some("a".to_string()),
            })
            .await
            .expect("handled");
        agent
            .handle_message(SendMessageRequest {
                message: "task two".to_string(),
                context_id: Some("b".to_string()),
            })
            .await
            .expect("handled");

        let store = agent.store.lock().await;
        assert_eq!(store.history("a").len(), 2);
        assert_eq!(store.history("b").len(), 2);
        assert_eq!(store.history("a")[0].content_or_empty(), "task one");
    }

    #[test]
    fn test_card_shape() {
        let card = ExecutorAgent::card("http://127.0.0.1:9002");
        assert_eq!(card.name, "gaia_executor_agent");
        assert_eq!(card.url, "http://127.0.0.1:9002");
        assert_eq!(card.skills.len(), 1);
    }
}
