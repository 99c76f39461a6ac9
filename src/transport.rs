//! Agent-to-agent messaging transport.
//!
//! Both agents expose the same narrow HTTP surface: a capability card at
//! `GET /.well-known/agent.json` and message exchange at `POST /messages`.
//! The client side fetches cards (also the readiness signal), sends text
//! messages, and receives structured responses of text and data parts.
//! Failures are reported to the caller; nothing here retries except the
//! readiness poll.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::error::TransportError;

/// Well-known path of the agent capability card.
pub const AGENT_CARD_PATH: &str = "/.well-known/agent.json";

/// Path of the message exchange endpoint.
pub const MESSAGES_PATH: &str = "/messages";

/// A capability an agent advertises on its card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Externally discoverable description of an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    pub name: String,
    pub description: String,
    pub url: String,
    pub version: String,
    pub skills: Vec<AgentSkill>,
}

/// Request body of `POST /messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// The text message for the agent.
    pub message: String,
    /// Conversation to continue; absent starts a fresh conversation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
}

/// One part of an agent response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Human-readable text.
    Text { text: String },
    /// Structured payload.
    Data { data: Value },
}

/// Response body of `POST /messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// The conversation this exchange belongs to.
    pub context_id: String,
    /// Response parts, in order.
    pub parts: Vec<Part>,
}

impl SendMessageResponse {
    /// Concatenated text of all text parts, newline-joined.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::Data { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The first data part, if any.
    pub fn data(&self) -> Option<&Value> {
        self.parts.iter().find_map(|part| match part {
            Part::Data { data } => Some(data),
            Part::Text { .. } => None,
        })
    }
}

/// HTTP client for talking to agents.
#[derive(Clone)]
pub struct AgentClient {
    http_client: reqwest::Client,
}

impl AgentClient {
    /// Create a client. Message exchanges get a generous timeout since one
    /// message may cover a full multi-turn tool-calling loop downstream.
    pub fn new() -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(600))
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    /// Fetch the capability card of the agent at `url`.
    pub async fn fetch_card(&self, url: &str) -> Result<AgentCard, TransportError> {
        let card_url = format!("{}{}", url.trim_end_matches('/'), AGENT_CARD_PATH);
        let response = self
            .http_client
            .get(&card_url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                url: card_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::BadStatus {
                url: card_url,
                code: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Send a text message to the agent at `url` and await its response.
    pub async fn send_message(
        &self,
        url: &str,
        message: impl Into<String>,
        context_id: Option<String>,
    ) -> Result<SendMessageResponse, TransportError> {
        let messages_url = format!("{}{}", url.trim_end_matches('/'), MESSAGES_PATH);
        let request = SendMessageRequest {
            message: message.into(),
            context_id,
        };

        let response = self
            .http_client
            .post(&messages_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed {
                url: messages_url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::BadStatus {
                url: messages_url,
                code: response.status().as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    /// Poll the agent's card once per second until it responds or `timeout`
    /// elapses. Returns whether the agent became ready.
    pub async fn wait_agent_ready(&self, url: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.fetch_card(url).await.is_ok() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}

impl Default for AgentClient {
    fn default() -> Self {
        Self::new()
    }
}
