//! Per-conversation turn history for the executor agent.
//!
//! One history bucket per conversation identifier. Within a conversation the
//! history grows monotonically and is never pruned; across conversations an
//! injectable eviction policy bounds how many buckets a long-lived executor
//! process keeps alive.

use std::collections::{HashMap, VecDeque};

use crate::llm::ChatMessage;

/// Policy bounding the number of retained conversations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Keep every conversation for the lifetime of the process.
    Unbounded,
    /// Keep at most `n` conversations, evicting the least recently touched.
    MaxConversations(usize),
}

/// Store of conversation histories keyed by conversation identifier.
pub struct ConversationStore {
    policy: EvictionPolicy,
    conversations: HashMap<String, Vec<ChatMessage>>,
    // Least recently touched at the front.
    touch_order: VecDeque<String>,
}

impl ConversationStore {
    /// Create a store with the given eviction policy.
    pub fn new(policy: EvictionPolicy) -> Self {
        Self {
            policy,
            conversations: HashMap::new(),
            touch_order: VecDeque::new(),
        }
    }

    /// Snapshot of the history for `context_id`; empty for a fresh
    /// conversation.
    pub fn history(&self, context_id: &str) -> Vec<ChatMessage> {
        self.conversations
            .get(context_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the history for `context_id`, marking it most recently
    /// touched and evicting per policy.
    pub fn replace(&mut self, context_id: &str, messages: Vec<ChatMessage>) {
        self.conversations.insert(context_id.to_string(), messages);
        self.touch(context_id);

        if let EvictionPolicy::MaxConversations(max) = self.policy {
            while self.conversations.len() > max {
                let Some(oldest) = self.touch_order.pop_front() else {
                    break;
                };
                self.conversations.remove(&oldest);
                tracing::debug!(context_id = %oldest, "Evicted conversation history");
            }
        }
    }

    fn touch(&mut self, context_id: &str) {
        self.touch_order.retain(|id| id != context_id);
        self.touch_order.push_back(context_id.to_string());
    }

    /// Number of retained conversations.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Whether the store holds no conversations.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    /// Whether `context_id` has retained history.
    pub fn contains(&self, context_id: &str) -> bool {
        self.conversations.contains_key(context_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_conversation_is_empty() {
        let store = ConversationStore::new(EvictionPolicy::Unbounded);
        assert!(store.history("ctx-1").is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_and_reload() {
        let mut store = ConversationStore::new(EvictionPolicy::Unbounded);
        store.replace("ctx-1", vec![ChatMessage::user("hello")]);

        let history = store.history("ctx-1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content_or_empty(), "hello");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut store = ConversationStore::new(EvictionPolicy::Unbounded);
        for i in 0..100 {
            store.replace(&format!("ctx-{i}"), vec![ChatMessage::user("m")]);
        }
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_max_conversations_evicts_least_recently_touched() {
        let mut store = ConversationStore::new(EvictionPolicy::MaxConversations(2));
        store.replace("a", vec![ChatMessage::user("1")]);
        store.replace("b", vec![ChatMessage::user("2")]);

        // Touch "a" so "b" becomes the eviction candidate.
        store.replace("a", vec![ChatMessage::user("1"), ChatMessage::user("1b")]);
        store.replace("c", vec![ChatMessage::user("3")]);

        assert_eq!(store.len(), 2);
        assert!(store.contains("a"));
        assert!(!store.contains("b"));
        assert!(store.contains("c"));
    }
}
