//! Chat history store
//!
//! An ordered, append-only log of user/assistant turns, serialized to and
//! from a JSON string between requests. Absent or malformed serialized
//! content yields an empty history instead of failing the request: the
//! history is reconstructible from future turns, so falling back is a
//! resilience rule rather than silent data loss.

use serde::{Deserialize, Serialize};

/// Role of a chat turn author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Turn authored by the user
    User,
    /// Turn authored by the model
    Assistant,
}

/// A single role-tagged message, immutable once created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    /// Author of the turn
    pub role: Role,
    /// Message text
    pub content: String,
}

impl ChatTurn {
    /// Creates a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Creates an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, append-only sequence of chat turns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    /// Creates an empty history
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn to the history
    pub fn push_turn(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    /// Number of turns in the history
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true when the history holds no turns
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serializes the history to a JSON string
    ///
    /// Serialization of plain role/content pairs cannot realistically
    /// fail; if it ever does the empty-list form is returned so the
    /// request still completes.
    pub fn serialize(&self) -> String {
        match serde_json::to_string(&self.turns) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to serialize chat history: {}", e);
                "[]".to_string()
            }
        }
    }

    /// Deserializes a history from a JSON string
    ///
    /// An empty, whitespace-only, or malformed string yields an empty
    /// history (treated as "first turn") rather than an error.
    pub fn deserialize(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }

        match serde_json::from_str::<Vec<ChatTurn>>(text) {
            Ok(turns) => Self { turns },
            Err(e) => {
                tracing::warn!("Malformed chat history, starting fresh: {}", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_history() -> ChatHistory {
        let mut history = ChatHistory::new();
        history.push_turn(ChatTurn::user("show a bar chart"));
        history.push_turn(ChatTurn::assistant("```json\n{\"chart\":\"bar\"}\n```"));
        history
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
    }

    #[test]
    fn test_push_preserves_order() {
        let history = sample_history();
        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].role, Role::User);
        assert_eq!(history.turns()[1].role, Role::Assistant);
    }

    #[test]
    fn test_serialize_deserialize_round_trip() {
        let history = sample_history();
        let text = history.serialize();
        assert_eq!(ChatHistory::deserialize(&text), history);
    }

    #[test]
    fn test_round_trip_empty_history() {
        let history = ChatHistory::new();
        assert_eq!(ChatHistory::deserialize(&history.serialize()), history);
    }

    #[test]
    fn test_deserialize_empty_string() {
        assert!(ChatHistory::deserialize("").is_empty());
        assert!(ChatHistory::deserialize("   \n").is_empty());
    }

    #[test]
    fn test_deserialize_malformed_falls_back_to_empty() {
        assert!(ChatHistory::deserialize("{not json").is_empty());
        assert!(ChatHistory::deserialize("{\"role\":\"user\"}").is_empty());
    }

    #[test]
    fn test_role_serialization_format() {
        let text = sample_history().serialize();
        assert!(text.contains("\"role\":\"user\""));
        assert!(text.contains("\"role\":\"assistant\""));
    }

    #[test]
    fn test_turn_constructors() {
        assert_eq!(ChatTurn::user("hi").role, Role::User);
        assert_eq!(ChatTurn::assistant("hello").role, Role::Assistant);
    }
}
