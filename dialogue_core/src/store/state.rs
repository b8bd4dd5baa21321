//! Per-actor conversation state.

use dialogue_rules::NodeId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one loaded conversation. A reload gets a fresh id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The cursor of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Node currently spoken. `None` once the conversation has ended.
    pub current: Option<NodeId>,

    pub session: SessionId,

    /// Number of transitions taken since load.
    pub turns: u32,
}

impl ConversationState {
    /// Start a conversation at `first`.
    pub fn starting_at(first: NodeId) -> Self {
        Self {
            current: Some(first),
            session: SessionId::new(),
            turns: 0,
        }
    }

    /// Check if the conversation has ended.
    pub fn is_ended(&self) -> bool {
        self.current.is_none()
    }

    /// Move the cursor and count the transition.
    pub fn advance(&mut self, to: Option<NodeId>) {
        self.current = to;
        self.turns += 1;
    }
}
