//! Dialogue node definitions.

mod hooks;

pub use hooks::*;

use serde::{Deserialize, Serialize};

/// Identifier of a node, unique within one actor's collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i64);

impl From<i64> for NodeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for NodeId {
    fn from(id: i32) -> Self {
        Self(i64::from(id))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a node continues once it has been chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFlow {
    /// A menu of player-selectable branches. May be empty.
    Choices(Vec<NodeId>),
    /// A direct successor. `None` ends the conversation.
    Next(Option<NodeId>),
}

impl NodeFlow {
    /// Every node id this flow refers to.
    pub fn references(&self) -> Vec<NodeId> {
        match self {
            NodeFlow::Choices(ids) => ids.clone(),
            NodeFlow::Next(next) => next.iter().copied().collect(),
        }
    }
}

impl Default for NodeFlow {
    fn default() -> Self {
        NodeFlow::Next(None)
    }
}

/// A gating predicate together with the node to show when it fails.
#[derive(Debug, Clone)]
pub struct Prerequisite {
    pub condition: Condition,
    pub fallback: NodeId,
}

/// One line of dialogue plus its branching metadata.
#[derive(Debug, Clone)]
pub struct DialogueNode {
    pub id: NodeId,

    /// Display text.
    pub message: String,

    pub flow: NodeFlow,

    /// Optional gate; when it fails the fallback node is used instead.
    pub prerequisite: Option<Prerequisite>,

    /// Optional effect run after this node is chosen, before the cursor moves.
    pub post: Option<Effect>,
}

impl DialogueNode {
    /// Create a conversation-ending node with the given message.
    pub fn new(id: impl Into<NodeId>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            flow: NodeFlow::default(),
            prerequisite: None,
            post: None,
        }
    }

    /// Offer the given nodes as choices.
    pub fn with_choices<I, T>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<NodeId>,
    {
        self.flow = NodeFlow::Choices(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Advance to `next` once chosen.
    pub fn with_next(mut self, next: impl Into<NodeId>) -> Self {
        self.flow = NodeFlow::Next(Some(next.into()));
        self
    }

    /// End the conversation once chosen.
    pub fn ending(mut self) -> Self {
        self.flow = NodeFlow::Next(None);
        self
    }

    /// Set the flow directly.
    pub fn with_flow(mut self, flow: NodeFlow) -> Self {
        self.flow = flow;
        self
    }

    /// Gate this node behind `condition`, redirecting to `fallback` when it fails.
    pub fn with_prerequisite(mut self, condition: Condition, fallback: impl Into<NodeId>) -> Self {
        self.prerequisite = Some(Prerequisite {
            condition,
            fallback: fallback.into(),
        });
        self
    }

    /// Run `effect` after this node is chosen.
    pub fn with_post(mut self, effect: Effect) -> Self {
        self.post = Some(effect);
        self
    }

    /// The choice menu, if this node has one.
    pub fn choices(&self) -> Option<&[NodeId]> {
        match &self.flow {
            NodeFlow::Choices(ids) => Some(ids),
            NodeFlow::Next(_) => None,
        }
    }

    /// The direct successor. `None` for menus and ending nodes.
    pub fn next(&self) -> Option<NodeId> {
        match self.flow {
            NodeFlow::Next(next) => next,
            NodeFlow::Choices(_) => None,
        }
    }

    /// Whether this node carries a non-empty choice menu.
    pub fn has_menu(&self) -> bool {
        self.choices().is_some_and(|ids| !ids.is_empty())
    }

    /// Fallback node id, present only when gated.
    pub fn fallback(&self) -> Option<NodeId> {
        self.prerequisite.as_ref().map(|p| p.fallback)
    }

    /// Evaluate the prerequisite. Ungated nodes always pass.
    pub fn passes_prerequisite(&self) -> HookResult<bool> {
        match &self.prerequisite {
            Some(prerequisite) => prerequisite.condition.evaluate(),
            None => Ok(true),
        }
    }

    /// Every node id this node refers to (choices, successor, fallback).
    pub fn references(&self) -> Vec<NodeId> {
        let mut refs = self.flow.references();
        refs.extend(self.fallback());
        refs
    }
}
