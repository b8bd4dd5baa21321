//! Rendered responses returned by [`interact_with`](super::DialogueEngine::interact_with).

use dialogue_rules::{DialogueNode, NodeId};

/// The node an actor is currently speaking, with its choices hydrated.
#[derive(Debug, Clone)]
pub struct RenderedNode {
    pub node: DialogueNode,

    /// Nodes offered as choices. Empty, never absent, when there is no menu.
    pub prompts: Vec<DialogueNode>,

    /// Set when the cursor's node failed its prerequisite and its fallback
    /// is shown instead.
    pub redirected_from: Option<NodeId>,
}

impl RenderedNode {
    pub fn id(&self) -> NodeId {
        self.node.id
    }

    pub fn message(&self) -> &str {
        &self.node.message
    }

    /// The raw choice menu of the rendered node.
    pub fn choices(&self) -> Option<&[NodeId]> {
        self.node.choices()
    }

    /// Ids of the hydrated prompts, in offer order.
    pub fn prompt_ids(&self) -> Vec<NodeId> {
        self.prompts.iter().map(|p| p.id).collect()
    }

    /// Check if `id` is among the offered prompts.
    pub fn offers(&self, id: NodeId) -> bool {
        self.prompts.iter().any(|p| p.id == id)
    }
}

/// Result of an interaction.
#[derive(Debug, Clone)]
pub enum Response {
    /// The conversation is in progress.
    Node(RenderedNode),
    /// The conversation has ended.
    Ended,
}

impl Response {
    pub fn is_ended(&self) -> bool {
        matches!(self, Response::Ended)
    }

    pub fn node(&self) -> Option<&RenderedNode> {
        match self {
            Response::Node(rendered) => Some(rendered),
            Response::Ended => None,
        }
    }

    pub fn into_node(self) -> Option<RenderedNode> {
        match self {
            Response::Node(rendered) => Some(rendered),
            Response::Ended => None,
        }
    }

    /// Id of the rendered node, if the conversation is in progress.
    pub fn id(&self) -> Option<NodeId> {
        self.node().map(RenderedNode::id)
    }
}
