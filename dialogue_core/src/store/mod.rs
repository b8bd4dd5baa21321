//! Dialogue Store - per-actor node collections and conversation cursors.
//!
//! Each actor key owns exactly one node collection and one
//! [`ConversationState`]. Both are created together on load and dropped
//! together on clear.

mod state;

pub use state::*;

use dialogue_rules::{validate_batch, validate_nodes, DialogueNode, NodeId, ValidationError};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// One actor's node collection and cursor.
#[derive(Debug, Clone)]
pub struct Conversation {
    /// Nodes in load order, appended definitions last.
    nodes: Vec<DialogueNode>,

    /// Index: node id -> position of its effective (last) definition.
    index: HashMap<NodeId, usize>,

    state: ConversationState,
}

impl Conversation {
    /// Build a conversation positioned at the first node.
    ///
    /// Returns `None` for an empty collection.
    fn start(nodes: Vec<DialogueNode>) -> Option<Self> {
        let first = nodes.first()?.id;
        let mut conversation = Self {
            nodes,
            index: HashMap::new(),
            state: ConversationState::starting_at(first),
        };
        conversation.reindex();
        Some(conversation)
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, node) in self.nodes.iter().enumerate() {
            self.index.insert(node.id, position);
        }
    }

    fn append(&mut self, nodes: Vec<DialogueNode>) {
        self.nodes.extend(nodes);
        self.reindex();
    }

    /// All stored definitions in order, including overridden ones.
    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }

    /// Number of distinct node ids.
    pub fn node_count(&self) -> usize {
        self.index.len()
    }

    /// Find a node by id. When an id is defined more than once the last
    /// definition wins.
    pub fn find(&self, id: NodeId) -> Option<&DialogueNode> {
        self.index.get(&id).and_then(|&position| self.nodes.get(position))
    }

    /// Hydrate the choice menu of `node` into full nodes.
    ///
    /// Order follows the collection, not the menu, and only effective
    /// definitions are returned. Nodes without a menu hydrate to nothing.
    pub fn hydrate(&self, node: &DialogueNode) -> Vec<DialogueNode> {
        let Some(choices) = node.choices() else {
            return Vec::new();
        };

        self.nodes
            .iter()
            .enumerate()
            .filter(|(position, candidate)| {
                choices.contains(&candidate.id) && self.index.get(&candidate.id) == Some(position)
            })
            .map(|(_, candidate)| candidate.clone())
            .collect()
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub(crate) fn state_mut(&mut self) -> &mut ConversationState {
        &mut self.state
    }
}

/// Key-value association from actor to conversation.
#[derive(Debug, Clone, Default)]
pub struct DialogueStore {
    conversations: HashMap<String, Conversation>,
}

impl DialogueStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `nodes` and install them for `actor`, replacing any previous
    /// conversation. The cursor starts at the first node.
    ///
    /// Nothing is changed when validation fails.
    pub fn load(
        &mut self,
        actor: impl Into<String>,
        nodes: Vec<DialogueNode>,
    ) -> Result<&Conversation, ValidationError> {
        validate_nodes(&nodes)?;
        let conversation = Conversation::start(nodes).ok_or(ValidationError::EmptyCollection)?;

        let conversation = match self.conversations.entry(actor.into()) {
            Entry::Occupied(mut slot) => {
                slot.insert(conversation);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(conversation),
        };
        Ok(&*conversation)
    }

    /// Append `nodes` to an existing conversation. Later definitions of an
    /// existing id override earlier ones; the cursor is left alone.
    ///
    /// Returns `Ok(None)` when `actor` has no conversation.
    pub fn append(
        &mut self,
        actor: &str,
        nodes: Vec<DialogueNode>,
    ) -> Result<Option<&Conversation>, ValidationError> {
        let Some(conversation) = self.conversations.get_mut(actor) else {
            return Ok(None);
        };

        validate_batch(&nodes, conversation.nodes())?;
        conversation.append(nodes);
        Ok(Some(&*conversation))
    }

    /// Drop the conversation for `actor`, if any.
    pub fn clear(&mut self, actor: &str) -> Option<Conversation> {
        self.conversations.remove(actor)
    }

    pub fn get(&self, actor: &str) -> Option<&Conversation> {
        self.conversations.get(actor)
    }

    pub fn get_mut(&mut self, actor: &str) -> Option<&mut Conversation> {
        self.conversations.get_mut(actor)
    }

    /// Check if `actor` has a loaded conversation.
    pub fn contains(&self, actor: &str) -> bool {
        self.conversations.contains_key(actor)
    }

    /// All actors with a loaded conversation.
    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.conversations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
