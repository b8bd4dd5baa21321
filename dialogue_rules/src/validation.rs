//! Load-time validation of node collections.

use std::collections::HashSet;
use thiserror::Error;

use crate::node::{DialogueNode, NodeId};

/// Reasons a node collection is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("dialogue collection is empty")]
    EmptyCollection,

    #[error("node {0} is defined more than once in the same batch")]
    DuplicateNodeId(NodeId),

    #[error("node {node} refers to unknown node {target}")]
    UnknownReference { node: NodeId, target: NodeId },

    #[error("node {0} declares both choices and next")]
    ConflictingFlow(NodeId),

    #[error("node {0} has a prerequisite but no pre_id")]
    MissingFallback(NodeId),

    #[error("node {0} has a pre_id but no prerequisite")]
    OrphanFallback(NodeId),

    #[error("node {node} uses unregistered hook '{hook}'")]
    UnknownHook { node: NodeId, hook: String },
}

impl ValidationError {
    /// The node the error is about, if any.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            ValidationError::EmptyCollection => None,
            ValidationError::DuplicateNodeId(id)
            | ValidationError::ConflictingFlow(id)
            | ValidationError::MissingFallback(id)
            | ValidationError::OrphanFallback(id) => Some(*id),
            ValidationError::UnknownReference { node, .. }
            | ValidationError::UnknownHook { node, .. } => Some(*node),
        }
    }
}

/// Validate a batch of nodes that will form a collection on its own.
pub fn validate_nodes(nodes: &[DialogueNode]) -> Result<(), ValidationError> {
    validate_batch(nodes, &[])
}

/// Validate a batch of nodes appended to an existing collection.
///
/// Ids must be unique within `batch` but may repeat ids from `existing`;
/// references may point into either.
pub fn validate_batch(
    batch: &[DialogueNode],
    existing: &[DialogueNode],
) -> Result<(), ValidationError> {
    if batch.is_empty() {
        return Err(ValidationError::EmptyCollection);
    }

    let mut batch_ids = HashSet::with_capacity(batch.len());
    for node in batch {
        if !batch_ids.insert(node.id) {
            return Err(ValidationError::DuplicateNodeId(node.id));
        }
    }

    let known: HashSet<NodeId> = existing.iter().map(|n| n.id).chain(batch_ids).collect();

    for node in batch {
        if let Some(target) = node.references().into_iter().find(|t| !known.contains(t)) {
            return Err(ValidationError::UnknownReference {
                node: node.id,
                target,
            });
        }
    }

    Ok(())
}
