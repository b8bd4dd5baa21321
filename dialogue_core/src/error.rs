//! Errors reported by the dialogue engine.

use dialogue_rules::{HookError, NodeId, ValidationError};
use thiserror::Error;

/// Errors from dialogue engine operations.
///
/// Every failing operation leaves the store as it was, except that a `post`
/// effect which already ran cannot be undone.
#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("unknown actor '{0}'")]
    UnknownActor(String),

    #[error("node {id} not found for actor '{actor}'")]
    NodeNotFound { actor: String, id: NodeId },

    #[error("node {id} is not offered as a choice by actor '{actor}'")]
    ChoiceNotOffered { actor: String, id: NodeId },

    #[error("invalid dialogue: {0}")]
    Validation(#[from] ValidationError),

    #[error("hook on node {node} failed: {source}")]
    Hook {
        node: NodeId,
        #[source]
        source: HookError,
    },

    #[error("invalid engine config: {0}")]
    Config(#[from] toml::de::Error),
}

impl DialogueError {
    pub(crate) fn not_found(actor: &str, id: NodeId) -> Self {
        DialogueError::NodeNotFound {
            actor: actor.to_string(),
            id,
        }
    }
}
