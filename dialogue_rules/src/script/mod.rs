//! Declarative dialogue scripts.
//!
//! A script is a list of node definitions in TOML or JSON. Hooks are named
//! rather than embedded, and are bound through a [`HookRegistry`] when the
//! script is compiled into [`DialogueNode`]s:
//!
//! ```toml
//! [[nodes]]
//! id = 1
//! message = "Would you like to take my quest?"
//! choices = [2, 3]
//!
//! [[nodes]]
//! id = 2
//! message = "Sure, I'll take it."
//! post = "take_quest"
//! next = 4
//! ```

mod registry;

pub use registry::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{DialogueNode, NodeFlow, NodeId, Prerequisite};
use crate::validation::{validate_nodes, ValidationError};

/// Errors from reading or compiling a script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid script: {0}")]
    Invalid(#[from] ValidationError),
}

/// A node as written in a script.
///
/// A definition without `choices` or `next` is a conversation-ending node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDefinition {
    pub id: NodeId,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<NodeId>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NodeId>,

    /// Name of a registered condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre: Option<String>,

    #[serde(default, alias = "preId", skip_serializing_if = "Option::is_none")]
    pub pre_id: Option<NodeId>,

    /// Name of a registered effect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<String>,
}

impl NodeDefinition {
    /// Bind hooks and build the typed node.
    pub fn compile(&self, registry: &HookRegistry) -> Result<DialogueNode, ValidationError> {
        let flow = match (&self.choices, self.next) {
            (Some(_), Some(_)) => return Err(ValidationError::ConflictingFlow(self.id)),
            (Some(choices), None) => NodeFlow::Choices(choices.clone()),
            (None, next) => NodeFlow::Next(next),
        };

        let prerequisite = match (&self.pre, self.pre_id) {
            (Some(name), Some(fallback)) => Some(Prerequisite {
                condition: registry
                    .condition(name)
                    .cloned()
                    .ok_or_else(|| self.unknown_hook(name))?,
                fallback,
            }),
            (Some(_), None) => return Err(ValidationError::MissingFallback(self.id)),
            (None, Some(_)) => return Err(ValidationError::OrphanFallback(self.id)),
            (None, None) => None,
        };

        let post = match &self.post {
            Some(name) => Some(
                registry
                    .effect(name)
                    .cloned()
                    .ok_or_else(|| self.unknown_hook(name))?,
            ),
            None => None,
        };

        Ok(DialogueNode {
            id: self.id,
            message: self.message.clone(),
            flow,
            prerequisite,
            post,
        })
    }

    fn unknown_hook(&self, name: &str) -> ValidationError {
        ValidationError::UnknownHook {
            node: self.id,
            hook: name.to_string(),
        }
    }
}

/// An ordered list of node definitions for one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueScript {
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,
}

impl DialogueScript {
    /// Parse a script from TOML (`[[nodes]]` tables).
    pub fn from_toml_str(source: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(source)?)
    }

    /// Parse a script from JSON (`{"nodes": [...]}`).
    pub fn from_json_str(source: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Compile every definition and validate the resulting collection.
    pub fn compile(&self, registry: &HookRegistry) -> Result<Vec<DialogueNode>, ValidationError> {
        let nodes = self
            .nodes
            .iter()
            .map(|def| def.compile(registry))
            .collect::<Result<Vec<_>, _>>()?;
        validate_nodes(&nodes)?;
        Ok(nodes)
    }
}
