//! Named hooks that declarative scripts bind to.

use std::collections::HashMap;

use crate::node::{Condition, Effect};

/// Maps hook names used in scripts to the capabilities they stand for.
#[derive(Debug, Clone, Default)]
pub struct HookRegistry {
    conditions: HashMap<String, Condition>,
    effects: HashMap<String, Effect>,
}

impl HookRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition under `name`, replacing any previous one.
    pub fn register_condition(&mut self, name: impl Into<String>, condition: Condition) {
        self.conditions.insert(name.into(), condition);
    }

    /// Register an effect under `name`, replacing any previous one.
    pub fn register_effect(&mut self, name: impl Into<String>, effect: Effect) {
        self.effects.insert(name.into(), effect);
    }

    /// Builder form of [`register_condition`](Self::register_condition).
    pub fn with_condition(mut self, name: impl Into<String>, condition: Condition) -> Self {
        self.register_condition(name, condition);
        self
    }

    /// Builder form of [`register_effect`](Self::register_effect).
    pub fn with_effect(mut self, name: impl Into<String>, effect: Effect) -> Self {
        self.register_effect(name, effect);
        self
    }

    pub fn condition(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(name)
    }

    pub fn effect(&self, name: &str) -> Option<&Effect> {
        self.effects.get(name)
    }
}
