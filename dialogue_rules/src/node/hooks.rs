//! Hook capabilities supplied by the caller.
//!
//! Hooks are opaque to the engine. A `Condition` gates whether a node may be
//! taken; an `Effect` runs after a node is chosen. Both may read or write game
//! state the engine knows nothing about.

use std::fmt;
use std::sync::Arc;

/// Error raised from inside a hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by hooks.
pub type HookResult<T> = Result<T, HookError>;

/// A zero-argument predicate gating a node.
#[derive(Clone)]
pub struct Condition(Arc<dyn Fn() -> HookResult<bool> + Send + Sync>);

impl Condition {
    /// Wrap an infallible predicate.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(move || Ok(predicate())))
    }

    /// Wrap a predicate that may fail.
    pub fn try_new<F>(predicate: F) -> Self
    where
        F: Fn() -> HookResult<bool> + Send + Sync + 'static,
    {
        Self(Arc::new(predicate))
    }

    /// Evaluate the predicate.
    pub fn evaluate(&self) -> HookResult<bool> {
        (self.0)()
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition(..)")
    }
}

/// A zero-argument side effect run after a node is chosen.
#[derive(Clone)]
pub struct Effect(Arc<dyn Fn() -> HookResult<()> + Send + Sync>);

impl Effect {
    /// Wrap an infallible effect.
    pub fn new<F>(effect: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self(Arc::new(move || {
            effect();
            Ok(())
        }))
    }

    /// Wrap an effect that may fail.
    pub fn try_new<F>(effect: F) -> Self
    where
        F: Fn() -> HookResult<()> + Send + Sync + 'static,
    {
        Self(Arc::new(effect))
    }

    /// Run the effect.
    pub fn run(&self) -> HookResult<()> {
        (self.0)()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Effect(..)")
    }
}
