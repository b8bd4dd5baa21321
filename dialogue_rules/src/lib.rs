//! # Dialogue Rules
//!
//! The data model for branching dialogue: node identifiers, dialogue nodes,
//! their flow (a choice menu or a direct successor), and the hook
//! capabilities that gate and follow a node. This crate holds no conversation
//! state; it defines what a well-formed node collection is.
//!
//! ## Core Components
//!
//! - **node**: `NodeId`, `DialogueNode`, `NodeFlow`, and the `Condition`/`Effect` hooks
//! - **validation**: collection-level checks run before a collection is accepted
//! - **script**: declarative node definitions (TOML/JSON) bound to hooks by name

pub mod node;
pub mod script;
pub mod validation;

pub use node::*;
pub use script::*;
pub use validation::*;
