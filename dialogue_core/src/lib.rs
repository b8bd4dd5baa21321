//! # Dialogue Core
//!
//! An in-memory branching-dialogue engine. For each actor it keeps one node
//! collection and a single conversation cursor, and advances that cursor in
//! response to player choices while evaluating the prerequisite and
//! post-effect hooks supplied with the nodes.
//!
//! ## Core Components
//!
//! - **store**: per-actor node collections and conversation state
//! - **engine**: the conversation state machine and response rendering
//! - **error**: the engine's error type
//!
//! ## Example
//!
//! ```
//! use dialogue_core::{DialogueEngine, Response};
//! use dialogue_rules::DialogueNode;
//!
//! let mut engine = DialogueEngine::with_defaults();
//! engine
//!     .load_dialogue(
//!         "guard",
//!         vec![
//!             DialogueNode::new(1, "Halt!").with_choices([2]),
//!             DialogueNode::new(2, "I'm just passing through.").with_next(3),
//!             DialogueNode::new(3, "Move along, then.").ending(),
//!         ],
//!     )
//!     .unwrap();
//!
//! let opening = engine.interact_with("guard", None).unwrap();
//! assert_eq!(opening.node().unwrap().prompts.len(), 1);
//!
//! let reply = engine.choose("guard", 2).unwrap();
//! assert_eq!(reply.node().unwrap().message(), "Move along, then.");
//!
//! let farewell = engine.choose("guard", 3).unwrap();
//! assert!(matches!(farewell, Response::Ended));
//! ```

pub mod engine;
pub mod error;
pub mod store;

pub use engine::*;
pub use error::*;
pub use store::*;
