//! Conversation Engine - the dialogue state machine.
//!
//! An interaction with a choice works as follows:
//! 1. **Lookup**: Resolve the chosen node in the actor's collection
//! 2. **Gate**: If its prerequisite fails, move to its fallback and stop
//! 3. **Effect**: Run its `post` effect, if any
//! 4. **Advance**: Stay on it if it is a menu, otherwise move to its `next`
//!    (re-checking that target's prerequisite when chaining is enabled)
//! 5. **Render**: Return the current node with its choices hydrated
//!
//! Every lookup a transition needs is resolved before any hook runs, and the
//! cursor is written only after all hooks have succeeded.

mod config;
mod response;

pub use config::*;
pub use response::*;

use dialogue_rules::{DialogueNode, DialogueScript, HookRegistry, NodeFlow, NodeId};
use tracing::{debug, info};

use crate::error::DialogueError;
use crate::store::{Conversation, DialogueStore, SessionId};

/// Rule that decided a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Chosen node failed its prerequisite.
    Unqualified,
    /// Chosen node is itself a menu.
    Menu,
    Advance,
    /// The `next` target failed its prerequisite.
    ChainedRedirect,
    End,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    to: Option<NodeId>,
    rule: Rule,
}

enum Successor<'a> {
    Menu(NodeId),
    Advance(&'a DialogueNode),
    End,
}

/// Drives conversations for any number of actors.
///
/// All operations are synchronous and run hooks on the calling thread. Calls
/// for one actor must be serialized; to share an engine across threads, wrap
/// it in a mutex held across the whole call. Hooks must not call back into
/// the engine for the actor whose transition is in flight.
#[derive(Debug, Clone, Default)]
pub struct DialogueEngine {
    store: DialogueStore,
    config: EngineConfig,
}

impl DialogueEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            store: DialogueStore::new(),
            config,
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &DialogueStore {
        &self.store
    }

    /// Load `nodes` for `actor`, replacing any previous conversation.
    ///
    /// The conversation starts at the first node. A malformed collection is
    /// rejected as a whole and the store is left untouched.
    pub fn load_dialogue(
        &mut self,
        actor: impl Into<String>,
        nodes: Vec<DialogueNode>,
    ) -> Result<(), DialogueError> {
        let actor = actor.into();
        let conversation = self.store.load(actor.clone(), nodes)?;
        info!(
            actor = %actor,
            session = %conversation.state().session,
            nodes = conversation.node_count(),
            "dialogue loaded"
        );
        Ok(())
    }

    /// Compile `script` against `registry` and load the result for `actor`.
    pub fn load_script(
        &mut self,
        actor: impl Into<String>,
        script: &DialogueScript,
        registry: &HookRegistry,
    ) -> Result<(), DialogueError> {
        let nodes = script.compile(registry)?;
        self.load_dialogue(actor, nodes)
    }

    /// Append `nodes` to the conversation of `actor`. A node whose id is
    /// already present overrides the earlier definition.
    pub fn append_dialogue(
        &mut self,
        actor: &str,
        nodes: Vec<DialogueNode>,
    ) -> Result<(), DialogueError> {
        let conversation = self
            .store
            .append(actor, nodes)?
            .ok_or_else(|| DialogueError::UnknownActor(actor.to_string()))?;
        info!(
            actor = %actor,
            session = %conversation.state().session,
            nodes = conversation.node_count(),
            "dialogue appended"
        );
        Ok(())
    }

    /// Drop the conversation of `actor`. Unknown actors are ignored.
    pub fn clear_dialogue(&mut self, actor: &str) {
        if let Some(conversation) = self.store.clear(actor) {
            info!(actor = %actor, session = %conversation.state().session, "dialogue cleared");
        }
    }

    /// Check if `actor` has a loaded conversation.
    pub fn has_actor(&self, actor: &str) -> bool {
        self.store.contains(actor)
    }

    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.store.actors()
    }

    /// Look up a node of `actor`. The last definition of an id wins.
    pub fn find_node(&self, actor: &str, id: NodeId) -> Result<Option<&DialogueNode>, DialogueError> {
        Ok(self.conversation(actor)?.find(id))
    }

    /// The cursor of `actor`; `None` once the conversation has ended.
    pub fn current_node_id(&self, actor: &str) -> Result<Option<NodeId>, DialogueError> {
        Ok(self.conversation(actor)?.state().current)
    }

    pub fn session(&self, actor: &str) -> Result<SessionId, DialogueError> {
        Ok(self.conversation(actor)?.state().session)
    }

    /// Choose node `choice` in the conversation of `actor`.
    pub fn choose(&mut self, actor: &str, choice: impl Into<NodeId>) -> Result<Response, DialogueError> {
        self.interact_with(actor, Some(choice.into()))
    }

    /// Interact with `actor`.
    ///
    /// Without a choice this renders the current node and changes nothing.
    /// With a choice the cursor is moved first, then the new current node is
    /// rendered.
    pub fn interact_with(
        &mut self,
        actor: &str,
        choice: Option<NodeId>,
    ) -> Result<Response, DialogueError> {
        if let Some(choice) = choice {
            let transition = self.transition(actor, self.conversation(actor)?, choice)?;

            let conversation = self
                .store
                .get_mut(actor)
                .ok_or_else(|| DialogueError::UnknownActor(actor.to_string()))?;
            let from = conversation.state().current;
            conversation.state_mut().advance(transition.to);

            debug!(
                actor = %actor,
                session = %conversation.state().session,
                choice = %choice,
                from = ?from,
                to = ?transition.to,
                rule = ?transition.rule,
                "dialogue transition"
            );
        }

        self.render(actor, self.conversation(actor)?)
    }

    fn conversation(&self, actor: &str) -> Result<&Conversation, DialogueError> {
        self.store
            .get(actor)
            .ok_or_else(|| DialogueError::UnknownActor(actor.to_string()))
    }

    /// Decide where choosing `choice` moves the cursor, running the hooks
    /// involved. Does not touch the store.
    fn transition(
        &self,
        actor: &str,
        conversation: &Conversation,
        choice: NodeId,
    ) -> Result<Transition, DialogueError> {
        let chosen = conversation
            .find(choice)
            .ok_or_else(|| DialogueError::not_found(actor, choice))?;

        if self.config.restrict_to_prompts {
            let offered = match self.render(actor, conversation)? {
                Response::Node(rendered) => rendered.offers(choice),
                Response::Ended => false,
            };
            if !offered {
                return Err(DialogueError::ChoiceNotOffered {
                    actor: actor.to_string(),
                    id: choice,
                });
            }
        }

        if !passes(chosen)? {
            return Ok(Transition {
                to: chosen.fallback(),
                rule: Rule::Unqualified,
            });
        }

        let successor = match &chosen.flow {
            NodeFlow::Choices(ids) if !ids.is_empty() => Successor::Menu(chosen.id),
            NodeFlow::Choices(_) | NodeFlow::Next(None) => Successor::End,
            NodeFlow::Next(Some(next)) => Successor::Advance(
                conversation
                    .find(*next)
                    .ok_or_else(|| DialogueError::not_found(actor, *next))?,
            ),
        };

        if let Some(post) = &chosen.post {
            post.run().map_err(|source| DialogueError::Hook {
                node: chosen.id,
                source,
            })?;
        }

        let transition = match successor {
            Successor::Menu(id) => Transition {
                to: Some(id),
                rule: Rule::Menu,
            },
            Successor::End => Transition {
                to: None,
                rule: Rule::End,
            },
            // The target is checked after `post` so an effect can unlock it.
            Successor::Advance(next) if self.config.chain_prerequisites && !passes(next)? => {
                Transition {
                    to: next.fallback(),
                    rule: Rule::ChainedRedirect,
                }
            }
            Successor::Advance(next) => Transition {
                to: Some(next.id),
                rule: Rule::Advance,
            },
        };

        Ok(transition)
    }

    /// Render the current node. A node failing its prerequisite is shown as
    /// its fallback; the cursor does not move.
    fn render(&self, actor: &str, conversation: &Conversation) -> Result<Response, DialogueError> {
        let Some(current_id) = conversation.state().current else {
            return Ok(Response::Ended);
        };

        let current = conversation
            .find(current_id)
            .ok_or_else(|| DialogueError::not_found(actor, current_id))?;

        let (shown, redirected_from) = match current.fallback() {
            Some(fallback) if !passes(current)? => {
                let shown = conversation
                    .find(fallback)
                    .ok_or_else(|| DialogueError::not_found(actor, fallback))?;
                (shown, Some(current.id))
            }
            _ => (current, None),
        };

        Ok(Response::Node(RenderedNode {
            node: shown.clone(),
            prompts: conversation.hydrate(shown),
            redirected_from,
        }))
    }
}

fn passes(node: &DialogueNode) -> Result<bool, DialogueError> {
    node.passes_prerequisite()
        .map_err(|source| DialogueError::Hook {
            node: node.id,
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dialogue_rules::{Condition, Effect};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter_effect(counter: &Arc<AtomicUsize>) -> Effect {
        let counter = Arc::clone(counter);
        Effect::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn flag_condition(flag: &Arc<AtomicBool>) -> Condition {
        let flag = Arc::clone(flag);
        Condition::new(move || flag.load(Ordering::SeqCst))
    }

    #[test]
    fn test_unknown_actor() {
        let mut engine = DialogueEngine::with_defaults();

        let err = engine.interact_with("nope", None).unwrap_err();
        assert!(matches!(err, DialogueError::UnknownActor(ref actor) if actor == "nope"));
        assert!(engine.current_node_id("nope").is_err());

        engine.clear_dialogue("nope");
    }

    #[test]
    fn test_load_rejects_malformed_collection() {
        let mut engine = DialogueEngine::with_defaults();

        let err = engine
            .load_dialogue("x", vec![DialogueNode::new(1, "Hi").with_choices([2])])
            .unwrap_err();
        assert!(matches!(err, DialogueError::Validation(_)));
        assert!(!engine.has_actor("x"));

        assert!(engine.load_dialogue("x", Vec::new()).is_err());
    }

    #[test]
    fn test_choice_not_found_leaves_state() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue("x", vec![DialogueNode::new(1, "Hi").with_choices([2]), DialogueNode::new(2, "Bye")])
            .unwrap();

        let err = engine.choose("x", 77).unwrap_err();
        assert!(matches!(err, DialogueError::NodeNotFound { id: NodeId(77), .. }));
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(1)));
    }

    #[test]
    fn test_choosing_a_menu_node_moves_to_it() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "What do you need?").with_choices([2, 4]),
                    DialogueNode::new(2, "Tell me about the town.").with_choices([3, 4]),
                    DialogueNode::new(3, "The mill burned down.").ending(),
                    DialogueNode::new(4, "Nothing.").ending(),
                ],
            )
            .unwrap();

        let response = engine.choose("x", 2).unwrap();
        assert_eq!(response.id(), Some(NodeId(2)));
        assert_eq!(response.node().unwrap().prompt_ids(), vec![NodeId(3), NodeId(4)]);
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(2)));
    }

    #[test]
    fn test_choosing_empty_menu_ends() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Well?").with_choices([2]),
                    DialogueNode::new(2, "...").with_choices(Vec::<i64>::new()),
                ],
            )
            .unwrap();

        assert!(engine.choose("x", 2).unwrap().is_ended());
        assert_eq!(engine.current_node_id("x").unwrap(), None);
    }

    #[test]
    fn test_unqualified_choice_redirects_without_post() {
        let posts = Arc::new(AtomicUsize::new(0));
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "thug",
                vec![
                    DialogueNode::new(1, "I ain't talking to you").with_choices([8]),
                    DialogueNode::new(8, "Who do you work for!?")
                        .with_prerequisite(Condition::new(|| false), 9)
                        .with_post(counter_effect(&posts))
                        .with_next(10),
                    DialogueNode::new(9, "I won't tell you nothin!").ending(),
                    DialogueNode::new(10, "Da Big Boss, now leggo my arm!").ending(),
                ],
            )
            .unwrap();

        let response = engine.choose("thug", 8).unwrap();

        assert_eq!(response.id(), Some(NodeId(9)));
        assert_eq!(posts.load(Ordering::SeqCst), 0);
        assert_eq!(engine.current_node_id("thug").unwrap(), Some(NodeId(9)));
    }

    fn gated_successor_nodes(unlocked: &Arc<AtomicBool>) -> Vec<DialogueNode> {
        vec![
            DialogueNode::new(1, "Ready?").with_choices([2]),
            DialogueNode::new(2, "Let's go.").with_next(3),
            DialogueNode::new(3, "The gate opens.")
                .with_prerequisite(flag_condition(unlocked), 4)
                .with_choices([5]),
            DialogueNode::new(4, "The gate is locked.").ending(),
            DialogueNode::new(5, "Onward.").ending(),
        ]
    }

    #[test]
    fn test_chained_prerequisite_redirects_cursor() {
        let unlocked = Arc::new(AtomicBool::new(false));
        let mut engine = DialogueEngine::with_defaults();
        engine.load_dialogue("gate", gated_successor_nodes(&unlocked)).unwrap();

        let response = engine.choose("gate", 2).unwrap();

        assert_eq!(response.id(), Some(NodeId(4)));
        assert!(response.node().unwrap().redirected_from.is_none());
        assert_eq!(engine.current_node_id("gate").unwrap(), Some(NodeId(4)));
    }

    #[test]
    fn test_unchained_prerequisite_redirects_at_render() {
        let unlocked = Arc::new(AtomicBool::new(false));
        let config = EngineConfig {
            chain_prerequisites: false,
            ..EngineConfig::default()
        };
        let mut engine = DialogueEngine::new(config);
        engine.load_dialogue("gate", gated_successor_nodes(&unlocked)).unwrap();

        let response = engine.choose("gate", 2).unwrap();
        let rendered = response.node().unwrap();

        assert_eq!(rendered.id(), NodeId(4));
        assert_eq!(rendered.redirected_from, Some(NodeId(3)));
        assert!(rendered.prompts.is_empty());
        assert_eq!(engine.current_node_id("gate").unwrap(), Some(NodeId(3)));

        // Once unlocked, the same cursor renders the gated node itself.
        unlocked.store(true, Ordering::SeqCst);
        let response = engine.interact_with("gate", None).unwrap();
        assert_eq!(response.id(), Some(NodeId(3)));
        assert_eq!(response.node().unwrap().prompt_ids(), vec![NodeId(5)]);
    }

    #[test]
    fn test_post_runs_before_successor_check() {
        let unlocked = Arc::new(AtomicBool::new(false));
        let unlock = {
            let unlocked = Arc::clone(&unlocked);
            Effect::new(move || unlocked.store(true, Ordering::SeqCst))
        };
        let mut nodes = gated_successor_nodes(&unlocked);
        nodes[1] = DialogueNode::new(2, "Use the key.").with_post(unlock).with_next(3);

        let mut engine = DialogueEngine::with_defaults();
        engine.load_dialogue("gate", nodes).unwrap();

        let response = engine.choose("gate", 2).unwrap();
        assert_eq!(response.id(), Some(NodeId(3)));
    }

    #[test]
    fn test_failing_post_leaves_cursor() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Pay up.").with_choices([2]),
                    DialogueNode::new(2, "Here's the gold.")
                        .with_post(Effect::try_new(|| Err("not enough gold".into())))
                        .with_next(3),
                    DialogueNode::new(3, "Pleasure doing business.").ending(),
                ],
            )
            .unwrap();

        let err = engine.choose("x", 2).unwrap_err();

        assert!(matches!(err, DialogueError::Hook { node: NodeId(2), .. }));
        assert_eq!(err.to_string(), "hook on node 2 failed: not enough gold");
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(1)));
        assert_eq!(engine.store().get("x").unwrap().state().turns, 0);
    }

    #[test]
    fn test_failing_prerequisite_hook_propagates() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Hm?").with_choices([2]),
                    DialogueNode::new(2, "Ask about the ledger.")
                        .with_prerequisite(Condition::try_new(|| Err("ledger missing".into())), 1),
                ],
            )
            .unwrap();

        assert!(matches!(
            engine.choose("x", 2).unwrap_err(),
            DialogueError::Hook { node: NodeId(2), .. }
        ));
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(1)));
    }

    #[test]
    fn test_restrict_to_prompts() {
        let config = EngineConfig {
            restrict_to_prompts: true,
            ..EngineConfig::default()
        };
        let mut engine = DialogueEngine::new(config);
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Quest?").with_choices([2]),
                    DialogueNode::new(2, "Yes").with_next(3),
                    DialogueNode::new(3, "Bye").ending(),
                ],
            )
            .unwrap();

        let err = engine.choose("x", 3).unwrap_err();
        assert!(matches!(err, DialogueError::ChoiceNotOffered { id: NodeId(3), .. }));
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(1)));

        assert_eq!(engine.choose("x", 2).unwrap().id(), Some(NodeId(3)));
    }

    #[test]
    fn test_append_override_changes_rendering() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Quest?").with_choices([2]),
                    DialogueNode::new(2, "Yes").with_next(3),
                    DialogueNode::new(3, "Bye").ending(),
                ],
            )
            .unwrap();
        let session = engine.session("x").unwrap();

        engine
            .append_dialogue("x", vec![DialogueNode::new(3, "Come back soon!").ending()])
            .unwrap();

        assert_eq!(engine.session("x").unwrap(), session);
        let response = engine.choose("x", 2).unwrap();
        assert_eq!(response.node().unwrap().message(), "Come back soon!");
        assert_eq!(
            engine.find_node("x", NodeId(3)).unwrap().unwrap().message,
            "Come back soon!"
        );

        assert!(matches!(
            engine.append_dialogue("y", vec![DialogueNode::new(1, "Hi")]),
            Err(DialogueError::UnknownActor(_))
        ));
    }

    #[test]
    fn test_turns_are_counted() {
        let mut engine = DialogueEngine::with_defaults();
        engine
            .load_dialogue(
                "x",
                vec![
                    DialogueNode::new(1, "Again?").with_choices([2]),
                    DialogueNode::new(2, "Again.").with_next(1),
                ],
            )
            .unwrap();

        engine.choose("x", 2).unwrap();
        engine.choose("x", 2).unwrap();
        engine.interact_with("x", None).unwrap();

        assert_eq!(engine.store().get("x").unwrap().state().turns, 2);
        assert_eq!(engine.current_node_id("x").unwrap(), Some(NodeId(1)));
    }

    #[test]
    fn test_load_script() {
        let script = DialogueScript::from_toml_str(
            r#"
            [[nodes]]
            id = 1
            message = "Rest here?"
            choices = [2]

            [[nodes]]
            id = 2
            message = "Yes, one night."
            post = "pay_innkeeper"
            "#,
        )
        .unwrap();
        let paid = Arc::new(AtomicUsize::new(0));
        let registry = HookRegistry::new().with_effect("pay_innkeeper", counter_effect(&paid));

        let mut engine = DialogueEngine::with_defaults();
        engine.load_script("innkeeper", &script, &registry).unwrap();

        assert!(engine.choose("innkeeper", 2).unwrap().is_ended());
        assert_eq!(paid.load(Ordering::SeqCst), 1);

        let err = engine
            .load_script("innkeeper", &script, &HookRegistry::new())
            .unwrap_err();
        assert!(matches!(err, DialogueError::Validation(_)));
        // The failed reload kept the ended conversation.
        assert!(engine.has_actor("innkeeper"));
        assert_eq!(engine.current_node_id("innkeeper").unwrap(), None);
    }
}
