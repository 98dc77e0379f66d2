//! Per-agent, per-tick evaluation context.

use formic_core::{Intent, TickId};
use formic_plugin::TriggerEvaluator;
use formic_world::{Agent, World};
use rand_chacha::ChaCha8Rng;

/// Transient state for one behavior-tree evaluation.
///
/// Created at the start of an agent's BT phase and destroyed at its end.
/// Nodes append produced intents to [`intents`](Self::intents) in
/// evaluation order; the executor consumes them afterwards.
pub struct TickCtx<'a> {
    /// The agent being ticked.
    pub agent: &'a Agent,
    /// The simulation world (read-only during the BT phase).
    pub world: &'a World,
    /// Evaluator backing condition nodes.
    pub triggers: &'a TriggerEvaluator,
    /// The current global tick.
    pub tick: TickId,
    /// Stack of node labels from the root to the current node.
    pub node_path: Vec<String>,
    /// Intents collected from leaves, in evaluation order.
    pub intents: Vec<Intent>,
    /// The engine's deterministic RNG.
    pub rng: &'a mut ChaCha8Rng,
}

impl<'a> TickCtx<'a> {
    /// Build a context with empty path and intent list.
    pub fn new(
        agent: &'a Agent,
        world: &'a World,
        triggers: &'a TriggerEvaluator,
        tick: TickId,
        rng: &'a mut ChaCha8Rng,
    ) -> Self {
        Self {
            agent,
            world,
            triggers,
            tick,
            node_path: Vec::new(),
            intents: Vec::new(),
            rng,
        }
    }
}
