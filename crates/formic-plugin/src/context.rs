//! Execution context handed to step plugins.

use formic_core::TickId;
use formic_world::{Agent, World};
use rand_chacha::ChaCha8Rng;

/// What a step sees when it runs.
///
/// World and agent are shared references, so the borrow checker enforces
/// the purity contract: steps can only *propose* mutations, as intents in
/// their [`StepResult`](crate::StepResult). The RNG is the engine's
/// seeded generator; drawing from it is the only state a step may change.
pub struct StepCtx<'a> {
    /// The agent being ticked.
    pub agent: &'a Agent,
    /// The simulation world (read-only).
    pub world: &'a World,
    /// The current global tick.
    pub tick: TickId,
    /// Deterministic RNG owned by the engine.
    pub rng: &'a mut ChaCha8Rng,
}
