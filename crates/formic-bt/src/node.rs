//! Executable tree nodes.

use crate::ctx::TickCtx;
use crate::status::Status;
use formic_plugin::{Logic, Params, Step, StepCtx, StepResult, TriggerRef};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A behavior-tree node.
///
/// Children are owned exclusively by their parent, forming an acyclic
/// tree. Step leaves hold their plugin resolved at build time, so
/// evaluation never touches the registry.
pub enum Node {
    /// Evaluate children in order; first non-`Success` short-circuits.
    Sequence {
        /// Trace label.
        name: String,
        /// Child nodes, evaluated left to right.
        children: Vec<Node>,
    },
    /// Evaluate children in order; first non-`Failure` short-circuits.
    Selector {
        /// Trace label.
        name: String,
        /// Child nodes, evaluated left to right.
        children: Vec<Node>,
    },
    /// Gate on a set of triggers; produces no intents.
    Condition {
        /// Trace label.
        name: String,
        /// Triggers with their parameters.
        triggers: Vec<TriggerRef>,
        /// AND/OR combination.
        logic: Logic,
    },
    /// Invoke a step plugin and collect its intents.
    StepLeaf {
        /// Trace label.
        name: String,
        /// Registered plugin name, kept for tracing.
        step_name: String,
        /// The resolved plugin.
        step: Arc<dyn Step>,
        /// Node parameters forwarded to the plugin.
        params: Params,
    },
}

impl Node {
    /// Convenience constructor for a sequence.
    pub fn sequence(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Sequence {
            name: name.into(),
            children,
        }
    }

    /// Convenience constructor for a selector.
    pub fn selector(name: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Selector {
            name: name.into(),
            children,
        }
    }

    /// Convenience constructor for a condition.
    pub fn condition(name: impl Into<String>, triggers: Vec<TriggerRef>, logic: Logic) -> Self {
        Node::Condition {
            name: name.into(),
            triggers,
            logic,
        }
    }

    /// Convenience constructor for a step leaf.
    pub fn step(
        name: impl Into<String>,
        step_name: impl Into<String>,
        step: Arc<dyn Step>,
        params: Params,
    ) -> Self {
        Node::StepLeaf {
            name: name.into(),
            step_name: step_name.into(),
            step,
            params,
        }
    }

    /// The node's trace label.
    pub fn name(&self) -> &str {
        match self {
            Node::Sequence { name, .. }
            | Node::Selector { name, .. }
            | Node::Condition { name, .. }
            | Node::StepLeaf { name, .. } => name,
        }
    }

    /// Recursively evaluate this node.
    ///
    /// Intents from successful or running leaves accumulate in
    /// `ctx.intents` in evaluation order; a failing leaf contributes
    /// nothing.
    pub fn tick(&self, ctx: &mut TickCtx<'_>) -> Status {
        match self {
            Node::Sequence { name, children } => {
                for (i, child) in children.iter().enumerate() {
                    ctx.node_path.push(format!("{name}[{i}]"));
                    let result = child.tick(ctx);
                    ctx.node_path.pop();
                    if result != Status::Success {
                        debug!(node = %name, child = i, %result, "sequence short-circuit");
                        return result;
                    }
                }
                Status::Success
            }
            Node::Selector { name, children } => {
                for (i, child) in children.iter().enumerate() {
                    ctx.node_path.push(format!("{name}[{i}]"));
                    let result = child.tick(ctx);
                    ctx.node_path.pop();
                    if result != Status::Failure {
                        debug!(node = %name, child = i, %result, "selector short-circuit");
                        return result;
                    }
                }
                Status::Failure
            }
            Node::Condition {
                name,
                triggers,
                logic,
            } => {
                let (passed, details) =
                    ctx.triggers
                        .evaluate_many(triggers, &ctx.agent.blackboard, *logic);
                debug!(node = %name, %logic, passed, ?details, "condition gate");
                if passed {
                    Status::Success
                } else {
                    Status::Failure
                }
            }
            Node::StepLeaf {
                name,
                step_name,
                step,
                params,
            } => {
                let result = {
                    let mut step_ctx = StepCtx {
                        agent: ctx.agent,
                        world: ctx.world,
                        tick: ctx.tick,
                        rng: &mut *ctx.rng,
                    };
                    step.call(&mut step_ctx, params)
                };
                let status = match result {
                    StepResult::Success(intents) => {
                        ctx.intents.extend(intents);
                        Status::Success
                    }
                    StepResult::Running(intents) => {
                        ctx.intents.extend(intents);
                        Status::Running
                    }
                    StepResult::Failure => Status::Failure,
                };
                debug!(node = %name, step = %step_name, %status, "step leaf");
                status
            }
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Sequence { name, children } => f
                .debug_struct("Sequence")
                .field("name", name)
                .field("children", children)
                .finish(),
            Node::Selector { name, children } => f
                .debug_struct("Selector")
                .field("name", name)
                .field("children", children)
                .finish(),
            Node::Condition {
                name,
                triggers,
                logic,
            } => f
                .debug_struct("Condition")
                .field("name", name)
                .field("triggers", triggers)
                .field("logic", logic)
                .finish(),
            Node::StepLeaf {
                name, step_name, ..
            } => f
                .debug_struct("StepLeaf")
                .field("name", name)
                .field("step", step_name)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_core::{GridPos, Intent, TickId};
    use formic_field::PheromoneField;
    use formic_plugin::{PluginManifest, PluginRegistry, TriggerEvaluator};
    use formic_world::{Agent, WorkerConfig, World};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Fixed(StepResult);
    impl Step for Fixed {
        fn call(&self, _ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
            self.0.clone()
        }
    }

    struct FlagTrigger;
    impl formic_plugin::Trigger for FlagTrigger {
        fn eval(&self, bb: &formic_core::Blackboard, _params: &Params) -> bool {
            bb.get_bool("flag", false)
        }
    }

    fn fixture() -> (World, TriggerEvaluator) {
        let field = PheromoneField::new(6, 6, &["trail"], 0.0, 0.1, true).unwrap();
        let mut world = World::new(6, 6, field).unwrap();
        let id = world.next_id();
        let mut agent = Agent::worker(id, GridPos::new(2, 2), &WorkerConfig::default());
        agent.blackboard.set("flag", true);
        agent.blackboard.commit();
        world.insert_agent(agent).unwrap();

        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").trigger("flag", FlagTrigger))
            .unwrap();
        (world, TriggerEvaluator::new(&reg))
    }

    fn leaf(result: StepResult) -> Node {
        Node::step("leaf", "fixed", Arc::new(Fixed(result)), Params::new())
    }

    fn run(root: &Node, world: &World, triggers: &TriggerEvaluator) -> (Status, Vec<Intent>) {
        let agent = world.agents().next().unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut ctx = TickCtx::new(agent, world, triggers, TickId(1), &mut rng);
        let status = root.tick(&mut ctx);
        (status, ctx.intents)
    }

    #[test]
    fn sequence_stops_at_first_failure() {
        let (world, triggers) = fixture();
        let root = Node::sequence(
            "root",
            vec![
                leaf(StepResult::success_with([Intent::move_by(1, 0)])),
                leaf(StepResult::Failure),
                leaf(StepResult::success_with([Intent::move_by(0, 1)])),
            ],
        );
        let (status, intents) = run(&root, &world, &triggers);
        assert_eq!(status, Status::Failure);
        // Only the first leaf ran; the third never contributed.
        assert_eq!(intents, vec![Intent::move_by(1, 0)]);
    }

    #[test]
    fn sequence_propagates_running() {
        let (world, triggers) = fixture();
        let root = Node::sequence(
            "root",
            vec![leaf(StepResult::running()), leaf(StepResult::success())],
        );
        assert_eq!(run(&root, &world, &triggers).0, Status::Running);
    }

    #[test]
    fn selector_stops_at_first_non_failure() {
        let (world, triggers) = fixture();
        let root = Node::selector(
            "root",
            vec![
                leaf(StepResult::Failure),
                leaf(StepResult::success_with([Intent::collect_food(5)])),
                leaf(StepResult::success_with([Intent::move_by(1, 1)])),
            ],
        );
        let (status, intents) = run(&root, &world, &triggers);
        assert_eq!(status, Status::Success);
        assert_eq!(intents, vec![Intent::collect_food(5)]);
    }

    #[test]
    fn empty_composites_return_identity() {
        let (world, triggers) = fixture();
        assert_eq!(
            run(&Node::sequence("s", vec![]), &world, &triggers).0,
            Status::Success
        );
        assert_eq!(
            run(&Node::selector("s", vec![]), &world, &triggers).0,
            Status::Failure
        );
    }

    #[test]
    fn condition_gates_on_blackboard() {
        let (world, triggers) = fixture();
        let pass = Node::condition("gate", vec![TriggerRef::named("flag")], Logic::And);
        assert_eq!(run(&pass, &world, &triggers).0, Status::Success);

        let fail = Node::condition(
            "gate",
            vec![TriggerRef::named("flag"), TriggerRef::named("missing")],
            Logic::And,
        );
        assert_eq!(run(&fail, &world, &triggers).0, Status::Failure);

        let rescue = Node::condition(
            "gate",
            vec![TriggerRef::named("flag"), TriggerRef::named("missing")],
            Logic::Or,
        );
        assert_eq!(run(&rescue, &world, &triggers).0, Status::Success);
    }

    #[test]
    fn intents_accumulate_in_evaluation_order() {
        let (world, triggers) = fixture();
        let root = Node::sequence(
            "root",
            vec![
                leaf(StepResult::running_with([Intent::deposit("trail", 1)])),
                leaf(StepResult::success()),
            ],
        );
        // Running from the first child short-circuits the sequence, so
        // only its intent is collected.
        let (status, intents) = run(&root, &world, &triggers);
        assert_eq!(status, Status::Running);
        assert_eq!(intents, vec![Intent::deposit("trail", 1)]);

        let root = Node::selector(
            "root",
            vec![
                leaf(StepResult::Failure),
                leaf(StepResult::success_with([
                    Intent::move_by(1, 0),
                    Intent::deposit("trail", 2),
                ])),
            ],
        );
        let (_, intents) = run(&root, &world, &triggers);
        assert_eq!(
            intents,
            vec![Intent::move_by(1, 0), Intent::deposit("trail", 2)]
        );
    }

    #[test]
    fn evaluation_leaves_world_and_blackboard_untouched() {
        let (world, triggers) = fixture();
        let root = Node::sequence(
            "root",
            vec![
                Node::condition("gate", vec![TriggerRef::named("flag")], Logic::And),
                leaf(StepResult::success_with([Intent::move_by(1, 0)])),
            ],
        );
        let (status, _) = run(&root, &world, &triggers);
        assert_eq!(status, Status::Success);

        let agent = world.agents().next().unwrap();
        assert_eq!(agent.position(), GridPos::new(2, 2));
        assert!(!agent.blackboard.is_dirty());
    }
}
