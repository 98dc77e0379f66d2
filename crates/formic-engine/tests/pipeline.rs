//! End-to-end tick pipeline tests: ordering, lifecycle, determinism.

use formic_core::{keys, GridPos, Intent, Value, ValueMap};
use formic_engine::{Simulation, SimulationConfig, TickEngine};
use formic_plugin::{
    Params, PluginManifest, PluginRegistry, Sensor, SensorError, Step, StepCtx, StepResult,
};
use formic_world::{Agent, AgentKind, BroodConfig, QueenConfig, WorkerConfig, World};
use formic_test_utils::{flat_world, spawn_worker, ScriptedStep};
use rand::Rng;
use serde_json::json;

/// Step that wanders one cell in a random direction each tick.
struct RandomWalk;
impl Step for RandomWalk {
    fn call(&self, ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        let dirs = ctx.agent.position().neighbours8();
        let choice = dirs[ctx.rng.gen_range(0..dirs.len())];
        StepResult::running_with([Intent::move_to(choice)])
    }
}

/// Step that lays one unit of trail at the agent's cell every tick.
struct LayTrail;
impl Step for LayTrail {
    fn call(&self, _ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        StepResult::running_with([Intent::deposit("trail", 1)])
    }
}

/// Sensor mirroring the agent's x coordinate, to observe pipeline phases.
struct EchoX;
impl Sensor for EchoX {
    fn sense(&self, agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
        let mut out = ValueMap::new();
        out.insert("seen_x".into(), json!(agent.position().x));
        Ok(out)
    }
}

fn engine_with(registry: &PluginRegistry, tree_step: &str, seed: u64) -> TickEngine {
    let spec = serde_json::from_value(json!({
        "type": "step", "step": {"name": tree_step},
    }))
    .unwrap();
    let tree = formic_bt::TreeBuilder::new(registry).build(&spec).unwrap();
    TickEngine::new(
        registry,
        tree,
        None,
        Default::default(),
        BroodConfig::default(),
        WorkerConfig::default(),
        seed,
    )
}

#[test]
fn post_sensors_observe_executor_mutations() {
    let mut registry = PluginRegistry::new();
    registry
        .install(
            PluginManifest::new("test")
                .step(
                    "step_east",
                    ScriptedStep::fixed(StepResult::running_with([Intent::move_by(1, 0)])),
                )
                .sensor("echo_x", EchoX),
        )
        .unwrap();
    let mut engine = engine_with(&registry, "step_east", 0);
    let mut world = flat_world(6);
    let id = spawn_worker(&mut world, 1, 1);

    let report = engine.execute_tick(&mut world).unwrap();
    assert_eq!(report.agents.len(), 1);
    assert_eq!(report.executed_count(), 1);

    let agent = world.agent(id).unwrap();
    assert_eq!(agent.position(), GridPos::new(2, 1));
    // The post-sensor phase saw the post-move position.
    assert_eq!(agent.blackboard.get_i64("seen_x", -1), 2);
    assert!(agent.blackboard.get_bool(keys::HAS_MOVED, false));
}

#[test]
fn reset_phase_clears_the_execution_log_each_tick() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "step_east",
            ScriptedStep::fixed(StepResult::running_with([Intent::move_by(1, 0)])),
        ))
        .unwrap();
    let mut engine = engine_with(&registry, "step_east", 0);
    let mut world = flat_world(8);
    let id = spawn_worker(&mut world, 1, 1);

    for _ in 0..3 {
        engine.execute_tick(&mut world).unwrap();
        let log = world
            .agent(id)
            .unwrap()
            .blackboard
            .get(keys::INTENTS_EXECUTED)
            .and_then(Value::as_array)
            .cloned()
            .unwrap();
        // One entry per tick: the log resets instead of accumulating.
        assert_eq!(log.len(), 1);
    }
}

#[test]
fn pheromone_advance_happens_once_after_all_agents() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step("lay_trail", LayTrail))
        .unwrap();
    let mut engine = engine_with(&registry, "lay_trail", 0);
    let mut world = flat_world(5);
    spawn_worker(&mut world, 1, 1);
    spawn_worker(&mut world, 3, 3);

    let report = engine.execute_tick(&mut world).unwrap();
    let summary = &report.pheromones["trail"];
    assert_eq!(summary.mass_before, 0.0);
    assert_eq!(summary.deposited, 2.0);
    // Both deposits published together by the single end-of-tick swap.
    assert_eq!(world.field().value_at("trail", GridPos::new(1, 1)), 1.0);
    assert_eq!(world.field().value_at("trail", GridPos::new(3, 3)), 1.0);
}

#[test]
fn moves_of_earlier_agents_are_visible_to_later_agents() {
    // Both workers try to enter (2, 1): the first (insertion order)
    // wins, the second is blocked in the same tick.
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "step_to_2_1",
            ScriptedStep::fixed(StepResult::running_with([Intent::move_to(GridPos::new(
                2, 1,
            ))])),
        ))
        .unwrap();
    let mut engine = engine_with(&registry, "step_to_2_1", 0);
    let mut world = flat_world(6);
    let first = spawn_worker(&mut world, 1, 1);
    let second = spawn_worker(&mut world, 2, 2);

    let report = engine.execute_tick(&mut world).unwrap();
    assert_eq!(world.agent(first).unwrap().position(), GridPos::new(2, 1));
    assert_eq!(world.agent(second).unwrap().position(), GridPos::new(2, 2));
    let second_report = &report.agents[1].report;
    assert!(second_report.rejected_with(formic_core::RejectReason::Blocked));
}

#[test]
fn starved_brood_is_removed_at_end_of_tick() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "idle",
            ScriptedStep::fixed(StepResult::success()),
        ))
        .unwrap();
    let mut engine = engine_with(&registry, "idle", 0);
    let mut world = flat_world(6);
    let id = world.next_id();
    let doomed = BroodConfig {
        initial_energy: 1,
        initial_stomach: 0,
        energy_loss_rate: 2,
        ..BroodConfig::default()
    };
    world
        .insert_agent(Agent::brood(id, GridPos::new(2, 2), &doomed))
        .unwrap();

    let report = engine.execute_tick(&mut world).unwrap();
    assert_eq!(report.deaths, vec![id]);
    assert!(world.agent(id).is_none());
    assert!(world.is_free(GridPos::new(2, 2)));
}

#[test]
fn queen_lays_eggs_that_mature_into_workers() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "idle",
            ScriptedStep::fixed(StepResult::success()),
        ))
        .unwrap();

    let spec = serde_json::from_value(json!({
        "type": "step", "step": {"name": "idle"},
    }))
    .unwrap();
    let tree = formic_bt::TreeBuilder::new(&registry).build(&spec).unwrap();
    // Brood that never starves and matures three ticks after birth.
    let brood_cfg = BroodConfig {
        initial_energy: 100,
        max_energy: 100,
        energy_loss_rate: 0,
        maturation_time: 3,
        ..BroodConfig::default()
    };
    let mut engine = TickEngine::new(
        &registry,
        tree,
        None,
        Default::default(),
        brood_cfg,
        WorkerConfig::default(),
        7,
    );

    let mut world = flat_world(9);
    let queen_id = world.next_id();
    world
        .insert_agent(Agent::queen(
            queen_id,
            GridPos::new(4, 4),
            &QueenConfig {
                egg_laying_interval: 5,
                ..QueenConfig::default()
            },
        ))
        .unwrap();

    let mut brood_born = None;
    let mut worker_born = None;
    for _ in 0..12 {
        let report = engine.execute_tick(&mut world).unwrap();
        if let Some(&b) = report.births.first() {
            if world.agent(b).map(|a| a.kind()) == Some(AgentKind::Brood) && brood_born.is_none() {
                brood_born = Some((report.tick, b));
            }
        }
        if let Some(&(_, w)) = report.matured.first() {
            worker_born = Some((report.tick, w));
        }
    }

    let (egg_tick, brood) = brood_born.expect("queen should lay an egg");
    assert_eq!(egg_tick.0, 5, "interval 5 with full energy");
    assert!(world.agent(brood).is_none(), "brood replaced by worker");
    let (mature_tick, worker) = worker_born.expect("brood should mature");
    assert_eq!(world.agent(worker).unwrap().kind(), AgentKind::Worker);
    assert_eq!(mature_tick.0, egg_tick.0 + 3);
    // The queen's ledger advanced.
    let queen_bb = &world.agent(queen_id).unwrap().blackboard;
    assert!(queen_bb.get_u32(keys::EGGS_LAID, 0) >= 1);
}

#[test]
fn newborns_do_not_act_in_their_birth_tick() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "idle",
            ScriptedStep::fixed(StepResult::success()),
        ))
        .unwrap();
    let mut engine = engine_with(&registry, "idle", 0);
    let mut world = flat_world(9);
    let queen_id = world.next_id();
    world
        .insert_agent(Agent::queen(
            queen_id,
            GridPos::new(4, 4),
            &QueenConfig {
                egg_laying_interval: 1,
                ..QueenConfig::default()
            },
        ))
        .unwrap();

    let report = engine.execute_tick(&mut world).unwrap();
    assert_eq!(report.births.len(), 1);
    // Only the queen appears in the per-agent pipeline this tick.
    assert_eq!(report.agents.len(), 1);
    assert_eq!(report.agents[0].agent, queen_id);

    let report = engine.execute_tick(&mut world).unwrap();
    assert_eq!(report.agents.len(), 2);
}

#[test]
fn identical_seeds_produce_identical_trajectories() {
    fn build() -> (PluginRegistry, SimulationConfig) {
        let mut registry = PluginRegistry::new();
        registry
            .install(
                PluginManifest::new("test")
                    .step("wander", RandomWalk)
                    .step("lay_trail", LayTrail),
            )
            .unwrap();
        let config: SimulationConfig = serde_json::from_value(json!({
            "environment": {"width": 15, "height": 15, "nest_type": "none"},
            "agents": {"queen_count": 1, "worker_count": 4},
            "behavior_tree": {"root": {
                "type": "sequence",
                "children": [
                    {"type": "step", "step": {"name": "lay_trail"}},
                    {"type": "step", "step": {"name": "wander"}},
                ],
            }},
            "food_sources": [{"position": [1, 1], "amount": 40}],
            "pheromones": {"evaporation_rate": 0.02, "diffusion_alpha": 0.1},
            "simulation": {"max_cycles": 50, "seed": 2024},
        }))
        .unwrap();
        (registry, config)
    }

    let (reg_a, config_a) = build();
    let (reg_b, config_b) = build();
    let mut sim_a = Simulation::new(config_a, &reg_a).unwrap();
    let mut sim_b = Simulation::new(config_b, &reg_b).unwrap();

    for _ in 0..50 {
        sim_a.step().unwrap();
        sim_b.step().unwrap();

        let positions_a: Vec<_> = sim_a.world().agents().map(|a| (a.id(), a.position())).collect();
        let positions_b: Vec<_> = sim_b.world().agents().map(|a| (a.id(), a.position())).collect();
        assert_eq!(positions_a, positions_b);
        assert_eq!(sim_a.world().field().stats(), sim_b.world().field().stats());
    }
}

#[test]
fn simulation_builds_colony_from_config() {
    let mut registry = PluginRegistry::new();
    registry
        .install(PluginManifest::new("test").step(
            "idle",
            ScriptedStep::fixed(StepResult::success()),
        ))
        .unwrap();
    let config: SimulationConfig = serde_json::from_value(json!({
        "agents": {"queen_count": 1, "worker_count": 3},
        "behavior_tree": {"root": {"type": "step", "step": {"name": "idle"}}},
        "food_sources": [{"position": [2, 2], "amount": 100}],
        "simulation": {"max_cycles": 5, "seed": 1},
    }))
    .unwrap();
    let mut sim = Simulation::new(config, &registry).unwrap();

    assert_eq!(sim.world().agent_count(), 4);
    assert_eq!(sim.world().food_at(GridPos::new(2, 2)), 100);
    assert!(!sim.world().entry_positions().is_empty(), "standard nest has an entry");

    let queens = sim
        .world()
        .agents()
        .filter(|a| a.kind() == AgentKind::Queen)
        .count();
    assert_eq!(queens, 1);

    let reports = sim.run().unwrap();
    assert_eq!(reports.len(), 5);
    assert_eq!(reports.last().unwrap().tick.0, 5);
}

#[test]
fn front_buffer_is_stable_for_the_whole_tick() {
    // A sensor snapshots the trail level at the agent's cell; within the
    // same tick a step deposits there. The sensor must keep seeing the
    // tick-start front buffer (zero), in pre *and* post phases.
    struct TrailLevel;
    impl Sensor for TrailLevel {
        fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
            let mut out = ValueMap::new();
            out.insert(
                "trail_here".into(),
                json!(world.field().value_at("trail", agent.position())),
            );
            Ok(out)
        }
    }
    let mut registry = PluginRegistry::new();
    registry
        .install(
            PluginManifest::new("test")
                .step("lay_trail", LayTrail)
                .sensor("trail_level", TrailLevel),
        )
        .unwrap();
    let mut engine = engine_with(&registry, "lay_trail", 0);
    let mut world = flat_world(5);
    let id = spawn_worker(&mut world, 2, 2);

    engine.execute_tick(&mut world).unwrap();
    let seen = world.agent(id).unwrap().blackboard.get("trail_here").cloned();
    assert_eq!(seen, Some(json!(0.0)));

    // Next tick both phases see the swapped-in deposit.
    engine.execute_tick(&mut world).unwrap();
    let seen = world
        .agent(id)
        .unwrap()
        .blackboard
        .get("trail_here")
        .and_then(Value::as_f64)
        .unwrap();
    assert!((seen - 1.0).abs() < 1e-6);
}
