//! Sensor execution with policies and the shared spatial index.

use formic_core::{AgentId, BlackboardDiff, ValueMap};
use formic_plugin::{PluginRegistry, Sensor};
use formic_world::World;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Per-sensor execution policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SensorPolicy {
    /// Run only when `tick % on_interval == 0`.
    on_interval: u64,
}

/// Executes sensor plugins in registration order and merges their facts
/// into agent blackboards.
///
/// Before any sensor runs, the world's per-tick spatial index is
/// refreshed so all sensors share one lookup structure. Within a tick
/// the runner is idempotent: sensors are pure, so a second run stages no
/// further blackboard changes.
pub struct SensorRunner {
    sensors: IndexMap<String, Arc<dyn Sensor>>,
    policies: IndexMap<String, SensorPolicy>,
}

impl SensorRunner {
    /// Snapshot all sensors from `registry` and apply the default
    /// throttling policy: sensors whose names mention `pheromone`,
    /// `food_detection`, or `gradient` are broad scans and run every
    /// second tick.
    pub fn new(registry: &PluginRegistry) -> Self {
        let sensors: IndexMap<String, Arc<dyn Sensor>> = registry
            .sensors()
            .map(|(name, s)| (name.to_string(), Arc::clone(s)))
            .collect();
        let mut runner = Self {
            sensors,
            policies: IndexMap::new(),
        };
        let throttled: Vec<String> = runner
            .sensors
            .keys()
            .filter(|n| {
                ["pheromone", "food_detection", "gradient"]
                    .iter()
                    .any(|k| n.contains(k))
            })
            .cloned()
            .collect();
        for name in throttled {
            runner.set_policy(&name, Some(2));
        }
        debug!(count = runner.sensors.len(), "sensor runner loaded");
        runner
    }

    /// Set or clear a sensor's `on_interval` policy. Intervals below 1
    /// are clamped to 1 (always run).
    pub fn set_policy(&mut self, sensor: &str, on_interval: Option<u64>) {
        match on_interval {
            Some(interval) => {
                self.policies.insert(
                    sensor.to_string(),
                    SensorPolicy {
                        on_interval: interval.max(1),
                    },
                );
            }
            None => {
                self.policies.shift_remove(sensor);
            }
        }
    }

    fn should_run(&self, sensor: &str, tick: u64) -> bool {
        match self.policies.get(sensor) {
            Some(policy) if policy.on_interval > 1 => tick % policy.on_interval == 0,
            _ => true,
        }
    }

    /// Run all due sensors for `agent`, merge their facts into its
    /// blackboard, commit, and return the diff.
    ///
    /// Sensor failures are contained: the failing sensor contributes
    /// nothing and the run continues. On key collisions between sensors
    /// the last writer wins, with a warning.
    pub fn run(&self, world: &mut World, agent: AgentId) -> BlackboardDiff {
        world.refresh_spatial_index();

        let tick = world.tick().0;
        let merged = {
            let Some(agent_ref) = world.agent(agent) else {
                return BlackboardDiff::new();
            };
            let mut merged = ValueMap::new();
            for (name, sensor) in &self.sensors {
                if !self.should_run(name, tick) {
                    debug!(sensor = %name, "sensor skipped by interval policy");
                    continue;
                }
                match sensor.sense(agent_ref, world) {
                    Ok(reading) => {
                        for (key, value) in reading {
                            if merged.contains_key(&key) {
                                warn!(sensor = %name, %key, "sensor key collision, overwriting");
                            }
                            merged.insert(key, value);
                        }
                    }
                    Err(e) => {
                        error!(sensor = %name, error = %e, "sensor failed, skipping");
                    }
                }
            }
            merged
        };

        let Some(agent_mut) = world.agent_mut(agent) else {
            return BlackboardDiff::new();
        };
        agent_mut.blackboard.update(&merged);
        let diff = agent_mut.blackboard.commit();
        if !diff.is_empty() {
            debug!(agent = %agent, changes = diff.len(), "sensor facts committed");
        }
        diff
    }

    /// Registered sensor names in execution order.
    pub fn sensor_names(&self) -> impl Iterator<Item = &str> {
        self.sensors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_core::{GridPos, TickId};
    use formic_field::PheromoneField;
    use formic_plugin::{PluginManifest, SensorError};
    use formic_world::{Agent, WorkerConfig};
    use serde_json::json;

    struct Position;
    impl Sensor for Position {
        fn sense(&self, agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
            let mut out = ValueMap::new();
            out.insert("seen_x".into(), json!(agent.position().x));
            Ok(out)
        }
    }

    struct Clashing;
    impl Sensor for Clashing {
        fn sense(&self, _agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
            let mut out = ValueMap::new();
            out.insert("seen_x".into(), json!(-1));
            Ok(out)
        }
    }

    struct Broken;
    impl Sensor for Broken {
        fn sense(&self, _agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
            Err(SensorError::new("boom"))
        }
    }

    struct TickEcho;
    impl Sensor for TickEcho {
        fn sense(&self, _agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
            let mut out = ValueMap::new();
            out.insert("echo_tick".into(), json!(world.tick().0));
            Ok(out)
        }
    }

    fn world_with_worker() -> (World, AgentId) {
        let field = PheromoneField::new(5, 5, &[], 0.0, 0.1, true).unwrap();
        let mut world = World::new(5, 5, field).unwrap();
        let id = world.next_id();
        world
            .insert_agent(Agent::worker(id, GridPos::new(3, 1), &WorkerConfig::default()))
            .unwrap();
        (world, id)
    }

    #[test]
    fn facts_are_merged_and_committed() {
        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").sensor("position", Position))
            .unwrap();
        let runner = SensorRunner::new(&reg);
        let (mut world, id) = world_with_worker();

        let diff = runner.run(&mut world, id);
        assert_eq!(diff["seen_x"].new, Some(json!(3)));
        let agent = world.agent(id).unwrap();
        assert!(!agent.blackboard.is_dirty());
        assert_eq!(agent.blackboard.get_i64("seen_x", 0), 3);
    }

    #[test]
    fn rerun_within_a_tick_is_a_no_op() {
        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").sensor("position", Position))
            .unwrap();
        let runner = SensorRunner::new(&reg);
        let (mut world, id) = world_with_worker();

        let first = runner.run(&mut world, id);
        assert!(!first.is_empty());
        let second = runner.run(&mut world, id);
        assert!(second.is_empty(), "sensors are pure, same tick, same facts");
    }

    #[test]
    fn last_writer_wins_on_collisions() {
        let mut reg = PluginRegistry::new();
        reg.install(
            PluginManifest::new("test")
                .sensor("position", Position)
                .sensor("clashing", Clashing),
        )
        .unwrap();
        let runner = SensorRunner::new(&reg);
        let (mut world, id) = world_with_worker();

        runner.run(&mut world, id);
        assert_eq!(world.agent(id).unwrap().blackboard.get_i64("seen_x", 0), -1);
    }

    #[test]
    fn failing_sensor_contributes_nothing() {
        let mut reg = PluginRegistry::new();
        reg.install(
            PluginManifest::new("test")
                .sensor("broken", Broken)
                .sensor("position", Position),
        )
        .unwrap();
        let runner = SensorRunner::new(&reg);
        let (mut world, id) = world_with_worker();

        let diff = runner.run(&mut world, id);
        assert!(diff.contains_key("seen_x"));
        assert_eq!(diff.len(), 1);
    }

    #[test]
    fn interval_policy_skips_off_ticks() {
        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").sensor("echo", TickEcho))
            .unwrap();
        let mut runner = SensorRunner::new(&reg);
        runner.set_policy("echo", Some(2));
        let (mut world, id) = world_with_worker();

        world.set_tick(TickId(1));
        runner.run(&mut world, id);
        assert!(world.agent(id).unwrap().blackboard.get("echo_tick").is_none());

        world.set_tick(TickId(2));
        runner.run(&mut world, id);
        assert_eq!(world.agent(id).unwrap().blackboard.get_i64("echo_tick", 0), 2);
    }

    #[test]
    fn default_policy_throttles_scan_sensors() {
        let mut reg = PluginRegistry::new();
        reg.install(
            PluginManifest::new("test")
                .sensor("bb_food_detection", Position)
                .sensor("bb_basic", TickEcho),
        )
        .unwrap();
        let runner = SensorRunner::new(&reg);
        assert!(!runner.should_run("bb_food_detection", 1));
        assert!(runner.should_run("bb_food_detection", 2));
        assert!(runner.should_run("bb_basic", 1));
    }

    #[test]
    fn spatial_index_is_refreshed_before_sensing() {
        struct CountsNeighbours;
        impl Sensor for CountsNeighbours {
            fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
                let n = world
                    .spatial_index()
                    .within_chebyshev(agent.position(), 1)
                    .count();
                let mut out = ValueMap::new();
                out.insert("neighbour_count".into(), json!(n));
                Ok(out)
            }
        }
        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").sensor("neighbours", CountsNeighbours))
            .unwrap();
        let runner = SensorRunner::new(&reg);
        let (mut world, id) = world_with_worker();
        let other = world.next_id();
        world
            .insert_agent(Agent::worker(other, GridPos::new(2, 1), &WorkerConfig::default()))
            .unwrap();

        world.set_tick(TickId(1));
        runner.run(&mut world, id);
        assert_eq!(
            world.agent(id).unwrap().blackboard.get_i64("neighbour_count", -1),
            1
        );
    }
}
