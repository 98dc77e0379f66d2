//! Test fixtures and scripted plugins for Formic development.
//!
//! Provides deterministic stand-ins for the three plugin roles
//! ([`ScriptedStep`], [`ConstTrigger`], [`StaticSensor`],
//! [`FailingSensor`]) plus small world builders used across the engine
//! and behavior-tree test suites.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::sync::Mutex;

use formic_core::{AgentId, GridPos, ValueMap};
use formic_field::PheromoneField;
use formic_plugin::{Params, Sensor, SensorError, Step, StepCtx, StepResult, Trigger};
use formic_world::{Agent, WorkerConfig, World};

/// Step that replays a fixed sequence of results, then repeats the last
/// one. Useful for driving specific executor and pipeline paths.
pub struct ScriptedStep {
    script: Mutex<Vec<StepResult>>,
    cursor: Mutex<usize>,
}

impl ScriptedStep {
    pub fn new(script: Vec<StepResult>) -> Self {
        assert!(!script.is_empty(), "script must have at least one result");
        Self {
            script: Mutex::new(script),
            cursor: Mutex::new(0),
        }
    }

    /// A step that returns the same result forever.
    pub fn fixed(result: StepResult) -> Self {
        Self::new(vec![result])
    }
}

impl Step for ScriptedStep {
    fn call(&self, _ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        let script = self.script.lock().expect("script lock");
        let mut cursor = self.cursor.lock().expect("cursor lock");
        let result = script[(*cursor).min(script.len() - 1)].clone();
        *cursor += 1;
        result
    }
}

/// Trigger with a constant answer.
pub struct ConstTrigger(pub bool);

impl Trigger for ConstTrigger {
    fn eval(&self, _bb: &formic_core::Blackboard, _params: &Params) -> bool {
        self.0
    }
}

/// Sensor returning the same facts every run.
pub struct StaticSensor(pub ValueMap);

impl StaticSensor {
    pub fn single(key: &str, value: serde_json::Value) -> Self {
        let mut map = ValueMap::new();
        map.insert(key.to_string(), value);
        Self(map)
    }
}

impl Sensor for StaticSensor {
    fn sense(&self, _agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
        Ok(self.0.clone())
    }
}

/// Sensor that always fails; the runner must contain it.
pub struct FailingSensor;

impl Sensor for FailingSensor {
    fn sense(&self, _agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
        Err(SensorError::new("failing sensor fixture"))
    }
}

/// A `size × size` world with `trail` and `hunger` layers and no
/// diffusion or evaporation, so field assertions stay exact.
pub fn flat_world(size: u32) -> World {
    let field = PheromoneField::new(size, size, &["trail", "hunger"], 0.0, 0.0, true)
        .expect("valid field size");
    World::new(size, size, field).expect("valid world size")
}

/// Insert a default-config worker at `(x, y)` and return its id.
pub fn spawn_worker(world: &mut World, x: i32, y: i32) -> AgentId {
    let id = world.next_id();
    world
        .insert_agent(Agent::worker(id, GridPos::new(x, y), &WorkerConfig::default()))
        .expect("free cell for test worker")
}
