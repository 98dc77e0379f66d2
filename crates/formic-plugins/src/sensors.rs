//! Core sensors: world observations written to the blackboard.
//!
//! Sensors only derive facts; they never decide. Hunger thresholds,
//! neighbour scans, and gradients land on the blackboard for triggers
//! and steps to consume.

use formic_core::{keys, GridPos, ValueMap};
use formic_plugin::{Sensor, SensorError};
use formic_world::{Agent, World};
use serde_json::json;

/// Mirrors position and the current tick onto the blackboard.
pub struct BasicState;

impl Sensor for BasicState {
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        let pos = agent.position();
        let mut out = ValueMap::new();
        out.insert(keys::POSITION.into(), json!([pos.x, pos.y]));
        out.insert(keys::CYCLE.into(), json!(world.tick().0));
        Ok(out)
    }
}

/// Flags for the agent's current cell: inside the nest, on an entry.
pub struct EnvFlags;

impl Sensor for EnvFlags {
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        let pos = agent.position();
        let cell = world
            .grid()
            .cell(pos)
            .ok_or_else(|| SensorError::new(format!("agent cell {pos} out of bounds")))?;
        let at_entry = world.entry_positions().contains(&pos);
        let mut out = ValueMap::new();
        out.insert("in_nest".into(), json!(cell.is_nest()));
        out.insert("at_entry".into(), json!(at_entry));
        Ok(out)
    }
}

/// Hunger flags derived from the stomach levels.
///
/// `individual_hungry`: the own stomach is below the hunger threshold.
/// `social_hungry`: the crop has free capacity, so foraging is useful.
pub struct InternalState;

impl Sensor for InternalState {
    fn sense(&self, agent: &Agent, _world: &World) -> Result<ValueMap, SensorError> {
        let bb = &agent.blackboard;
        let stomach = bb.get_u32(keys::STOMACH, 0);
        let threshold = bb.get_u32(keys::HUNGER_THRESHOLD, 0);
        let social = bb.get_u32(keys::SOCIAL_STOMACH, 0);
        let social_cap = bb.get_u32(keys::SOCIAL_STOMACH_CAPACITY, 0);

        let mut out = ValueMap::new();
        out.insert("individual_hungry".into(), json!(stomach < threshold));
        out.insert("social_hungry".into(), json!(social < social_cap));
        Ok(out)
    }
}

/// Scans the 8-neighbourhood (via the shared spatial index) for a hungry
/// neighbour to feed.
#[derive(Default)]
pub struct Neighbours;

impl Sensor for Neighbours {
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        let mut found: Option<(u32, GridPos)> = None;
        for (id, pos) in world.spatial_index().within_chebyshev(agent.position(), 1) {
            let Some(other) = world.agent(id) else {
                continue;
            };
            let bb = &other.blackboard;
            let stomach = bb.get_u32(keys::STOMACH, 0);
            let capacity = bb.get_u32(keys::STOMACH_CAPACITY, 0);
            let threshold = bb.get_u32(keys::HUNGER_THRESHOLD, capacity / 2);
            if stomach < threshold && stomach < capacity {
                found = Some((id.0, pos));
                break;
            }
        }

        let mut out = ValueMap::new();
        out.insert("hungry_neighbor_found".into(), json!(found.is_some()));
        out.insert(
            "hungry_neighbor_id".into(),
            found.map_or(json!(null), |(id, _)| json!(id)),
        );
        out.insert(
            "hungry_neighbor_position".into(),
            found.map_or(json!(null), |(_, p)| json!([p.x, p.y])),
        );
        Ok(out)
    }
}

/// Scans cells within a Chebyshev radius for food.
///
/// Reports the nearest source (scan order breaks ties deterministically)
/// as `food_detected` / `food_position` / `food_amount`.
pub struct FoodDetection {
    /// Scan radius in cells.
    pub radius: i32,
}

impl Default for FoodDetection {
    fn default() -> Self {
        Self { radius: 3 }
    }
}

impl Sensor for FoodDetection {
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        let center = agent.position();
        let mut best: Option<(i32, GridPos, u32)> = None;
        for dy in -self.radius..=self.radius {
            for dx in -self.radius..=self.radius {
                let pos = center.offset(dx, dy);
                let amount = world.food_at(pos);
                if amount == 0 {
                    continue;
                }
                let dist = center.chebyshev(pos);
                if best.map_or(true, |(d, _, _)| dist < d) {
                    best = Some((dist, pos, amount));
                }
            }
        }

        let mut out = ValueMap::new();
        out.insert("food_detected".into(), json!(best.is_some()));
        out.insert(
            "food_position".into(),
            best.map_or(json!(null), |(_, p, _)| json!([p.x, p.y])),
        );
        out.insert(
            "food_amount".into(),
            best.map_or(json!(0), |(_, _, a)| json!(a)),
        );
        Ok(out)
    }
}

/// Samples one pheromone type at the agent's cell and points toward the
/// strongest 4-neighbour.
///
/// Writes `<ptype>_here` and `<ptype>_gradient` (a `[dx, dy]` unit step,
/// or `[0, 0]` when no neighbour beats the current cell).
pub struct PheromoneGradient {
    ptype: String,
}

impl PheromoneGradient {
    /// A gradient sensor for `ptype`.
    pub fn new(ptype: impl Into<String>) -> Self {
        Self {
            ptype: ptype.into(),
        }
    }
}

impl Sensor for PheromoneGradient {
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        let pos = agent.position();
        let here = world.field().value_at(&self.ptype, pos);
        let mut best_dir = (0, 0);
        let mut best_value = here;
        for (dx, dy) in [(0, -1), (0, 1), (-1, 0), (1, 0)] {
            let value = world.field().value_at(&self.ptype, pos.offset(dx, dy));
            if value > best_value {
                best_value = value;
                best_dir = (dx, dy);
            }
        }

        let mut out = ValueMap::new();
        out.insert(format!("{}_here", self.ptype), json!(here));
        out.insert(
            format!("{}_gradient", self.ptype),
            json!([best_dir.0, best_dir.1]),
        );
        Ok(out)
    }
}
