//! Agents: queen, worker, and brood variants sharing one capability set.
//!
//! Agents own their blackboard exclusively; the world indexes them by id
//! and mirrors their position into cell occupancy. Kind-specific state
//! lives on the blackboard, seeded from the config structs here, so
//! sensors and triggers can treat every agent uniformly.

use formic_core::{keys, AgentId, Blackboard, GridPos};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Agent variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// Egg-laying colony founder.
    Queen,
    /// Foraging adult.
    Worker,
    /// Egg/larva growing toward maturation.
    Brood,
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Queen => "queen",
            Self::Worker => "worker",
            Self::Brood => "brood",
        };
        write!(f, "{s}")
    }
}

/// Seed values for worker blackboards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Starting energy.
    pub energy: u32,
    /// Energy cap.
    pub max_energy: u32,
    /// Starting individual stomach contents.
    pub initial_stomach: u32,
    /// Individual stomach capacity.
    pub stomach_capacity: u32,
    /// Starting social (crop) stomach contents.
    pub initial_social_stomach: u32,
    /// Social stomach capacity.
    pub social_stomach_capacity: u32,
    /// Stomach level below which the worker counts as hungry.
    pub hunger_threshold: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            energy: 100,
            max_energy: 100,
            initial_stomach: 100,
            stomach_capacity: 100,
            initial_social_stomach: 0,
            social_stomach_capacity: 100,
            hunger_threshold: 50,
        }
    }
}

/// Seed values for queen blackboards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueenConfig {
    /// Starting energy.
    pub energy: u32,
    /// Energy cap; egg laying requires energy at this cap.
    pub max_energy: u32,
    /// Starting stomach contents.
    pub initial_stomach: u32,
    /// Stomach capacity.
    pub stomach_capacity: u32,
    /// Minimum ticks between egg layings.
    pub egg_laying_interval: u64,
    /// Lifetime egg budget.
    pub max_eggs: u32,
}

impl Default for QueenConfig {
    fn default() -> Self {
        Self {
            energy: 200,
            max_energy: 200,
            initial_stomach: 150,
            stomach_capacity: 150,
            egg_laying_interval: 10,
            max_eggs: 100,
        }
    }
}

/// Seed values for brood blackboards, including the energy-cycle rates
/// the lifecycle phase reads back from the blackboard each tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BroodConfig {
    /// Starting energy.
    pub initial_energy: u32,
    /// Energy cap; growth requires energy at this cap.
    pub max_energy: u32,
    /// Starting stomach contents.
    pub initial_stomach: u32,
    /// Stomach capacity.
    pub stomach_capacity: u32,
    /// Growth ticks required to mature into a worker.
    pub maturation_time: u32,
    /// Stomach units converted to energy per tick.
    pub energy_conversion_rate: u32,
    /// Energy lost per tick while the stomach is empty.
    pub energy_loss_rate: u32,
    /// Strength of the hunger pheromone emitted while below max energy.
    pub hunger_pheromone_strength: u32,
}

impl Default for BroodConfig {
    fn default() -> Self {
        Self {
            initial_energy: 50,
            max_energy: 100,
            initial_stomach: 0,
            stomach_capacity: 80,
            maturation_time: 50,
            energy_conversion_rate: 5,
            energy_loss_rate: 2,
            hunger_pheromone_strength: 2,
        }
    }
}

/// A simulated agent: id, kind, authoritative position, and blackboard.
#[derive(Clone, Debug)]
pub struct Agent {
    id: AgentId,
    kind: AgentKind,
    position: GridPos,
    /// The agent's private state store.
    pub blackboard: Blackboard,
}

impl Agent {
    /// Construct a worker, seeding its blackboard from `config`.
    pub fn worker(id: AgentId, position: GridPos, config: &WorkerConfig) -> Self {
        let mut bb = Blackboard::new(id);
        bb.set_pos(keys::POSITION, position);
        bb.set(keys::HAS_MOVED, false);
        bb.set(keys::ENERGY, config.energy);
        bb.set(keys::MAX_ENERGY, config.max_energy);
        bb.set(keys::STOMACH, config.initial_stomach);
        bb.set(keys::STOMACH_CAPACITY, config.stomach_capacity);
        bb.set(keys::SOCIAL_STOMACH, config.initial_social_stomach);
        bb.set(
            keys::SOCIAL_STOMACH_CAPACITY,
            config.social_stomach_capacity,
        );
        bb.set(keys::HUNGER_THRESHOLD, config.hunger_threshold);
        bb.commit();
        Self {
            id,
            kind: AgentKind::Worker,
            position,
            blackboard: bb,
        }
    }

    /// Construct a queen, seeding its blackboard from `config`.
    pub fn queen(id: AgentId, position: GridPos, config: &QueenConfig) -> Self {
        let mut bb = Blackboard::new(id);
        bb.set_pos(keys::POSITION, position);
        bb.set(keys::HAS_MOVED, false);
        bb.set(keys::ENERGY, config.energy);
        bb.set(keys::MAX_ENERGY, config.max_energy);
        bb.set(keys::STOMACH, config.initial_stomach);
        bb.set(keys::STOMACH_CAPACITY, config.stomach_capacity);
        bb.set(keys::EGG_LAYING_INTERVAL, config.egg_laying_interval);
        bb.set(keys::EGGS_LAID, 0);
        bb.set(keys::LAST_EGG_TICK, 0);
        bb.set(keys::MAX_EGGS, config.max_eggs);
        bb.set(keys::SIGNALING_HUNGER, false);
        bb.commit();
        Self {
            id,
            kind: AgentKind::Queen,
            position,
            blackboard: bb,
        }
    }

    /// Construct a brood, seeding its blackboard from `config`.
    pub fn brood(id: AgentId, position: GridPos, config: &BroodConfig) -> Self {
        let mut bb = Blackboard::new(id);
        bb.set_pos(keys::POSITION, position);
        bb.set(keys::HAS_MOVED, false);
        bb.set(keys::ENERGY, config.initial_energy);
        bb.set(keys::MAX_ENERGY, config.max_energy);
        bb.set(keys::STOMACH, config.initial_stomach);
        bb.set(keys::STOMACH_CAPACITY, config.stomach_capacity);
        bb.set(keys::GROWTH_PROGRESS, 0);
        bb.set(keys::MATURATION_TIME, config.maturation_time);
        bb.set("energy_conversion_rate", config.energy_conversion_rate);
        bb.set("energy_loss_rate", config.energy_loss_rate);
        bb.set(
            "hunger_pheromone_strength",
            config.hunger_pheromone_strength,
        );
        bb.set(keys::SIGNALING_HUNGER, false);
        bb.commit();
        Self {
            id,
            kind: AgentKind::Brood,
            position,
            blackboard: bb,
        }
    }

    /// The agent's id.
    pub fn id(&self) -> AgentId {
        self.id
    }

    /// The agent's kind.
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// The agent's authoritative position.
    pub fn position(&self) -> GridPos {
        self.position
    }

    /// Relocate the agent and mirror the new position into the blackboard.
    ///
    /// Occupancy maintenance is the world's job; this only updates the
    /// agent-local view.
    pub(crate) fn set_position(&mut self, pos: GridPos) {
        self.position = pos;
        self.blackboard.set_pos(keys::POSITION, pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_blackboard_is_seeded_and_committed() {
        let w = Agent::worker(AgentId(3), GridPos::new(1, 2), &WorkerConfig::default());
        assert_eq!(w.kind(), AgentKind::Worker);
        assert!(!w.blackboard.is_dirty());
        assert_eq!(w.blackboard.get_pos(keys::POSITION), Some(GridPos::new(1, 2)));
        assert_eq!(w.blackboard.get_u32(keys::SOCIAL_STOMACH_CAPACITY, 0), 100);
        assert!(!w.blackboard.get_bool(keys::HAS_MOVED, true));
    }

    #[test]
    fn queen_carries_egg_state() {
        let q = Agent::queen(AgentId(0), GridPos::new(5, 5), &QueenConfig::default());
        assert_eq!(q.blackboard.get_u32(keys::EGGS_LAID, 9), 0);
        assert_eq!(q.blackboard.get_i64(keys::EGG_LAYING_INTERVAL, 0), 10);
        assert_eq!(q.blackboard.get_u32(keys::MAX_EGGS, 0), 100);
    }

    #[test]
    fn brood_carries_growth_state_and_rates() {
        let b = Agent::brood(AgentId(8), GridPos::new(2, 2), &BroodConfig::default());
        assert_eq!(b.blackboard.get_u32(keys::GROWTH_PROGRESS, 9), 0);
        assert_eq!(b.blackboard.get_u32(keys::MATURATION_TIME, 0), 50);
        assert_eq!(b.blackboard.get_u32("energy_conversion_rate", 0), 5);
    }

    #[test]
    fn config_defaults_deserialize_from_empty_object() {
        let w: WorkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(w, WorkerConfig::default());
        let q: QueenConfig = serde_json::from_str(r#"{"max_eggs": 7}"#).unwrap();
        assert_eq!(q.max_eggs, 7);
        assert_eq!(q.energy, 200);
    }
}
