//! Well-known blackboard keys shared between the engine and plugins.
//!
//! Plugins are free to introduce their own keys; the constants here cover
//! the keys the engine itself reads or writes, so that the executor,
//! lifecycle code, sensors, and triggers agree on spelling.

/// Agent id, mirrored into the blackboard at construction.
pub const AGENT_ID: &str = "agent_id";
/// Current position as a `[x, y]` array, mirrored by the basic-state sensor.
pub const POSITION: &str = "position";
/// Current global tick, mirrored by the basic-state sensor.
pub const CYCLE: &str = "cycle";
/// Whether a move has already been executed this tick.
pub const HAS_MOVED: &str = "has_moved";
/// Execution log for the current tick: executed and rejected intent records.
pub const INTENTS_EXECUTED: &str = "intents_executed";

/// Individual food store.
pub const STOMACH: &str = "stomach";
/// Capacity of the individual food store.
pub const STOMACH_CAPACITY: &str = "stomach_capacity";
/// Social (crop) food store used for carrying and feeding.
pub const SOCIAL_STOMACH: &str = "social_stomach";
/// Capacity of the social food store.
pub const SOCIAL_STOMACH_CAPACITY: &str = "social_stomach_capacity";
/// Stomach level below which an agent counts as hungry.
pub const HUNGER_THRESHOLD: &str = "hunger_threshold";

/// Current energy level (queen and brood).
pub const ENERGY: &str = "energy";
/// Maximum energy level (queen and brood).
pub const MAX_ENERGY: &str = "max_energy";
/// Whether the agent emitted a hunger pheromone this tick.
pub const SIGNALING_HUNGER: &str = "is_signaling_hunger";

/// Queen: minimum ticks between egg layings.
pub const EGG_LAYING_INTERVAL: &str = "egg_laying_interval";
/// Queen: eggs laid so far.
pub const EGGS_LAID: &str = "eggs_laid";
/// Queen: tick of the most recent egg laying.
pub const LAST_EGG_TICK: &str = "last_egg_tick";
/// Queen: lifetime egg budget.
pub const MAX_EGGS: &str = "max_eggs";

/// Brood: accumulated growth progress in ticks.
pub const GROWTH_PROGRESS: &str = "growth_progress";
/// Brood: growth required to mature into a worker.
pub const MATURATION_TIME: &str = "maturation_time";
