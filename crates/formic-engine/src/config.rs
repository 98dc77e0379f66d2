//! Validated simulation configuration.
//!
//! The structs here are the *shape* the engine consumes; how they are
//! encoded on disk (YAML, JSON, ...) is the host's concern — anything
//! serde can deserialize works. [`SimulationConfig::validate`] enforces
//! the load-time rules: every referenced plugin name resolves (unresolved
//! names aggregate into one error), composites have children, parameter
//! ranges hold, and placements are in bounds.

use formic_bt::{BuildError, Node, NodeSpec, TreeBuilder};
use formic_core::GridPos;
use formic_plugin::PluginRegistry;
use formic_world::{BroodConfig, QueenConfig, WorkerConfig};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Grid and nest setup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// Extra entry positions besides those the nest layout creates.
    pub entry_positions: Vec<GridPos>,
    /// Which nest layout to build.
    pub nest_type: NestType,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            width: 20,
            height: 20,
            entry_positions: Vec::new(),
            nest_type: NestType::Standard,
        }
    }
}

/// Nest layout selector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NestType {
    /// Centred walled rectangle with entries (the default).
    #[default]
    Standard,
    /// No nest; the grid starts empty.
    None,
}

/// Initial colony composition and per-kind seeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSetupConfig {
    /// Number of queens placed at startup.
    pub queen_count: u32,
    /// Number of workers placed at startup.
    pub worker_count: u32,
    /// Queen blackboard seeds.
    pub queen_config: QueenConfig,
    /// Worker blackboard seeds.
    pub worker_config: WorkerConfig,
}

impl Default for AgentSetupConfig {
    fn default() -> Self {
        Self {
            queen_count: 1,
            worker_count: 2,
            queen_config: QueenConfig::default(),
            worker_config: WorkerConfig::default(),
        }
    }
}

/// Behavior trees for the colony.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BehaviorTreeConfig {
    /// Tree driving workers (and queens without an override).
    pub root: NodeSpec,
    /// Optional queen-specific tree.
    #[serde(default)]
    pub queen_root: Option<NodeSpec>,
}

/// Colony placement overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColonyConfig {
    /// Additional entry positions for colony placement, merged with the
    /// environment's.
    pub entry_positions: Vec<GridPos>,
}

/// One food deposit placed at startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodSourceConfig {
    /// Cell to place the food on.
    pub position: GridPos,
    /// Units of food.
    pub amount: u32,
}

/// Queen energy-cycle rates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueenEnergyConfig {
    /// Stomach units converted to energy per tick.
    pub energy_conversion_rate: u32,
    /// Energy lost per tick while the stomach is empty.
    pub energy_loss_rate: u32,
    /// Stomach units consumed per conversion tick (reserved; the cycle
    /// currently draws `energy_conversion_rate`).
    pub stomach_depletion_rate: u32,
    /// Strength of the queen's hunger pheromone.
    pub hunger_pheromone_strength: u32,
}

impl Default for QueenEnergyConfig {
    fn default() -> Self {
        Self {
            energy_conversion_rate: 8,
            energy_loss_rate: 3,
            stomach_depletion_rate: 5,
            hunger_pheromone_strength: 3,
        }
    }
}

/// Pheromone field parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PheromoneConfig {
    /// Evaporation fraction per tick, `[0, 1)`.
    pub evaporation_rate: f32,
    /// Diffusion weight to each 4-neighbour, `[0, 0.25]`.
    pub diffusion_alpha: f32,
    /// Types registered at startup.
    pub types: Vec<String>,
    /// Whether deposits may create new types at runtime.
    pub allow_dynamic_types: bool,
}

impl Default for PheromoneConfig {
    fn default() -> Self {
        Self {
            evaporation_rate: 0.01,
            diffusion_alpha: 0.1,
            types: vec!["trail".into(), "hunger".into(), "alarm".into()],
            allow_dynamic_types: true,
        }
    }
}

/// Run-length and pacing parameters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Ticks executed by [`Simulation::run`](crate::Simulation::run).
    pub max_cycles: u64,
    /// Host pacing hint; the engine itself never sleeps.
    pub tick_interval_ms: u64,
    /// Seed for the engine RNG; fixed seed, fixed trajectory.
    pub seed: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            max_cycles: 1000,
            tick_interval_ms: 100,
            seed: 42,
        }
    }
}

/// Top-level simulation configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Grid and nest setup.
    #[serde(default)]
    pub environment: EnvironmentConfig,
    /// Colony composition.
    #[serde(default)]
    pub agents: AgentSetupConfig,
    /// Behavior trees (required).
    pub behavior_tree: BehaviorTreeConfig,
    /// Reserved task definitions; accepted but not consumed by the core.
    #[serde(default)]
    pub tasks: Vec<formic_core::Value>,
    /// Food placed at startup.
    #[serde(default)]
    pub food_sources: Vec<FoodSourceConfig>,
    /// Colony placement overrides.
    #[serde(default)]
    pub colony: ColonyConfig,
    /// Queen energy rates.
    #[serde(default)]
    pub queen_energy: QueenEnergyConfig,
    /// Brood seeds and rates.
    #[serde(default)]
    pub brood: BroodConfig,
    /// Pheromone field parameters.
    #[serde(default)]
    pub pheromones: PheromoneConfig,
    /// Run length, pacing, and seed.
    #[serde(default)]
    pub simulation: TimingConfig,
}

/// Trees produced by a successful [`SimulationConfig::validate`].
#[derive(Debug)]
pub(crate) struct ValidatedTrees {
    pub worker: Node,
    pub queen: Option<Node>,
}

/// Load-time configuration errors. The simulation does not start.
#[derive(Debug)]
pub enum ConfigError {
    /// A behavior tree failed validation (unresolved plugin names,
    /// childless composites), aggregated per tree.
    Tree {
        /// Which tree: `"root"` or `"queen_root"`.
        which: &'static str,
        /// The aggregated problems.
        source: BuildError,
    },
    /// A parameter is out of range or a placement is out of bounds.
    InvalidParameter {
        /// Description of the offending parameter.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tree { which, source } => write!(f, "behavior_tree.{which}: {source}"),
            Self::InvalidParameter { reason } => write!(f, "invalid parameter: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Tree { source, .. } => Some(source),
            Self::InvalidParameter { .. } => None,
        }
    }
}

impl SimulationConfig {
    /// A minimal config around a worker tree, with defaults everywhere
    /// else. Handy for tests and examples.
    pub fn with_tree(root: NodeSpec) -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            agents: AgentSetupConfig::default(),
            behavior_tree: BehaviorTreeConfig {
                root,
                queen_root: None,
            },
            tasks: Vec::new(),
            food_sources: Vec::new(),
            colony: ColonyConfig::default(),
            queen_energy: QueenEnergyConfig::default(),
            brood: BroodConfig::default(),
            pheromones: PheromoneConfig::default(),
            simulation: TimingConfig::default(),
        }
    }

    /// Enforce the load-time validation rules against `registry` and
    /// build the behavior trees.
    pub(crate) fn validate(&self, registry: &PluginRegistry) -> Result<ValidatedTrees, ConfigError> {
        let mut problems = Vec::new();

        if self.environment.width == 0 || self.environment.height == 0 {
            problems.push(format!(
                "environment size {}x{} must be non-zero",
                self.environment.width, self.environment.height
            ));
        }
        if !(0.0..1.0).contains(&self.pheromones.evaporation_rate) {
            problems.push(format!(
                "pheromones.evaporation_rate {} outside [0, 1)",
                self.pheromones.evaporation_rate
            ));
        }
        if !(0.0..=0.25).contains(&self.pheromones.diffusion_alpha) {
            problems.push(format!(
                "pheromones.diffusion_alpha {} outside [0, 0.25]",
                self.pheromones.diffusion_alpha
            ));
        }
        let in_bounds = |pos: GridPos| {
            pos.x >= 0
                && pos.y >= 0
                && pos.x < self.environment.width as i32
                && pos.y < self.environment.height as i32
        };
        for pos in self
            .environment
            .entry_positions
            .iter()
            .chain(&self.colony.entry_positions)
        {
            if !in_bounds(*pos) {
                problems.push(format!("entry position {pos} out of bounds"));
            }
        }
        for food in &self.food_sources {
            if !in_bounds(food.position) {
                problems.push(format!("food source {} out of bounds", food.position));
            }
        }
        if !problems.is_empty() {
            return Err(ConfigError::InvalidParameter {
                reason: problems.join("; "),
            });
        }

        let builder = TreeBuilder::new(registry);
        let worker = builder
            .build(&self.behavior_tree.root)
            .map_err(|source| ConfigError::Tree {
                which: "root",
                source,
            })?;
        let queen = match &self.behavior_tree.queen_root {
            Some(spec) => Some(builder.build(spec).map_err(|source| ConfigError::Tree {
                which: "queen_root",
                source,
            })?),
            None => None,
        };
        Ok(ValidatedTrees { worker, queen })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_plugin::{Params, PluginManifest, Step, StepCtx, StepResult};
    use serde_json::json;

    struct Idle;
    impl Step for Idle {
        fn call(&self, _ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
            StepResult::success()
        }
    }

    fn registry() -> PluginRegistry {
        let mut reg = PluginRegistry::new();
        reg.install(PluginManifest::new("test").step("idle", Idle))
            .unwrap();
        reg
    }

    fn idle_spec() -> NodeSpec {
        serde_json::from_value(json!({"type": "step", "step": {"name": "idle"}})).unwrap()
    }

    #[test]
    fn full_config_deserializes_with_defaults() {
        let config: SimulationConfig = serde_json::from_value(json!({
            "behavior_tree": {"root": {"type": "step", "step": {"name": "idle"}}},
        }))
        .unwrap();
        assert_eq!(config.environment.width, 20);
        assert_eq!(config.agents.queen_count, 1);
        assert_eq!(config.pheromones.types.len(), 3);
        assert!(config.validate(&registry()).is_ok());
    }

    #[test]
    fn unresolved_plugin_names_fail_validation() {
        let config: SimulationConfig = serde_json::from_value(json!({
            "behavior_tree": {"root": {"type": "step", "step": {"name": "dance"}}},
        }))
        .unwrap();
        let err = config.validate(&registry()).unwrap_err();
        assert!(err.to_string().contains("dance"));
    }

    #[test]
    fn parameter_ranges_are_checked() {
        let mut config = SimulationConfig::with_tree(idle_spec());
        config.pheromones.diffusion_alpha = 0.3;
        let err = config.validate(&registry()).unwrap_err();
        assert!(err.to_string().contains("diffusion_alpha"));

        let mut config = SimulationConfig::with_tree(idle_spec());
        config.pheromones.evaporation_rate = 1.0;
        assert!(config.validate(&registry()).is_err());
    }

    #[test]
    fn placement_bounds_are_checked_and_aggregated() {
        let mut config = SimulationConfig::with_tree(idle_spec());
        config.environment.entry_positions = vec![GridPos::new(50, 0)];
        config.food_sources = vec![FoodSourceConfig {
            position: GridPos::new(-1, 3),
            amount: 10,
        }];
        let err = config.validate(&registry()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("entry position"));
        assert!(msg.contains("food source"));
    }
}
