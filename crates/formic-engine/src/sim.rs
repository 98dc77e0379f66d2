//! Simulation front-end: build a world from configuration and run it.

use crate::config::{ConfigError, NestType, SimulationConfig};
use crate::tick::{TickEngine, TickReport};
use formic_core::GridPos;
use formic_field::{FieldError, PheromoneField};
use formic_plugin::PluginRegistry;
use formic_world::{build_standard_nest, Agent, NestLayout, World};
use tracing::info;

/// A configured colony: world plus tick engine.
///
/// Construction validates the configuration (plugins resolve, parameters
/// in range), builds the grid, nest, food sources, and initial agents,
/// and seeds the engine RNG. Identical configuration, plugin set, and
/// seed produce identical runs.
pub struct Simulation {
    world: World,
    engine: TickEngine,
    max_cycles: u64,
}

impl Simulation {
    /// Validate `config` against `registry` and assemble the simulation.
    pub fn new(config: SimulationConfig, registry: &PluginRegistry) -> Result<Self, ConfigError> {
        let trees = config.validate(registry)?;

        let types: Vec<&str> = config.pheromones.types.iter().map(String::as_str).collect();
        let field = PheromoneField::new(
            config.environment.width,
            config.environment.height,
            &types,
            config.pheromones.evaporation_rate,
            config.pheromones.diffusion_alpha,
            config.pheromones.allow_dynamic_types,
        )
        .map_err(|e| ConfigError::InvalidParameter {
            reason: e.to_string(),
        })?;
        let mut world = World::new(config.environment.width, config.environment.height, field)
            .map_err(|e| ConfigError::InvalidParameter {
                reason: e.to_string(),
            })?;

        // Nest first: placement searches prefer its interior.
        let nest_center = GridPos::new(
            config.environment.width as i32 / 2,
            config.environment.height as i32 / 2,
        );
        if config.environment.nest_type == NestType::Standard {
            build_standard_nest(&mut world, &NestLayout::default()).map_err(|e| {
                ConfigError::InvalidParameter {
                    reason: format!("nest does not fit: {e}"),
                }
            })?;
        }
        for &pos in config
            .environment
            .entry_positions
            .iter()
            .chain(&config.colony.entry_positions)
        {
            world
                .add_entry(pos)
                .map_err(|e| ConfigError::InvalidParameter {
                    reason: e.to_string(),
                })?;
        }

        for food in &config.food_sources {
            world.add_food(food.position, food.amount);
        }

        // Queens around the nest centre, workers around the entries.
        for _ in 0..config.agents.queen_count {
            let pos = find_free_near(&world, nest_center).ok_or_else(|| {
                ConfigError::InvalidParameter {
                    reason: "no free cell for queen placement".into(),
                }
            })?;
            let id = world.next_id();
            world
                .insert_agent(Agent::queen(id, pos, &config.agents.queen_config))
                .expect("cell checked free");
        }
        let entries: Vec<GridPos> = if world.entry_positions().is_empty() {
            vec![nest_center]
        } else {
            world.entry_positions().to_vec()
        };
        for i in 0..config.agents.worker_count {
            let anchor = entries[i as usize % entries.len()];
            let pos =
                find_free_near(&world, anchor).ok_or_else(|| ConfigError::InvalidParameter {
                    reason: "no free cell for worker placement".into(),
                })?;
            let id = world.next_id();
            world
                .insert_agent(Agent::worker(id, pos, &config.agents.worker_config))
                .expect("cell checked free");
        }

        let engine = TickEngine::new(
            registry,
            trees.worker,
            trees.queen,
            config.queen_energy.clone(),
            config.brood.clone(),
            config.agents.worker_config.clone(),
            config.simulation.seed,
        );

        info!(
            width = config.environment.width,
            height = config.environment.height,
            agents = world.agent_count(),
            seed = config.simulation.seed,
            "simulation assembled"
        );
        Ok(Self {
            world,
            engine,
            max_cycles: config.simulation.max_cycles,
        })
    }

    /// The simulation world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The tick engine.
    pub fn engine(&self) -> &TickEngine {
        &self.engine
    }

    /// Mutable engine access, e.g. to register custom intent handlers.
    pub fn engine_mut(&mut self) -> &mut TickEngine {
        &mut self.engine
    }

    /// Advance one tick.
    pub fn step(&mut self) -> Result<TickReport, FieldError> {
        self.engine.execute_tick(&mut self.world)
    }

    /// Run `max_cycles` ticks, collecting the reports.
    pub fn run(&mut self) -> Result<Vec<TickReport>, FieldError> {
        let mut reports = Vec::with_capacity(self.max_cycles as usize);
        for _ in 0..self.max_cycles {
            reports.push(self.step()?);
        }
        Ok(reports)
    }
}

/// Deterministic free-cell search: `anchor` itself, its 8-neighbourhood
/// in scan order, then the whole grid row-major.
fn find_free_near(world: &World, anchor: GridPos) -> Option<GridPos> {
    if world.is_free(anchor) {
        return Some(anchor);
    }
    if let Some(pos) = anchor.neighbours8().into_iter().find(|&p| world.is_free(p)) {
        return Some(pos);
    }
    world.grid().positions().find(|&p| world.is_free(p))
}
