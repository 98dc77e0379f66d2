//! The tick engine: one atomic advancement of the whole simulation.

use crate::config::QueenEnergyConfig;
use crate::executor::{ExecutionReport, IntentExecutor};
use crate::lifecycle::{self, EnergyRates};
use crate::sensors::SensorRunner;
use formic_bt::{Node, Status, TickCtx};
use formic_core::{AgentId, TickId};
use formic_field::{FieldError, LayerSummary};
use formic_plugin::{PluginRegistry, TriggerEvaluator};
use formic_world::{AgentKind, BroodConfig, WorkerConfig, World};
use indexmap::IndexMap;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

/// Per-agent slice of a [`TickReport`].
#[derive(Clone, Debug)]
pub struct AgentTickReport {
    /// The agent this slice describes.
    pub agent: AgentId,
    /// Its kind at tick time.
    pub kind: AgentKind,
    /// Root behavior-tree status; `None` for brood, which runs no tree.
    pub status: Option<Status>,
    /// Executor outcome for the agent's intent batch.
    pub report: ExecutionReport,
}

/// Host-facing record of one global tick.
#[derive(Clone, Debug)]
pub struct TickReport {
    /// The tick this report describes.
    pub tick: TickId,
    /// Per-agent outcomes, in processing order.
    pub agents: Vec<AgentTickReport>,
    /// Agents spawned this tick (brood from eggs, workers from
    /// maturation).
    pub births: Vec<AgentId>,
    /// Agents removed this tick by starvation; maturation replacements
    /// appear in [`matured`](Self::matured) instead.
    pub deaths: Vec<AgentId>,
    /// `(brood, worker)` pairs for maturations this tick.
    pub matured: Vec<(AgentId, AgentId)>,
    /// Per-type pheromone mass accounting from the end-of-tick swap.
    pub pheromones: IndexMap<String, LayerSummary>,
}

impl TickReport {
    /// Total executed intents across all agents.
    pub fn executed_count(&self) -> usize {
        self.agents.iter().map(|a| a.report.executed.len()).sum()
    }

    /// Total rejected intents across all agents.
    pub fn rejected_count(&self) -> usize {
        self.agents.iter().map(|a| a.report.rejected.len()).sum()
    }
}

/// Drives the per-agent pipeline and the global pheromone advance.
///
/// Per agent and tick: reset markers, pre-sensors, behavior tree, intent
/// application, post-sensors. After all agents: one lifecycle pass
/// (energy, egg laying, maturation), queued death removal, then exactly
/// one pheromone `update_and_swap`.
pub struct TickEngine {
    sensors: SensorRunner,
    triggers: TriggerEvaluator,
    executor: IntentExecutor,
    worker_tree: Node,
    queen_tree: Option<Node>,
    queen_energy: QueenEnergyConfig,
    brood_config: BroodConfig,
    worker_config: WorkerConfig,
    rng: ChaCha8Rng,
    tick: TickId,
}

impl TickEngine {
    /// Assemble an engine.
    ///
    /// `worker_tree` drives workers (and queens, unless `queen_tree`
    /// overrides it); brood runs no tree. All randomness available to
    /// steps flows from `seed`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: &PluginRegistry,
        worker_tree: Node,
        queen_tree: Option<Node>,
        queen_energy: QueenEnergyConfig,
        brood_config: BroodConfig,
        worker_config: WorkerConfig,
        seed: u64,
    ) -> Self {
        Self {
            sensors: SensorRunner::new(registry),
            triggers: TriggerEvaluator::new(registry),
            executor: IntentExecutor::new(),
            worker_tree,
            queen_tree,
            queen_energy,
            brood_config,
            worker_config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            tick: TickId(0),
        }
    }

    /// The most recently completed tick.
    pub fn current_tick(&self) -> TickId {
        self.tick
    }

    /// The executor, e.g. to register custom intent handlers.
    pub fn executor_mut(&mut self) -> &mut IntentExecutor {
        &mut self.executor
    }

    /// The sensor runner, e.g. to adjust interval policies.
    pub fn sensors_mut(&mut self) -> &mut SensorRunner {
        &mut self.sensors
    }

    /// Advance the simulation by exactly one global tick.
    ///
    /// Agents are processed in registry insertion order against a
    /// tick-start id snapshot, so births this tick first act next tick
    /// and removals take effect at the end-of-tick safe point. The only
    /// error source is the field's parameter check; rejections and
    /// plugin failures are data in the report.
    pub fn execute_tick(&mut self, world: &mut World) -> Result<TickReport, FieldError> {
        let next = TickId(self.tick.0 + 1);
        world.set_tick(next);
        let ids = world.agent_ids();
        debug!(tick = %next, agents = ids.len(), "tick start");

        let mut agent_reports = Vec::with_capacity(ids.len());
        for &id in &ids {
            if world.agent(id).is_none() {
                continue;
            }
            // Reset phase: clear per-tick markers.
            self.executor.reset_agent_cycle(world, id);

            // Pre-sensor phase.
            self.sensors.run(world, id);

            // BT phase: collect intents without mutating anything.
            let kind = world.agent(id).expect("present").kind();
            let (status, intents) = match kind {
                AgentKind::Brood => (None, Vec::new()),
                AgentKind::Queen | AgentKind::Worker => {
                    let tree = match (kind, self.queen_tree.as_ref()) {
                        (AgentKind::Queen, Some(t)) => t,
                        _ => &self.worker_tree,
                    };
                    let agent = world.agent(id).expect("present");
                    let mut ctx =
                        TickCtx::new(agent, world, &self.triggers, next, &mut self.rng);
                    let status = tree.tick(&mut ctx);
                    (Some(status), ctx.intents)
                }
            };

            // Apply phase: the executor is the only mutator.
            let report = self.executor.apply(world, id, intents);

            // Post-sensor phase: observe the executor's mutations.
            self.sensors.run(world, id);

            agent_reports.push(AgentTickReport {
                agent: id,
                kind,
                status,
                report,
            });
        }

        // Lifecycle phase: energy, egg laying, maturation.
        let mut births = Vec::new();
        let mut deaths = Vec::new();
        let mut matured = Vec::new();
        for &id in &ids {
            let Some(agent) = world.agent(id) else {
                continue;
            };
            match agent.kind() {
                AgentKind::Queen => {
                    let rates = EnergyRates {
                        conversion: self.queen_energy.energy_conversion_rate,
                        loss: self.queen_energy.energy_loss_rate,
                        hunger_strength: self.queen_energy.hunger_pheromone_strength,
                    };
                    let outcome = lifecycle::run_energy_cycle(world, &self.executor, id, rates);
                    if !outcome.alive {
                        deaths.push(id);
                        continue;
                    }
                    if let Some(brood) =
                        lifecycle::try_lay_egg(world, id, &self.brood_config, next)
                    {
                        births.push(brood);
                    }
                }
                AgentKind::Brood => {
                    let rates = lifecycle::brood_rates(agent);
                    let outcome = lifecycle::run_energy_cycle(world, &self.executor, id, rates);
                    if !outcome.alive {
                        deaths.push(id);
                        continue;
                    }
                    if let Some(worker) = lifecycle::grow_brood(world, id, &self.worker_config) {
                        matured.push((id, worker));
                        births.push(worker);
                    }
                }
                AgentKind::Worker => {}
            }
        }

        // Remove the dead at the safe point, before the field advance.
        for &id in &deaths {
            world.remove_agent(id);
        }

        // Global pheromone advance, exactly once per tick.
        let pheromones = world.advance_pheromones()?;

        self.tick = next;
        info!(
            tick = %next,
            agents = agent_reports.len(),
            births = births.len(),
            deaths = deaths.len(),
            "tick complete"
        );
        Ok(TickReport {
            tick: next,
            agents: agent_reports,
            births,
            deaths,
            matured,
            pheromones,
        })
    }
}
