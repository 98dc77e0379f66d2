//! Agent lifecycle: energy cycles, egg laying, and brood maturation.
//!
//! These run once per tick per living queen and brood, outside the
//! behavior tree. World effects still flow through the executor so the
//! pheromone staging discipline and execution log hold.

use crate::executor::IntentExecutor;
use formic_core::{keys, AgentId, GridPos, Intent, TickId};
use formic_world::{Agent, BroodConfig, WorkerConfig, World};
use tracing::{debug, info};

/// Energy-cycle rates for one agent kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnergyRates {
    /// Stomach units converted to energy per tick.
    pub conversion: u32,
    /// Energy lost per tick while the stomach is empty.
    pub loss: u32,
    /// Strength of the hunger pheromone emitted while below max energy.
    pub hunger_strength: u32,
}

/// What one energy cycle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnergyOutcome {
    /// Energy gained from stomach conversion.
    pub converted: u32,
    /// Energy lost to starvation.
    pub lost: u32,
    /// False if the agent starved to death this tick.
    pub alive: bool,
    /// Whether a hunger pheromone was emitted.
    pub signaling: bool,
}

/// Read the brood's energy rates back from its blackboard, where they
/// were seeded at creation.
pub(crate) fn brood_rates(agent: &Agent) -> EnergyRates {
    EnergyRates {
        conversion: agent.blackboard.get_u32("energy_conversion_rate", 5),
        loss: agent.blackboard.get_u32("energy_loss_rate", 2),
        hunger_strength: agent.blackboard.get_u32("hunger_pheromone_strength", 2),
    }
}

/// Run one energy cycle for `agent`.
///
/// While the stomach holds food it converts into energy (capped at
/// `max_energy`); on an empty stomach energy drains, and at zero the
/// agent is reported dead (removal is the tick engine's job). Below max
/// energy the agent signals hunger by depositing a pheromone at its
/// cell, applied through `executor` so it stages like any other deposit.
pub(crate) fn run_energy_cycle(
    world: &mut World,
    executor: &IntentExecutor,
    agent_id: AgentId,
    rates: EnergyRates,
) -> EnergyOutcome {
    let mut outcome = EnergyOutcome {
        alive: true,
        ..EnergyOutcome::default()
    };
    let Some(agent) = world.agent_mut(agent_id) else {
        return outcome;
    };
    let bb = &mut agent.blackboard;
    let energy = bb.get_u32(keys::ENERGY, 0);
    let max_energy = bb.get_u32(keys::MAX_ENERGY, 0);
    let stomach = bb.get_u32(keys::STOMACH, 0);

    if stomach > 0 {
        let converted = stomach.min(rates.conversion);
        let gain = converted.min(max_energy.saturating_sub(energy));
        bb.set(keys::ENERGY, energy + gain);
        bb.set(keys::STOMACH, stomach - converted);
        outcome.converted = gain;
    } else {
        let loss = energy.min(rates.loss);
        let remaining = energy - loss;
        bb.set(keys::ENERGY, remaining);
        outcome.lost = loss;
        if remaining == 0 {
            bb.set(keys::SIGNALING_HUNGER, false);
            bb.commit();
            outcome.alive = false;
            info!(agent = %agent_id, "agent starved");
            return outcome;
        }
    }

    let hungry = bb.get_u32(keys::ENERGY, 0) < max_energy;
    bb.set(keys::SIGNALING_HUNGER, hungry);
    bb.commit();

    if hungry {
        executor.apply(
            world,
            agent_id,
            vec![Intent::deposit("hunger", rates.hunger_strength)],
        );
        outcome.signaling = true;
    }
    outcome
}

/// Attempt to lay an egg for the queen.
///
/// Preconditions: the laying interval has elapsed, the lifetime egg
/// budget is not exhausted, and energy is at its cap. The brood spawns
/// on the first free 8-neighbour of the queen's cell (fixed scan order);
/// with no free neighbour the attempt defers without consuming the
/// interval or the budget.
pub(crate) fn try_lay_egg(
    world: &mut World,
    queen_id: AgentId,
    config: &BroodConfig,
    tick: TickId,
) -> Option<AgentId> {
    let queen = world.agent(queen_id)?;
    let bb = &queen.blackboard;
    let last_egg = bb.get_i64(keys::LAST_EGG_TICK, 0) as u64;
    let interval = bb.get_i64(keys::EGG_LAYING_INTERVAL, 10) as u64;
    let eggs_laid = bb.get_u32(keys::EGGS_LAID, 0);
    let max_eggs = bb.get_u32(keys::MAX_EGGS, 0);
    let energy = bb.get_u32(keys::ENERGY, 0);
    let max_energy = bb.get_u32(keys::MAX_ENERGY, 0);

    if tick.0.saturating_sub(last_egg) < interval || eggs_laid >= max_eggs || energy < max_energy {
        return None;
    }

    let queen_pos = queen.position();
    let spot = queen_pos.neighbours8().into_iter().find(|&p| world.is_free(p))?;

    let brood_id = world.next_id();
    world
        .insert_agent(Agent::brood(brood_id, spot, config))
        .expect("cell checked free");
    let bb = &mut world.agent_mut(queen_id).expect("queen exists").blackboard;
    bb.set(keys::EGGS_LAID, eggs_laid + 1);
    bb.set(keys::LAST_EGG_TICK, tick.0);
    bb.commit();

    info!(queen = %queen_id, brood = %brood_id, %spot, egg = eggs_laid + 1, "egg laid");
    Some(brood_id)
}

/// Advance brood growth and maturation.
///
/// Growth increments only at full energy. At `maturation_time` the brood
/// is replaced in place by a fresh worker (new id, same cell). Returns
/// the new worker's id on maturation.
pub(crate) fn grow_brood(
    world: &mut World,
    brood_id: AgentId,
    worker_config: &WorkerConfig,
) -> Option<AgentId> {
    let brood = world.agent_mut(brood_id)?;
    let bb = &mut brood.blackboard;
    let energy = bb.get_u32(keys::ENERGY, 0);
    let max_energy = bb.get_u32(keys::MAX_ENERGY, 0);
    let mut growth = bb.get_u32(keys::GROWTH_PROGRESS, 0);
    let maturation_time = bb.get_u32(keys::MATURATION_TIME, u32::MAX);

    if energy >= max_energy {
        growth += 1;
        bb.set(keys::GROWTH_PROGRESS, growth);
        bb.commit();
        debug!(brood = %brood_id, growth, "brood grew");
    }

    if growth < maturation_time {
        return None;
    }

    let position: GridPos = world.agent(brood_id)?.position();
    world.remove_agent(brood_id);
    let worker_id = world.next_id();
    world
        .insert_agent(Agent::worker(worker_id, position, worker_config))
        .expect("brood cell just vacated");
    info!(brood = %brood_id, worker = %worker_id, %position, "brood matured");
    Some(worker_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_core::GridPos;
    use formic_field::PheromoneField;
    use formic_world::QueenConfig;

    fn world() -> World {
        let field = PheromoneField::new(7, 7, &["hunger"], 0.0, 0.0, true).unwrap();
        World::new(7, 7, field).unwrap()
    }

    fn rates() -> EnergyRates {
        EnergyRates {
            conversion: 8,
            loss: 3,
            hunger_strength: 3,
        }
    }

    #[test]
    fn stomach_converts_to_energy_up_to_cap() {
        let mut w = world();
        let id = w.next_id();
        let config = QueenConfig {
            energy: 195,
            max_energy: 200,
            initial_stomach: 20,
            ..QueenConfig::default()
        };
        w.insert_agent(Agent::queen(id, GridPos::new(3, 3), &config))
            .unwrap();
        let ex = IntentExecutor::new();

        let outcome = run_energy_cycle(&mut w, &ex, id, rates());
        // Conversion draws 8 from the stomach but energy caps at 200.
        assert_eq!(outcome.converted, 5);
        assert!(outcome.alive);
        let bb = &w.agent(id).unwrap().blackboard;
        assert_eq!(bb.get_u32(keys::ENERGY, 0), 200);
        assert_eq!(bb.get_u32(keys::STOMACH, 0), 12);
        assert!(!outcome.signaling, "at full energy there is no hunger signal");
    }

    #[test]
    fn empty_stomach_drains_energy_and_signals() {
        let mut w = world();
        let id = w.next_id();
        let config = QueenConfig {
            energy: 10,
            max_energy: 200,
            initial_stomach: 0,
            ..QueenConfig::default()
        };
        w.insert_agent(Agent::queen(id, GridPos::new(3, 3), &config))
            .unwrap();
        let ex = IntentExecutor::new();

        let outcome = run_energy_cycle(&mut w, &ex, id, rates());
        assert_eq!(outcome.lost, 3);
        assert!(outcome.signaling);
        assert!(w.agent(id).unwrap().blackboard.get_bool(keys::SIGNALING_HUNGER, false));

        // The hunger deposit staged at the queen's cell.
        w.advance_pheromones().unwrap();
        assert_eq!(w.field().value_at("hunger", GridPos::new(3, 3)), 3.0);
    }

    #[test]
    fn starvation_is_reported_not_removed() {
        let mut w = world();
        let id = w.next_id();
        let config = QueenConfig {
            energy: 2,
            initial_stomach: 0,
            ..QueenConfig::default()
        };
        w.insert_agent(Agent::queen(id, GridPos::new(3, 3), &config))
            .unwrap();
        let ex = IntentExecutor::new();

        let outcome = run_energy_cycle(&mut w, &ex, id, rates());
        assert!(!outcome.alive);
        // Removal is the tick engine's decision at the safe point.
        assert!(w.agent(id).is_some());
    }

    #[test]
    fn egg_laying_requires_interval_budget_and_full_energy() {
        let mut w = world();
        let id = w.next_id();
        let config = QueenConfig {
            egg_laying_interval: 10,
            max_eggs: 2,
            ..QueenConfig::default()
        };
        w.insert_agent(Agent::queen(id, GridPos::new(3, 3), &config))
            .unwrap();
        let brood_cfg = BroodConfig::default();

        // Interval not yet elapsed at tick 5 (last_egg_tick = 0).
        assert!(try_lay_egg(&mut w, id, &brood_cfg, TickId(5)).is_none());

        let brood = try_lay_egg(&mut w, id, &brood_cfg, TickId(10)).unwrap();
        // First free 8-neighbour in scan order.
        assert_eq!(w.agent(brood).unwrap().position(), GridPos::new(2, 2));
        let bb = &w.agent(id).unwrap().blackboard;
        assert_eq!(bb.get_u32(keys::EGGS_LAID, 0), 1);
        assert_eq!(bb.get_i64(keys::LAST_EGG_TICK, 0), 10);

        // Not full energy: blocked.
        w.agent_mut(id).unwrap().blackboard.set(keys::ENERGY, 150);
        assert!(try_lay_egg(&mut w, id, &brood_cfg, TickId(30)).is_none());
        w.agent_mut(id).unwrap().blackboard.set(keys::ENERGY, 200);

        // Second egg exhausts the budget.
        assert!(try_lay_egg(&mut w, id, &brood_cfg, TickId(30)).is_some());
        assert!(try_lay_egg(&mut w, id, &brood_cfg, TickId(50)).is_none());
    }

    #[test]
    fn egg_laying_defers_when_surrounded() {
        let mut w = world();
        let id = w.next_id();
        w.insert_agent(Agent::queen(id, GridPos::new(3, 3), &QueenConfig::default()))
            .unwrap();
        for pos in GridPos::new(3, 3).neighbours8() {
            w.set_wall(pos);
        }
        assert!(try_lay_egg(&mut w, id, &BroodConfig::default(), TickId(20)).is_none());
        // The interval was not consumed; freeing a cell lets the next
        // attempt succeed immediately.
        let bb = &w.agent(id).unwrap().blackboard;
        assert_eq!(bb.get_i64(keys::LAST_EGG_TICK, 0), 0);
    }

    #[test]
    fn brood_grows_only_at_full_energy_and_matures() {
        let mut w = world();
        let id = w.next_id();
        let config = BroodConfig {
            initial_energy: 100,
            max_energy: 100,
            maturation_time: 2,
            ..BroodConfig::default()
        };
        w.insert_agent(Agent::brood(id, GridPos::new(4, 4), &config))
            .unwrap();
        let worker_cfg = WorkerConfig::default();

        assert!(grow_brood(&mut w, id, &worker_cfg).is_none());
        let worker = grow_brood(&mut w, id, &worker_cfg).unwrap();

        assert!(w.agent(id).is_none(), "brood replaced");
        let new_worker = w.agent(worker).unwrap();
        assert_eq!(new_worker.position(), GridPos::new(4, 4));
        assert_eq!(new_worker.kind(), formic_world::AgentKind::Worker);
    }

    #[test]
    fn hungry_brood_does_not_grow() {
        let mut w = world();
        let id = w.next_id();
        let config = BroodConfig {
            initial_energy: 50,
            max_energy: 100,
            maturation_time: 1,
            ..BroodConfig::default()
        };
        w.insert_agent(Agent::brood(id, GridPos::new(4, 4), &config))
            .unwrap();
        assert!(grow_brood(&mut w, id, &WorkerConfig::default()).is_none());
        assert_eq!(
            w.agent(id).unwrap().blackboard.get_u32(keys::GROWTH_PROGRESS, 9),
            0
        );
    }
}
