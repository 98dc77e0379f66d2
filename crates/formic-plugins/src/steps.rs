//! Basic steps: pure intent producers for foraging colonies.
//!
//! Steps read the blackboard facts the core sensors maintain and emit
//! intents; the executor validates everything, so steps can stay
//! optimistic (a proposed move into a cell that filled up this tick is
//! simply rejected there).

use formic_core::{AgentId, GridPos, Intent, Value};
use formic_plugin::{Params, Step, StepCtx, StepResult};
use rand::Rng;
use serde_json::json;
use tracing::debug;

/// One-cell displacement toward `to`, clamped to the 8-neighbourhood.
fn step_toward(from: GridPos, to: GridPos) -> (i32, i32) {
    ((to.x - from.x).signum(), (to.y - from.y).signum())
}

/// Succeed without doing anything.
pub struct DoNothing;

impl Step for DoNothing {
    fn call(&self, _ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        StepResult::success()
    }
}

/// Wander: move to a random free neighbouring cell.
///
/// Fails when boxed in. Randomness comes from the engine RNG, so runs
/// with the same seed wander identically.
pub struct RandomMove;

impl Step for RandomMove {
    fn call(&self, ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        let free: Vec<GridPos> = ctx
            .agent
            .position()
            .neighbours8()
            .into_iter()
            .filter(|&p| ctx.world.is_free(p))
            .collect();
        if free.is_empty() {
            debug!(agent = %ctx.agent.id(), "random_move boxed in");
            return StepResult::Failure;
        }
        let choice = free[ctx.rng.gen_range(0..free.len())];
        StepResult::running_with([Intent::move_to(choice)])
    }
}

/// Walk one cell toward the food position the detection sensor found.
///
/// Succeeds when standing on it, fails when no food is known.
pub struct MoveToFood;

impl Step for MoveToFood {
    fn call(&self, ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        let Some(food) = ctx.agent.blackboard.get_pos("food_position") else {
            return StepResult::Failure;
        };
        let here = ctx.agent.position();
        if here == food {
            return StepResult::success();
        }
        let (dx, dy) = step_toward(here, food);
        StepResult::running_with([Intent::move_by(dx, dy)])
    }
}

/// Collect food from the current cell into the crop.
///
/// `params.amount` caps the request (default 10). Fails when the cell
/// holds no food.
pub struct CollectFood;

impl Step for CollectFood {
    fn call(&self, ctx: &mut StepCtx<'_>, params: &Params) -> StepResult {
        let here = ctx.agent.position();
        if ctx.world.food_at(here) == 0 {
            return StepResult::Failure;
        }
        let amount = params
            .get("amount")
            .and_then(Value::as_u64)
            .unwrap_or(10) as u32;
        StepResult::running_with([Intent::collect_food(amount)])
    }
}

/// Head home: walk one cell toward the nearest entry.
///
/// Succeeds once inside the nest (per the env-flags sensor), fails when
/// the world has no entries.
pub struct ReturnToNest;

impl Step for ReturnToNest {
    fn call(&self, ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        if ctx.agent.blackboard.get_bool("in_nest", false) {
            return StepResult::success();
        }
        let here = ctx.agent.position();
        let Some(&target) = ctx
            .world
            .entry_positions()
            .iter()
            .min_by_key(|p| here.chebyshev(**p))
        else {
            return StepResult::Failure;
        };
        let (dx, dy) = step_toward(here, target);
        StepResult::running_with([Intent::move_by(dx, dy)])
    }
}

/// Feed the hungry neighbour the neighbour sensor located.
pub struct FeedHungryNeighbour;

impl Step for FeedHungryNeighbour {
    fn call(&self, ctx: &mut StepCtx<'_>, _params: &Params) -> StepResult {
        let Some(target) = ctx
            .agent
            .blackboard
            .get("hungry_neighbor_id")
            .and_then(Value::as_u64)
        else {
            return StepResult::Failure;
        };
        StepResult::running_with([Intent::feed(AgentId(target as u32))])
    }
}

/// Lay pheromone at the current cell.
///
/// `params.ptype` (default `"trail"`) and `params.strength` (default 1).
pub struct DepositTrail;

impl Step for DepositTrail {
    fn call(&self, _ctx: &mut StepCtx<'_>, params: &Params) -> StepResult {
        let ptype = params
            .get("ptype")
            .and_then(Value::as_str)
            .unwrap_or("trail");
        let strength = params
            .get("strength")
            .and_then(Value::as_u64)
            .unwrap_or(1) as u32;
        StepResult::success_with([Intent::deposit(ptype, strength)])
    }
}

/// Legacy-shaped example step, registered through the wire adapter.
///
/// Returns `"IN_PROGRESS"` while `params.busy` is truthy, else a bare
/// `true` — exactly the loose shapes the adapter coerces.
pub fn example_wait_raw(_ctx: &mut StepCtx<'_>, params: &Params) -> Value {
    if params.get("busy").and_then(Value::as_bool).unwrap_or(false) {
        json!("IN_PROGRESS")
    } else {
        json!(true)
    }
}
