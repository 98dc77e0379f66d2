//! Centralized intent execution.
//!
//! The executor is the only component that mutates the world and agent
//! blackboards during the Apply phase. Steps only *propose*; everything
//! they propose is validated here, and every outcome — applied or
//! rejected — is recorded on the agent's blackboard and in the returned
//! report. The executor never fails a tick: invalid intents become
//! rejection entries.

#[cfg(test)]
use formic_core::GridPos;
use formic_core::{keys, AgentId, Intent, RejectReason, Value, ValueMap};
use formic_world::World;
use indexmap::IndexMap;
use serde_json::json;
use tracing::{debug, info};

/// An intent the executor applied, with effect details for observability
/// (new position, transferred amount, ...).
#[derive(Clone, Debug, PartialEq)]
pub struct ExecutedIntent {
    /// The applied intent.
    pub intent: Intent,
    /// Effect details, JSON-shaped for the blackboard execution log.
    pub detail: ValueMap,
}

/// An intent the executor refused, with the reason code.
#[derive(Clone, Debug, PartialEq)]
pub struct RejectedIntent {
    /// The refused intent.
    pub intent: Intent,
    /// Why it was refused.
    pub reason: RejectReason,
}

/// Outcome of applying one agent-tick's intent batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExecutionReport {
    /// Applied intents, in application order.
    pub executed: Vec<ExecutedIntent>,
    /// Refused intents, in encounter order.
    pub rejected: Vec<RejectedIntent>,
}

impl ExecutionReport {
    /// Whether a rejection with `reason` is present.
    pub fn rejected_with(&self, reason: RejectReason) -> bool {
        self.rejected.iter().any(|r| r.reason == reason)
    }
}

/// Handler for [`Intent::Custom`] effects.
///
/// Registered per name on the executor; receives the payload and may
/// mutate the world. Whatever it returns lands in the execution log.
/// Custom intents without a handler are no-ops, never rejections.
pub trait CustomHandler: Send + Sync {
    /// Apply the custom effect.
    fn apply(&self, world: &mut World, agent: AgentId, payload: &ValueMap) -> ValueMap;
}

/// Validates and applies intents, enforcing the per-tick invariants.
#[derive(Default)]
pub struct IntentExecutor {
    custom_handlers: IndexMap<String, Box<dyn CustomHandler>>,
}

impl IntentExecutor {
    /// An executor with no custom handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route [`Intent::Custom`] intents named `name` (uppercased on the
    /// wire) to `handler`.
    pub fn register_custom(&mut self, name: impl Into<String>, handler: impl CustomHandler + 'static) {
        self.custom_handlers
            .insert(name.into().to_uppercase(), Box::new(handler));
    }

    /// Clear the per-tick markers on an agent's blackboard: `has_moved`
    /// and the execution log. Runs before the pre-sensor phase.
    pub fn reset_agent_cycle(&self, world: &mut World, agent: AgentId) {
        if let Some(a) = world.agent_mut(agent) {
            a.blackboard.set(keys::HAS_MOVED, false);
            a.blackboard.set(keys::INTENTS_EXECUTED, json!([]));
        }
    }

    /// Apply `intents` for `agent`, in order.
    ///
    /// Enforced across the batch: at most one move per tick, single-cell
    /// Chebyshev steps, bounds, walls, and cell exclusivity. Both
    /// executed and rejected entries are appended to the agent's
    /// `intents_executed` key.
    pub fn apply(&self, world: &mut World, agent: AgentId, intents: Vec<Intent>) -> ExecutionReport {
        let mut report = ExecutionReport::default();
        if world.agent(agent).is_none() {
            return report;
        }

        for intent in intents {
            match intent {
                Intent::Move { .. } => self.apply_move(world, agent, intent, &mut report),
                Intent::Feed { .. } => self.apply_feed(world, agent, intent, &mut report),
                Intent::DepositPheromone { .. } => {
                    self.apply_pheromone(world, agent, intent, &mut report)
                }
                Intent::CollectFood { .. } => {
                    self.apply_collect(world, agent, intent, &mut report)
                }
                Intent::Custom { .. } => self.apply_custom(world, agent, intent, &mut report),
            }
        }

        self.log_to_blackboard(world, agent, &report);
        info!(
            agent = %agent,
            executed = report.executed.len(),
            rejected = report.rejected.len(),
            "intent batch applied"
        );
        report
    }

    fn apply_move(
        &self,
        world: &mut World,
        agent: AgentId,
        intent: Intent,
        report: &mut ExecutionReport,
    ) {
        let Intent::Move { target, delta } = &intent else {
            unreachable!("dispatched on variant");
        };
        let bb_moved = world
            .agent(agent)
            .map(|a| a.blackboard.get_bool(keys::HAS_MOVED, false))
            .unwrap_or(true);
        if bb_moved {
            reject(report, intent.clone(), RejectReason::MoveAlreadyDone);
            return;
        }

        let current = world.agent(agent).expect("checked in apply").position();
        let new_pos = match (target, delta) {
            (Some(_), Some(_)) => {
                reject(report, intent.clone(), RejectReason::AmbiguousMove);
                return;
            }
            (Some(t), None) => *t,
            (None, Some((dx, dy))) => current.offset(*dx, *dy),
            (None, None) => {
                reject(report, intent.clone(), RejectReason::InvalidTarget);
                return;
            }
        };

        if !world.in_bounds(new_pos) {
            reject(report, intent.clone(), RejectReason::OutOfBounds);
            return;
        }
        if current.chebyshev(new_pos) > 1 {
            reject(report, intent.clone(), RejectReason::TooFar);
            return;
        }
        // A move onto the agent's own cell is a valid no-op; it still
        // consumes the per-tick move.
        if new_pos != current && !world.is_free(new_pos) {
            reject(report, intent.clone(), RejectReason::Blocked);
            return;
        }

        world
            .move_agent(agent, new_pos)
            .expect("validated against bounds and occupancy");
        let bb = &mut world.agent_mut(agent).expect("checked in apply").blackboard;
        bb.set(keys::HAS_MOVED, true);

        debug!(agent = %agent, from = %current, to = %new_pos, "move applied");
        report.executed.push(ExecutedIntent {
            intent,
            detail: detail_map(&[
                ("from", json!([current.x, current.y])),
                ("to", json!([new_pos.x, new_pos.y])),
            ]),
        });
    }

    fn apply_feed(
        &self,
        world: &mut World,
        agent: AgentId,
        intent: Intent,
        report: &mut ExecutionReport,
    ) {
        let Intent::Feed { target_id, amount } = &intent else {
            unreachable!("dispatched on variant");
        };
        let (target_id, amount) = (*target_id, *amount);

        let Some(target) = world.agent(target_id) else {
            reject(report, intent.clone(), RejectReason::TargetNotFound);
            return;
        };
        let target_stomach = target.blackboard.get_u32(keys::STOMACH, 0);
        let target_capacity = target.blackboard.get_u32(keys::STOMACH_CAPACITY, 0);
        let free = target_capacity.saturating_sub(target_stomach);

        let social = world
            .agent(agent)
            .expect("checked in apply")
            .blackboard
            .get_u32(keys::SOCIAL_STOMACH, 0);
        if social == 0 {
            reject(report, intent.clone(), RejectReason::NoSocialFood);
            return;
        }
        if free == 0 {
            reject(report, intent.clone(), RejectReason::TargetFull);
            return;
        }

        let mut transfer = social.min(free);
        if let Some(cap) = amount {
            transfer = transfer.min(cap);
        }
        if transfer == 0 {
            reject(report, intent.clone(), RejectReason::NothingToCollect);
            return;
        }

        let bb = &mut world.agent_mut(agent).expect("checked in apply").blackboard;
        bb.set(keys::SOCIAL_STOMACH, social - transfer);
        let target_bb = &mut world
            .agent_mut(target_id)
            .expect("checked above")
            .blackboard;
        target_bb.set(keys::STOMACH, target_stomach + transfer);

        debug!(agent = %agent, target = %target_id, transfer, "feed applied");
        report.executed.push(ExecutedIntent {
            intent,
            detail: detail_map(&[
                ("transferred", json!(transfer)),
                ("target_id", json!(target_id.0)),
            ]),
        });
    }

    fn apply_pheromone(
        &self,
        world: &mut World,
        agent: AgentId,
        intent: Intent,
        report: &mut ExecutionReport,
    ) {
        let Intent::DepositPheromone {
            ptype,
            strength,
            position,
        } = &intent
        else {
            unreachable!("dispatched on variant");
        };
        let pos = match position {
            Some(p) => *p,
            None => world.agent(agent).expect("checked in apply").position(),
        };
        if !world.in_bounds(pos) {
            reject(report, intent.clone(), RejectReason::InvalidPosition);
            return;
        }
        let ptype = ptype.clone();
        let strength = *strength;
        if world
            .field_mut()
            .deposit(&ptype, pos, strength as f32)
            .is_err()
        {
            reject(report, intent.clone(), RejectReason::EnvCellUnavailable);
            return;
        }

        debug!(agent = %agent, ptype = %ptype, %pos, strength, "pheromone staged");
        report.executed.push(ExecutedIntent {
            intent,
            detail: detail_map(&[
                ("ptype", json!(ptype)),
                ("position", json!([pos.x, pos.y])),
                ("strength", json!(strength)),
            ]),
        });
    }

    fn apply_collect(
        &self,
        world: &mut World,
        agent: AgentId,
        intent: Intent,
        report: &mut ExecutionReport,
    ) {
        let Intent::CollectFood { source, amount } = &intent else {
            unreachable!("dispatched on variant");
        };
        let requested = *amount;
        let src = match source {
            Some(p) => *p,
            None => world.agent(agent).expect("checked in apply").position(),
        };
        if !world.in_bounds(src) {
            reject(report, intent.clone(), RejectReason::InvalidSourcePosition);
            return;
        }

        let bb = &world.agent(agent).expect("checked in apply").blackboard;
        let social = bb.get_u32(keys::SOCIAL_STOMACH, 0);
        let capacity = bb.get_u32(keys::SOCIAL_STOMACH_CAPACITY, 0);
        let free = capacity.saturating_sub(social);
        if free == 0 {
            reject(report, intent.clone(), RejectReason::NoCapacity);
            return;
        }

        let available = world.food_at(src);
        if available == 0 {
            reject(report, intent.clone(), RejectReason::NoFood);
            return;
        }

        let collect = requested.min(free).min(available);
        if collect == 0 {
            reject(report, intent.clone(), RejectReason::NothingToCollect);
            return;
        }

        let taken = world.take_food(src, collect);
        let bb = &mut world.agent_mut(agent).expect("checked in apply").blackboard;
        bb.set(keys::SOCIAL_STOMACH, social + taken);

        debug!(agent = %agent, source = %src, taken, "food collected");
        report.executed.push(ExecutedIntent {
            intent,
            detail: detail_map(&[
                ("collected", json!(taken)),
                ("source", json!([src.x, src.y])),
                ("social_stomach", json!(social + taken)),
            ]),
        });
    }

    fn apply_custom(
        &self,
        world: &mut World,
        agent: AgentId,
        intent: Intent,
        report: &mut ExecutionReport,
    ) {
        let Intent::Custom { name, payload } = &intent else {
            unreachable!("dispatched on variant");
        };
        let detail = match self.custom_handlers.get(&name.to_uppercase()) {
            Some(handler) => {
                let payload = payload.clone();
                handler.apply(world, agent, &payload)
            }
            None => detail_map(&[("result", json!("noop"))]),
        };
        report.executed.push(ExecutedIntent { intent, detail });
    }

    /// Append the report to the agent's `intents_executed` log, both
    /// applied and rejected entries.
    fn log_to_blackboard(&self, world: &mut World, agent: AgentId, report: &ExecutionReport) {
        let Some(a) = world.agent_mut(agent) else {
            return;
        };
        let mut log = a
            .blackboard
            .get(keys::INTENTS_EXECUTED)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for e in &report.executed {
            let mut record = ValueMap::new();
            record.insert("intent".into(), e.intent.to_wire());
            record.insert("result".into(), json!("applied"));
            for (k, v) in &e.detail {
                record.insert(k.clone(), v.clone());
            }
            log.push(Value::Object(record));
        }
        for r in &report.rejected {
            log.push(json!({
                "intent": r.intent.to_wire(),
                "result": "rejected",
                "reason": r.reason.as_str(),
            }));
        }
        a.blackboard.set(keys::INTENTS_EXECUTED, Value::Array(log));
        a.blackboard.commit();
    }
}

fn reject(report: &mut ExecutionReport, intent: Intent, reason: RejectReason) {
    debug!(reason = %reason, "intent rejected");
    report.rejected.push(RejectedIntent { intent, reason });
}

fn detail_map(entries: &[(&str, Value)]) -> ValueMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}
