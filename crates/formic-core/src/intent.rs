//! Intents: declarative world-mutation requests produced by behavior-tree
//! leaves and consumed by the intent executor.
//!
//! Steps never mutate the world; they emit [`Intent`] values which the
//! executor validates and applies. Each intent also has a canonical wire
//! encoding (`{"type": ..., "payload": {...}}`) used when intents cross a
//! serialization boundary, e.g. legacy step adapters or the per-tick
//! execution log on the blackboard.

use crate::id::{AgentId, GridPos};
use crate::{Value, ValueMap};
use serde_json::json;
use std::error::Error;
use std::fmt;

/// A declarative request to mutate the world.
///
/// Produced inside a step, consumed by the executor within the same tick;
/// never persisted.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Move one cell, by absolute `target` or relative `delta`.
    ///
    /// Exactly one of the two must be set; the executor rejects an intent
    /// carrying both (`ambiguous_move`) or neither (`invalid_target`).
    Move {
        /// Absolute destination cell.
        target: Option<GridPos>,
        /// Relative displacement from the agent's current cell.
        delta: Option<(i32, i32)>,
    },
    /// Transfer food from the agent's social stomach to another agent.
    Feed {
        /// The receiving agent.
        target_id: AgentId,
        /// Optional cap on the transferred amount.
        amount: Option<u32>,
    },
    /// Stage a pheromone deposit, applied at the end-of-tick field swap.
    DepositPheromone {
        /// Pheromone type name.
        ptype: String,
        /// Deposit strength.
        strength: u32,
        /// Deposit cell; the agent's current cell if `None`.
        position: Option<GridPos>,
    },
    /// Collect food from a cell into the agent's social stomach.
    CollectFood {
        /// Source cell; the agent's current cell if `None`.
        source: Option<GridPos>,
        /// Requested amount; clamped to capacity and availability.
        amount: u32,
    },
    /// Environment-specific effect routed to registered custom handlers.
    /// Unknown customs are applied as no-ops, never rejected.
    Custom {
        /// Handler name (uppercased on the wire).
        name: String,
        /// Opaque payload forwarded to the handler.
        payload: ValueMap,
    },
}

impl Intent {
    /// Move to an absolute cell.
    pub fn move_to(target: GridPos) -> Self {
        Intent::Move {
            target: Some(target),
            delta: None,
        }
    }

    /// Move by a relative displacement.
    pub fn move_by(dx: i32, dy: i32) -> Self {
        Intent::Move {
            target: None,
            delta: Some((dx, dy)),
        }
    }

    /// Feed `target_id` with no explicit cap.
    pub fn feed(target_id: AgentId) -> Self {
        Intent::Feed {
            target_id,
            amount: None,
        }
    }

    /// Deposit `strength` units of `ptype` at the agent's current cell.
    pub fn deposit(ptype: impl Into<String>, strength: u32) -> Self {
        Intent::DepositPheromone {
            ptype: ptype.into(),
            strength,
            position: None,
        }
    }

    /// Collect up to `amount` food from the agent's current cell.
    pub fn collect_food(amount: u32) -> Self {
        Intent::CollectFood {
            source: None,
            amount,
        }
    }

    /// The wire type tag for this intent (`"MOVE"`, `"FEED"`,
    /// `"PHEROMONE"`, `"COLLECT_FOOD"`, or the uppercased custom name).
    pub fn wire_type(&self) -> String {
        match self {
            Intent::Move { .. } => "MOVE".to_string(),
            Intent::Feed { .. } => "FEED".to_string(),
            Intent::DepositPheromone { .. } => "PHEROMONE".to_string(),
            Intent::CollectFood { .. } => "COLLECT_FOOD".to_string(),
            Intent::Custom { name, .. } => name.to_uppercase(),
        }
    }

    /// Encode as the canonical wire record `{"type": ..., "payload": ...}`.
    pub fn to_wire(&self) -> Value {
        let payload = match self {
            Intent::Move { target, delta } => {
                let mut p = ValueMap::new();
                if let Some(t) = target {
                    p.insert("target".into(), json!([t.x, t.y]));
                }
                if let Some((dx, dy)) = delta {
                    p.insert("delta".into(), json!([dx, dy]));
                }
                Value::Object(p)
            }
            Intent::Feed { target_id, amount } => json!({
                "target_id": target_id.0,
                "amount": amount,
            }),
            Intent::DepositPheromone {
                ptype,
                strength,
                position,
            } => {
                let mut p = ValueMap::new();
                p.insert("ptype".into(), json!(ptype));
                p.insert("strength".into(), json!(strength));
                if let Some(pos) = position {
                    p.insert("position".into(), json!([pos.x, pos.y]));
                }
                Value::Object(p)
            }
            Intent::CollectFood { source, amount } => {
                let mut p = ValueMap::new();
                if let Some(src) = source {
                    p.insert("source".into(), json!([src.x, src.y]));
                }
                p.insert("amount".into(), json!(amount));
                Value::Object(p)
            }
            Intent::Custom { payload, .. } => Value::Object(payload.clone()),
        };
        json!({ "type": self.wire_type(), "payload": payload })
    }

    /// Decode a wire record into a typed intent.
    ///
    /// Accepts the four core types plus arbitrary custom tags; a record
    /// with an unknown tag becomes [`Intent::Custom`]. For `COLLECT_FOOD`,
    /// the legacy payload keys `position` and `food_position` are accepted
    /// as aliases for `source`.
    pub fn from_wire(value: &Value) -> Result<Self, WireError> {
        let obj = value.as_object().ok_or(WireError::NotARecord)?;
        let wire_type = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(WireError::MissingType)?
            .to_uppercase();
        let empty = ValueMap::new();
        let payload = obj
            .get("payload")
            .and_then(Value::as_object)
            .unwrap_or(&empty);

        match wire_type.as_str() {
            "MOVE" => Ok(Intent::Move {
                target: read_pos(payload, "target")?,
                delta: read_pos(payload, "delta")?.map(|p| (p.x, p.y)),
            }),
            "FEED" => {
                let target_id = payload
                    .get("target_id")
                    .and_then(Value::as_u64)
                    .ok_or_else(|| WireError::bad_payload("FEED requires target_id"))?;
                let amount = payload
                    .get("amount")
                    .and_then(Value::as_u64)
                    .map(|a| a as u32);
                Ok(Intent::Feed {
                    target_id: AgentId(target_id as u32),
                    amount,
                })
            }
            "PHEROMONE" => {
                let ptype = payload
                    .get("ptype")
                    .and_then(Value::as_str)
                    .ok_or_else(|| WireError::bad_payload("PHEROMONE requires ptype"))?;
                let strength = payload
                    .get("strength")
                    .and_then(Value::as_u64)
                    .unwrap_or(1) as u32;
                Ok(Intent::DepositPheromone {
                    ptype: ptype.to_string(),
                    strength,
                    position: read_pos(payload, "position")?,
                })
            }
            "COLLECT_FOOD" => {
                let source = match read_pos(payload, "source")? {
                    Some(p) => Some(p),
                    None => match read_pos(payload, "food_position")? {
                        Some(p) => Some(p),
                        None => read_pos(payload, "position")?,
                    },
                };
                let amount = payload
                    .get("amount")
                    .and_then(Value::as_u64)
                    .unwrap_or(10) as u32;
                Ok(Intent::CollectFood { source, amount })
            }
            other => Ok(Intent::Custom {
                name: other.to_string(),
                payload: payload.clone(),
            }),
        }
    }
}

/// Read an optional `[x, y]` pair from a payload map.
fn read_pos(payload: &ValueMap, key: &str) -> Result<Option<GridPos>, WireError> {
    let Some(raw) = payload.get(key) else {
        return Ok(None);
    };
    if raw.is_null() {
        return Ok(None);
    }
    let arr = raw
        .as_array()
        .filter(|a| a.len() == 2)
        .ok_or_else(|| WireError::bad_payload(format!("{key} must be a [x, y] pair")))?;
    let (x, y) = match (arr[0].as_i64(), arr[1].as_i64()) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            return Err(WireError::bad_payload(format!(
                "{key} coordinates must be integers"
            )))
        }
    };
    Ok(Some(GridPos::new(x as i32, y as i32)))
}

/// Error decoding an intent wire record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WireError {
    /// The value was not a JSON object.
    NotARecord,
    /// The record had no string `type` field.
    MissingType,
    /// The payload was malformed for the given type.
    BadPayload {
        /// Description of the problem.
        reason: String,
    },
}

impl WireError {
    fn bad_payload(reason: impl Into<String>) -> Self {
        WireError::BadPayload {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotARecord => write!(f, "intent record must be a JSON object"),
            Self::MissingType => write!(f, "intent record missing 'type'"),
            Self::BadPayload { reason } => write!(f, "bad intent payload: {reason}"),
        }
    }
}

impl Error for WireError {}

/// Why the executor rejected an intent.
///
/// Rejections are recoverable run-time outcomes, recorded on the blackboard
/// and in the tick report; they never abort a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// Move target outside the grid.
    OutOfBounds,
    /// Move target further than one cell (Chebyshev distance > 1).
    TooFar,
    /// Move target is a wall or an occupied cell.
    Blocked,
    /// A move was already executed for this agent this tick.
    MoveAlreadyDone,
    /// Move carried both a target and a delta.
    AmbiguousMove,
    /// Move target missing or unusable.
    InvalidTarget,
    /// Move delta unusable.
    InvalidDelta,
    /// Feed target does not exist.
    TargetNotFound,
    /// Feeding agent has an empty social stomach.
    NoSocialFood,
    /// Feed target has no free stomach capacity.
    TargetFull,
    /// No food at the collect source cell.
    NoFood,
    /// Collecting agent has no free social stomach capacity.
    NoCapacity,
    /// Requested, free, and available amounts intersect at zero.
    NothingToCollect,
    /// Collect source cell outside the grid.
    InvalidSourcePosition,
    /// Pheromone deposit position outside the grid.
    InvalidPosition,
    /// Pheromone deposit could not be staged (e.g. unknown type with
    /// dynamic types disabled).
    EnvCellUnavailable,
}

impl RejectReason {
    /// The stable snake_case code used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfBounds => "out_of_bounds",
            Self::TooFar => "too_far",
            Self::Blocked => "blocked",
            Self::MoveAlreadyDone => "move_already_done",
            Self::AmbiguousMove => "ambiguous_move",
            Self::InvalidTarget => "invalid_target",
            Self::InvalidDelta => "invalid_delta",
            Self::TargetNotFound => "target_not_found",
            Self::NoSocialFood => "no_social_food",
            Self::TargetFull => "target_full",
            Self::NoFood => "no_food",
            Self::NoCapacity => "no_capacity",
            Self::NothingToCollect => "nothing_to_collect",
            Self::InvalidSourcePosition => "invalid_source_position",
            Self::InvalidPosition => "invalid_position",
            Self::EnvCellUnavailable => "env_cell_unavailable",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_round_trips_through_wire() {
        let intent = Intent::move_to(GridPos::new(3, 2));
        let wire = intent.to_wire();
        assert_eq!(wire["type"], "MOVE");
        assert_eq!(wire["payload"]["target"], json!([3, 2]));
        assert_eq!(Intent::from_wire(&wire).unwrap(), intent);
    }

    #[test]
    fn delta_move_round_trips() {
        let intent = Intent::move_by(-1, 1);
        let back = Intent::from_wire(&intent.to_wire()).unwrap();
        assert_eq!(back, intent);
    }

    #[test]
    fn feed_amount_is_optional() {
        let wire = json!({"type": "FEED", "payload": {"target_id": 4}});
        let intent = Intent::from_wire(&wire).unwrap();
        assert_eq!(
            intent,
            Intent::Feed {
                target_id: AgentId(4),
                amount: None
            }
        );
    }

    #[test]
    fn pheromone_defaults_strength_and_position() {
        let wire = json!({"type": "PHEROMONE", "payload": {"ptype": "trail"}});
        let intent = Intent::from_wire(&wire).unwrap();
        assert_eq!(intent, Intent::deposit("trail", 1));
    }

    #[test]
    fn collect_food_accepts_position_aliases() {
        for key in ["source", "food_position", "position"] {
            let wire = json!({
                "type": "COLLECT_FOOD",
                "payload": {key: [5, 6], "amount": 3},
            });
            let intent = Intent::from_wire(&wire).unwrap();
            assert_eq!(
                intent,
                Intent::CollectFood {
                    source: Some(GridPos::new(5, 6)),
                    amount: 3
                }
            );
        }
    }

    #[test]
    fn unknown_type_becomes_custom() {
        let wire = json!({"type": "dig_tunnel", "payload": {"depth": 2}});
        match Intent::from_wire(&wire).unwrap() {
            Intent::Custom { name, payload } => {
                assert_eq!(name, "DIG_TUNNEL");
                assert_eq!(payload.get("depth"), Some(&json!(2)));
            }
            other => panic!("expected Custom, got {other:?}"),
        }
    }

    #[test]
    fn missing_type_is_an_error() {
        assert_eq!(
            Intent::from_wire(&json!({"payload": {}})),
            Err(WireError::MissingType)
        );
        assert_eq!(Intent::from_wire(&json!(42)), Err(WireError::NotARecord));
    }

    #[test]
    fn malformed_pair_is_rejected() {
        let wire = json!({"type": "MOVE", "payload": {"target": [1, 2, 3]}});
        assert!(matches!(
            Intent::from_wire(&wire),
            Err(WireError::BadPayload { .. })
        ));
    }

    #[test]
    fn reject_reason_codes_are_snake_case() {
        assert_eq!(RejectReason::MoveAlreadyDone.as_str(), "move_already_done");
        assert_eq!(RejectReason::EnvCellUnavailable.to_string(), "env_cell_unavailable");
    }
}
