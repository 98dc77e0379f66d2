//! Core triggers: blackboard predicates gating behavior-tree branches.
//!
//! All of these read flags the core sensors maintain; none touches the
//! environment. `bb_true` / `bb_false` are the parameterized escape
//! hatch for ad-hoc gates on any key.

use formic_core::Blackboard;
use formic_plugin::{Params, Trigger};

/// Inverts another trigger.
pub struct Not<T: Trigger>(pub T);

impl<T: Trigger> Trigger for Not<T> {
    fn eval(&self, bb: &Blackboard, params: &Params) -> bool {
        !self.0.eval(bb, params)
    }
}

/// The crop has free capacity (`social_hungry` sensor flag).
pub struct SocialHungry;

impl Trigger for SocialHungry {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("social_hungry", false)
    }
}

/// The own stomach is below the hunger threshold.
pub struct IndividualHungry;

impl Trigger for IndividualHungry {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("individual_hungry", false)
    }
}

/// The agent stands on a nest or entry cell.
pub struct InNest;

impl Trigger for InNest {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("in_nest", false)
    }
}

/// The agent stands on an entry cell.
pub struct AtEntry;

impl Trigger for AtEntry {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("at_entry", false)
    }
}

/// The food-detection sensor saw a source in range.
pub struct FoodDetected;

impl Trigger for FoodDetected {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("food_detected", false)
    }
}

/// The neighbour sensor found a hungry agent next to us.
pub struct HungryNeighbourFound;

impl Trigger for HungryNeighbourFound {
    fn eval(&self, bb: &Blackboard, _params: &Params) -> bool {
        bb.get_bool("hungry_neighbor_found", false)
    }
}

/// `params.key` is truthy on the blackboard.
///
/// Truthy follows the dynamic-value convention: `true`, non-zero
/// numbers, non-empty strings/arrays/objects.
pub struct BbTrue;

impl Trigger for BbTrue {
    fn eval(&self, bb: &Blackboard, params: &Params) -> bool {
        let Some(key) = params.get("key").and_then(|v| v.as_str()) else {
            return false;
        };
        bb.get(key).map_or(false, truthy)
    }
}

/// `params.key` is missing or falsy on the blackboard.
pub struct BbFalse;

impl Trigger for BbFalse {
    fn eval(&self, bb: &Blackboard, params: &Params) -> bool {
        let Some(key) = params.get("key").and_then(|v| v.as_str()) else {
            return false;
        };
        !bb.get(key).map_or(false, truthy)
    }
}

fn truthy(value: &formic_core::Value) -> bool {
    use formic_core::Value;
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_core::AgentId;
    use serde_json::json;

    fn bb() -> Blackboard {
        let mut bb = Blackboard::new(AgentId(1));
        bb.set("social_hungry", true);
        bb.set("in_nest", false);
        bb.set("count", 3);
        bb.set("empty", "");
        bb.commit();
        bb
    }

    #[test]
    fn flag_triggers_read_sensor_outputs() {
        let bb = bb();
        let p = Params::new();
        assert!(SocialHungry.eval(&bb, &p));
        assert!(!InNest.eval(&bb, &p));
        assert!(Not(InNest).eval(&bb, &p));
        assert!(!Not(SocialHungry).eval(&bb, &p));
        assert!(!FoodDetected.eval(&bb, &p), "missing key defaults to false");
    }

    #[test]
    fn bb_true_follows_truthiness() {
        let bb = bb();
        let with_key = |k: &str| {
            let mut p = Params::new();
            p.insert("key".into(), json!(k));
            p
        };
        assert!(BbTrue.eval(&bb, &with_key("count")));
        assert!(!BbTrue.eval(&bb, &with_key("empty")));
        assert!(!BbTrue.eval(&bb, &with_key("missing")));
        assert!(BbFalse.eval(&bb, &with_key("missing")));
        assert!(!BbFalse.eval(&bb, &with_key("count")));
        // Without a key parameter both gates refuse.
        assert!(!BbTrue.eval(&bb, &Params::new()));
        assert!(!BbFalse.eval(&bb, &Params::new()));
    }
}
