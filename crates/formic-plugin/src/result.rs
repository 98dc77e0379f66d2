//! Step results and the legacy wire-shape adapter.

use formic_core::{Intent, Value};
use smallvec::SmallVec;

/// Small batch of intents produced by a single leaf; most steps emit
/// zero, one, or two.
pub type IntentBatch = SmallVec<[Intent; 2]>;

/// Outcome of a step invocation.
///
/// `Running` is a logical status only; no coroutine suspends. Steps that
/// span multiple ticks keep their progress on the blackboard and return
/// `Running` each tick. A failing step contributes no intents.
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// The step completed; its intents (possibly none) are collected.
    Success(IntentBatch),
    /// The step failed; nothing is collected.
    Failure,
    /// The step is still working; its intents are collected.
    Running(IntentBatch),
}

impl StepResult {
    /// Success with no intents.
    pub fn success() -> Self {
        Self::Success(IntentBatch::new())
    }

    /// Success carrying intents.
    pub fn success_with(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self::Success(intents.into_iter().collect())
    }

    /// Running with no intents.
    pub fn running() -> Self {
        Self::Running(IntentBatch::new())
    }

    /// Running carrying intents.
    pub fn running_with(intents: impl IntoIterator<Item = Intent>) -> Self {
        Self::Running(intents.into_iter().collect())
    }

    /// The intents this result contributes.
    pub fn intents(&self) -> &[Intent] {
        match self {
            Self::Success(i) | Self::Running(i) => i,
            Self::Failure => &[],
        }
    }

    /// Interpret a loosely-shaped step return value.
    ///
    /// Accepted shapes, matching the legacy plugin convention:
    ///
    /// - `{"status": S, "intents": [...]}` — honours `S`; collects intents
    /// - `{"status": S}` — honours `S`
    /// - `[intent, ...]` — `Running` with those intents
    /// - a single intent record — `Running` with one intent
    /// - `true` / `false` / `null` — `Success` / `Failure` / `Failure`
    /// - `"SUCCESS"` / `"FAILURE"` / `"RUNNING"` — that status
    /// - `"IN_PROGRESS"` / `"RUN"` — `Running`
    /// - anything else — `Failure` (conservative)
    ///
    /// `S` may be a status string (as above) or a boolean. Intents that
    /// fail to decode are dropped; a failure status drops its intents
    /// entirely.
    pub fn from_wire(value: &Value) -> Self {
        match value {
            Value::Object(obj) if obj.contains_key("status") => {
                let intents = match obj.get("intents") {
                    None | Some(Value::Null) => IntentBatch::new(),
                    Some(Value::Array(items)) => collect_intents(items),
                    Some(single) => collect_intents(std::slice::from_ref(single)),
                };
                match &obj["status"] {
                    Value::String(s) => match status_from_str(s) {
                        Some(Coerced::Success) => Self::Success(intents),
                        Some(Coerced::Running) => Self::Running(intents),
                        _ => Self::Failure,
                    },
                    Value::Bool(true) => Self::Success(intents),
                    _ => Self::Failure,
                }
            }
            Value::Object(obj) if obj.contains_key("type") => {
                match Intent::from_wire(value) {
                    Ok(intent) => Self::Running(IntentBatch::from_iter([intent])),
                    Err(_) => Self::Failure,
                }
            }
            Value::Array(items) => Self::Running(collect_intents(items)),
            Value::String(s) => match status_from_str(s) {
                Some(Coerced::Success) => Self::success(),
                Some(Coerced::Running) => Self::running(),
                _ => Self::Failure,
            },
            Value::Bool(true) => Self::success(),
            _ => Self::Failure,
        }
    }
}

enum Coerced {
    Success,
    Failure,
    Running,
}

fn status_from_str(s: &str) -> Option<Coerced> {
    match s.to_uppercase().as_str() {
        "SUCCESS" => Some(Coerced::Success),
        "FAILURE" => Some(Coerced::Failure),
        "RUNNING" | "IN_PROGRESS" | "RUN" => Some(Coerced::Running),
        _ => None,
    }
}

fn collect_intents(items: &[Value]) -> IntentBatch {
    items
        .iter()
        .filter_map(|v| Intent::from_wire(v).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use formic_core::GridPos;
    use serde_json::json;

    #[test]
    fn status_object_with_intents() {
        let wire = json!({
            "status": "SUCCESS",
            "intents": [{"type": "MOVE", "payload": {"delta": [1, 0]}}],
        });
        let result = StepResult::from_wire(&wire);
        assert_eq!(
            result,
            StepResult::success_with([Intent::move_by(1, 0)])
        );
    }

    #[test]
    fn status_object_single_intent_not_in_list() {
        let wire = json!({
            "status": "RUNNING",
            "intents": {"type": "PHEROMONE", "payload": {"ptype": "trail", "strength": 2}},
        });
        assert_eq!(
            StepResult::from_wire(&wire),
            StepResult::running_with([Intent::deposit("trail", 2)])
        );
    }

    #[test]
    fn failure_status_drops_its_intents() {
        let wire = json!({
            "status": "FAILURE",
            "intents": [{"type": "MOVE", "payload": {"delta": [1, 0]}}],
        });
        assert_eq!(StepResult::from_wire(&wire), StepResult::Failure);
    }

    #[test]
    fn bare_intent_list_defaults_to_running() {
        let wire = json!([
            {"type": "MOVE", "payload": {"target": [2, 2]}},
            {"type": "COLLECT_FOOD", "payload": {"amount": 5}},
        ]);
        let result = StepResult::from_wire(&wire);
        assert!(matches!(&result, StepResult::Running(i) if i.len() == 2));
        assert_eq!(result.intents()[0], Intent::move_to(GridPos::new(2, 2)));
    }

    #[test]
    fn single_intent_record_defaults_to_running() {
        let wire = json!({"type": "FEED", "payload": {"target_id": 3}});
        assert!(matches!(StepResult::from_wire(&wire), StepResult::Running(i) if i.len() == 1));
    }

    #[test]
    fn booleans_and_null() {
        assert_eq!(StepResult::from_wire(&json!(true)), StepResult::success());
        assert_eq!(StepResult::from_wire(&json!(false)), StepResult::Failure);
        assert_eq!(StepResult::from_wire(&Value::Null), StepResult::Failure);
    }

    #[test]
    fn status_strings_including_legacy_aliases() {
        assert_eq!(StepResult::from_wire(&json!("success")), StepResult::success());
        assert_eq!(StepResult::from_wire(&json!("IN_PROGRESS")), StepResult::running());
        assert_eq!(StepResult::from_wire(&json!("RUN")), StepResult::running());
        assert_eq!(StepResult::from_wire(&json!("FAILURE")), StepResult::Failure);
        assert_eq!(StepResult::from_wire(&json!("bogus")), StepResult::Failure);
    }

    #[test]
    fn boolean_status_field() {
        assert_eq!(
            StepResult::from_wire(&json!({"status": true})),
            StepResult::success()
        );
        assert_eq!(
            StepResult::from_wire(&json!({"status": false})),
            StepResult::Failure
        );
        assert_eq!(
            StepResult::from_wire(&json!({"status": null})),
            StepResult::Failure
        );
    }

    #[test]
    fn unknown_shapes_are_conservative_failures() {
        assert_eq!(StepResult::from_wire(&json!(42)), StepResult::Failure);
        assert_eq!(StepResult::from_wire(&json!({"foo": 1})), StepResult::Failure);
    }

    #[test]
    fn malformed_intents_are_dropped_not_fatal() {
        let wire = json!({
            "status": "SUCCESS",
            "intents": [
                {"type": "MOVE", "payload": {"target": "oops"}},
                {"type": "MOVE", "payload": {"target": [1, 1]}},
            ],
        });
        let result = StepResult::from_wire(&wire);
        assert_eq!(result.intents().len(), 1);
    }
}
