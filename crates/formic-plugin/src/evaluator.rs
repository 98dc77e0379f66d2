//! Trigger evaluation with AND/OR composition.

use crate::registry::PluginRegistry;
use crate::traits::Trigger;
use crate::Params;
use formic_core::Blackboard;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a condition combines its trigger results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Logic {
    /// Every trigger must pass (the default).
    #[default]
    And,
    /// At least one trigger must pass.
    Or,
}

impl Logic {
    /// Parse case-insensitively; anything other than `AND`/`OR` is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "AND" => Some(Self::And),
            "OR" => Some(Self::Or),
            _ => None,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "AND"),
            Self::Or => write!(f, "OR"),
        }
    }
}

impl Serialize for Logic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Logic {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Logic::parse(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("logic must be AND or OR, got '{s}'")))
    }
}

/// A trigger reference with optional parameters.
///
/// Deserializes from either a bare string (`"in_nest"`) or a full record
/// (`{"name": "bb_true", "params": {"key": "food_detected"}}`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "TriggerRefRepr")]
pub struct TriggerRef {
    /// The trigger's registered name.
    pub name: String,
    /// Keyword parameters forwarded to the trigger; triggers ignore
    /// unknown keys.
    #[serde(default)]
    pub params: Params,
}

impl TriggerRef {
    /// A reference with no parameters.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Params::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TriggerRefRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        params: Params,
    },
}

impl From<TriggerRefRepr> for TriggerRef {
    fn from(repr: TriggerRefRepr) -> Self {
        match repr {
            TriggerRefRepr::Name(name) => TriggerRef::named(name),
            TriggerRefRepr::Full { name, params } => TriggerRef { name, params },
        }
    }
}

/// Resolves and evaluates triggers against a blackboard.
///
/// Trigger lookups are cached at construction, so per-node evaluation is
/// a map hit. Missing triggers evaluate to `false` with a log line, never
/// an error.
#[derive(Clone)]
pub struct TriggerEvaluator {
    triggers: IndexMap<String, Arc<dyn Trigger>>,
}

impl TriggerEvaluator {
    /// Snapshot all triggers currently in `registry`.
    pub fn new(registry: &PluginRegistry) -> Self {
        let triggers = registry
            .triggers()
            .map(|(name, t)| (name.to_string(), Arc::clone(t)))
            .collect::<IndexMap<_, _>>();
        debug!(count = triggers.len(), "trigger evaluator loaded");
        Self { triggers }
    }

    /// Number of cached triggers.
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    /// Whether no triggers are cached.
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// Evaluate a single trigger. Unknown names are `false`.
    pub fn evaluate(&self, name: &str, bb: &Blackboard, params: &Params) -> bool {
        match self.triggers.get(name) {
            Some(trigger) => {
                let result = trigger.eval(bb, params);
                debug!(trigger = name, result, "trigger evaluated");
                result
            }
            None => {
                warn!(trigger = name, "trigger missing, evaluating to false");
                false
            }
        }
    }

    /// Evaluate a gate of triggers with the given combination logic.
    ///
    /// Returns the combined result plus per-trigger detail. An empty gate
    /// is vacuously `true` under both logics.
    pub fn evaluate_many(
        &self,
        refs: &[TriggerRef],
        bb: &Blackboard,
        logic: Logic,
    ) -> (bool, IndexMap<String, bool>) {
        let mut details = IndexMap::with_capacity(refs.len());
        for r in refs {
            let result = self.evaluate(&r.name, bb, &r.params);
            details.insert(r.name.clone(), result);
        }
        let final_result = match logic {
            _ if details.is_empty() => true,
            Logic::And => details.values().all(|&v| v),
            Logic::Or => details.values().any(|&v| v),
        };
        (final_result, details)
    }
}

impl fmt::Debug for TriggerEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerEvaluator")
            .field("triggers", &self.triggers.keys().collect::<Vec<_>>())
            .finish()
    }
}
