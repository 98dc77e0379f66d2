//! Declarative tree specification and the validating builder.
//!
//! [`NodeSpec`] is the serde-facing shape of a behavior tree, matching the
//! configuration schema: composites carry `children`, conditions carry a
//! `condition` payload, steps carry a `step` payload. [`TreeBuilder`]
//! validates a spec against the plugin registry — aggregating *all*
//! unresolved names into one error — and produces an executable
//! [`Node`] tree with step plugins resolved up front.

use crate::node::Node;
use formic_plugin::{Logic, Params, PluginRegistry, TriggerRef};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Condition payload: triggers plus combination logic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionSpec {
    /// Triggers, each a bare name or a `{name, params}` record.
    #[serde(default)]
    pub triggers: Vec<TriggerRef>,
    /// AND (default) or OR, case-insensitive.
    #[serde(default)]
    pub logic: Logic,
}

/// Step payload: plugin name plus parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepSpec {
    /// Registered step plugin name.
    pub name: String,
    /// Parameters forwarded to the plugin on every invocation.
    #[serde(default)]
    pub params: Params,
}

/// Declarative node shape, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeSpec {
    /// `{"type": "sequence", "children": [...]}`
    #[serde(alias = "seq")]
    Sequence {
        /// Optional trace label; defaults to the node type.
        #[serde(default)]
        name: Option<String>,
        /// Child specs; must be non-empty.
        children: Vec<NodeSpec>,
    },
    /// `{"type": "selector", "children": [...]}`
    #[serde(alias = "sel")]
    Selector {
        /// Optional trace label; defaults to the node type.
        #[serde(default)]
        name: Option<String>,
        /// Child specs; must be non-empty.
        children: Vec<NodeSpec>,
    },
    /// `{"type": "condition", "condition": {"triggers": [...], "logic": "AND"}}`
    #[serde(alias = "cond")]
    Condition {
        /// Optional trace label; defaults to the node type.
        #[serde(default)]
        name: Option<String>,
        /// The gate payload.
        condition: ConditionSpec,
    },
    /// `{"type": "step", "step": {"name": ..., "params": {...}}}`
    #[serde(alias = "leaf")]
    Step {
        /// Optional trace label; defaults to the step plugin name.
        #[serde(default)]
        name: Option<String>,
        /// The step payload.
        step: StepSpec,
    },
}

/// Errors from building a tree out of a [`NodeSpec`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BuildError {
    /// The spec referenced names or shapes the registry cannot satisfy.
    ///
    /// Everything wrong with the spec is aggregated here so a user fixes
    /// one round of errors, not one error per round.
    InvalidSpec {
        /// Step names that did not resolve.
        unresolved_steps: Vec<String>,
        /// Trigger names that did not resolve.
        unresolved_triggers: Vec<String>,
        /// Labels of composite nodes with no children.
        empty_composites: Vec<String>,
    },
}

impl BuildError {
    fn is_empty(&self) -> bool {
        let BuildError::InvalidSpec {
            unresolved_steps,
            unresolved_triggers,
            empty_composites,
        } = self;
        unresolved_steps.is_empty() && unresolved_triggers.is_empty() && empty_composites.is_empty()
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let BuildError::InvalidSpec {
            unresolved_steps,
            unresolved_triggers,
            empty_composites,
        } = self;
        write!(f, "invalid behavior tree spec:")?;
        if !unresolved_steps.is_empty() {
            write!(f, " unresolved steps [{}];", unresolved_steps.join(", "))?;
        }
        if !unresolved_triggers.is_empty() {
            write!(
                f,
                " unresolved triggers [{}];",
                unresolved_triggers.join(", ")
            )?;
        }
        if !empty_composites.is_empty() {
            write!(
                f,
                " composites without children [{}];",
                empty_composites.join(", ")
            )?;
        }
        Ok(())
    }
}

impl Error for BuildError {}

/// Builds executable trees from specs, resolving plugins eagerly.
pub struct TreeBuilder<'a> {
    registry: &'a PluginRegistry,
}

impl<'a> TreeBuilder<'a> {
    /// A builder resolving against `registry`.
    pub fn new(registry: &'a PluginRegistry) -> Self {
        Self { registry }
    }

    /// Validate `spec` and construct the tree.
    ///
    /// All problems are collected before failing: unresolved step and
    /// trigger names and childless composites come back in a single
    /// [`BuildError::InvalidSpec`].
    pub fn build(&self, spec: &NodeSpec) -> Result<Node, BuildError> {
        let mut problems = BuildError::InvalidSpec {
            unresolved_steps: Vec::new(),
            unresolved_triggers: Vec::new(),
            empty_composites: Vec::new(),
        };
        self.collect_problems(spec, &mut problems);
        if !problems.is_empty() {
            return Err(problems);
        }
        Ok(self.construct(spec))
    }

    fn collect_problems(&self, spec: &NodeSpec, problems: &mut BuildError) {
        match spec {
            NodeSpec::Sequence { name, children } | NodeSpec::Selector { name, children } => {
                if children.is_empty() {
                    let BuildError::InvalidSpec {
                        empty_composites, ..
                    } = problems;
                    empty_composites.push(label(name, spec));
                }
                for child in children {
                    self.collect_problems(child, problems);
                }
            }
            NodeSpec::Condition { condition, .. } => {
                let BuildError::InvalidSpec {
                    unresolved_triggers,
                    ..
                } = problems;
                for t in &condition.triggers {
                    if self.registry.get_trigger(&t.name).is_none()
                        && !unresolved_triggers.contains(&t.name)
                    {
                        unresolved_triggers.push(t.name.clone());
                    }
                }
            }
            NodeSpec::Step { step, .. } => {
                let BuildError::InvalidSpec {
                    unresolved_steps, ..
                } = problems;
                if self.registry.get_step(&step.name).is_none()
                    && !unresolved_steps.contains(&step.name)
                {
                    unresolved_steps.push(step.name.clone());
                }
            }
        }
    }

    fn construct(&self, spec: &NodeSpec) -> Node {
        match spec {
            NodeSpec::Sequence { name, children } => Node::sequence(
                label(name, spec),
                children.iter().map(|c| self.construct(c)).collect(),
            ),
            NodeSpec::Selector { name, children } => Node::selector(
                label(name, spec),
                children.iter().map(|c| self.construct(c)).collect(),
            ),
            NodeSpec::Condition { name, condition } => Node::condition(
                label(name, spec),
                condition.triggers.clone(),
                condition.logic,
            ),
            NodeSpec::Step { name, step } => {
                let plugin = self
                    .registry
                    .get_step(&step.name)
                    .expect("validated before construction");
                Node::step(
                    name.clone().unwrap_or_else(|| step.name.clone()),
                    step.name.clone(),
                    plugin,
                    step.params.clone(),
                )
            }
        }
    }
}

fn label(name: &Option<String>, spec: &NodeSpec) -> String {
    name.clone().unwrap_or_else(|| {
        match spec {
            NodeSpec::Sequence { .. } => "sequence",
            NodeSpec::Selector { .. } => "selector",
            NodeSpec::Condition { .. } => "condition",
            NodeSpec::Step { step, .. } => return step.name.clone(),
        }
        .to_string()
    })
}
