//! The three plugin traits and adapters for function-style plugins.

use crate::context::StepCtx;
use crate::result::StepResult;
use crate::Params;
use formic_core::{Blackboard, Value, ValueMap};
use formic_world::{Agent, World};
use std::error::Error;
use std::fmt;

/// A behavior-tree leaf: reads the world, proposes intents.
///
/// Steps must not mutate the environment or any blackboard; the shared
/// references in [`StepCtx`] make that structural.
pub trait Step: Send + Sync {
    /// Run the step for the agent in `ctx` with the node's parameters.
    fn call(&self, ctx: &mut StepCtx<'_>, params: &Params) -> StepResult;
}

/// A boolean predicate over a blackboard.
///
/// Triggers are read-only and may not consult the environment; unknown
/// parameters are ignored.
pub trait Trigger: Send + Sync {
    /// Evaluate the predicate.
    fn eval(&self, bb: &Blackboard, params: &Params) -> bool;
}

/// Failure surfaced by a sensor; converted to an empty reading and a log
/// line by the sensor runner, never propagated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SensorError {
    /// Human-readable description.
    pub reason: String,
}

impl SensorError {
    /// Construct from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor failed: {}", self.reason)
    }
}

impl Error for SensorError {}

/// A pure observer producing blackboard facts.
///
/// Sensors read the environment (including the shared spatial index) and
/// the agent's blackboard, and return key→value facts to merge. They do
/// not mutate anything and do not emit intents.
pub trait Sensor: Send + Sync {
    /// Compute this sensor's facts for `agent`.
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError>;
}

// ── Function adapters ───────────────────────────────────────────────
//
// Plugins that are a single function can be registered without a named
// struct. Fixtures and tests lean on these heavily.

/// Wrap a closure as a [`Step`].
pub struct FnStep<F>(pub F);

impl<F> Step for FnStep<F>
where
    F: Fn(&mut StepCtx<'_>, &Params) -> StepResult + Send + Sync,
{
    fn call(&self, ctx: &mut StepCtx<'_>, params: &Params) -> StepResult {
        (self.0)(ctx, params)
    }
}

/// Wrap a closure as a [`Trigger`].
pub struct FnTrigger<F>(pub F);

impl<F> Trigger for FnTrigger<F>
where
    F: Fn(&Blackboard, &Params) -> bool + Send + Sync,
{
    fn eval(&self, bb: &Blackboard, params: &Params) -> bool {
        (self.0)(bb, params)
    }
}

/// Wrap a closure as a [`Sensor`].
pub struct FnSensor<F>(pub F);

impl<F> Sensor for FnSensor<F>
where
    F: Fn(&Agent, &World) -> Result<ValueMap, SensorError> + Send + Sync,
{
    fn sense(&self, agent: &Agent, world: &World) -> Result<ValueMap, SensorError> {
        (self.0)(agent, world)
    }
}

/// Adapter for legacy steps that return loosely-shaped JSON instead of a
/// typed [`StepResult`]; the value is coerced via
/// [`StepResult::from_wire`].
pub struct WireStep<F>(pub F);

impl<F> Step for WireStep<F>
where
    F: Fn(&mut StepCtx<'_>, &Params) -> Value + Send + Sync,
{
    fn call(&self, ctx: &mut StepCtx<'_>, params: &Params) -> StepResult {
        StepResult::from_wire(&(self.0)(ctx, params))
    }
}
