//! Plugin seams for the Formic engine.
//!
//! Behavior is extended through three plugin roles, each a trait object
//! resolved by name from the [`PluginRegistry`]:
//!
//! - [`Step`] — behavior-tree leaves; read the world and blackboard,
//!   return a [`StepResult`] carrying intents. Never mutate anything.
//! - [`Trigger`] — boolean predicates over a blackboard; may not consult
//!   the environment.
//! - [`Sensor`] — observers that read the world and produce blackboard
//!   facts; may not mutate.
//!
//! Names are global across all three roles; registration rejects
//! duplicates with a message naming both origins.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod context;
mod evaluator;
mod registry;
mod result;
mod traits;

pub use context::StepCtx;
pub use evaluator::{Logic, TriggerEvaluator, TriggerRef};
pub use registry::{PluginKind, PluginManifest, PluginRegistry, RegistryError};
pub use result::{IntentBatch, StepResult};
pub use traits::{FnSensor, FnStep, FnTrigger, Sensor, SensorError, Step, Trigger, WireStep};

/// Keyword parameters passed to steps and triggers from the tree
/// configuration.
pub type Params = formic_core::ValueMap;
