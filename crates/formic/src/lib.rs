//! Formic: a deterministic ant-colony simulation engine.
//!
//! This is the top-level facade crate re-exporting the public API of the
//! Formic workspace. For most users, depending on `formic` alone is
//! enough.
//!
//! # Quick start
//!
//! ```rust
//! use formic::prelude::*;
//!
//! // Register the reference plugin set.
//! let mut registry = PluginRegistry::new();
//! formic::plugins::install_defaults(&mut registry).unwrap();
//!
//! // A colony whose workers wander and lay trail.
//! let config: SimulationConfig = serde_json::from_value(serde_json::json!({
//!     "agents": {"queen_count": 1, "worker_count": 3},
//!     "behavior_tree": {"root": {
//!         "type": "sequence",
//!         "children": [
//!             {"type": "step", "step": {"name": "deposit_trail"}},
//!             {"type": "step", "step": {"name": "random_move"}},
//!         ],
//!     }},
//!     "food_sources": [{"position": [2, 2], "amount": 120}],
//!     "simulation": {"max_cycles": 8, "seed": 7},
//! }))
//! .unwrap();
//!
//! let mut sim = Simulation::new(config, &registry).unwrap();
//! let reports = sim.run().unwrap();
//! assert_eq!(reports.len(), 8);
//! assert_eq!(sim.world().agent_count(), 4);
//! // Trail mass accumulated in the field.
//! assert!(sim.world().field().stats()["trail"].sum > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `formic-core` | IDs, blackboard, intents, reason codes |
//! | [`field`] | `formic-field` | Double-buffered pheromone field |
//! | [`world`] | `formic-world` | Grid, agents, nest, spatial index |
//! | [`plugin`] | `formic-plugin` | Plugin traits, registry, trigger evaluator |
//! | [`bt`] | `formic-bt` | Behavior-tree runtime and builder |
//! | [`engine`] | `formic-engine` | Executor, tick engine, configuration |
//! | [`plugins`] | `formic-plugins` | Reference sensors, triggers, steps |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: IDs, blackboard, intents (`formic-core`).
pub use formic_core as types;

/// Pheromone field engine (`formic-field`).
pub use formic_field as field;

/// World state: grid, agents, nest, spatial index (`formic-world`).
pub use formic_world as world;

/// Plugin traits and the name registry (`formic-plugin`).
pub use formic_plugin as plugin;

/// Behavior-tree runtime (`formic-bt`).
pub use formic_bt as bt;

/// Tick engine, executor, and configuration (`formic-engine`).
pub use formic_engine as engine;

/// Reference plugin library (`formic-plugins`).
pub use formic_plugins as plugins;

/// The types most hosts need, in one import.
pub mod prelude {
    pub use formic_bt::{BuildError, Node, NodeSpec, Status, TickCtx, TreeBuilder};
    pub use formic_core::{
        AgentId, Blackboard, GridPos, Intent, RejectReason, TickId, Value, ValueMap,
    };
    pub use formic_engine::{
        ConfigError, ExecutionReport, IntentExecutor, SensorRunner, Simulation, SimulationConfig,
        TickEngine, TickReport,
    };
    pub use formic_field::{FieldStats, PheromoneField};
    pub use formic_plugin::{
        Logic, Params, PluginManifest, PluginRegistry, Sensor, SensorError, Step, StepCtx,
        StepResult, Trigger, TriggerEvaluator, TriggerRef,
    };
    pub use formic_world::{Agent, AgentKind, Cell, CellKind, World};
}
