//! Behavior-tree runtime for the Formic engine.
//!
//! A tree is built once from a validated [`NodeSpec`] and evaluated once
//! per agent per tick. Evaluation is pure with respect to the world:
//! [`TickCtx`] hands nodes shared references only, and leaves communicate
//! exclusively by appending [`Intent`](formic_core::Intent)s to the
//! context. `Running` is a status value, not a suspension; steps that
//! span ticks park their progress on the blackboard.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod ctx;
mod node;
mod spec;
mod status;

pub use ctx::TickCtx;
pub use node::Node;
pub use spec::{BuildError, ConditionSpec, NodeSpec, StepSpec, TreeBuilder};
pub use status::Status;
