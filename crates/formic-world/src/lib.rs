//! World state for Formic simulations.
//!
//! The [`World`] owns the cell [`Grid`], the agent registry, and the
//! pheromone field. Agents are stored in an insertion-ordered arena keyed
//! by [`AgentId`](formic_core::AgentId); cells hold `Option<AgentId>`
//! back-indices rather than references, so there are no ownership cycles.
//!
//! Mutation discipline: between ticks only the intent executor and the
//! tick engine mutate the world; sensors, triggers, and behavior-tree
//! steps get shared references.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod agent;
mod cell;
mod error;
mod grid;
mod nest;
mod spatial;
mod world;

pub use agent::{Agent, AgentKind, BroodConfig, QueenConfig, WorkerConfig};
pub use cell::{Cell, CellKind, Food};
pub use error::WorldError;
pub use grid::Grid;
pub use nest::{build_standard_nest, NestLayout};
pub use spatial::SpatialIndex;
pub use world::World;
