//! Core types for the Formic colony simulation engine.
//!
//! This is the leaf crate with zero internal Formic dependencies. It defines
//! the fundamental vocabulary used throughout the workspace: typed IDs and
//! grid coordinates, the per-agent [`Blackboard`], [`Intent`] values with
//! their wire encoding, and the rejection reason codes produced by the
//! intent executor.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blackboard;
pub mod id;
pub mod intent;
pub mod keys;

// Re-export core types at crate root for convenience.
pub use blackboard::{Blackboard, BlackboardDiff, ValueChange};
pub use id::{AgentId, GridPos, TickId};
pub use intent::{Intent, RejectReason, WireError};

/// JSON-representable dynamic value, the currency of blackboards, step
/// parameters, and intent wire records.
pub type Value = serde_json::Value;

/// A string-keyed map of [`Value`]s.
pub type ValueMap = serde_json::Map<String, serde_json::Value>;
