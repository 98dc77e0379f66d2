//! Double-buffered pheromone field engine.
//!
//! [`PheromoneField`] maintains one scalar layer per pheromone type, each
//! backed by three `width × height` `f32` buffers: `front` (the read view
//! published to the rest of the simulation), `back` (the write buffer for
//! the next tick), and `deposit` (staging for amounts laid down during the
//! current tick).
//!
//! Exactly once per global tick, [`PheromoneField::update_and_swap`]:
//!
//! 1. diffuses `front` into `back` with a 4-neighbour stencil under a
//!    Neumann (no-flux) boundary,
//! 2. adds the staged deposits,
//! 3. applies uniform evaporation,
//! 4. clamps to non-negative and swaps the buffers.
//!
//! Readers of [`PheromoneField::field_for`] therefore always observe the
//! buffer published at the end of the previous tick, never a mid-update
//! state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

mod error;
mod field;

pub use error::FieldError;
pub use field::{FieldStats, LayerSummary, PheromoneField};
