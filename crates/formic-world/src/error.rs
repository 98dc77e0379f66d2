//! Error type for world construction and mutation.

use formic_core::{AgentId, GridPos};
use std::error::Error;
use std::fmt;

/// Errors from world construction and agent placement.
///
/// These are engine-invariant violations (bug class) or invalid setup
/// input; recoverable run-time outcomes are intent rejections, not errors.
#[derive(Clone, Debug, PartialEq)]
pub enum WorldError {
    /// Grid width or height is zero.
    InvalidSize {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Pheromone field dimensions do not match the grid.
    FieldSizeMismatch {
        /// Grid dimensions.
        grid: (u32, u32),
        /// Field dimensions.
        field: (u32, u32),
    },
    /// A position outside the grid was supplied.
    PositionOutOfBounds {
        /// The offending position.
        pos: GridPos,
    },
    /// Attempt to place an agent on a wall or occupied cell.
    CellNotFree {
        /// The offending position.
        pos: GridPos,
    },
    /// An agent id was reused.
    DuplicateAgent {
        /// The duplicated id.
        id: AgentId,
    },
    /// An unknown agent id was supplied.
    UnknownAgent {
        /// The unknown id.
        id: AgentId,
    },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { width, height } => {
                write!(f, "invalid grid size {width}x{height}")
            }
            Self::FieldSizeMismatch { grid, field } => write!(
                f,
                "pheromone field {}x{} does not match grid {}x{}",
                field.0, field.1, grid.0, grid.1
            ),
            Self::PositionOutOfBounds { pos } => {
                write!(f, "position {pos} out of bounds")
            }
            Self::CellNotFree { pos } => write!(f, "cell {pos} is not free"),
            Self::DuplicateAgent { id } => write!(f, "agent id {id} already registered"),
            Self::UnknownAgent { id } => write!(f, "unknown agent id {id}"),
        }
    }
}

impl Error for WorldError {}
