//! Grid cells, cell kinds, and food records.

use formic_core::AgentId;
use std::fmt;

/// Discrete cell classification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Plain walkable ground.
    #[default]
    Empty,
    /// Impassable wall.
    Wall,
    /// Nest interior.
    Nest,
    /// Nest entrance.
    Entry,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Wall => "wall",
            Self::Nest => "nest",
            Self::Entry => "entry",
        };
        write!(f, "{s}")
    }
}

/// A food deposit sitting on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Food {
    /// Remaining units; records with zero units are removed from the cell.
    pub amount: u32,
}

/// One grid cell: kind, at most one occupant, and optional food.
///
/// Pheromone values are not stored here; they live in the field's front
/// buffer and are read through the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// Cell classification.
    pub kind: CellKind,
    /// Occupying agent, if any.
    pub occupant: Option<AgentId>,
    /// Food record, if any.
    pub food: Option<Food>,
}

impl Cell {
    /// Whether an agent may enter: not a wall and not occupied.
    pub fn is_free(&self) -> bool {
        self.kind != CellKind::Wall && self.occupant.is_none()
    }

    /// Whether the cell counts as inside the nest (nest interior or entry).
    pub fn is_nest(&self) -> bool {
        matches!(self.kind, CellKind::Nest | CellKind::Entry)
    }
}
