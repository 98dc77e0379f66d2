//! Strongly-typed identifiers and the [`GridPos`] coordinate type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies an agent within a simulation world.
///
/// IDs are allocated sequentially by the world as agents are spawned and
/// are never reused within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Monotonically increasing tick counter.
///
/// Incremented each time the simulation advances one global tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// A cell coordinate on the simulation grid.
///
/// Coordinates are signed so that out-of-bounds targets produced by
/// deltas can be represented and rejected; valid cells satisfy
/// `0 <= x < width` and `0 <= y < height`.
///
/// Serializes as a two-element `[x, y]` array, matching the wire and
/// configuration encodings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct GridPos {
    /// Column index, `0..width`.
    pub x: i32,
    /// Row index, `0..height`.
    pub y: i32,
}

impl GridPos {
    /// Construct a position from column and row indices.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The position shifted by `(dx, dy)`.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Chebyshev (chessboard) distance to `other`.
    ///
    /// A value of 1 means the cells are 8-neighbours; 0 means equal.
    pub fn chebyshev(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// The 8-neighbourhood of this cell in row-major scan order.
    ///
    /// The order is fixed and documented because spawn placement and
    /// neighbour sensors rely on it for determinism.
    pub fn neighbours8(self) -> [Self; 8] {
        [
            self.offset(-1, -1),
            self.offset(0, -1),
            self.offset(1, -1),
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(-1, 1),
            self.offset(0, 1),
            self.offset(1, 1),
        ]
    }

    /// The 4-neighbourhood (von Neumann) of this cell: north, south,
    /// west, east.
    pub fn neighbours4(self) -> [Self; 4] {
        [
            self.offset(0, -1),
            self.offset(0, 1),
            self.offset(-1, 0),
            self.offset(1, 0),
        ]
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for GridPos {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<GridPos> for (i32, i32) {
    fn from(p: GridPos) -> Self {
        (p.x, p.y)
    }
}
