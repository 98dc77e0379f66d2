//! Row-major rectangular cell grid.

use crate::cell::{Cell, CellKind};
use crate::error::WorldError;
use formic_core::GridPos;

/// A `width × height` lattice of [`Cell`]s, stored row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Create an all-empty grid. Size must be non-zero.
    pub fn new(width: u32, height: u32) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidSize { width, height });
        }
        Ok(Self {
            width,
            height,
            cells: vec![Cell::default(); (width * height) as usize],
        })
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether `pos` lies on the grid.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        self.in_bounds(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// The cell at `pos`, if in bounds.
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    /// Mutable access to the cell at `pos`, if in bounds.
    pub fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Whether `pos` is in bounds, not a wall, and unoccupied.
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.cell(pos).is_some_and(Cell::is_free)
    }

    /// Set the kind of every cell in the inclusive rectangle spanned by
    /// `a` and `b`, clipped to the grid. Returns how many cells changed.
    pub fn fill_rect(&mut self, a: GridPos, b: GridPos, kind: CellKind) -> usize {
        let (x0, x1) = (a.x.min(b.x), a.x.max(b.x));
        let (y0, y1) = (a.y.min(b.y), a.y.max(b.y));
        let mut count = 0;
        for y in y0..=y1 {
            for x in x0..=x1 {
                if let Some(cell) = self.cell_mut(GridPos::new(x, y)) {
                    cell.kind = kind;
                    count += 1;
                }
            }
        }
        count
    }

    /// Iterate all positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        let (w, h) = (self.width as i32, self.height as i32);
        (0..h).flat_map(move |y| (0..w).map(move |x| GridPos::new(x, y)))
    }
}
