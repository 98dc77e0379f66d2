//! Standard nest layout builder.
//!
//! Builds a centred rectangular nest: a wall ring enclosing nest-interior
//! cells, with entry cells punched into the wall at the configured
//! offsets. Layout (width 13, height 7, entry offset (3, 0)):
//!
//! ```text
//! w w w e w w w w w w w w w
//! w . . . . . . . . . . . w
//! w . . . . . . . . . . . w
//! w w w w w w w w w w w w w
//! ```

use crate::cell::CellKind;
use crate::error::WorldError;
use crate::world::World;
use formic_core::GridPos;
use tracing::info;

/// Parameters for the standard nest layout.
#[derive(Clone, Debug, PartialEq)]
pub struct NestLayout {
    /// Nest width including walls. Minimum 5.
    pub width: u32,
    /// Nest height including walls. Minimum 3.
    pub height: u32,
    /// Entry positions relative to the nest's top-left corner. Each is
    /// carved out of the wall ring.
    pub entry_offsets: Vec<(i32, i32)>,
}

impl Default for NestLayout {
    fn default() -> Self {
        Self {
            width: 13,
            height: 7,
            entry_offsets: vec![(3, 0)],
        }
    }
}

/// Build the standard nest centred on the grid.
///
/// Returns the absolute entry positions. Fails if the nest is smaller
/// than 5×3 or does not fit the grid.
pub fn build_standard_nest(world: &mut World, layout: &NestLayout) -> Result<Vec<GridPos>, WorldError> {
    let (w, h) = (layout.width, layout.height);
    if w < 5 || h < 3 || w > world.width() || h > world.height() {
        return Err(WorldError::InvalidSize { width: w, height: h });
    }

    let origin = GridPos::new(
        ((world.width() - w) / 2) as i32,
        ((world.height() - h) / 2) as i32,
    );
    let far = origin.offset(w as i32 - 1, h as i32 - 1);

    // Wall ring first, then carve the interior.
    world.fill_rect(origin, far, CellKind::Wall);
    world.fill_rect(origin.offset(1, 1), far.offset(-1, -1), CellKind::Nest);

    let mut entries = Vec::with_capacity(layout.entry_offsets.len());
    for &(dx, dy) in &layout.entry_offsets {
        let mut pos = origin.offset(dx, dy);
        if !world.in_bounds(pos) {
            // Fall back to the middle of the top wall.
            pos = origin.offset(w as i32 / 2, 0);
        }
        world.add_entry(pos)?;
        entries.push(pos);
    }

    info!(origin = %origin, width = w, height = h, entries = entries.len(), "standard nest built");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellKind;
    use formic_field::PheromoneField;

    fn world(w: u32, h: u32) -> World {
        let field = PheromoneField::new(w, h, &[], 0.0, 0.1, true).unwrap();
        World::new(w, h, field).unwrap()
    }

    #[test]
    fn standard_nest_is_centred_with_wall_ring() {
        let mut w = world(20, 20);
        let entries = build_standard_nest(&mut w, &NestLayout::default()).unwrap();
        assert_eq!(entries, vec![GridPos::new(6, 6)]);

        // Corners of the 13x7 ring at origin (3, 6).
        for pos in [
            GridPos::new(3, 6),
            GridPos::new(15, 6),
            GridPos::new(3, 12),
            GridPos::new(15, 12),
        ] {
            assert_eq!(w.grid().cell(pos).unwrap().kind, CellKind::Wall, "{pos}");
        }
        // Interior is nest.
        assert_eq!(w.grid().cell(GridPos::new(8, 9)).unwrap().kind, CellKind::Nest);
        // Entry carved into the top wall.
        assert_eq!(w.grid().cell(GridPos::new(6, 6)).unwrap().kind, CellKind::Entry);
        // Outside untouched.
        assert_eq!(w.grid().cell(GridPos::new(0, 0)).unwrap().kind, CellKind::Empty);
    }

    #[test]
    fn nest_too_small_or_too_big_is_rejected() {
        let mut w = world(10, 10);
        let tiny = NestLayout {
            width: 4,
            height: 3,
            entry_offsets: vec![(1, 0)],
        };
        assert!(build_standard_nest(&mut w, &tiny).is_err());

        let huge = NestLayout {
            width: 13,
            height: 7,
            entry_offsets: vec![(3, 0)],
        };
        let mut small = world(12, 12);
        assert!(build_standard_nest(&mut small, &huge).is_err());
    }
}
