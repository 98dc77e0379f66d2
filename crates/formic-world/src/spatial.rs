//! Per-tick spatial index over agent positions.
//!
//! Built once per tick by the sensor runner and exposed read-only through
//! the world so all sensors share one lookup structure instead of
//! re-scanning the grid.

use formic_core::{AgentId, GridPos, TickId};
use std::collections::HashMap;

/// Snapshot of agent positions for one tick.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    tick: Option<TickId>,
    positions: Vec<GridPos>,
    ids: Vec<AgentId>,
    by_pos: HashMap<GridPos, AgentId>,
}

impl SpatialIndex {
    /// An index valid for no tick; any query on it is empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an index from `(id, position)` pairs for `tick`.
    pub fn build(tick: TickId, entries: impl IntoIterator<Item = (AgentId, GridPos)>) -> Self {
        let mut positions = Vec::new();
        let mut ids = Vec::new();
        let mut by_pos = HashMap::new();
        for (id, pos) in entries {
            positions.push(pos);
            ids.push(id);
            by_pos.insert(pos, id);
        }
        Self {
            tick: Some(tick),
            positions,
            ids,
            by_pos,
        }
    }

    /// Whether this index was built for `tick`.
    pub fn is_valid_for(&self, tick: TickId) -> bool {
        self.tick == Some(tick)
    }

    /// Indexed agent positions, in registry order.
    pub fn positions(&self) -> &[GridPos] {
        &self.positions
    }

    /// Indexed agent ids, in registry order.
    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    /// The agent at `pos`, if any.
    pub fn agent_at(&self, pos: GridPos) -> Option<AgentId> {
        self.by_pos.get(&pos).copied()
    }

    /// Agents within Chebyshev distance `radius` of `center`, excluding
    /// the centre cell itself, in registry order.
    pub fn within_chebyshev(
        &self,
        center: GridPos,
        radius: i32,
    ) -> impl Iterator<Item = (AgentId, GridPos)> + '_ {
        self.ids
            .iter()
            .zip(&self.positions)
            .filter(move |(_, &pos)| pos != center && center.chebyshev(pos) <= radius)
            .map(|(&id, &pos)| (id, pos))
    }
}
