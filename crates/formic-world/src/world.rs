//! The [`World`]: grid + agent registry + pheromone field.

use crate::agent::Agent;
use crate::cell::{CellKind, Food};
use crate::error::WorldError;
use crate::grid::Grid;
use crate::spatial::SpatialIndex;
use formic_core::{AgentId, GridPos, TickId};
use formic_field::{FieldError, LayerSummary, PheromoneField};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Authoritative simulation state.
///
/// Owns the grid, the agents (insertion-ordered, which fixes the per-tick
/// processing order), the entry positions, and the pheromone field. All
/// occupancy bookkeeping goes through the methods here so the
/// one-occupant-per-cell invariant cannot be broken from outside.
#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    agents: IndexMap<AgentId, Agent>,
    entry_positions: Vec<GridPos>,
    field: PheromoneField,
    tick: TickId,
    next_agent_id: u32,
    spatial: SpatialIndex,
}

impl World {
    /// Create a world from a grid size and a pheromone field of the same
    /// dimensions.
    pub fn new(width: u32, height: u32, field: PheromoneField) -> Result<Self, WorldError> {
        let grid = Grid::new(width, height)?;
        if field.width() != width || field.height() != height {
            return Err(WorldError::FieldSizeMismatch {
                grid: (width, height),
                field: (field.width(), field.height()),
            });
        }
        Ok(Self {
            grid,
            agents: IndexMap::new(),
            entry_positions: Vec::new(),
            field,
            tick: TickId(0),
            next_agent_id: 0,
            spatial: SpatialIndex::empty(),
        })
    }

    // ── Grid access ─────────────────────────────────────────────────

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    /// The cell grid.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Whether `pos` lies on the grid.
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        self.grid.in_bounds(pos)
    }

    /// Whether `pos` is in bounds, not a wall, and unoccupied.
    pub fn is_free(&self, pos: GridPos) -> bool {
        self.grid.is_free(pos)
    }

    /// Mark a cell as wall.
    pub fn set_wall(&mut self, pos: GridPos) {
        if let Some(cell) = self.grid.cell_mut(pos) {
            cell.kind = CellKind::Wall;
        }
    }

    /// Mark a cell as nest interior.
    pub fn set_nest(&mut self, pos: GridPos) {
        if let Some(cell) = self.grid.cell_mut(pos) {
            cell.kind = CellKind::Nest;
        }
    }

    /// Mark a cell as entry and record it. Idempotent; out-of-bounds
    /// positions are an error.
    pub fn add_entry(&mut self, pos: GridPos) -> Result<(), WorldError> {
        let cell = self
            .grid
            .cell_mut(pos)
            .ok_or(WorldError::PositionOutOfBounds { pos })?;
        cell.kind = CellKind::Entry;
        if !self.entry_positions.contains(&pos) {
            self.entry_positions.push(pos);
        }
        Ok(())
    }

    /// Recorded entry positions, in registration order.
    pub fn entry_positions(&self) -> &[GridPos] {
        &self.entry_positions
    }

    /// Set every cell in the inclusive rectangle to `kind`; clipped.
    pub fn fill_rect(&mut self, a: GridPos, b: GridPos, kind: CellKind) -> usize {
        self.grid.fill_rect(a, b, kind)
    }

    // ── Food ────────────────────────────────────────────────────────

    /// Place (or top up) food at `pos`. Out-of-bounds is ignored.
    pub fn add_food(&mut self, pos: GridPos, amount: u32) {
        if amount == 0 {
            return;
        }
        if let Some(cell) = self.grid.cell_mut(pos) {
            let current = cell.food.map_or(0, |f| f.amount);
            cell.food = Some(Food {
                amount: current + amount,
            });
        }
    }

    /// Food units available at `pos` (0 if none or out of bounds).
    pub fn food_at(&self, pos: GridPos) -> u32 {
        self.grid
            .cell(pos)
            .and_then(|c| c.food)
            .map_or(0, |f| f.amount)
    }

    /// Take up to `amount` food units from `pos`; clears the record when
    /// depleted. Returns the amount actually taken.
    pub fn take_food(&mut self, pos: GridPos, amount: u32) -> u32 {
        let Some(cell) = self.grid.cell_mut(pos) else {
            return 0;
        };
        let Some(food) = cell.food.as_mut() else {
            return 0;
        };
        let taken = amount.min(food.amount);
        food.amount -= taken;
        if food.amount == 0 {
            cell.food = None;
        }
        taken
    }

    // ── Agent registry ──────────────────────────────────────────────

    /// Allocate a fresh agent id. Ids are never reused within a run.
    pub fn next_id(&mut self) -> AgentId {
        let id = AgentId(self.next_agent_id);
        self.next_agent_id += 1;
        id
    }

    /// Register an agent and occupy its cell.
    ///
    /// Fails on duplicate id, out-of-bounds position, or a non-free cell.
    pub fn insert_agent(&mut self, agent: Agent) -> Result<AgentId, WorldError> {
        let id = agent.id();
        let pos = agent.position();
        if self.agents.contains_key(&id) {
            return Err(WorldError::DuplicateAgent { id });
        }
        if !self.grid.in_bounds(pos) {
            return Err(WorldError::PositionOutOfBounds { pos });
        }
        if !self.grid.is_free(pos) {
            return Err(WorldError::CellNotFree { pos });
        }
        self.grid.cell_mut(pos).expect("bounds checked").occupant = Some(id);
        // Keep the id allocator ahead of externally-constructed ids.
        self.next_agent_id = self.next_agent_id.max(id.0 + 1);
        self.agents.insert(id, agent);
        info!(agent = %id, pos = %pos, "agent registered");
        Ok(id)
    }

    /// Remove an agent, clearing its cell. Returns the agent if present.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent> {
        let agent = self.agents.shift_remove(&id)?;
        if let Some(cell) = self.grid.cell_mut(agent.position()) {
            if cell.occupant == Some(id) {
                cell.occupant = None;
            }
        }
        info!(agent = %id, "agent removed");
        Some(agent)
    }

    /// Shared access to an agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// Mutable access to an agent.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(&id)
    }

    /// All agents in insertion order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Agent ids in insertion order; the tick engine snapshots this at
    /// tick start so births and deaths during the tick do not perturb the
    /// processing order.
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Number of registered agents.
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// The agent occupying `pos`, if any.
    pub fn agent_at(&self, pos: GridPos) -> Option<AgentId> {
        self.grid.cell(pos).and_then(|c| c.occupant)
    }

    /// Rebind an agent to a new cell.
    ///
    /// The caller (executor) must have validated the move; this enforces
    /// only the hard invariants: the agent exists, the target is in
    /// bounds, and the target is free or the agent's own cell. Old-cell
    /// clearing and new-cell binding happen together, so no intermediate
    /// state is observable.
    pub fn move_agent(&mut self, id: AgentId, to: GridPos) -> Result<(), WorldError> {
        let from = self
            .agents
            .get(&id)
            .ok_or(WorldError::UnknownAgent { id })?
            .position();
        if !self.grid.in_bounds(to) {
            return Err(WorldError::PositionOutOfBounds { pos: to });
        }
        if to != from && !self.grid.is_free(to) {
            return Err(WorldError::CellNotFree { pos: to });
        }
        if let Some(cell) = self.grid.cell_mut(from) {
            if cell.occupant == Some(id) {
                cell.occupant = None;
            }
        }
        self.grid.cell_mut(to).expect("bounds checked").occupant = Some(id);
        self.agents
            .get_mut(&id)
            .expect("checked above")
            .set_position(to);
        debug!(agent = %id, %from, %to, "agent moved");
        Ok(())
    }

    // ── Pheromones ──────────────────────────────────────────────────

    /// The pheromone field (read view).
    pub fn field(&self) -> &PheromoneField {
        &self.field
    }

    /// The pheromone field (deposit staging and type registration).
    pub fn field_mut(&mut self) -> &mut PheromoneField {
        &mut self.field
    }

    /// Run the once-per-tick field update: diffusion, staged deposits,
    /// evaporation, swap.
    pub fn advance_pheromones(&mut self) -> Result<IndexMap<String, LayerSummary>, FieldError> {
        self.field.update_and_swap()
    }

    // ── Tick bookkeeping ────────────────────────────────────────────

    /// The current global tick.
    pub fn tick(&self) -> TickId {
        self.tick
    }

    /// Set the current global tick; engine use only.
    pub fn set_tick(&mut self, tick: TickId) {
        self.tick = tick;
    }

    /// The shared per-tick spatial index. Empty until refreshed for the
    /// current tick.
    pub fn spatial_index(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Rebuild the spatial index for the current tick if stale.
    /// Idempotent within a tick.
    pub fn refresh_spatial_index(&mut self) {
        if self.spatial.is_valid_for(self.tick) {
            return;
        }
        let entries: Vec<_> = self
            .agents
            .values()
            .map(|a| (a.id(), a.position()))
            .collect();
        self.spatial = SpatialIndex::build(self.tick, entries);
        debug!(tick = %self.tick, agents = self.spatial.ids().len(), "spatial index rebuilt");
    }
}
