//! The multi-layer scalar field and its per-tick update kernel.

use crate::error::FieldError;
use formic_core::GridPos;
use indexmap::IndexMap;
use tracing::debug;

/// One pheromone type's buffers. `front` is the published read view;
/// `back` and `deposit` are only touched between swaps.
#[derive(Clone, Debug)]
struct Layer {
    front: Vec<f32>,
    back: Vec<f32>,
    deposit: Vec<f32>,
}

impl Layer {
    fn new(cells: usize) -> Self {
        Self {
            front: vec![0.0; cells],
            back: vec![0.0; cells],
            deposit: vec![0.0; cells],
        }
    }
}

/// Per-type mass accounting returned by [`PheromoneField::update_and_swap`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerSummary {
    /// Total mass of the front buffer before the update.
    pub mass_before: f32,
    /// Total mass of the published buffer after the update.
    pub mass_after: f32,
    /// Total staged deposit applied during the update.
    pub deposited: f32,
}

/// Per-type front-buffer statistics, used for rendering scale and tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldStats {
    /// Minimum cell value.
    pub min: f32,
    /// Maximum cell value.
    pub max: f32,
    /// Sum over all cells.
    pub sum: f32,
    /// Mean over all cells.
    pub mean: f32,
}

/// Multi-layer, double-buffered pheromone field.
///
/// See the [crate docs](crate) for the update contract.
#[derive(Clone, Debug)]
pub struct PheromoneField {
    width: u32,
    height: u32,
    evaporation: f32,
    alpha: f32,
    allow_dynamic_types: bool,
    layers: IndexMap<String, Layer>,
}

impl PheromoneField {
    /// Create a field with the given types.
    ///
    /// Size must be non-zero. Parameter *ranges* are deliberately not
    /// checked here; violations surface on the first
    /// [`update_and_swap`](Self::update_and_swap).
    pub fn new(
        width: u32,
        height: u32,
        types: &[&str],
        evaporation: f32,
        alpha: f32,
        allow_dynamic_types: bool,
    ) -> Result<Self, FieldError> {
        if width == 0 || height == 0 {
            return Err(FieldError::InvalidSize { width, height });
        }
        let mut field = Self {
            width,
            height,
            evaporation,
            alpha,
            allow_dynamic_types,
            layers: IndexMap::new(),
        };
        for t in types {
            field.add_type(t);
        }
        Ok(field)
    }

    /// Grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Evaporation fraction per tick.
    pub fn evaporation(&self) -> f32 {
        self.evaporation
    }

    /// Diffusion weight to each 4-neighbour.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Registered type names, in registration order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.layers.keys().map(String::as_str)
    }

    /// Whether `ptype` has a layer.
    pub fn has_type(&self, ptype: &str) -> bool {
        self.layers.contains_key(ptype)
    }

    /// Register a pheromone type. Idempotent.
    pub fn add_type(&mut self, ptype: &str) {
        let cells = (self.width * self.height) as usize;
        if !self.layers.contains_key(ptype) {
            self.layers.insert(ptype.to_string(), Layer::new(cells));
        }
    }

    fn index(&self, pos: GridPos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x >= self.width as i32 || pos.y >= self.height as i32 {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    /// Stage a deposit, applied at the next swap.
    ///
    /// Out-of-bounds positions and non-positive amounts are dropped
    /// silently. Unknown types are created on the fly when dynamic types
    /// are allowed, otherwise this is an error.
    pub fn deposit(&mut self, ptype: &str, pos: GridPos, amount: f32) -> Result<(), FieldError> {
        if amount <= 0.0 {
            return Ok(());
        }
        let Some(i) = self.index(pos) else {
            return Ok(());
        };
        if !self.layers.contains_key(ptype) {
            if !self.allow_dynamic_types {
                return Err(FieldError::UnknownType {
                    name: ptype.to_string(),
                });
            }
            self.add_type(ptype);
        }
        self.layers[ptype].deposit[i] += amount;
        Ok(())
    }

    /// Stage the same deposit at several positions; returns how many were
    /// actually applied (in-bounds).
    pub fn deposit_many(
        &mut self,
        ptype: &str,
        positions: &[GridPos],
        amount: f32,
    ) -> Result<usize, FieldError> {
        let mut applied = 0;
        for &pos in positions {
            let before = self.index(pos).is_some() && amount > 0.0;
            self.deposit(ptype, pos, amount)?;
            if before {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// The published read buffer for `ptype`, row-major `width × height`.
    ///
    /// Stable for the whole tick; staged deposits become visible only
    /// after the post-tick swap.
    pub fn field_for(&self, ptype: &str) -> Option<&[f32]> {
        self.layers.get(ptype).map(|l| l.front.as_slice())
    }

    /// Front-buffer value at `pos`; 0.0 for unknown types or out-of-bounds
    /// positions.
    pub fn value_at(&self, ptype: &str, pos: GridPos) -> f32 {
        match (self.layers.get(ptype), self.index(pos)) {
            (Some(layer), Some(i)) => layer.front[i],
            _ => 0.0,
        }
    }

    fn check_params(&self) -> Result<(), FieldError> {
        if !(0.0..1.0).contains(&self.evaporation) || !self.evaporation.is_finite() {
            return Err(FieldError::InvalidEvaporation {
                value: self.evaporation,
            });
        }
        if !(0.0..=0.25).contains(&self.alpha) || !self.alpha.is_finite() {
            return Err(FieldError::InvalidAlpha { value: self.alpha });
        }
        Ok(())
    }

    /// Run one field tick: diffuse, add deposits, evaporate, clamp, swap.
    ///
    /// Returns per-type mass accounting. Parameter-range violations are
    /// reported here (on the first call) rather than at construction.
    pub fn update_and_swap(&mut self) -> Result<IndexMap<String, LayerSummary>, FieldError> {
        self.check_params()?;
        let w = self.width as usize;
        let h = self.height as usize;
        let keep = 1.0 - self.evaporation;
        let mut summary = IndexMap::with_capacity(self.layers.len());

        for (name, layer) in &mut self.layers {
            let mass_before: f32 = layer.front.iter().sum();
            let deposited: f32 = layer.deposit.iter().sum();

            diffuse(&layer.front, &mut layer.back, w, h, self.alpha);
            for (b, d) in layer.back.iter_mut().zip(&layer.deposit) {
                *b = (*b + *d) * keep;
                if *b < 0.0 {
                    *b = 0.0;
                }
            }

            let mass_after: f32 = layer.back.iter().sum();
            std::mem::swap(&mut layer.front, &mut layer.back);
            layer.back.fill(0.0);
            layer.deposit.fill(0.0);

            summary.insert(
                name.clone(),
                LayerSummary {
                    mass_before,
                    mass_after,
                    deposited,
                },
            );
        }

        debug!(types = summary.len(), "pheromone field swapped");
        Ok(summary)
    }

    /// Min/max/sum/mean per type over the front buffers.
    pub fn stats(&self) -> IndexMap<String, FieldStats> {
        self.layers
            .iter()
            .map(|(name, layer)| {
                let sum: f32 = layer.front.iter().sum();
                let min = layer.front.iter().copied().fold(f32::INFINITY, f32::min);
                let max = layer
                    .front
                    .iter()
                    .copied()
                    .fold(f32::NEG_INFINITY, f32::max);
                let n = layer.front.len() as f32;
                (
                    name.clone(),
                    FieldStats {
                        min: if layer.front.is_empty() { 0.0 } else { min },
                        max: if layer.front.is_empty() { 0.0 } else { max },
                        sum,
                        mean: if layer.front.is_empty() { 0.0 } else { sum / n },
                    },
                )
            })
            .collect()
    }
}

/// 4-neighbour diffusion stencil with Neumann (no-flux) boundary:
/// out-of-grid neighbours replicate the edge value, so diffusion alone
/// preserves mass.
fn diffuse(front: &[f32], back: &mut [f32], w: usize, h: usize, alpha: f32) {
    let centre = 1.0 - 4.0 * alpha;
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let i = row + x;
            let up = if y == 0 { front[i] } else { front[i - w] };
            let down = if y == h - 1 { front[i] } else { front[i + w] };
            let left = if x == 0 { front[i] } else { front[i - 1] };
            let right = if x == w - 1 { front[i] } else { front[i + 1] };
            back[i] = centre * front[i] + alpha * (up + down + left + right);
        }
    }
}
