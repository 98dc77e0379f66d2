//! Error type for field construction and parameter validation.

use std::error::Error;
use std::fmt;

/// Errors from [`PheromoneField`](crate::PheromoneField) construction and
/// the per-swap parameter check.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldError {
    /// Width or height is zero.
    InvalidSize {
        /// Configured width.
        width: u32,
        /// Configured height.
        height: u32,
    },
    /// Evaporation outside `[0, 1)`.
    InvalidEvaporation {
        /// The offending value.
        value: f32,
    },
    /// Diffusion alpha outside `[0, 0.25]`; above 0.25 the stencil's
    /// centre coefficient goes negative.
    InvalidAlpha {
        /// The offending value.
        value: f32,
    },
    /// Deposit to a type that does not exist while dynamic type creation
    /// is disabled.
    UnknownType {
        /// The requested type name.
        name: String,
    },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { width, height } => {
                write!(f, "invalid field size {width}x{height}")
            }
            Self::InvalidEvaporation { value } => {
                write!(f, "evaporation must be in [0, 1), got {value}")
            }
            Self::InvalidAlpha { value } => {
                write!(f, "alpha must be in [0, 0.25], got {value}")
            }
            Self::UnknownType { name } => {
                write!(f, "unknown pheromone type '{name}'")
            }
        }
    }
}

impl Error for FieldError {}
