//! Error types for grid processing.

use thiserror::Error;

/// Why a layer could not be normalized. Callers render nothing for the layer
/// and surface a warning instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Degenerate {
    /// No value survived the finiteness / positivity filter.
    #[error("no qualifying values")]
    Empty,

    /// Every qualifying value is equal, so min-max has no range.
    #[error("all {count} values equal {value}")]
    Constant { value: f64, count: usize },
}

/// Errors that can occur while blending layers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompositeError {
    /// Nothing to blend.
    #[error("no layers to composite")]
    NoLayers,

    /// A layer weight was NaN or infinite.
    #[error("weight for layer '{layer}' is not a finite number")]
    InvalidWeight { layer: String },

    /// Every weight was zero after clamping to [0, 1].
    #[error("layer weights sum to zero")]
    ZeroWeight,
}
