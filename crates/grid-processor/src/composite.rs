//! Weighted blending of normalized layers.
//!
//! Weights partition a single unit of mass: after clamping to [0, 1] they are
//! rescaled to sum to 1, so a blended intensity stays within [0, 1].
//!
//! Layers need not share points. The output is the union of all input points;
//! a point present in only some layers receives only those layers' weighted
//! terms. Each layer contributes at most one term per location: repeated
//! points within a layer keep their first value.

use map_common::{CoordKey, WeightedPoint};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::CompositeError;
use crate::normalize::NormalizedLayer;

/// One blending input: a named layer and its raw (slider) weight.
#[derive(Debug, Clone, Copy)]
pub struct LayerInput<'a> {
    pub name: &'a str,
    pub layer: &'a NormalizedLayer,
    pub weight: f64,
}

impl<'a> LayerInput<'a> {
    pub fn new(name: &'a str, layer: &'a NormalizedLayer, weight: f64) -> Self {
        Self {
            name,
            layer,
            weight,
        }
    }
}

/// Result of blending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    /// `(lat, lon, intensity)` in first-appearance order
    pub points: Vec<WeightedPoint>,
    /// Effective weight per input layer after rescaling, in input order
    pub weights: Vec<(String, f64)>,
}

/// Blend layers into a single intensity list.
///
/// `intensity = Σ wᵢ · valueᵢ` over the layers containing the point, where
/// `wᵢ` are the clamped weights divided by their sum.
pub fn blend(inputs: &[LayerInput<'_>]) -> Result<Composite, CompositeError> {
    if inputs.is_empty() {
        return Err(CompositeError::NoLayers);
    }

    let mut clamped = Vec::with_capacity(inputs.len());
    for input in inputs {
        if !input.weight.is_finite() {
            return Err(CompositeError::InvalidWeight {
                layer: input.name.to_string(),
            });
        }
        clamped.push(input.weight.clamp(0.0, 1.0));
    }

    let total: f64 = clamped.iter().sum();
    if total <= 0.0 {
        return Err(CompositeError::ZeroWeight);
    }
    let weights: Vec<f64> = clamped.iter().map(|w| w / total).collect();

    let mut index: HashMap<CoordKey, usize> = HashMap::new();
    let mut points: Vec<WeightedPoint> = Vec::new();

    for (input, &w) in inputs.iter().zip(&weights) {
        let mut seen: HashSet<CoordKey> = HashSet::with_capacity(input.layer.points.len());
        for p in &input.layer.points {
            let key = p.position().key();
            if !seen.insert(key) {
                debug!(layer = input.name, lat = p.lat, lon = p.lon, "Repeated point ignored");
                continue;
            }

            let term = w * p.weight;
            match index.get(&key) {
                Some(&i) => points[i].weight += term,
                None => {
                    index.insert(key, points.len());
                    points.push(WeightedPoint::new(p.lat, p.lon, term));
                }
            }
        }
    }

    debug!(layers = inputs.len(), points = points.len(), "Blended layers");

    Ok(Composite {
        points,
        weights: inputs
            .iter()
            .zip(weights)
            .map(|(input, w)| (input.name.to_string(), w))
            .collect(),
    })
}
