//! Colour lookup over intensity fractions.

use map_common::GradientConfig;
use std::collections::BTreeMap;

const PALETTE_SIZE: usize = 256;

/// 256-entry RGBA lookup table built from gradient stops.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: Vec<[u8; 4]>,
}

impl Palette {
    pub fn from_gradient(gradient: &GradientConfig) -> Self {
        let colors = gradient
            .palette()
            .into_iter()
            .map(|(r, g, b, a)| [r, g, b, a])
            .collect();
        Self { colors }
    }

    /// Colour for a fraction in [0, 1]; out-of-range values clamp.
    pub fn color(&self, t: f64) -> [u8; 4] {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = (t * (PALETTE_SIZE - 1) as f64).round() as usize;
        self.colors
            .get(idx.min(self.colors.len().saturating_sub(1)))
            .copied()
            .unwrap_or([0, 0, 0, 0])
    }
}

/// Gradient stops as `{"0.3": "#b3ad00", ...}`, the form the browser heat layer accepts.
pub fn css_stops(gradient: &GradientConfig) -> BTreeMap<String, String> {
    gradient
        .stops
        .iter()
        .map(|stop| (format!("{}", stop.value), stop.color.to_css()))
        .collect()
}
