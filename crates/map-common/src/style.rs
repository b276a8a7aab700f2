//! Style configuration for heatmap overlays.
//!
//! A JSON schema describing how each overlay is drawn: kernel radius and blur,
//! opacity range and the colour gradient applied to intensity fractions.
//! Built-in defaults give each layer its own colour ramp; a file with the same
//! schema can override them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::LayerKind;

/// Style key of the blended overlay.
pub const COMPOSITE_STYLE: &str = "composite";

/// Root style configuration - one named heatmap style per overlay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Version of the style schema
    #[serde(default = "default_version")]
    pub version: String,

    /// Named style definitions, keyed by layer id or "composite"
    pub styles: HashMap<String, HeatmapStyle>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl StyleConfig {
    /// Load style configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StyleError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| StyleError::IoError(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Parse style configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        serde_json::from_str(json).map_err(|e| StyleError::ParseError(e.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<&HeatmapStyle> {
        self.styles.get(name)
    }

    /// Style for a layer, falling back to the built-in default.
    pub fn for_layer(&self, layer: LayerKind) -> HeatmapStyle {
        self.get(layer.id())
            .cloned()
            .unwrap_or_else(|| HeatmapStyle::default_for(layer))
    }

    /// Style for the composite overlay, falling back to the built-in default.
    pub fn composite(&self) -> HeatmapStyle {
        self.get(COMPOSITE_STYLE)
            .cloned()
            .unwrap_or_else(HeatmapStyle::composite_default)
    }

    /// Validate all styles in the configuration.
    pub fn validate(&self) -> Result<(), StyleError> {
        for (name, style) in &self.styles {
            style
                .validate()
                .map_err(|e| StyleError::ValidationError(format!("{}: {}", name, e)))?;
        }
        Ok(())
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        let mut styles: HashMap<String, HeatmapStyle> = LayerKind::ALL
            .into_iter()
            .map(|k| (k.id().to_string(), HeatmapStyle::default_for(k)))
            .collect();
        styles.insert(COMPOSITE_STYLE.to_string(), HeatmapStyle::composite_default());

        Self {
            version: default_version(),
            styles,
        }
    }
}

/// Kernel-density overlay parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapStyle {
    /// Kernel radius in pixels
    pub radius: f32,

    /// Extra blur in pixels added around the radius
    #[serde(default)]
    pub blur: f32,

    /// Opacity of the faintest drawn pixel
    #[serde(default = "default_min_opacity")]
    pub min_opacity: f32,

    /// Opacity of the most intense pixel
    #[serde(default = "default_max_opacity")]
    pub max_opacity: f32,

    /// Density mapped to the top of the gradient (defaults to the observed maximum)
    #[serde(default)]
    pub max_intensity: Option<f64>,

    /// Colour stops over intensity fractions in [0, 1]
    pub gradient: GradientConfig,
}

fn default_min_opacity() -> f32 {
    0.3
}

fn default_max_opacity() -> f32 {
    0.9
}

impl HeatmapStyle {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.radius > 0.0) {
            return Err("radius must be positive".to_string());
        }
        if self.blur < 0.0 {
            return Err("blur must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.min_opacity) || !(0.0..=1.0).contains(&self.max_opacity) {
            return Err("opacity must lie in [0, 1]".to_string());
        }
        if self.min_opacity > self.max_opacity {
            return Err("min_opacity exceeds max_opacity".to_string());
        }
        if let Some(max) = self.max_intensity {
            if !(max > 0.0) {
                return Err("max_intensity must be positive".to_string());
            }
        }
        self.gradient.validate()
    }

    pub fn default_for(layer: LayerKind) -> Self {
        match layer {
            LayerKind::Solar => Self {
                radius: 50.0,
                blur: 100.0,
                min_opacity: 0.3,
                max_opacity: 0.9,
                max_intensity: None,
                gradient: GradientConfig::from_hex(&[
                    (0.0, "#58580C"),
                    (0.3, "#B3AD00"),
                    (0.6, "#FFFC33"),
                    (0.8, "#FFF566"),
                    (1.0, "#FFFEB3"),
                ]),
            },
            LayerKind::Co2 => Self {
                radius: 50.0,
                blur: 100.0,
                min_opacity: 0.25,
                max_opacity: 0.95,
                max_intensity: None,
                gradient: GradientConfig::from_hex(&[
                    (0.0, "#001233"),
                    (0.3, "#0056B3"),
                    (0.6, "#339CFF"),
                    (0.8, "#66C2FF"),
                    (1.0, "#B3E6FF"),
                ]),
            },
            LayerKind::Pipelines => Self {
                radius: 35.0,
                blur: 30.0,
                min_opacity: 0.3,
                max_opacity: 0.9,
                max_intensity: None,
                gradient: GradientConfig::from_hex(&[
                    (0.0, "#033300"),
                    (0.3, "#00B30F"),
                    (0.6, "#33FF4E"),
                    (0.8, "#66FF6B"),
                    (1.0, "#B3FFB7"),
                ]),
            },
        }
    }

    /// Viridis ramp for the blended suitability overlay.
    pub fn composite_default() -> Self {
        Self {
            radius: 45.0,
            blur: 60.0,
            min_opacity: 0.3,
            max_opacity: 0.85,
            max_intensity: None,
            gradient: GradientConfig::from_hex(&[
                (0.0, "#440154"),
                (0.25, "#3B528B"),
                (0.5, "#21918C"),
                (0.75, "#5EC962"),
                (1.0, "#FDE725"),
            ]),
        }
    }
}

/// Continuous gradient colour mapping over intensity fractions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientConfig {
    /// Colour stops, ascending by value
    pub stops: Vec<ColorStop>,
}

impl GradientConfig {
    /// Build from `(fraction, "#RRGGBB")` pairs.
    pub fn from_hex(stops: &[(f64, &str)]) -> Self {
        Self {
            stops: stops
                .iter()
                .map(|(value, hex)| ColorStop {
                    value: *value,
                    color: Color::Hex(hex.to_string()),
                })
                .collect(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.stops.len() < 2 {
            return Err("Gradient must have at least 2 color stops".to_string());
        }

        for stop in &self.stops {
            if !(0.0..=1.0).contains(&stop.value) {
                return Err(format!("Color stop {} outside [0, 1]", stop.value));
            }
        }

        // Check stops are in ascending order
        for i in 1..self.stops.len() {
            if self.stops[i].value <= self.stops[i - 1].value {
                return Err("Color stops must be in ascending value order".to_string());
            }
        }

        Ok(())
    }

    /// Interpolate the RGBA colour for a fraction; values outside the stops clamp.
    pub fn interpolate(&self, value: f64) -> (u8, u8, u8, u8) {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return (0, 0, 0, 0),
        };

        if value.is_nan() || value <= first.value {
            return first.color.to_rgba();
        }
        if value >= last.value {
            return last.color.to_rgba();
        }

        for pair in self.stops.windows(2) {
            let (low, high) = (&pair[0], &pair[1]);
            if value <= high.value {
                let t = (value - low.value) / (high.value - low.value);
                return lerp_rgba(low.color.to_rgba(), high.color.to_rgba(), t);
            }
        }

        last.color.to_rgba()
    }

    /// Precompute a 256-entry lookup table over [0, 1].
    pub fn palette(&self) -> Vec<(u8, u8, u8, u8)> {
        (0..256).map(|i| self.interpolate(i as f64 / 255.0)).collect()
    }
}

/// A colour stop in a gradient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorStop {
    /// Intensity fraction at this stop
    pub value: f64,

    /// The colour at this stop
    pub color: Color,
}

/// Colour representation supporting multiple formats.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    /// Hex string: "#RRGGBB" or "#RRGGBBAA" (named colours are accepted too)
    Hex(String),

    /// RGB array: [r, g, b] or [r, g, b, a]
    Array(Vec<u8>),

    /// Explicit RGBA
    Rgba { r: u8, g: u8, b: u8, a: u8 },
}

impl Color {
    /// Convert to RGBA tuple.
    pub fn to_rgba(&self) -> (u8, u8, u8, u8) {
        match self {
            Color::Hex(s) if s.starts_with('#') => parse_hex_color(s),
            Color::Hex(name) => named_color(name),
            Color::Array(arr) => {
                let r = arr.first().copied().unwrap_or(0);
                let g = arr.get(1).copied().unwrap_or(0);
                let b = arr.get(2).copied().unwrap_or(0);
                let a = arr.get(3).copied().unwrap_or(255);
                (r, g, b, a)
            }
            Color::Rgba { r, g, b, a } => (*r, *g, *b, *a),
        }
    }

    /// CSS form used by the browser widget.
    pub fn to_css(&self) -> String {
        let (r, g, b, a) = self.to_rgba();
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("rgba({},{},{},{:.3})", r, g, b, a as f64 / 255.0)
        }
    }
}

fn lerp_rgba(c1: (u8, u8, u8, u8), c2: (u8, u8, u8, u8), t: f64) -> (u8, u8, u8, u8) {
    let t = t.clamp(0.0, 1.0);
    let lerp_u8 = |a: u8, b: u8| -> u8 { ((a as f64) * (1.0 - t) + (b as f64) * t).round() as u8 };
    (
        lerp_u8(c1.0, c2.0),
        lerp_u8(c1.1, c2.1),
        lerp_u8(c1.2, c2.2),
        lerp_u8(c1.3, c2.3),
    )
}

fn parse_hex_color(s: &str) -> (u8, u8, u8, u8) {
    let s = s.trim_start_matches('#');
    let byte = |i: usize, default: u8| {
        s.get(i..i + 2)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .unwrap_or(default)
    };

    match s.len() {
        6 => (byte(0, 0), byte(2, 0), byte(4, 0), 255),
        8 => (byte(0, 0), byte(2, 0), byte(4, 0), byte(6, 255)),
        _ => (0, 0, 0, 255),
    }
}

fn named_color(name: &str) -> (u8, u8, u8, u8) {
    match name.to_lowercase().as_str() {
        "transparent" => (0, 0, 0, 0),
        "black" => (0, 0, 0, 255),
        "white" => (255, 255, 255, 255),
        "red" => (255, 0, 0, 255),
        "green" => (0, 255, 0, 255),
        "blue" => (0, 0, 255, 255),
        "yellow" => (255, 255, 0, 255),
        "orange" => (255, 165, 0, 255),
        _ => (0, 0, 0, 255),
    }
}

/// Style-related errors.
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}
