//! Overlay descriptions for the browser heat layer.

use map_common::{HeatmapStyle, WeightedPoint};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::gradient::css_stops;

/// Options in the shape the browser heat layer takes them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    pub radius: f32,
    pub blur: f32,
    pub min_opacity: f32,
    pub max_opacity: f32,
    /// Intensity drawn at the top of the gradient
    pub max: f64,
    pub gradient: BTreeMap<String, String>,
}

impl OverlayOptions {
    pub fn from_style(style: &HeatmapStyle, points: &[WeightedPoint]) -> Self {
        let max = style.max_intensity.unwrap_or_else(|| {
            let observed = points.iter().map(|p| p.weight).fold(0.0, f64::max);
            if observed > 0.0 {
                observed
            } else {
                1.0
            }
        });

        Self {
            radius: style.radius,
            blur: style.blur,
            min_opacity: style.min_opacity,
            max_opacity: style.max_opacity,
            max,
            gradient: css_stops(&style.gradient),
        }
    }
}

/// One drawable overlay: `[lat, lon, weight]` triples plus drawing options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub id: String,
    pub title: String,
    pub points: Vec<WeightedPoint>,
    pub options: OverlayOptions,
}

impl Overlay {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        points: Vec<WeightedPoint>,
        style: &HeatmapStyle,
    ) -> Self {
        let options = OverlayOptions::from_style(style, &points);
        Self {
            id: id.into(),
            title: title.into(),
            points,
            options,
        }
    }
}
