//! Layer identifiers, selections and blending weights.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::MapError;

/// A named overlay that can be toggled on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Gridded solar irradiance (GHI climatology).
    Solar,
    /// Per-country CO₂ emissions.
    Co2,
    /// Per-country operating pipeline counts.
    Pipelines,
}

impl LayerKind {
    pub const ALL: [LayerKind; 3] = [LayerKind::Solar, LayerKind::Co2, LayerKind::Pipelines];

    /// Short identifier used in query strings and style keys.
    pub fn id(&self) -> &'static str {
        match self {
            LayerKind::Solar => "solar",
            LayerKind::Co2 => "co2",
            LayerKind::Pipelines => "pipelines",
        }
    }

    /// Human-readable title for the layer toggle.
    pub fn title(&self) -> &'static str {
        match self {
            LayerKind::Solar => "Solar Irradiance",
            LayerKind::Co2 => "CO₂ Emissions",
            LayerKind::Pipelines => "Pipeline Network",
        }
    }

    /// Weight used when the request does not carry one.
    pub fn default_weight(&self) -> f64 {
        match self {
            LayerKind::Solar => 0.6,
            LayerKind::Co2 => 0.4,
            LayerKind::Pipelines => 0.3,
        }
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for LayerKind {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        LayerKind::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(s) || k.title() == s)
            .ok_or_else(|| MapError::UnknownLayer(s.to_string()))
    }
}

/// Ordered, de-duplicated set of toggled layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerSelection(Vec<LayerKind>);

impl LayerSelection {
    pub fn new(layers: impl IntoIterator<Item = LayerKind>) -> Self {
        let mut out = Vec::new();
        for layer in layers {
            if !out.contains(&layer) {
                out.push(layer);
            }
        }
        Self(out)
    }

    /// Parse a comma-separated list such as `"solar,co2"`. Empty entries are ignored.
    pub fn parse(s: &str) -> Result<Self, MapError> {
        let layers = s
            .split(',')
            .filter(|p| !p.trim().is_empty())
            .map(LayerKind::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(layers))
    }

    pub fn contains(&self, layer: LayerKind) -> bool {
        self.0.contains(&layer)
    }

    pub fn iter(&self) -> impl Iterator<Item = LayerKind> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LayerSelection {
    /// Solar only, as the layer picker starts.
    fn default() -> Self {
        Self(vec![LayerKind::Solar])
    }
}

/// Raw slider weights per layer, as supplied by the user.
///
/// Weights are not rescaled here; the compositor does that.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerWeights(BTreeMap<LayerKind, f64>);

impl LayerWeights {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, layer: LayerKind, weight: f64) -> Result<(), MapError> {
        if !weight.is_finite() {
            return Err(MapError::invalid(
                format!("{}_weight", layer.id()),
                "weight must be a finite number",
            ));
        }
        self.0.insert(layer, weight);
        Ok(())
    }

    pub fn with(mut self, layer: LayerKind, weight: f64) -> Result<Self, MapError> {
        self.set(layer, weight)?;
        Ok(self)
    }

    pub fn explicit(&self, layer: LayerKind) -> Option<f64> {
        self.0.get(&layer).copied()
    }

    /// Resolve the weight for `layer` within `selection`.
    ///
    /// With exactly solar + CO₂ selected and only the solar slider set, CO₂
    /// takes the complement `1 - solar`. Otherwise missing weights fall back
    /// to the layer default.
    pub fn resolve(&self, layer: LayerKind, selection: &LayerSelection) -> f64 {
        if let Some(w) = self.explicit(layer) {
            return w;
        }

        let solar_co2_pair = selection.len() == 2
            && selection.contains(LayerKind::Solar)
            && selection.contains(LayerKind::Co2);

        if layer == LayerKind::Co2 && solar_co2_pair {
            if let Some(solar) = self.explicit(LayerKind::Solar) {
                return (1.0 - solar.clamp(0.0, 1.0)).max(0.0);
            }
        }

        layer.default_weight()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_layer_kind() {
        assert_eq!("solar".parse::<LayerKind>().unwrap(), LayerKind::Solar);
        assert_eq!("CO2".parse::<LayerKind>().unwrap(), LayerKind::Co2);
        assert_eq!("Pipeline Network".parse::<LayerKind>().unwrap(), LayerKind::Pipelines);
        assert!(matches!("wind".parse::<LayerKind>(), Err(MapError::UnknownLayer(_))));
    }

    #[test]
    fn test_selection_dedups_and_keeps_order() {
        let sel = LayerSelection::parse("co2, solar,,co2").unwrap();
        assert_eq!(sel.iter().collect::<Vec<_>>(), vec![LayerKind::Co2, LayerKind::Solar]);
        assert!(LayerSelection::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_co2_weight_complements_solar() {
        let sel = LayerSelection::new([LayerKind::Solar, LayerKind::Co2]);
        let weights = LayerWeights::new().with(LayerKind::Solar, 0.75).unwrap();
        assert!((weights.resolve(LayerKind::Co2, &sel) - 0.25).abs() < 1e-12);

        // Third layer present: no complement rule
        let sel = LayerSelection::new([LayerKind::Solar, LayerKind::Co2, LayerKind::Pipelines]);
        assert_eq!(weights.resolve(LayerKind::Co2, &sel), LayerKind::Co2.default_weight());
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let mut weights = LayerWeights::new();
        assert!(weights.set(LayerKind::Solar, f64::NAN).is_err());
        assert!(weights.explicit(LayerKind::Solar).is_none());
    }
}
