//! Rescaling raw layer values to weights in [0, 1].

use map_common::{SamplePoint, WeightedPoint};
use serde::Serialize;

use crate::error::Degenerate;

/// How qualifying values are mapped into [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scaling {
    /// `(v - vmin) / (vmax - vmin)`
    #[default]
    MinMax,
    /// `ln(1 + v) / ln(1 + vmax)`; compresses heavy-tailed counts.
    /// Only strictly positive values qualify.
    LogRatio,
}

/// Normalizer configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    /// Exclude values `<= 0` from both the range and the output.
    pub positive_only: bool,
    pub scaling: Scaling,
}

/// A layer of weights ready for blending, in input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedLayer {
    pub points: Vec<WeightedPoint>,
    /// Smallest qualifying raw value
    pub vmin: f64,
    /// Largest qualifying raw value
    pub vmax: f64,
}

impl NormalizedLayer {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Normalizer {
    pub fn min_max() -> Self {
        Self::default()
    }

    /// Min-max over strictly positive values.
    pub fn positive_min_max() -> Self {
        Self {
            positive_only: true,
            scaling: Scaling::MinMax,
        }
    }

    pub fn log_ratio() -> Self {
        Self {
            positive_only: true,
            scaling: Scaling::LogRatio,
        }
    }

    fn qualifies(&self, v: f64) -> bool {
        let positive_required = self.positive_only || self.scaling == Scaling::LogRatio;
        v.is_finite() && (!positive_required || v > 0.0)
    }

    /// Normalize raw samples.
    ///
    /// Points whose value does not qualify are dropped. Returns
    /// [`Degenerate`] instead of dividing by zero when nothing qualifies or,
    /// for min-max, when all qualifying values are equal.
    pub fn normalize(&self, samples: &[SamplePoint]) -> Result<NormalizedLayer, Degenerate> {
        let mut vmin = f64::INFINITY;
        let mut vmax = f64::NEG_INFINITY;
        let mut count = 0usize;

        for s in samples.iter().filter(|s| self.qualifies(s.value)) {
            vmin = vmin.min(s.value);
            vmax = vmax.max(s.value);
            count += 1;
        }

        if count == 0 {
            return Err(Degenerate::Empty);
        }

        if self.scaling == Scaling::MinMax && vmax == vmin {
            return Err(Degenerate::Constant { value: vmin, count });
        }

        let weight = |v: f64| match self.scaling {
            Scaling::MinMax => (v - vmin) / (vmax - vmin),
            Scaling::LogRatio => v.ln_1p() / vmax.ln_1p(),
        };

        let points = samples
            .iter()
            .filter(|s| self.qualifies(s.value))
            .map(|s| WeightedPoint::new(s.lat, s.lon, weight(s.value).clamp(0.0, 1.0)))
            .collect();

        Ok(NormalizedLayer { points, vmin, vmax })
    }
}
