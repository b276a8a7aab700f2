//! Kernel-density heatmap rasterization.
//!
//! Each weighted point adds `weight * k(d)` to every pixel within
//! `radius + blur` pixels, where `k` is a Gaussian with
//! `sigma = (radius + blur) / 3`, normalized so `k(0) = 1`. The summed density
//! is divided by the style's `max_intensity` (or the observed maximum),
//! coloured through the gradient, and given an opacity between
//! `min_opacity` and `max_opacity`. Pixels with no density stay transparent.

use map_common::{BoundingBox, HeatmapStyle, WeightedPoint};
use tracing::debug;

use crate::error::{RenderError, RenderResult};
use crate::gradient::Palette;
use crate::png::encode_rgba;

/// Largest raster accepted, in pixels per side.
pub const MAX_DIMENSION: u32 = 8192;

/// Fractions below one palette step are not drawn.
const MIN_VISIBLE: f64 = 1.0 / 255.0;

/// Equirectangular pixel grid over a lon/lat box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub bbox: BoundingBox,
}

impl Raster {
    pub fn new(width: u32, height: u32, bbox: BoundingBox) -> RenderResult<Self> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if !(bbox.width() > 0.0) || !(bbox.height() > 0.0) {
            return Err(RenderError::EmptyBounds(format!("{:?}", bbox)));
        }
        Ok(Self {
            width,
            height,
            bbox,
        })
    }

    /// Whole-globe raster.
    pub fn world(width: u32, height: u32) -> RenderResult<Self> {
        Self::new(width, height, BoundingBox::WORLD)
    }

    /// Continuous pixel coordinates of a position; `(0, 0)` is the top-left corner.
    pub fn to_pixel(&self, lat: f64, lon: f64) -> (f64, f64) {
        let x = (lon - self.bbox.min_x) / self.bbox.width() * self.width as f64;
        let y = (self.bbox.max_y - lat) / self.bbox.height() * self.height as f64;
        (x, y)
    }

    fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Accumulated kernel density, row-major.
#[derive(Debug, Clone)]
pub struct DensityGrid {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl DensityGrid {
    /// Splat every point onto the raster. Non-finite or non-positive weights
    /// contribute nothing.
    pub fn accumulate(points: &[WeightedPoint], raster: &Raster, style: &HeatmapStyle) -> Self {
        let extent = (style.radius + style.blur).max(1.0) as f64;
        let sigma = extent / 3.0;
        let reach = extent.ceil() as i64;
        let two_sigma_sq = 2.0 * sigma * sigma;

        // Kernel indexed by squared integer distance from the centre pixel
        let max_d2 = (reach * reach) as usize;
        let kernel: Vec<f32> = (0..=max_d2)
            .map(|d2| (-(d2 as f64) / two_sigma_sq).exp() as f32)
            .collect();

        let (w, h) = (raster.width as i64, raster.height as i64);
        let mut values = vec![0f32; raster.len()];

        for p in points {
            if !p.weight.is_finite() || p.weight <= 0.0 {
                continue;
            }
            let (px, py) = raster.to_pixel(p.lat, p.lon);
            let (cx, cy) = (px.floor() as i64, py.floor() as i64);
            if cx + reach < 0 || cy + reach < 0 || cx - reach >= w || cy - reach >= h {
                continue;
            }

            let weight = p.weight as f32;
            for y in (cy - reach).max(0)..=(cy + reach).min(h - 1) {
                let dy = y - cy;
                let row = (y * w) as usize;
                for x in (cx - reach).max(0)..=(cx + reach).min(w - 1) {
                    let dx = x - cx;
                    let d2 = (dx * dx + dy * dy) as usize;
                    if d2 <= max_d2 {
                        values[row + x as usize] += weight * kernel[d2];
                    }
                }
            }
        }

        Self {
            width: raster.width,
            height: raster.height,
            values,
        }
    }

    pub fn max(&self) -> f32 {
        self.values.iter().copied().fold(0.0, f32::max)
    }

    pub fn at(&self, x: u32, y: u32) -> f32 {
        self.values
            .get(y as usize * self.width as usize + x as usize)
            .copied()
            .unwrap_or(0.0)
    }

    /// Colour the density through the style's gradient and opacity range.
    pub fn colorize(&self, style: &HeatmapStyle) -> RgbaImage {
        let palette = Palette::from_gradient(&style.gradient);
        let scale = match style.max_intensity {
            Some(max) if max > 0.0 && max.is_finite() => max,
            _ => self.max() as f64,
        };

        let mut pixels = vec![0u8; self.values.len() * 4];
        if scale > 0.0 {
            let (lo, hi) = (style.min_opacity as f64, style.max_opacity as f64);
            for (value, px) in self.values.iter().zip(pixels.chunks_exact_mut(4)) {
                let t = (*value as f64 / scale).min(1.0);
                if t < MIN_VISIBLE {
                    continue;
                }
                let [r, g, b, a] = palette.color(t);
                let opacity = lo + (hi - lo) * t;
                px.copy_from_slice(&[r, g, b, (opacity * a as f64).round() as u8]);
            }
        }

        RgbaImage {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RgbaImage {
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        match self.pixels.get(i..i + 4) {
            Some(px) => [px[0], px[1], px[2], px[3]],
            None => [0, 0, 0, 0],
        }
    }

    /// Number of pixels with non-zero alpha.
    pub fn painted(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        encode_rgba(&self.pixels, self.width, self.height)
    }
}

/// Render one overlay.
pub fn render_heatmap(
    points: &[WeightedPoint],
    style: &HeatmapStyle,
    raster: &Raster,
) -> RenderResult<RgbaImage> {
    style.validate().map_err(RenderError::InvalidStyle)?;

    let density = DensityGrid::accumulate(points, raster, style);
    debug!(
        points = points.len(),
        width = raster.width,
        height = raster.height,
        max_density = density.max(),
        "Rendered heatmap density"
    );
    Ok(density.colorize(style))
}

#[cfg(test)]
mod tests {
    use super::*;
    use map_common::{GradientConfig, LayerKind};

    fn style(radius: f32, blur: f32) -> HeatmapStyle {
        HeatmapStyle {
            radius,
            blur,
            min_opacity: 0.2,
            max_opacity: 1.0,
            max_intensity: None,
            gradient: GradientConfig::from_hex(&[(0.0, "#000000"), (1.0, "#FFFFFF")]),
        }
    }

    #[test]
    fn test_to_pixel_corners() {
        let raster = Raster::world(360, 180).unwrap();
        assert_eq!(raster.to_pixel(90.0, -180.0), (0.0, 0.0));
        assert_eq!(raster.to_pixel(-90.0, 180.0), (360.0, 180.0));
        assert_eq!(raster.to_pixel(0.0, 0.0), (180.0, 90.0));
    }

    #[test]
    fn test_peak_at_point() {
        let raster = Raster::world(360, 180).unwrap();
        let density = DensityGrid::accumulate(&[WeightedPoint::new(0.0, 0.0, 1.0)], &raster, &style(5.0, 4.0));

        assert_eq!(density.at(180, 90), 1.0);
        assert!(density.at(183, 90) < 1.0 && density.at(183, 90) > 0.0);
        // Beyond radius + blur
        assert_eq!(density.at(190, 90), 0.0);
    }

    #[test]
    fn test_overlapping_kernels_sum() {
        let raster = Raster::world(360, 180).unwrap();
        let points = [WeightedPoint::new(0.0, 0.0, 0.5), WeightedPoint::new(0.0, 0.0, 0.25)];
        let density = DensityGrid::accumulate(&points, &raster, &style(3.0, 0.0));
        assert_eq!(density.at(180, 90), 0.75);
    }

    #[test]
    fn test_empty_input_is_transparent() {
        let raster = Raster::world(64, 32).unwrap();
        let image = render_heatmap(&[], &HeatmapStyle::default_for(LayerKind::Solar), &raster).unwrap();
        assert_eq!(image.painted(), 0);
        assert_eq!(image.pixels.len(), 64 * 32 * 4);
    }

    #[test]
    fn test_opacity_range() {
        let raster = Raster::world(360, 180).unwrap();
        let image = render_heatmap(&[WeightedPoint::new(0.0, 0.0, 1.0)], &style(5.0, 0.0), &raster).unwrap();
        // Peak pixel: top of the gradient, full opacity
        assert_eq!(image.pixel(180, 90), [255, 255, 255, 255]);
        // Far away: untouched
        assert_eq!(image.pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(Raster::world(0, 10).is_err());
        assert!(Raster::new(10, 10, BoundingBox::new(0.0, 0.0, 0.0, 10.0)).is_err());

        let raster = Raster::world(10, 10).unwrap();
        assert!(render_heatmap(&[], &style(0.0, 0.0), &raster).is_err());
    }
}
