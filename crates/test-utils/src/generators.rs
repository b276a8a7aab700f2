//! Synthetic sample generators.

use map_common::SamplePoint;

/// Samples on a `[-90, 90] x [-180, 180]` lattice, row-major, with values from `f(lat, lon)`.
pub fn lattice_samples(step_lat: f64, step_lon: f64, f: impl Fn(f64, f64) -> f64) -> Vec<SamplePoint> {
    let lats = (0..)
        .map(|k| -90.0 + k as f64 * step_lat)
        .take_while(|lat| *lat <= 90.0 + 1e-9);
    let mut out = Vec::new();
    for lat in lats {
        let mut lon = -180.0;
        while lon <= 180.0 + 1e-9 {
            out.push(SamplePoint::new(lat, lon, f(lat, lon)));
            lon += step_lon;
        }
    }
    out
}

/// Samples along the equator with the given values, one degree apart.
pub fn equator_samples(values: &[f64]) -> Vec<SamplePoint> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| SamplePoint::new(0.0, i as f64, *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lattice_samples_count() {
        let samples = lattice_samples(90.0, 180.0, |lat, _| lat);
        assert_eq!(samples.len(), 9);
        assert_eq!(samples[8].value, 90.0);
    }

    #[test]
    fn test_equator_samples() {
        let samples = equator_samples(&[1.0, 2.0]);
        assert_eq!(samples[1], SamplePoint::new(0.0, 1.0, 2.0));
    }
}
