//! Operating oil and gas pipelines per country.
//!
//! Counts are from the Global Energy Monitor oil infrastructure tracker;
//! positions are rough country centroids, not pipeline routes.

use map_common::SamplePoint;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineCountry {
    pub name: &'static str,
    pub count: u32,
    pub lat: f64,
    pub lon: f64,
}

const fn entry(name: &'static str, count: u32, lat: f64, lon: f64) -> PipelineCountry {
    PipelineCountry { name, count, lat, lon }
}

pub static PIPELINE_COUNTRIES: &[PipelineCountry] = &[
    entry("Argentina", 1709, -38.4, -63.6),
    entry("Australia", 1453, -25.3, 133.8),
    entry("Azerbaijan", 525, 40.1, 47.6),
    entry("Brazil", 1371, -10.8, -52.9),
    entry("Canada", 5343, 56.1, -106.3),
    entry("Chile", 156, -35.7, -71.5),
    entry("China", 3302, 35.9, 104.2),
    entry("Colombia", 1474, 4.6, -74.1),
    entry("Ecuador", 642, -1.8, -78.2),
    entry("France", 260, 46.2, 2.2),
    entry("Georgia", 248, 42.3, 43.4),
    entry("Germany", 43, 51.2, 10.5),
    entry("India", 4466, 20.6, 78.9),
    entry("Iran", 248, 32.4, 53.7),
    entry("Kazakhstan", 2468, 48.0, 67.0),
    entry("Libya", 595, 26.3, 17.2),
    entry("Mexico", 21, 23.6, -102.6),
    entry("Netherlands", 432, 52.1, 5.3),
    entry("New Zealand", 10, -40.9, 174.9),
    entry("Oman", 300, 21.5, 55.9),
    entry("Panama", 0, 8.5, -80.8),
    entry("Peru", 560, -9.2, -75.0),
    entry("Qatar", 437, 25.3, 51.2),
    entry("Russia", 12187, 61.5, 105.3),
    entry("Saudi Arabia", 1580, 23.9, 45.1),
    entry("Spain", 350, 40.5, -3.7),
    entry("Switzerland", 118, 46.8, 8.2),
    entry("Türkiye", 1075, 39.0, 35.2),
    entry("United Arab Emirates", 306, 23.4, 53.8),
    entry("United Kingdom", 37, 55.4, -3.4),
    entry("United States", 51123, 37.1, -95.7),
];

/// Raw counts as samples, countries with no pipelines omitted.
pub fn pipeline_samples() -> Vec<SamplePoint> {
    PIPELINE_COUNTRIES
        .iter()
        .filter(|c| c.count > 0)
        .map(|c| SamplePoint::new(c.lat, c.lon, c.count as f64))
        .collect()
}
