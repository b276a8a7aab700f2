//! Geometry → centroids → name resolution, as a render pass uses them.

use geodata::{parse_countries, resolve, select_land_mask, CentroidStore};
use map_common::LatLon;
use std::fs;
use test_utils::{assert_coords_approx_eq, cache_dir, world_geojson};

#[test]
fn test_dataset_names_resolve_to_centroids() {
    let shapes = parse_countries(&world_geojson()).unwrap();
    let centroids = CentroidStore::build(&shapes);

    let usa = resolve("United States", &centroids).unwrap();
    assert_eq!(usa, "United States of America");

    // Alias target carries a typographic apostrophe
    let civ = resolve("Cote d'Ivoire", &centroids).unwrap();
    let c = centroids[civ];
    assert_coords_approx_eq!((c.lat, c.lon), (7.0, -6.0), 1e-9);

    assert_eq!(resolve("West Bank and Gaza", &centroids), Some("Palestine"));
    assert_eq!(resolve("Korea, Rep.", &centroids), None);
}

#[test]
fn test_every_centroid_of_a_rectangle_is_land() {
    let shapes = parse_countries(&world_geojson()).unwrap();
    let centroids = CentroidStore::build(&shapes);
    let (mask, _) = select_land_mask(Ok(&shapes));

    for name in ["France", "Côte d’Ivoire", "Palestine"] {
        assert!(mask.is_land(centroids[name]), "{} centroid not on land", name);
    }
    assert!(!mask.is_land(LatLon::new(0.0, -150.0)));
}

#[test]
fn test_corrupt_centroid_cache_is_rebuilt() {
    let dir = cache_dir();
    let store = CentroidStore::in_dir(dir.path());
    fs::write(dir.path().join("country_coords_ne.json"), "{\"France\": [1]").unwrap();
    assert!(store.cached().is_none());

    let shapes = parse_countries(&world_geojson()).unwrap();
    store.rebuild(&shapes).unwrap();
    assert_eq!(store.cached().unwrap().len(), 4);

    store.clear().unwrap();
    assert!(store.cached().is_none());
}
