//! Rendering tests: heatmaps through to decoded PNG bytes.

use flate2::read::ZlibDecoder;
use map_common::{HeatmapStyle, LayerKind, WeightedPoint};
use renderer::png::encode_rgba;
use renderer::{render_heatmap, Raster};
use std::io::Read;

// ============================================================================
// Helper functions
// ============================================================================

/// Walk PNG chunks, returning `(type, data)` pairs. Panics on a CRC mismatch.
fn chunks(png: &[u8]) -> Vec<([u8; 4], Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = 8;
    while pos < png.len() {
        let len = u32::from_be_bytes(png[pos..pos + 4].try_into().unwrap()) as usize;
        let kind: [u8; 4] = png[pos + 4..pos + 8].try_into().unwrap();
        let data = png[pos + 8..pos + 8 + len].to_vec();
        let crc = u32::from_be_bytes(png[pos + 8 + len..pos + 12 + len].try_into().unwrap());

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&kind);
        hasher.update(&data);
        assert_eq!(hasher.finalize(), crc, "bad CRC in {:?}", kind);

        out.push((kind, data));
        pos += 12 + len;
    }
    out
}

/// Inflate the IDAT stream and strip filter bytes.
fn decode_pixels(png: &[u8], width: usize) -> Vec<u8> {
    let idat: Vec<u8> = chunks(png)
        .into_iter()
        .filter(|(kind, _)| kind == b"IDAT")
        .flat_map(|(_, data)| data)
        .collect();

    let mut raw = Vec::new();
    ZlibDecoder::new(&idat[..]).read_to_end(&mut raw).unwrap();

    raw.chunks_exact(1 + width * 4)
        .flat_map(|row| {
            assert_eq!(row[0], 0, "unexpected filter type");
            row[1..].to_vec()
        })
        .collect()
}

// ============================================================================
// PNG
// ============================================================================

#[test]
fn test_png_round_trips_pixels() {
    let pixels: Vec<u8> = (0..3 * 2 * 4).map(|i| (i * 10) as u8).collect();
    let png = encode_rgba(&pixels, 3, 2).unwrap();

    let kinds: Vec<[u8; 4]> = chunks(&png).into_iter().map(|(k, _)| k).collect();
    assert_eq!(kinds, vec![*b"IHDR", *b"IDAT", *b"IEND"]);
    assert_eq!(decode_pixels(&png, 3), pixels);
}

// ============================================================================
// Heatmap
// ============================================================================

#[test]
fn test_heatmap_png_has_painted_and_clear_regions() {
    let raster = Raster::world(256, 128).unwrap();
    let style = HeatmapStyle::default_for(LayerKind::Pipelines);
    let points = vec![
        WeightedPoint::new(37.1, -95.7, 1.0),
        WeightedPoint::new(61.5, 105.3, 0.6),
    ];

    let image = render_heatmap(&points, &style, &raster).unwrap();
    let png = image.to_png().unwrap();
    let pixels = decode_pixels(&png, 256);
    assert_eq!(pixels, image.pixels);

    // Under the strongest point: opaque-ish, top of the gradient
    let (x, y) = raster.to_pixel(37.1, -95.7);
    let peak = image.pixel(x as u32, y as u32);
    assert!(peak[3] > 200, "peak alpha {}", peak[3]);

    // Southern ocean far from both points stays transparent
    let (x, y) = raster.to_pixel(-60.0, 0.0);
    assert_eq!(image.pixel(x as u32, y as u32)[3], 0);
}

#[test]
fn test_max_intensity_caps_colour() {
    let raster = Raster::world(128, 64).unwrap();
    let mut style = HeatmapStyle::default_for(LayerKind::Co2);

    let points = [WeightedPoint::new(0.0, 0.0, 0.25)];
    let auto = render_heatmap(&points, &style, &raster).unwrap();

    style.max_intensity = Some(1.0);
    let capped = render_heatmap(&points, &style, &raster).unwrap();

    let (x, y) = raster.to_pixel(0.0, 0.0);
    // Observed max scales the lone point to full intensity; a fixed max does not
    assert!(auto.pixel(x as u32, y as u32)[3] > capped.pixel(x as u32, y as u32)[3]);
}
