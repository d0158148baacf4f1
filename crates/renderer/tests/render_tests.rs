//! Cross-module rendering tests: classification through raster projection,
//! canvas compositing and PNG encoding.

use atlas_common::Extent;
use renderer::raster::project_raster;
use renderer::{png, Color, ColorClassification, FigureCanvas};

fn depth_classification() -> ColorClassification {
    ColorClassification::new(
        vec![0.5, 1.5, 2.5],
        vec![Color::rgb(100, 150, 200), Color::rgb(20, 60, 120)],
        Color::transparent(),
        Color::rgb(5, 20, 50),
    )
    .unwrap()
}

#[test]
fn test_classified_raster_survives_png_roundtrip() {
    let classification = depth_classification();
    let extent = Extent::new(0.0, 2.0, 0.0, 2.0);
    // 2x2 raster: shallow, deep, dry, sentinel
    let samples = vec![1.0, 2.0, 0.0, 999.0];

    let layer = project_raster(&samples, 2, 2, &extent, &extent, &classification, 8, 8);
    let mut canvas = FigureCanvas::new(8, 8, Color::rgb(255, 255, 255)).unwrap();
    canvas.draw_rgba(0, 0, layer, 8, 8, None).unwrap();

    let encoded = png::encode(&canvas.to_rgba(), 8, 8).unwrap();
    let decoded = image::load_from_memory(&encoded).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (8, 8));

    // Quadrants carry their classified colors after decode
    assert_eq!(decoded.get_pixel(1, 1).0, [100, 150, 200, 255]); // 1.0
    assert_eq!(decoded.get_pixel(6, 1).0, [20, 60, 120, 255]); // 2.0
    assert_eq!(decoded.get_pixel(1, 6).0, [255, 255, 255, 255]); // dry: background
    assert_eq!(decoded.get_pixel(6, 6).0, [5, 20, 50, 255]); // sentinel: over color
}

#[test]
fn test_same_value_same_color_across_panels() {
    // Two panels of different rasters sharing one classification must give
    // identical colors to identical values.
    let classification = depth_classification();
    let extent = Extent::new(0.0, 1.0, 0.0, 1.0);

    let a = project_raster(&[1.0], 1, 1, &extent, &extent, &classification, 4, 4);
    let b = project_raster(&[1.0], 1, 1, &extent, &extent, &classification, 4, 4);
    assert_eq!(a, b);
}

#[test]
fn test_overlay_draws_over_raster_layer() {
    let classification = depth_classification();
    let extent = Extent::new(0.0, 1.0, 0.0, 1.0);
    let layer = project_raster(&[2.0], 1, 1, &extent, &extent, &classification, 16, 16);

    let mut canvas = FigureCanvas::new(16, 16, Color::rgb(255, 255, 255)).unwrap();
    canvas.draw_rgba(0, 0, layer, 16, 16, None).unwrap();
    canvas.stroke_polyline(
        &[(0.0, 8.0), (16.0, 8.0)],
        Color::rgb(209, 23, 10),
        2.0,
        None,
    );

    let rgba = canvas.to_rgba();
    let probe = |x: u32, y: u32| {
        let idx = ((y * 16 + x) * 4) as usize;
        [rgba[idx], rgba[idx + 1], rgba[idx + 2]]
    };
    assert_eq!(probe(8, 8), [209, 23, 10]); // road over raster
    assert_eq!(probe(8, 2), [20, 60, 120]); // raster away from the road
}
