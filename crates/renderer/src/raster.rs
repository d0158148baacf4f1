//! Raster-to-viewport projection through a shared classification.

use atlas_common::Extent;

use crate::classify::ColorClassification;

/// Project a georeferenced raster into a viewport-sized RGBA buffer.
///
/// Each destination pixel is mapped through the view extent back to the
/// raster's native extent and sampled nearest-neighbor; the sample value is
/// colored by the figure-wide classification. Pixels outside the raster's
/// native extent come out fully transparent so the basemap shows through.
///
/// The returned buffer is premultiplied RGBA, ready for canvas compositing.
pub fn project_raster(
    samples: &[f32],
    width: usize,
    height: usize,
    native: &Extent,
    view: &Extent,
    classification: &ColorClassification,
    out_width: u32,
    out_height: u32,
) -> Vec<u8> {
    let mut pixels = vec![0u8; out_width as usize * out_height as usize * 4];
    if width == 0 || height == 0 || samples.len() < width * height {
        return pixels;
    }

    let view = view.normalized();
    for py in 0..out_height {
        // Destination pixel centers, row by row.
        let lat = view.north - (py as f64 + 0.5) / out_height as f64 * view.height();
        for px in 0..out_width {
            let lon = view.west + (px as f64 + 0.5) / out_width as f64 * view.width();
            if !native.contains(lon, lat) {
                continue;
            }

            let col = ((lon - native.west) / native.width() * width as f64) as usize;
            let row = ((native.north - lat) / native.height() * height as f64) as usize;
            let col = col.min(width - 1);
            let row = row.min(height - 1);

            let value = samples[row * width + col];
            let color = classification.classify(value as f64);
            if color.a == 0 {
                continue;
            }

            let idx = (py as usize * out_width as usize + px as usize) * 4;
            pixels[idx..idx + 4].copy_from_slice(&color.premultiplied());
        }
    }

    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;

    fn two_bucket() -> ColorClassification {
        ColorClassification::new(
            vec![0.5, 1.5, 2.5],
            vec![Color::rgb(100, 0, 0), Color::rgb(0, 100, 0)],
            Color::transparent(),
            Color::rgb(0, 0, 100),
        )
        .unwrap()
    }

    #[test]
    fn test_identity_projection() {
        // 2x2 raster over a matching 2x2 pixel viewport
        let native = Extent::new(0.0, 2.0, 0.0, 2.0);
        let samples = vec![1.0, 2.0, 0.0, 3.0];
        let rgba = project_raster(&samples, 2, 2, &native, &native, &two_bucket(), 2, 2);

        assert_eq!(&rgba[0..4], &[100, 0, 0, 255]); // 1.0 -> first bucket
        assert_eq!(&rgba[4..8], &[0, 100, 0, 255]); // 2.0 -> second bucket
        assert_eq!(rgba[11], 0); // 0.0 -> under -> transparent
        assert_eq!(&rgba[12..16], &[0, 0, 100, 255]); // 3.0 -> over
    }

    #[test]
    fn test_view_outside_native_is_transparent() {
        let native = Extent::new(0.0, 1.0, 0.0, 1.0);
        let view = Extent::new(10.0, 11.0, 10.0, 11.0);
        let samples = vec![2.0];
        let rgba = project_raster(&samples, 1, 1, &native, &view, &two_bucket(), 4, 4);
        assert!(rgba.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_zoomed_view_crops_raster() {
        // 4x4 raster; view covers only the northwest quadrant
        let native = Extent::new(0.0, 4.0, 0.0, 4.0);
        let mut samples = vec![0.0; 16];
        samples[0] = 2.0; // northwest corner cell
        samples[15] = 2.0; // southeast corner cell, outside the view
        let view = Extent::new(0.0, 2.0, 2.0, 4.0);
        let rgba = project_raster(&samples, 4, 4, &native, &view, &two_bucket(), 4, 4);

        // Top-left of the viewport shows the northwest cell
        assert_eq!(&rgba[0..4], &[0, 100, 0, 255]);
        // Bottom-right of the viewport maps to raster cell (1,1) = 0.0
        let idx = (3 * 4 + 3) * 4;
        assert_eq!(rgba[idx + 3], 0);
    }

    #[test]
    fn test_nan_samples_are_transparent() {
        let native = Extent::new(0.0, 1.0, 0.0, 1.0);
        let rgba = project_raster(&[f32::NAN], 1, 1, &native, &native, &two_bucket(), 2, 2);
        assert!(rgba.iter().all(|&b| b == 0));
    }
}
