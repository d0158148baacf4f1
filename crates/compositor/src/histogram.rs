//! Histogram panels for the flood-depth distribution figure.

use atlas_common::AtlasResult;
use renderer::{Color, FigureCanvas, Typeface};

use crate::layout::CellRect;
use crate::stats::Histogram;

const BAR_COLOR: Color = Color::rgb(49, 130, 189);
const AXIS_COLOR: Color = Color::rgb(120, 120, 120);

/// Draw one scenario's depth histogram into a grid cell.
///
/// `y_limit` fixes the vertical scale across every panel so the grid is
/// comparable, the same role the shared classification plays for maps.
/// Bars that exceed the limit are cut at the top of the cell.
pub fn draw_histogram_panel(
    canvas: &mut FigureCanvas,
    cell: &CellRect,
    histogram: &Histogram,
    y_limit: u32,
) -> AtlasResult<()> {
    let mask = canvas.rect_mask(cell.x, cell.y, cell.w, cell.h)?;
    canvas.fill_rect(cell.x, cell.y, cell.w, cell.h, Color::rgb(255, 255, 255));

    let bins = histogram.counts.len();
    if bins > 0 && y_limit > 0 {
        let bar_width = cell.w / bins as f32;
        for (i, &count) in histogram.counts.iter().enumerate() {
            if count == 0 {
                continue;
            }
            let frac = (count as f32 / y_limit as f32).min(1.0);
            let bar_height = frac * cell.h;
            canvas.fill_rect(
                cell.x + i as f32 * bar_width,
                cell.y + cell.h - bar_height,
                (bar_width - 0.5).max(0.5),
                bar_height,
                BAR_COLOR,
            );
        }
    }

    // Baseline and left axis
    canvas.stroke_polyline(
        &[(cell.x, cell.y + cell.h), (cell.x + cell.w, cell.y + cell.h)],
        AXIS_COLOR,
        1.0,
        Some(&mask),
    );
    canvas.stroke_polyline(
        &[(cell.x, cell.y), (cell.x, cell.y + cell.h)],
        AXIS_COLOR,
        1.0,
        Some(&mask),
    );
    Ok(())
}

/// X-axis caption under the histogram grid.
pub fn draw_axis_caption(
    canvas: &mut FigureCanvas,
    typeface: &Typeface,
    x: i32,
    y: i32,
    text: &str,
    size: f32,
) {
    typeface.draw_text(canvas, x, y, text, size, Color::rgb(30, 30, 30));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::histogram;

    #[test]
    fn test_bars_scale_to_limit() {
        let mut canvas = FigureCanvas::new(60, 60, Color::rgb(255, 255, 255)).unwrap();
        let cell = CellRect {
            x: 5.0,
            y: 5.0,
            w: 50.0,
            h: 50.0,
        };
        // One bin at half the limit
        let hist = histogram(&[1.0; 50], 1, (0.0, 15.0));
        draw_histogram_panel(&mut canvas, &cell, &hist, 100).unwrap();

        let rgba = canvas.to_rgba();
        let probe = |x: u32, y: u32| {
            let idx = ((y * 60 + x) * 4) as usize;
            [rgba[idx], rgba[idx + 1], rgba[idx + 2]]
        };
        // Bottom half of the cell carries the bar
        assert_eq!(probe(30, 50), [49, 130, 189]);
        // Top half stays white
        assert_eq!(probe(30, 10), [255, 255, 255]);
    }

    #[test]
    fn test_empty_histogram_draws_axes_only() {
        let mut canvas = FigureCanvas::new(60, 60, Color::rgb(255, 255, 255)).unwrap();
        let cell = CellRect {
            x: 5.0,
            y: 5.0,
            w: 50.0,
            h: 50.0,
        };
        let hist = histogram(&[], 15, (0.0, 15.0));
        assert!(draw_histogram_panel(&mut canvas, &cell, &hist, 20000).is_ok());
    }
}
