//! Shared legend and colorbar rendering.
//!
//! Exactly one colorbar is attached per figure, built from the figure's
//! single `ColorClassification`, so the legend is guaranteed to describe
//! every panel. Patch legends (road classes, highlighted routes) are
//! likewise figure-level artifacts.

use atlas_common::AtlasResult;
use tiny_skia::Pixmap;

use crate::canvas::FigureCanvas;
use crate::classify::ColorClassification;
use crate::color::Color;
use crate::text::Typeface;

const FRAME: Color = Color::rgb(80, 80, 80);
const TEXT: Color = Color::rgb(30, 30, 30);

/// One entry of a patch legend: a color swatch and its label.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

impl LegendEntry {
    pub fn new(label: impl Into<String>, color: Color) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

/// Render a horizontal discrete colorbar for a classification.
///
/// Every interval gets an equal-width segment; boundary values are labeled
/// beneath the segment edges and an optional caption is centered under the
/// ticks. Returns a standalone pixmap for the layout to place outside the
/// panel grid.
pub fn colorbar(
    classification: &ColorClassification,
    width: u32,
    bar_height: u32,
    typeface: Option<&Typeface>,
    caption: Option<&str>,
) -> AtlasResult<Pixmap> {
    let font_size = (bar_height as f32 * 0.9).clamp(9.0, 14.0);
    let tick_space = if typeface.is_some() { font_size as u32 + 6 } else { 0 };
    let caption_space = match (typeface.is_some(), caption) {
        (true, Some(_)) => font_size as u32 + 6,
        _ => 0,
    };
    let height = bar_height + tick_space + caption_space;

    let mut canvas = FigureCanvas::new(width, height, Color::transparent())?;

    let segments = classification.colors();
    let n = segments.len() as f32;
    // Side margin keeps edge tick labels inside the pixmap.
    let margin = (width as f32 * 0.04).max(8.0);
    let seg_width = (width as f32 - 2.0 * margin) / n;

    for (i, color) in segments.iter().enumerate() {
        let x = margin + i as f32 * seg_width;
        canvas.fill_rect(x, 0.0, seg_width, bar_height as f32, *color);
    }
    canvas.stroke_rect(
        margin,
        0.5,
        seg_width * n,
        bar_height as f32 - 1.0,
        FRAME,
        1.0,
    );

    if let Some(tf) = typeface {
        for (i, boundary) in classification.boundaries().iter().enumerate() {
            let x = margin + i as f32 * seg_width;
            tf.draw_text_centered(
                &mut canvas,
                x.round() as i32,
                bar_height as i32 + 2,
                &format_boundary(*boundary),
                font_size,
                TEXT,
            );
        }
        if let Some(text) = caption {
            tf.draw_text_centered(
                &mut canvas,
                (width / 2) as i32,
                (bar_height + tick_space) as i32 + 2,
                text,
                font_size,
                TEXT,
            );
        }
    }

    Ok(canvas.into_pixmap())
}

/// Render a patch legend: swatch + label rows on a translucent white card.
pub fn patch_legend(
    entries: &[LegendEntry],
    typeface: &Typeface,
    font_size: f32,
) -> AtlasResult<Pixmap> {
    let swatch = font_size * 1.2;
    let pad = 6.0;
    let row_height = swatch + 4.0;
    let text_width = entries
        .iter()
        .map(|e| typeface.text_width(&e.label, font_size))
        .fold(0.0f32, f32::max);
    let width = (pad * 3.0 + swatch + text_width).ceil() as u32;
    let height = (pad * 2.0 + row_height * entries.len() as f32).ceil() as u32;

    let mut canvas = FigureCanvas::new(width, height, Color::transparent())?;
    canvas.fill_rect(
        0.0,
        0.0,
        width as f32,
        height as f32,
        Color::new(255, 255, 255, 230),
    );
    canvas.stroke_rect(0.5, 0.5, width as f32 - 1.0, height as f32 - 1.0, FRAME, 1.0);

    for (i, entry) in entries.iter().enumerate() {
        let y = pad + i as f32 * row_height;
        canvas.fill_rect(pad, y, swatch, swatch, entry.color);
        canvas.stroke_rect(pad, y, swatch, swatch, FRAME, 0.5);
        typeface.draw_text(
            &mut canvas,
            (pad * 2.0 + swatch) as i32,
            y as i32,
            &entry.label,
            font_size,
            TEXT,
        );
    }

    Ok(canvas.into_pixmap())
}

/// Trailing zeros stripped so a colorbar reads "0.5 1 1.5 2".
fn format_boundary(value: f64) -> String {
    if (value - value.round()).abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{:.2}", value)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
