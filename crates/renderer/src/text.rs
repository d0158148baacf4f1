//! Text decoration: titles, rotated row labels and annotations.
//!
//! Glyphs are laid out with rusttype into an RGBA image and composited onto
//! the figure canvas. No font is embedded in the binary; `Typeface`
//! discovers a system font at startup (override with `ATLAS_FONT`). When no
//! font can be found the figure still renders, minus its text decorations:
//! callers hold an `Option<Typeface>` and skip labels when it is `None`.

use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use std::path::PathBuf;
use tiny_skia::{IntSize, Pixmap};
use tracing::{debug, warn};

use crate::canvas::FigureCanvas;
use crate::color::Color;

/// Well-known font locations, tried in order.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

/// A loaded TrueType face.
pub struct Typeface {
    font: Font<'static>,
}

impl Typeface {
    /// Load a face from raw TTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font })
    }

    /// Find a usable system font.
    ///
    /// `ATLAS_FONT` takes precedence; otherwise the standard DejaVu and
    /// Liberation locations are probed. Returns `None` (with a warning)
    /// when nothing loads; figures then render without text decorations.
    pub fn discover() -> Option<Self> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(path) = std::env::var_os("ATLAS_FONT") {
            candidates.push(PathBuf::from(path));
        }
        candidates.extend(FONT_SEARCH_PATHS.iter().map(PathBuf::from));

        for path in candidates {
            if let Ok(bytes) = std::fs::read(&path) {
                if let Some(face) = Self::from_bytes(bytes) {
                    debug!(font = %path.display(), "loaded typeface");
                    return Some(face);
                }
            }
        }
        warn!("no usable font found; text decorations will be skipped");
        None
    }

    /// Advance width of a string at the given pixel size.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Full line height at the given pixel size.
    pub fn line_height(&self, size: f32) -> f32 {
        let m = self.font.v_metrics(Scale::uniform(size));
        m.ascent - m.descent + m.line_gap
    }

    /// Rasterize a string into a tightly sized RGBA image.
    fn rasterize(&self, text: &str, size: f32, color: Color) -> Option<RgbaImage> {
        let width = self.text_width(text, size).ceil() as u32 + 2;
        let height = self.line_height(size).ceil() as u32 + 2;
        if width <= 2 || height <= 2 || text.is_empty() {
            return None;
        }
        let mut img = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 0]));
        draw_text_mut(
            &mut img,
            Rgba([color.r, color.g, color.b, color.a]),
            1,
            1,
            Scale::uniform(size),
            &self.font,
            text,
        );
        Some(img)
    }

    /// Draw text with its top-left corner at `(x, y)`.
    pub fn draw_text(
        &self,
        canvas: &mut FigureCanvas,
        x: i32,
        y: i32,
        text: &str,
        size: f32,
        color: Color,
    ) {
        if let Some(img) = self.rasterize(text, size, color) {
            if let Some(layer) = image_to_pixmap(&img) {
                canvas.draw_pixmap(x, y, &layer);
            }
        }
    }

    /// Draw text horizontally centered on `cx`, top edge at `y`.
    pub fn draw_text_centered(
        &self,
        canvas: &mut FigureCanvas,
        cx: i32,
        y: i32,
        text: &str,
        size: f32,
        color: Color,
    ) {
        let half = (self.text_width(text, size) / 2.0).round() as i32;
        self.draw_text(canvas, cx - half, y, text, size, color);
    }

    /// Draw text rotated 90° counterclockwise (reading bottom-to-top), the
    /// orientation of row labels along the left figure edge. `(x, y)` is
    /// the top-left corner of the rotated block; the block is vertically
    /// centered on `cy`.
    pub fn draw_text_rotated(
        &self,
        canvas: &mut FigureCanvas,
        x: i32,
        cy: i32,
        text: &str,
        size: f32,
        color: Color,
    ) {
        let Some(img) = self.rasterize(text, size, color) else {
            return;
        };
        let (w, h) = (img.width(), img.height());
        // Rotate 90° CCW: destination (dx, dy) takes source (w-1-dy, dx).
        let mut rotated = RgbaImage::from_pixel(h, w, Rgba([0, 0, 0, 0]));
        for dy in 0..w {
            for dx in 0..h {
                let src = img.get_pixel(w - 1 - dy, dx);
                rotated.put_pixel(dx, dy, *src);
            }
        }
        if let Some(layer) = image_to_pixmap(&rotated) {
            let top = cy - (w as i32 / 2);
            canvas.draw_pixmap(x, top, &layer);
        }
    }
}

/// Convert a straight-alpha RGBA image into a premultiplied pixmap.
fn image_to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = Vec::with_capacity((img.width() * img.height() * 4) as usize);
    for pixel in img.pixels() {
        let [r, g, b, a] = pixel.0;
        data.extend_from_slice(&Color::new(r, g, b, a).premultiplied());
    }
    Pixmap::from_vec(data, size)
}
