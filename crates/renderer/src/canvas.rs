//! RGBA figure canvas built on tiny-skia.
//!
//! All figure composition goes through this type: panels clip their
//! drawing to a rectangular mask, vector overlays are stroked/filled as
//! paths, and raster layers arrive as premultiplied RGBA buffers.

use atlas_common::{AtlasError, AtlasResult};
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, Mask, Paint, PathBuilder, Pixmap, PixmapPaint, Rect,
    Stroke, Transform,
};

use crate::color::Color;

/// The full-figure drawing surface.
#[derive(Debug)]
pub struct FigureCanvas {
    pixmap: Pixmap,
}

impl FigureCanvas {
    /// Allocate a canvas filled with the background color.
    pub fn new(width: u32, height: u32, background: Color) -> AtlasResult<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            AtlasError::Render(format!("cannot allocate {}x{} canvas", width, height))
        })?;
        pixmap.fill(to_skia_color(background));
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Build a clip mask covering one rectangle, used to confine a panel's
    /// layers to its grid cell.
    pub fn rect_mask(&self, x: f32, y: f32, w: f32, h: f32) -> AtlasResult<Mask> {
        let mut mask = Mask::new(self.pixmap.width(), self.pixmap.height())
            .ok_or_else(|| AtlasError::Render("cannot allocate clip mask".to_string()))?;
        let rect = Rect::from_xywh(x, y, w, h)
            .ok_or_else(|| AtlasError::Render(format!("degenerate clip rect {}x{}", w, h)))?;
        let path = PathBuilder::from_rect(rect);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        Ok(mask)
    }

    /// Fill a rectangle.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Stroke a rectangle outline.
    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, width: f32) {
        let Some(rect) = Rect::from_xywh(x, y, w, h) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        let paint = solid_paint(color);
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Stroke an open polyline with round caps and joins.
    pub fn stroke_polyline(
        &mut self,
        points: &[(f32, f32)],
        color: Color,
        width: f32,
        clip: Option<&Mask>,
    ) {
        let Some(path) = build_path(points, false) else {
            return;
        };
        let paint = solid_paint(color);
        let stroke = Stroke {
            width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
    }

    /// Fill a polygon given as rings; even-odd rule so holes stay open.
    pub fn fill_polygon(&mut self, rings: &[Vec<(f32, f32)>], color: Color, clip: Option<&Mask>) {
        let mut pb = PathBuilder::new();
        for ring in rings {
            append_ring(&mut pb, ring);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = solid_paint(color);
        self.pixmap
            .fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), clip);
    }

    /// Stroke polygon ring outlines.
    pub fn stroke_polygon(
        &mut self,
        rings: &[Vec<(f32, f32)>],
        color: Color,
        width: f32,
        clip: Option<&Mask>,
    ) {
        let mut pb = PathBuilder::new();
        for ring in rings {
            append_ring(&mut pb, ring);
        }
        let Some(path) = pb.finish() else {
            return;
        };
        let paint = solid_paint(color);
        let stroke = Stroke {
            width,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), clip);
    }

    /// Composite a premultiplied RGBA buffer at an integer position.
    pub fn draw_rgba(
        &mut self,
        x: i32,
        y: i32,
        rgba: Vec<u8>,
        width: u32,
        height: u32,
        clip: Option<&Mask>,
    ) -> AtlasResult<()> {
        let size = IntSize::from_wh(width, height).ok_or_else(|| {
            AtlasError::Render(format!("degenerate raster layer {}x{}", width, height))
        })?;
        let layer = Pixmap::from_vec(rgba, size).ok_or_else(|| {
            AtlasError::Render("raster layer buffer does not match its dimensions".to_string())
        })?;
        self.pixmap.draw_pixmap(
            x,
            y,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            clip,
        );
        Ok(())
    }

    /// Composite another pixmap (legend, text image) at a position.
    pub fn draw_pixmap(&mut self, x: i32, y: i32, layer: &Pixmap) {
        self.pixmap.draw_pixmap(
            x,
            y,
            layer.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Consume the canvas, yielding the underlying pixmap.
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Straight (demultiplied) RGBA bytes for PNG encoding.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixmap.pixels().len() * 4);
        for pixel in self.pixmap.pixels() {
            let c = pixel.demultiply();
            out.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }
}

fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn solid_paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn build_path(points: &[(f32, f32)], close: bool) -> Option<tiny_skia::Path> {
    if points.len() < 2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(points[0].0, points[0].1);
    for &(x, y) in &points[1..] {
        pb.line_to(x, y);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

fn append_ring(pb: &mut PathBuilder, ring: &[(f32, f32)]) {
    if ring.len() < 3 {
        return;
    }
    pb.move_to(ring[0].0, ring[0].1);
    for &(x, y) in &ring[1..] {
        pb.line_to(x, y);
    }
    pb.close();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_starts_with_background() {
        let canvas = FigureCanvas::new(4, 4, Color::rgb(255, 255, 255)).unwrap();
        let rgba = canvas.to_rgba();
        assert_eq!(rgba.len(), 4 * 4 * 4);
        assert_eq!(&rgba[0..4], &[255, 255, 255, 255]);
    }

    #[test]
    fn test_fill_rect_changes_pixels() {
        let mut canvas = FigureCanvas::new(8, 8, Color::rgb(255, 255, 255)).unwrap();
        canvas.fill_rect(0.0, 0.0, 4.0, 4.0, Color::rgb(255, 0, 0));
        let rgba = canvas.to_rgba();
        assert_eq!(&rgba[0..3], &[255, 0, 0]);
        // Far corner untouched
        let last = (7 * 8 + 7) * 4;
        assert_eq!(&rgba[last..last + 3], &[255, 255, 255]);
    }

    #[test]
    fn test_clip_mask_confines_drawing() {
        let mut canvas = FigureCanvas::new(8, 8, Color::rgb(255, 255, 255)).unwrap();
        let mask = canvas.rect_mask(0.0, 0.0, 4.0, 8.0).unwrap();
        canvas.stroke_polyline(
            &[(0.0, 4.0), (8.0, 4.0)],
            Color::rgb(0, 0, 255),
            2.0,
            Some(&mask),
        );
        let rgba = canvas.to_rgba();
        // Inside the mask the line is drawn
        let inside = (4 * 8 + 1) * 4;
        assert_ne!(&rgba[inside..inside + 3], &[255, 255, 255]);
        // Outside the mask the background survives
        let outside = (4 * 8 + 6) * 4;
        assert_eq!(&rgba[outside..outside + 3], &[255, 255, 255]);
    }

    #[test]
    fn test_zero_canvas_is_error() {
        assert!(FigureCanvas::new(0, 10, Color::transparent()).is_err());
    }
}
