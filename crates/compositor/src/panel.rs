//! Panel composition: one scenario rendered into one grid cell.
//!
//! Layer order within a cell is fixed: basemap overlays first, then the
//! raster through the figure's shared classification, then overlays above
//! the raster in ascending z-order, then text annotations. A panel whose
//! raster failed to load renders as a visible placeholder instead of
//! aborting the figure.

use atlas_common::{AtlasError, AtlasResult, Extent};
use renderer::classify::ColorClassification;
use renderer::raster::project_raster;
use renderer::{Color, FigureCanvas, Typeface};
use shapefile_parser::Geometry;
use std::sync::Arc;
use tiny_skia::Mask;

use crate::layout::CellRect;
use crate::load::RasterPanelData;
use crate::overlay::{GeometryOverlay, RASTER_Z_ORDER};

const PANEL_BACKGROUND: Color = Color::rgb(255, 255, 255);
const PLACEHOLDER_FILL: Color = Color::rgb(235, 235, 235);
const PLACEHOLDER_MARK: Color = Color::rgb(190, 120, 120);
const LABEL_COLOR: Color = Color::rgb(30, 30, 30);
const ANNOTATION_COLOR: Color = Color::new(60, 60, 60, 178);

/// Text decorations for one panel. Titles and row labels are assigned by
/// the positional rule in the figure code (`is_first_row` /
/// `is_first_column`), not here.
#[derive(Debug, Clone, Default)]
pub struct PanelDecorations {
    /// Column title drawn centered above the cell.
    pub title: Option<String>,
    /// Row label drawn rotated along the cell's left edge.
    pub row_label: Option<String>,
    /// Place-name annotations at geographic positions.
    pub annotations: Vec<(String, f64, f64)>,
    /// Cell border color, when the figure draws panel frames.
    pub frame: Option<Color>,
}

/// Renders scenarios into grid cells.
pub struct PanelComposer<'a> {
    classification: Option<&'a ColorClassification>,
    typeface: Option<&'a Typeface>,
    label_size: f32,
    annotation_size: f32,
}

impl<'a> PanelComposer<'a> {
    pub fn new(
        classification: Option<&'a ColorClassification>,
        typeface: Option<&'a Typeface>,
    ) -> Self {
        Self {
            classification,
            typeface,
            label_size: 13.0,
            annotation_size: 10.0,
        }
    }

    pub fn with_label_size(mut self, size: f32) -> Self {
        self.label_size = size;
        self
    }

    /// Render one panel into its cell.
    ///
    /// `view` is the zoom window shared by every data panel of the figure;
    /// the locator inset passes its own wider extent here.
    pub fn compose(
        &self,
        canvas: &mut FigureCanvas,
        cell: &CellRect,
        view: &Extent,
        raster: Option<&RasterPanelData>,
        overlays: &[Arc<GeometryOverlay>],
        decorations: &PanelDecorations,
    ) -> AtlasResult<()> {
        let view = view.normalized();
        let mask = canvas.rect_mask(cell.x, cell.y, cell.w, cell.h)?;

        canvas.fill_rect(cell.x, cell.y, cell.w, cell.h, PANEL_BACKGROUND);

        let mut ordered: Vec<&Arc<GeometryOverlay>> = overlays.iter().collect();
        ordered.sort_by_key(|o| o.style.z_order);

        for overlay in ordered.iter().filter(|o| o.style.z_order < RASTER_Z_ORDER) {
            self.draw_overlay(canvas, overlay, cell, &view, &mask);
        }

        if let Some(data) = raster {
            let classification = self.classification.ok_or_else(|| {
                AtlasError::Render("panel holds raster data but no classification".to_string())
            })?;
            let out_w = (cell.w.round() as u32).max(1);
            let out_h = (cell.h.round() as u32).max(1);
            let pixels = project_raster(
                &data.values,
                data.width,
                data.height,
                &data.native_extent,
                &view,
                classification,
                out_w,
                out_h,
            );
            canvas.draw_rgba(
                cell.x.round() as i32,
                cell.y.round() as i32,
                pixels,
                out_w,
                out_h,
                Some(&mask),
            )?;
        }

        for overlay in ordered.iter().filter(|o| o.style.z_order >= RASTER_Z_ORDER) {
            self.draw_overlay(canvas, overlay, cell, &view, &mask);
        }

        self.draw_decorations(canvas, cell, &view, decorations);
        Ok(())
    }

    /// Render a degraded cell for a scenario whose data failed to load:
    /// hatched placeholder with a visible marker, never an abort.
    pub fn compose_placeholder(
        &self,
        canvas: &mut FigureCanvas,
        cell: &CellRect,
        label: &str,
        decorations: &PanelDecorations,
    ) -> AtlasResult<()> {
        let mask = canvas.rect_mask(cell.x, cell.y, cell.w, cell.h)?;
        canvas.fill_rect(cell.x, cell.y, cell.w, cell.h, PLACEHOLDER_FILL);

        let (x0, y0) = (cell.x, cell.y);
        let (x1, y1) = (cell.x + cell.w, cell.y + cell.h);
        canvas.stroke_polyline(&[(x0, y0), (x1, y1)], PLACEHOLDER_MARK, 1.5, Some(&mask));
        canvas.stroke_polyline(&[(x0, y1), (x1, y0)], PLACEHOLDER_MARK, 1.5, Some(&mask));
        canvas.stroke_rect(cell.x, cell.y, cell.w, cell.h, PLACEHOLDER_MARK, 1.0);

        if let Some(tf) = self.typeface {
            tf.draw_text_centered(
                canvas,
                cell.center_x() as i32,
                cell.center_y() as i32,
                &format!("no data: {}", label),
                self.annotation_size,
                LABEL_COLOR,
            );
        }

        // Titles and row labels still apply so the grid stays readable.
        self.draw_titles(canvas, cell, decorations);
        Ok(())
    }

    /// Draw the locator rectangle marking the shared zoom window on the
    /// context inset. Both extents must come from the same constants the
    /// data panels use.
    pub fn draw_locator_rectangle(
        &self,
        canvas: &mut FigureCanvas,
        cell: &CellRect,
        inset_view: &Extent,
        zoom: &Extent,
    ) {
        let inset_view = inset_view.normalized();
        let zoom = zoom.normalized();
        let (x0, y0) = to_canvas(&inset_view, cell, zoom.west, zoom.north);
        let (x1, y1) = to_canvas(&inset_view, cell, zoom.east, zoom.south);
        canvas.stroke_rect(x0, y0, x1 - x0, y1 - y0, Color::rgb(0, 0, 0), 1.2);
    }

    fn draw_overlay(
        &self,
        canvas: &mut FigureCanvas,
        overlay: &GeometryOverlay,
        cell: &CellRect,
        view: &Extent,
        mask: &Mask,
    ) {
        let style = &overlay.style;
        for geometry in &overlay.geometries {
            match geometry {
                Geometry::Null | Geometry::Point(_) => {}
                Geometry::PolyLine(parts) => {
                    for part in parts {
                        let points = project_points(part, view, cell);
                        if let Some(radius) = style.buffer_degrees {
                            // Route outline: the buffered band is rendered
                            // as a thick round-capped stroke of the buffer
                            // diameter in panel pixels.
                            let width_px =
                                (2.0 * radius / view.width() * cell.w as f64) as f32;
                            if let Some(fill) = style.fill {
                                canvas.stroke_polyline(&points, fill, width_px, Some(mask));
                            }
                        } else if let Some(stroke) = style.stroke {
                            canvas.stroke_polyline(
                                &points,
                                stroke,
                                style.stroke_width,
                                Some(mask),
                            );
                        }
                    }
                }
                Geometry::Polygon(rings) => {
                    let projected: Vec<Vec<(f32, f32)>> = rings
                        .iter()
                        .map(|ring| project_points(ring, view, cell))
                        .collect();
                    if let Some(fill) = style.fill {
                        canvas.fill_polygon(&projected, fill, Some(mask));
                    }
                    if let Some(stroke) = style.stroke {
                        canvas.stroke_polygon(
                            &projected,
                            stroke,
                            style.stroke_width,
                            Some(mask),
                        );
                    }
                }
            }
        }
    }

    fn draw_decorations(
        &self,
        canvas: &mut FigureCanvas,
        cell: &CellRect,
        view: &Extent,
        decorations: &PanelDecorations,
    ) {
        if let Some(tf) = self.typeface {
            for (text, lon, lat) in &decorations.annotations {
                if view.contains(*lon, *lat) {
                    let (x, y) = to_canvas(view, cell, *lon, *lat);
                    tf.draw_text(
                        canvas,
                        x as i32,
                        y as i32,
                        text,
                        self.annotation_size,
                        ANNOTATION_COLOR,
                    );
                }
            }
        }
        if let Some(frame) = decorations.frame {
            canvas.stroke_rect(cell.x, cell.y, cell.w, cell.h, frame, 1.0);
        }
        self.draw_titles(canvas, cell, decorations);
    }

    fn draw_titles(
        &self,
        canvas: &mut FigureCanvas,
        cell: &CellRect,
        decorations: &PanelDecorations,
    ) {
        let Some(tf) = self.typeface else {
            return;
        };
        if let Some(title) = &decorations.title {
            let y = cell.y - tf.line_height(self.label_size) - 2.0;
            tf.draw_text_centered(
                canvas,
                cell.center_x() as i32,
                y as i32,
                title,
                self.label_size,
                LABEL_COLOR,
            );
        }
        if let Some(label) = &decorations.row_label {
            let x = cell.x - tf.line_height(self.label_size) - 6.0;
            tf.draw_text_rotated(
                canvas,
                x as i32,
                cell.center_y() as i32,
                label,
                self.label_size,
                LABEL_COLOR,
            );
        }
    }
}

/// Map geographic points into canvas coordinates for one cell.
fn project_points(
    points: &[shapefile_parser::Point],
    view: &Extent,
    cell: &CellRect,
) -> Vec<(f32, f32)> {
    points
        .iter()
        .map(|p| to_canvas(view, cell, p.x, p.y))
        .collect()
}

fn to_canvas(view: &Extent, cell: &CellRect, lon: f64, lat: f64) -> (f32, f32) {
    let (px, py) = view.to_pixel(lon, lat, cell.w as f64, cell.h as f64);
    (cell.x + px as f32, cell.y + py as f32)
}
