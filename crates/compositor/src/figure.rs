//! Scenario-grid figure assembly.
//!
//! Wires the pipeline stages together for the multi-panel map figures:
//! panels composed row-major in scenario order, the context inset in the
//! first cell after the data panels, trailing cells hidden, and exactly
//! one shared colorbar attached outside the panel grid.

use atlas_common::{AtlasError, AtlasResult, Extent};
use renderer::classify::ColorClassification;
use renderer::{legend, Color, FigureCanvas, Typeface};
use std::sync::Arc;
use tracing::debug;

use crate::layout::{CellRole, FigureLayout};
use crate::load::RasterPanelData;
use crate::overlay::GeometryOverlay;
use crate::panel::{PanelComposer, PanelDecorations};
use crate::scenario::ScenarioDescriptor;

/// Figure-level constants shared by every panel.
///
/// `zoom_extent` is the single view-extent value: each data panel crops to
/// it and the locator inset draws its rectangle from it, so the two can
/// never drift apart.
#[derive(Debug, Clone)]
pub struct GridFigureSpec {
    pub zoom_extent: Extent,
    pub context_extent: Extent,
    pub annotations: Vec<(String, f64, f64)>,
    pub colorbar_caption: Option<String>,
}

/// Compose a full scenario-grid figure onto a canvas.
///
/// `rasters` is the load cache, index-aligned with `scenarios`; a failed
/// entry degrades its own panel to a placeholder and nothing else.
pub fn compose_scenario_grid(
    spec: &GridFigureSpec,
    scenarios: &[ScenarioDescriptor],
    rasters: &[AtlasResult<RasterPanelData>],
    classification: &ColorClassification,
    overlays: &[Arc<GeometryOverlay>],
    layout: &FigureLayout,
    typeface: Option<&Typeface>,
) -> AtlasResult<FigureCanvas> {
    if rasters.len() != scenarios.len() {
        return Err(AtlasError::Render(format!(
            "{} cached rasters for {} scenarios",
            rasters.len(),
            scenarios.len()
        )));
    }
    // One context cell is reserved after the data panels.
    layout.check_alignment(scenarios.len(), 1)?;

    let mut canvas = FigureCanvas::new(layout.width(), layout.height(), Color::rgb(255, 255, 255))?;
    let composer = PanelComposer::new(Some(classification), typeface);

    for (pos, cell) in layout.cells() {
        match layout.role_for(pos.index, scenarios.len()) {
            CellRole::Scenario(i) => {
                let scenario = &scenarios[i];
                let decorations = PanelDecorations {
                    title: pos
                        .is_first_row()
                        .then(|| format!("{}y return", scenario.return_period)),
                    row_label: pos.is_first_column().then(|| scenario.model.clone()),
                    annotations: spec.annotations.clone(),
                    frame: None,
                };
                match &rasters[i] {
                    Ok(data) => composer.compose(
                        &mut canvas,
                        &cell,
                        &spec.zoom_extent,
                        Some(data),
                        overlays,
                        &decorations,
                    )?,
                    Err(_) => {
                        // Already logged with context at load time.
                        composer.compose_placeholder(
                            &mut canvas,
                            &cell,
                            &scenario.label(),
                            &decorations,
                        )?
                    }
                }
            }
            CellRole::Context => {
                composer.compose(
                    &mut canvas,
                    &cell,
                    &spec.context_extent,
                    None,
                    overlays,
                    &PanelDecorations::default(),
                )?;
                composer.draw_locator_rectangle(
                    &mut canvas,
                    &cell,
                    &spec.context_extent,
                    &spec.zoom_extent,
                );
            }
            CellRole::Hidden => {
                debug!(index = pos.index, "hidden trailing cell");
            }
        }
    }

    // The one shared colorbar, outside the panel grid.
    let legend_rect = layout.legend_rect();
    if legend_rect.h > 4.0 {
        let bar = legend::colorbar(
            classification,
            legend_rect.w as u32,
            (legend_rect.h * 0.35) as u32,
            typeface,
            spec.colorbar_caption.as_deref(),
        )?;
        canvas.draw_pixmap(legend_rect.x as i32, legend_rect.y as i32, &bar);
    }

    Ok(canvas)
}
