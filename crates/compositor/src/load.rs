//! Raster and vector loading with a per-figure cache.
//!
//! Each raster is read exactly once: the cached arrays feed both the
//! figure-wide classification pass and the per-panel render pass. Loads
//! fan out on rayon, but results stay keyed by scenario index so panel
//! placement is identity-based, never completion-order-based.

use atlas_common::{AtlasError, AtlasResult, Extent};
use geotiff_parser::GeoTiff;
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

use crate::scenario::ScenarioDescriptor;

/// A loaded, georeferenced raster owned by one panel.
#[derive(Debug, Clone)]
pub struct RasterPanelData {
    /// Row-major samples, top row first; invalid cells are NaN.
    pub values: Vec<f32>,
    pub width: usize,
    pub height: usize,
    /// Extent from the raster's geotransform.
    pub native_extent: Extent,
}

/// Load one raster for a scenario.
pub fn load_raster(scenario: &ScenarioDescriptor) -> AtlasResult<RasterPanelData> {
    let tiff = GeoTiff::from_path(&scenario.source_path).map_err(|e| {
        AtlasError::data_load(scenario.label(), &scenario.source_path, e.to_string())
    })?;
    let (west, east, south, north) = tiff.extent();
    Ok(RasterPanelData {
        values: tiff.samples,
        width: tiff.width,
        height: tiff.height,
        native_extent: Extent::new(west, east, south, north),
    })
}

/// Load every scenario raster into an order-preserving cache.
///
/// Failures are kept in place as errors rather than dropped: the panel at
/// index `i` always corresponds to `scenarios[i]`, loaded or not. Each
/// failure is logged with its scenario context here, once.
pub fn load_scenario_rasters(
    scenarios: &[ScenarioDescriptor],
) -> Vec<AtlasResult<RasterPanelData>> {
    let results: Vec<AtlasResult<RasterPanelData>> =
        scenarios.par_iter().map(load_raster).collect();

    let loaded = results.iter().filter(|r| r.is_ok()).count();
    info!(total = scenarios.len(), loaded, "loaded scenario rasters");
    for (scenario, result) in scenarios.iter().zip(&results) {
        if let Err(e) = result {
            warn!(
                model = %scenario.model,
                return_period = scenario.return_period,
                path = %scenario.source_path.display(),
                error = %e,
                "scenario raster failed to load; panel will degrade"
            );
        }
    }
    results
}

/// Load a single standalone raster (population basemap layers).
pub fn load_standalone_raster(name: &str, path: &Path) -> AtlasResult<RasterPanelData> {
    let tiff =
        GeoTiff::from_path(path).map_err(|e| AtlasError::data_load(name, path, e.to_string()))?;
    let (west, east, south, north) = tiff.extent();
    Ok(RasterPanelData {
        values: tiff.samples,
        width: tiff.width,
        height: tiff.height,
        native_extent: Extent::new(west, east, south, north),
    })
}
