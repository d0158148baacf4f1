//! Vector overlays: roads, boundaries, highlighted routes.
//!
//! Overlays are loaded once per figure and shared by reference across
//! panels (the country basemap is drawn on every panel); they are never
//! mutated after load.

use atlas_common::{AtlasError, AtlasResult};
use renderer::Color;
use shapefile_parser::{Geometry, Shapefile};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Z-order of the raster layer; overlays below it are basemap layers,
/// overlays above it draw over the data.
pub const RASTER_Z_ORDER: u8 = 2;

/// Drawing style for one overlay.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub stroke: Option<Color>,
    pub stroke_width: f32,
    pub fill: Option<Color>,
    pub z_order: u8,
    /// Buffer radius in degrees for highlighted-route outlines; the
    /// geometry is rendered as a thick translucent band of this half-width.
    pub buffer_degrees: Option<f64>,
}

impl OverlayStyle {
    pub fn stroked(color: Color, width: f32, z_order: u8) -> Self {
        Self {
            stroke: Some(color),
            stroke_width: width,
            fill: None,
            z_order,
            buffer_degrees: None,
        }
    }

    pub fn filled(fill: Color, stroke: Option<Color>, z_order: u8) -> Self {
        Self {
            stroke,
            stroke_width: 0.5,
            fill: Some(fill),
            z_order,
            buffer_degrees: None,
        }
    }

    pub fn buffered(fill: Color, radius_degrees: f64, z_order: u8) -> Self {
        Self {
            stroke: None,
            stroke_width: 0.0,
            fill: Some(fill),
            z_order,
            buffer_degrees: Some(radius_degrees),
        }
    }
}

/// A loaded vector layer with its style, shared across panels.
#[derive(Debug)]
pub struct GeometryOverlay {
    pub name: String,
    pub geometries: Vec<Geometry>,
    pub style: OverlayStyle,
}

impl GeometryOverlay {
    /// Load an overlay from a shapefile, with `DataLoad` context on failure.
    pub fn load(name: &str, path: &Path, style: OverlayStyle) -> AtlasResult<Arc<Self>> {
        let shapefile = Shapefile::from_path(path)
            .map_err(|e| AtlasError::data_load(name, path, e.to_string()))?;
        let geometries: Vec<Geometry> = shapefile.geometries().cloned().collect();
        debug!(name, count = geometries.len(), "loaded overlay");
        Ok(Arc::new(Self {
            name: name.to_string(),
            geometries,
            style,
        }))
    }

    /// Construct an overlay from in-memory geometries (tests, derived data).
    pub fn from_geometries(name: &str, geometries: Vec<Geometry>, style: OverlayStyle) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            geometries,
            style,
        })
    }
}

/// Country boundary basemap drawn beneath the raster on every panel.
pub fn country_basemap(data_path: &Path) -> AtlasResult<Arc<GeometryOverlay>> {
    let path = data_path
        .join("Infrastructure")
        .join("Boundaries")
        .join("ne_10m_admin_0_countries_lakes.shp");
    GeometryOverlay::load(
        "country boundaries",
        &path,
        OverlayStyle {
            stroke: Some(Color::rgb(180, 180, 180)),
            stroke_width: 0.6,
            fill: Some(Color::rgb(239, 239, 239)),
            z_order: 1,
            buffer_degrees: None,
        },
    )
}

/// Road layer paths under the infrastructure tree.
pub fn roads_path(data_path: &Path, filename: &str) -> std::path::PathBuf {
    data_path
        .join("Infrastructure")
        .join("Roads")
        .join("Tanroads_flow_shapefiles")
        .join(filename)
}
