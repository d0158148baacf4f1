//! Scenario-grid raster/vector compositing engine.
//!
//! Pipeline, in order: enumerate scenarios, load every raster once into a
//! cache (optionally in parallel, keyed by scenario index), construct the
//! figure-wide color classification, compose panels row-major into the
//! grid, attach the shared legend, export. The classification is fully
//! built before any panel composition begins; a single scenario's load
//! failure degrades only its own cell.

pub mod export;
pub mod figure;
pub mod histogram;
pub mod layout;
pub mod load;
pub mod overlay;
pub mod panel;
pub mod scenario;
pub mod stats;

pub use export::FigureExporter;
pub use figure::{compose_scenario_grid, GridFigureSpec};
pub use layout::{CellRect, CellRole, FigureLayout, GridPosition};
pub use load::{load_scenario_rasters, RasterPanelData};
pub use overlay::{GeometryOverlay, OverlayStyle};
pub use panel::{PanelComposer, PanelDecorations};
pub use scenario::{ScenarioDescriptor, ScenarioEnumerator, CLIMATE_MODELS, CURRENT_MODEL};
