//! Map figure rendering for hazard-atlas.
//!
//! Implements the drawing substrate every figure builds on:
//! - Discrete color classification shared across panels
//! - Raster-to-viewport projection through a classification
//! - Vector stroking/filling on an RGBA canvas
//! - Text decoration (titles, rotated row labels, annotations)
//! - Legend/colorbar rendering
//! - PNG encoding

pub mod canvas;
pub mod classify;
pub mod color;
pub mod legend;
pub mod png;
pub mod raster;
pub mod text;

pub use canvas::FigureCanvas;
pub use classify::ColorClassification;
pub use color::Color;
pub use legend::LegendEntry;
pub use text::Typeface;
