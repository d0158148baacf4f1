//! Error types for shapefile parsing.

use thiserror::Error;

/// Result type for shapefile parser operations.
pub type ShapefileResult<T> = Result<T, ShapefileError>;

/// Errors that can occur while reading a shapefile.
#[derive(Error, Debug)]
pub enum ShapefileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid .shp or .dbf data
    #[error("invalid shapefile data: {0}")]
    InvalidFormat(String),

    /// Valid shapefile, but a shape type this reader does not implement
    #[error("unsupported shape type: {0}")]
    UnsupportedShapeType(i32),
}
