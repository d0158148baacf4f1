//! Error types for GeoTIFF parsing.

use thiserror::Error;

/// Result type for GeoTIFF parser operations.
pub type GeoTiffResult<T> = Result<T, GeoTiffError>;

/// Errors that can occur while reading a GeoTIFF.
#[derive(Error, Debug)]
pub enum GeoTiffError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Structurally invalid TIFF data
    #[error("invalid TIFF data: {0}")]
    InvalidFormat(String),

    /// A tag required for georeferencing or decoding is absent
    #[error("missing required tag: {0}")]
    MissingTag(&'static str),

    /// Valid TIFF, but uses a feature this reader does not implement
    #[error("unsupported TIFF feature: {0}")]
    Unsupported(String),

    /// Strip decompression failed
    #[error("decompression error: {0}")]
    Decompression(String),
}
