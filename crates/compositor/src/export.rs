//! Figure export: PNG encode and write.

use atlas_common::{AtlasError, AtlasResult};
use renderer::{png, FigureCanvas};
use std::path::{Path, PathBuf};
use tracing::info;

/// Persists a finished figure to a raster image file.
pub struct FigureExporter {
    output_path: PathBuf,
}

impl FigureExporter {
    /// `figures_path` is the configured output directory.
    pub fn new(figures_path: &Path, filename: &str) -> Self {
        Self {
            output_path: figures_path.join(filename),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Encode and write. Fatal on an unwritable path, surfaced with the
    /// resolved output path; a failure here never corrupts figures already
    /// exported by prior invocations.
    pub fn export(&self, canvas: &FigureCanvas) -> AtlasResult<()> {
        let rgba = canvas.to_rgba();
        let encoded = png::encode(&rgba, canvas.width() as usize, canvas.height() as usize)?;

        if let Some(parent) = self.output_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AtlasError::export(&self.output_path, e.to_string()))?;
        }
        std::fs::write(&self.output_path, &encoded)
            .map_err(|e| AtlasError::export(&self.output_path, e.to_string()))?;

        info!(
            path = %self.output_path.display(),
            bytes = encoded.len(),
            "exported figure"
        );
        Ok(())
    }
}
