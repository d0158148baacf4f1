//! Runtime configuration for figure generation.
//!
//! Configuration is an explicit struct constructed once at each figure's
//! entry point and passed by reference into the pipeline, with no ambient
//! global lookup.

use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AtlasError, AtlasResult};

/// Paths required by every figure.
#[derive(Debug, Clone)]
pub struct AtlasConfig {
    /// Root of the input geospatial datasets.
    pub data_path: PathBuf,

    /// Output directory for rendered images.
    pub figures_path: PathBuf,
}

/// On-disk config file shape. Keys are optional here so that a missing key
/// can be reported by name instead of as an opaque parse failure.
#[derive(Debug, Deserialize)]
struct RawConfig {
    data_path: Option<PathBuf>,
    figures_path: Option<PathBuf>,
}

impl AtlasConfig {
    /// Load configuration from a JSON file with environment overrides.
    ///
    /// `ATLAS_DATA_PATH` / `ATLAS_FIGURES_PATH` take precedence over the
    /// file; when both are set the file may be absent entirely. A `.env`
    /// file in the working directory is honored.
    pub fn load(config_path: &Path) -> AtlasResult<Self> {
        dotenvy::dotenv().ok();

        let env_data = env::var_os("ATLAS_DATA_PATH").map(PathBuf::from);
        let env_figures = env::var_os("ATLAS_FIGURES_PATH").map(PathBuf::from);

        if let (Some(data_path), Some(figures_path)) = (env_data.clone(), env_figures.clone()) {
            debug!("configuration taken entirely from environment");
            return Ok(Self {
                data_path,
                figures_path,
            });
        }

        let content = std::fs::read_to_string(config_path).map_err(|e| {
            AtlasError::configuration(format!(
                "cannot read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let raw: RawConfig = serde_json::from_str(&content)?;

        let data_path = env_data
            .or(raw.data_path)
            .ok_or_else(|| AtlasError::configuration("configuration key not found: data_path"))?;
        let figures_path = env_figures.or(raw.figures_path).ok_or_else(|| {
            AtlasError::configuration("configuration key not found: figures_path")
        })?;

        Ok(Self {
            data_path,
            figures_path,
        })
    }
}
