//! Error types for hazard-atlas figure generation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AtlasError.
pub type AtlasResult<T> = Result<T, AtlasError>;

/// Primary error type for figure generation.
///
/// `DataLoad` is the only recoverable class: a panel whose raster or vector
/// source fails to load degrades to a placeholder cell. Every other variant
/// aborts the figure being produced.
#[derive(Debug, Error)]
pub enum AtlasError {
    /// Required configuration key absent or config file unreadable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A declared scenario's path cannot be formed. Contract violation.
    #[error("scenario resolution failed: {0}")]
    ScenarioResolution(String),

    /// A specific raster or vector file is missing, unreadable or malformed.
    /// `context` names the scenario or overlay the file belongs to.
    #[error("failed to load {context} ({path}): {reason}")]
    DataLoad {
        context: String,
        path: PathBuf,
        reason: String,
    },

    /// Shared color classification could not be constructed.
    #[error("classification error: {0}")]
    Classification(String),

    /// Panel or figure rendering failed.
    #[error("rendering failed: {0}")]
    Render(String),

    /// Output path unwritable or encoding failed.
    #[error("failed to export figure to {path}: {reason}")]
    Export { path: PathBuf, reason: String },
}

impl AtlasError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a DataLoad error with scenario or overlay context.
    pub fn data_load(
        context: impl Into<String>,
        path: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataLoad {
            context: context.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an Export error for a resolved output path.
    pub fn export(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Export {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// True when the error is recoverable by degrading a single panel.
    pub fn is_panel_local(&self) -> bool {
        matches!(self, AtlasError::DataLoad { .. })
    }
}

impl From<serde_json::Error> for AtlasError {
    fn from(err: serde_json::Error) -> Self {
        AtlasError::Configuration(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_load_is_panel_local() {
        let err = AtlasError::data_load("Current RP5", "/missing.tif", "no such file");
        assert!(err.is_panel_local());
        assert!(!AtlasError::Classification("bad boundaries".into()).is_panel_local());
    }

    #[test]
    fn test_data_load_message_carries_scenario_context() {
        let err = AtlasError::data_load("HadGEM2-ES RP1000", "/data/x.tif", "truncated");
        let msg = err.to_string();
        assert!(msg.contains("HadGEM2-ES"));
        assert!(msg.contains("RP1000"));
        assert!(msg.contains("/data/x.tif"));
    }
}
