//! Scenario enumeration: the deterministic (model, return period) ordering
//! the grid layout depends on.

use atlas_common::{AtlasError, AtlasResult};
use std::path::{Path, PathBuf};

/// Sentinel model name for present-day hazard, always enumerated first.
pub const CURRENT_MODEL: &str = "Current";

/// Global climate models of the flood study, in declared order.
pub const CLIMATE_MODELS: [&str; 5] = [
    "GFDL-ESM2M",
    "HadGEM2-ES",
    "IPSL-CM5A-LR",
    "MIROC-ESM-CHEM",
    "NorESM1-M",
];

/// Time-period label for the modelled future hazard layers.
const FUTURE_PERIOD: &str = "2030-2069";

/// One scenario: a (model, return period, period) combination resolved to
/// its input raster. Immutable once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDescriptor {
    pub return_period: u32,
    pub model: String,
    pub period: String,
    pub source_path: PathBuf,
}

impl ScenarioDescriptor {
    /// Short context label for logs and error messages.
    pub fn label(&self) -> String {
        format!("{} RP{}", self.model, self.return_period)
    }
}

/// Builds the ordered scenario list from a fixed combinatorial definition.
///
/// Order contract: all return periods for "Current" first, then for each
/// model in declared order, all return periods in ascending order. Row *i*
/// of the figure grid is model *i*, column *j* is return period *j*.
pub struct ScenarioEnumerator {
    hazard_base: PathBuf,
    return_periods: Vec<u32>,
    models: Vec<String>,
}

impl ScenarioEnumerator {
    /// `hazard_base` is the flood-hazard dataset root under `data_path`.
    pub fn new(
        hazard_base: impl Into<PathBuf>,
        return_periods: Vec<u32>,
        models: Vec<String>,
    ) -> Self {
        Self {
            hazard_base: hazard_base.into(),
            return_periods,
            models,
        }
    }

    /// Enumerator over the study's full model set.
    pub fn with_study_models(hazard_base: impl Into<PathBuf>, return_periods: Vec<u32>) -> Self {
        Self::new(
            hazard_base,
            return_periods,
            CLIMATE_MODELS.iter().map(|m| m.to_string()).collect(),
        )
    }

    /// Produce the ordered descriptor list, failing fast on any scenario
    /// whose path cannot be formed. Silent skipping is never an option:
    /// it would desynchronize row/column alignment in the grid.
    pub fn enumerate(&self) -> AtlasResult<Vec<ScenarioDescriptor>> {
        if self.return_periods.is_empty() {
            return Err(AtlasError::ScenarioResolution(
                "no return periods declared".to_string(),
            ));
        }
        for pair in self.return_periods.windows(2) {
            if pair[0] >= pair[1] {
                return Err(AtlasError::ScenarioResolution(format!(
                    "return periods must be ascending, got {} then {}",
                    pair[0], pair[1]
                )));
            }
        }

        let mut scenarios =
            Vec::with_capacity(self.return_periods.len() * (1 + self.models.len()));

        for &return_period in &self.return_periods {
            scenarios.push(ScenarioDescriptor {
                return_period,
                model: CURRENT_MODEL.to_string(),
                period: CURRENT_MODEL.to_string(),
                source_path: self.current_path(return_period),
            });
        }

        for model in &self.models {
            if model.is_empty() || model == CURRENT_MODEL {
                return Err(AtlasError::ScenarioResolution(format!(
                    "invalid model name {:?}",
                    model
                )));
            }
            for &return_period in &self.return_periods {
                scenarios.push(ScenarioDescriptor {
                    return_period,
                    model: model.clone(),
                    period: FUTURE_PERIOD.to_string(),
                    source_path: self.model_path(model, return_period),
                });
            }
        }

        Ok(scenarios)
    }

    /// Number of return periods, the grid's column count.
    pub fn columns(&self) -> usize {
        self.return_periods.len()
    }

    /// Number of model rows including "Current".
    pub fn model_rows(&self) -> usize {
        1 + self.models.len()
    }

    fn current_path(&self, return_period: u32) -> PathBuf {
        self.hazard_base
            .join("EUWATCH")
            .join(format!("inun_dynRout_RP_{:05}_Tanzania", return_period))
            .join(format!(
                "inun_dynRout_RP_{:05}_contour_Tanzania.tif",
                return_period
            ))
    }

    fn model_path(&self, model: &str, return_period: u32) -> PathBuf {
        self.hazard_base
            .join(model)
            .join("rcp6p0")
            .join(FUTURE_PERIOD)
            .join(format!(
                "inun_dynRout_RP_{:05}_bias_corr_masked_Tanzania",
                return_period
            ))
            .join(format!(
                "inun_dynRout_RP_{:05}_bias_corr_contour_Tanzania.tif",
                return_period
            ))
    }
}

/// The flood-hazard dataset root for a configured data path.
pub fn hazard_base_path(data_path: &Path) -> PathBuf {
    data_path.join("tanzania_flood")
}
