use std::{fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::{
    census::{MEDIAN_INCOME, TOTAL_POPULATION},
    demand::DemandConfig,
    error::{Error, Result},
    height::HeightEstimator,
};

/// Settings for one pipeline run. Every field has a default, so a config document only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub height: HeightEstimator,
    /// Tract column holding the population to allocate.
    pub population_column: String,
    /// Tract column holding median household income.
    pub income_column: String,
    /// Percentile (0-100) at or above which a building is a hotspot.
    pub hotspot_percentile: f64,
    pub demand: DemandConfig,
    /// Classification rule document; defaults are used when absent.
    pub rules_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            height: HeightEstimator::default(),
            population_column: TOTAL_POPULATION.to_string(),
            income_column: MEDIAN_INCOME.to_string(),
            hotspot_percentile: 90.0,
            demand: DemandConfig::default(),
            rules_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.height.validate()?;
        if !(0.0..=100.0).contains(&self.hotspot_percentile) {
            return Err(Error::config("config", format!("hotspot percentile {} is outside 0-100", self.hotspot_percentile)));
        }
        self.demand.validate()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| Error::config("config", format!("invalid pipeline config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
