use polars::prelude::*;
use serde::Serialize;

use crate::{census::CensusTracts, error::Result};

/// Descriptive statistics of one numeric tract column (nulls skipped).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub std: Option<f64>, // Sample standard deviation (ddof = 1)
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl CensusTracts {
    /// Summary statistics for every numeric column except coordinate columns.
    pub fn summary(&self) -> Result<Vec<ColumnSummary>> {
        self.numeric_columns().into_iter()
            .filter(|name| !matches!(name.as_str(), "LONGITUDE" | "LATITUDE"))
            .map(|name| {
                let col = self.data().column(&name)?.cast(&DataType::Float64)?;
                let series = col.as_materialized_series();
                let values = col.f64()?;

                Ok(ColumnSummary {
                    mean: series.mean(),
                    median: series.median(),
                    std: series.std(1),
                    min: values.into_iter().flatten().reduce(f64::min),
                    max: values.into_iter().flatten().reduce(f64::max),
                    column: name,
                })
            })
            .collect()
    }
}
