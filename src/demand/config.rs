use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Exponents of the demand model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandParams {
    pub alpha: f64,   // Population
    pub beta: f64,    // Income
    pub epsilon: f64, // Height
}

impl Default for DemandParams {
    fn default() -> Self {
        Self { alpha: 1.0, beta: 1.0, epsilon: 0.5 }
    }
}

/// Which multiplicative factors are switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandComponents {
    pub population: bool,
    pub income: bool,
    pub height: bool,
    pub time: bool,
}

impl Default for DemandComponents {
    fn default() -> Self {
        Self { population: true, income: true, height: true, time: true }
    }
}

impl DemandComponents {
    /// Every factor off; demand is 1.0 everywhere.
    pub fn none() -> Self {
        Self { population: false, income: false, height: false, time: false }
    }
}

/// Logistic income response `1 / (1 + e^(-steepness * (income - midpoint)))`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeCurve {
    pub midpoint: f64,
    pub steepness: f64,
}

impl Default for IncomeCurve {
    fn default() -> Self {
        Self { midpoint: 50_000.0, steepness: 0.00005 }
    }
}

impl IncomeCurve {
    #[inline]
    pub fn factor(&self, income: f64) -> f64 {
        1.0 / (1.0 + (-self.steepness * (income - self.midpoint)).exp())
    }
}

/// Half-open `[start, end)` hour windows with elevated demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakHours {
    pub windows: Vec<(u8, u8)>,
    pub multiplier: f64,
}

impl Default for PeakHours {
    fn default() -> Self {
        Self { windows: vec![(8, 10), (12, 14), (18, 20)], multiplier: 1.5 }
    }
}

impl PeakHours {
    #[inline]
    pub fn is_peak(&self, hour: u8) -> bool {
        self.windows.iter().any(|&(start, end)| start <= hour && hour < end)
    }

    /// `multiplier` inside a peak window, 1.0 otherwise.
    #[inline]
    pub fn factor(&self, hour: u8) -> f64 {
        if self.is_peak(hour) { self.multiplier } else { 1.0 }
    }
}

/// Everything the demand stage needs for one scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandConfig {
    pub params: DemandParams,
    pub components: DemandComponents,
    /// Simulation hour (0-23); the time factor only applies when set.
    pub current_hour: Option<u8>,
    pub income_curve: IncomeCurve,
    pub peak_hours: PeakHours,
}

impl Default for DemandConfig {
    fn default() -> Self {
        Self {
            params: DemandParams::default(),
            components: DemandComponents::default(),
            current_hour: Some(12),
            income_curve: IncomeCurve::default(),
            peak_hours: PeakHours::default(),
        }
    }
}

impl DemandConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(hour) = self.current_hour.filter(|&h| h > 23) {
            return Err(Error::config("demand", format!("current hour {hour} is outside 0-23")));
        }
        let DemandParams { alpha, beta, epsilon } = self.params;
        if ![alpha, beta, epsilon].iter().all(|x| x.is_finite()) {
            return Err(Error::config("demand", "exponents must be finite"));
        }
        if !(self.income_curve.midpoint.is_finite() && self.income_curve.steepness.is_finite()) {
            return Err(Error::config("demand", "income curve constants must be finite"));
        }
        if let Some(&(start, end)) = self.peak_hours.windows.iter().find(|&&(s, e)| s >= e || e > 24) {
            return Err(Error::config("demand", format!("peak window [{start}, {end}) is not a valid hour range")));
        }
        if !(self.peak_hours.multiplier.is_finite() && self.peak_hours.multiplier >= 0.0) {
            return Err(Error::config("demand", "peak multiplier must be a non-negative number"));
        }
        Ok(())
    }
}
