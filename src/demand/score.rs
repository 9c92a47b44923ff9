use rayon::prelude::*;
use tracing::info;

use crate::{
    building::{Building, Buildings},
    demand::{DemandComponents, DemandConfig, DemandParams},
    error::{Error, Result},
    height::DEFAULT_HEIGHT_M,
};

/// Population base used when a building has no positive allocation.
pub const DEFAULT_POPULATION: f64 = 1.0;

/// Income base used when a building has no positive income.
pub const DEFAULT_INCOME: f64 = 50_000.0;

/// Replace non-positive or non-finite bases before a fractional power.
#[inline]
fn positive_or(value: Option<f64>, default: f64) -> f64 {
    value.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(default)
}

/// Demand potential of one building with the default income curve and peak hours.
pub fn score(building: &Building, params: &DemandParams, components: &DemandComponents, current_hour: Option<u8>) -> f64 {
    let config = DemandConfig { params: *params, components: *components, current_hour, ..DemandConfig::default() };
    config.score(building)
}

impl DemandConfig {
    /// Demand potential `D` of one building: product of the enabled factors, 1.0 if none.
    pub fn score(&self, building: &Building) -> f64 {
        let DemandConfig { params, components, .. } = self;
        let mut demand = 1.0;

        if components.population {
            let population = positive_or(Some(building.estimated_population), DEFAULT_POPULATION);
            demand *= population.powf(params.alpha);
        }

        if components.income {
            let income = positive_or(building.income, DEFAULT_INCOME);
            demand *= self.income_curve.factor(income).powf(params.beta);
        }

        if components.height {
            let height = positive_or(building.height, DEFAULT_HEIGHT_M);
            demand *= height.powf(params.epsilon);
        }

        if let (true, Some(hour)) = (components.time, self.current_hour) {
            demand *= self.peak_hours.factor(hour);
        }

        demand
    }
}

/// Return a copy of `buildings` with `demand_potential` set.
/// Every building must already carry a height and a delivery class.
pub fn score_all(buildings: &Buildings, config: &DemandConfig) -> Result<Buildings> {
    config.validate()?;

    if let Some(building) = buildings.iter().find(|b| b.height.is_none()) {
        return Err(Error::config("demand", format!("building {} has no height; estimate heights first", building.id)));
    }
    if let Some(building) = buildings.iter().find(|b| b.delivery_class.is_none()) {
        return Err(Error::config("demand", format!("building {} is unclassified; classify buildings first", building.id)));
    }

    let out: Vec<_> = buildings.as_slice().par_iter()
        .map(|building| {
            let mut building = building.clone();
            building.demand_potential = Some(config.score(&building));
            building
        })
        .collect();

    info!(
        "[demand] scored {} buildings (population={} income={} height={} time={} hour={:?})",
        out.len(), config.components.population, config.components.income,
        config.components.height, config.components.time, config.current_hour
    );
    Ok(buildings.replace(out))
}
