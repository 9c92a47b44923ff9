//! Area-weighted allocation of census tract population onto residential buildings.

use ahash::AHashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    building::{Buildings, DeliveryClass},
    census::CensusTracts,
    error::Result,
};

/// What happened to each tract's population during allocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AllocationReport {
    /// Number of `DD` buildings considered.
    pub participating: usize,
    /// `DD` buildings whose centroid lies in no tract.
    pub unassociated: usize,
    /// Population reported per tract (nulls read as 0).
    pub reported: Vec<f64>,
    /// Population handed out per tract.
    pub allocated: Vec<f64>,
    /// Geo ids of tracts that contain buildings but no building area.
    pub empty_tracts: Vec<String>,
}

/// Return a copy of `buildings` with `estimated_population` allocated from `population_column`.
pub fn allocate(buildings: &Buildings, tracts: &CensusTracts, population_column: &str) -> Result<Buildings> {
    allocate_with_report(buildings, tracts, population_column).map(|(out, _)| out)
}

/// As [`allocate`], also returning per-tract diagnostics.
///
/// Every building gets `area_m2` and `tract`; only `DD` buildings receive population,
/// `pop = tract_pop * area / total_area_of_DD_buildings_in_tract`.
pub fn allocate_with_report(
    buildings: &Buildings,
    tracts: &CensusTracts,
    population_column: &str,
) -> Result<(Buildings, AllocationReport)> {
    let reported: Vec<f64> = tracts.column(population_column)?.into_iter()
        .map(|pop| pop.filter(|p| p.is_finite() && *p > 0.0).unwrap_or(0.0))
        .collect();

    let areas = buildings.geometries()
        .areas_m2("allocate", |i| buildings.as_slice()[i].id.clone())?;
    let centroids: Vec<_> = buildings.iter().map(|b| b.centroid()).collect();
    let parents = tracts.geometries().crosswalk(&centroids);

    let mut out = buildings.as_slice().to_vec();
    let mut report = AllocationReport { reported, allocated: vec![0.0; tracts.len()], ..Default::default() };

    // Group participating buildings by tract.
    let mut members: AHashMap<u32, Vec<usize>> = AHashMap::new();
    for (i, building) in out.iter_mut().enumerate() {
        building.area_m2 = Some(areas[i]);
        building.tract = parents[i];
        building.estimated_population = 0.0;

        if building.delivery_class != Some(DeliveryClass::DD) { continue }
        report.participating += 1;
        match parents[i] {
            Some(tract) => members.entry(tract).or_default().push(i),
            None => report.unassociated += 1,
        }
    }

    let mut groups: Vec<(u32, Vec<usize>)> = members.into_iter().collect();
    groups.sort_unstable_by_key(|(tract, _)| *tract);

    // Each tract must be area-summed before any of its buildings gets a share.
    let shares: Vec<(u32, f64, Vec<(usize, f64)>)> = groups.par_iter()
        .map(|(tract, idxs)| {
            let total_area: f64 = idxs.iter().map(|&i| areas[i]).sum();
            let population = report.reported[*tract as usize];
            let share = idxs.iter()
                .map(|&i| {
                    let pop = if total_area > 0.0 { population * areas[i] / total_area } else { 0.0 };
                    (i, pop)
                })
                .collect();
            (*tract, total_area, share)
        })
        .collect();

    for (tract, total_area, share) in shares {
        let geo_id = &tracts.geo_ids()[tract as usize];
        if total_area <= 0.0 {
            warn!("[allocate] tract {geo_id} has no residential building area; allocating 0");
            report.empty_tracts.push(geo_id.clone());
        }
        for (i, pop) in share {
            out[i].estimated_population = pop;
            report.allocated[tract as usize] += pop;
        }
        debug!(
            "[allocate] tract {geo_id}: {:.1} people over {:.0} m2",
            report.allocated[tract as usize], total_area
        );
    }

    if report.unassociated > 0 {
        warn!("[allocate] {} residential buildings lie outside every tract", report.unassociated);
    }
    info!(
        "[allocate] {:.1} people allocated to {} residential buildings across {} tracts",
        report.allocated.iter().sum::<f64>(), report.participating - report.unassociated, tracts.len()
    );

    Ok((buildings.replace(out), report))
}

/// Return a copy of `buildings` with `income` set from the containing tract's
/// `income_column`. Missing and non-positive incomes (ACS sentinels) are left unset.
pub fn attach_income(buildings: &Buildings, tracts: &CensusTracts, income_column: &str) -> Result<Buildings> {
    let incomes = tracts.column(income_column)?;
    let centroids: Vec<_> = buildings.iter().map(|b| b.centroid()).collect();
    let parents = tracts.geometries().crosswalk(&centroids);

    let out: Vec<_> = buildings.iter().zip(parents)
        .map(|(building, parent)| {
            let mut building = building.clone();
            building.tract = parent;
            building.income = parent
                .and_then(|tract| incomes[tract as usize])
                .filter(|income| income.is_finite() && *income > 0.0);
            building
        })
        .collect();

    info!(
        "[allocate] income attached to {} of {} buildings",
        out.iter().filter(|b| b.income.is_some()).count(), out.len()
    );
    Ok(buildings.replace(out))
}
