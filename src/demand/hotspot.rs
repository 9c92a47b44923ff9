use serde::Serialize;
use tracing::info;

use crate::{building::Buildings, error::{Error, Result}};

/// The `p`-th percentile (0-100) of `values`, interpolating linearly between the two
/// closest ranks. None for an empty slice or `p` outside 0-100.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&p) { return None }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Per building: is its demand potential at or above the `p`-th percentile of all scored
/// buildings? Unscored buildings are never hotspots.
pub fn is_hotspot(buildings: &Buildings, p: f64) -> Result<Vec<bool>> {
    if !(0.0..=100.0).contains(&p) {
        return Err(Error::config("hotspot", format!("percentile {p} is outside 0-100")));
    }

    let scores: Vec<f64> = buildings.iter().filter_map(|b| b.demand_potential).collect();
    let Some(threshold) = percentile(&scores, p) else {
        return Ok(vec![false; buildings.len()]);
    };

    Ok(buildings.iter()
        .map(|b| b.demand_potential.is_some_and(|d| d >= threshold))
        .collect())
}

/// Return a copy of `buildings` with `is_hotspot` recomputed.
pub fn flag_hotspots(buildings: &Buildings, p: f64) -> Result<Buildings> {
    let flags = is_hotspot(buildings, p)?;
    let out: Vec<_> = buildings.iter().zip(&flags)
        .map(|(building, &flag)| {
            let mut building = building.clone();
            building.is_hotspot = flag;
            building
        })
        .collect();

    info!("[hotspot] {} of {} buildings at or above percentile {p}", flags.iter().filter(|&&f| f).count(), out.len());
    Ok(buildings.replace(out))
}

/// Area-level summary of a scoring pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandSummary {
    pub total_buildings: usize,
    pub avg_demand: f64,
    pub max_demand: f64,
    pub total_demand: f64,
    pub hotspot_count: usize,
    pub avg_height: f64,
}

pub fn summary_statistics(buildings: &Buildings) -> DemandSummary {
    let demand: Vec<f64> = buildings.iter().filter_map(|b| b.demand_potential).collect();
    let heights: Vec<f64> = buildings.iter().filter_map(|b| b.height).collect();

    /// Mean of a slice, NaN if empty.
    fn mean(values: &[f64]) -> f64 {
        values.iter().sum::<f64>() / values.len() as f64
    }

    DemandSummary {
        total_buildings: buildings.len(),
        avg_demand: mean(&demand),
        max_demand: demand.iter().copied().fold(f64::NAN, f64::max),
        total_demand: demand.iter().sum(),
        hotspot_count: buildings.iter().filter(|b| b.is_hotspot).count(),
        avg_height: mean(&heights),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use geo::MultiPolygon;

    use super::*;
    use crate::building::Building;

    fn scored(values: &[f64]) -> Buildings {
        values.iter().enumerate()
            .map(|(i, &d)| {
                let mut b = Building::new(format!("b{i}"), MultiPolygon(vec![]));
                b.demand_potential = Some(d);
                b.height = Some(10.0 + i as f64);
                b
            })
            .collect()
    }

    #[test]
    fn percentile_interpolates_between_ranks() {
        let values: Vec<f64> = (1..=100).map(f64::from).collect();
        assert_relative_eq!(percentile(&values, 90.0).unwrap(), 90.1, max_relative = 1e-12);
        assert_relative_eq!(percentile(&values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(percentile(&values, 100.0).unwrap(), 100.0);
        assert_relative_eq!(percentile(&[3.0, 1.0], 50.0).unwrap(), 2.0);
        assert_eq!(percentile(&[], 90.0), None);
    }

    #[test]
    fn uniform_input_flags_top_tenth() {
        let buildings = scored(&(1..=100).map(f64::from).collect::<Vec<_>>());
        let flags = is_hotspot(&buildings, 90.0).unwrap();
        assert_eq!(flags.iter().filter(|&&f| f).count(), 10);
        assert!(flags[90..].iter().all(|&f| f));
        assert!(!flags[89]);
    }

    #[test]
    fn threshold_is_inclusive() {
        // Every value equals the percentile, so every building is a hotspot.
        let buildings = scored(&[2.0; 7]);
        assert!(is_hotspot(&buildings, 90.0).unwrap().into_iter().all(|f| f));
    }

    #[test]
    fn unscored_buildings_are_not_hotspots() {
        let mut buildings = scored(&[1.0, 5.0]).into_vec();
        buildings.push(Building::new("none", MultiPolygon(vec![])));
        let flags = is_hotspot(&Buildings::new(buildings), 50.0).unwrap();
        assert_eq!(flags, vec![false, true, false]);
        assert!(is_hotspot(&Buildings::default(), 90.0).unwrap().is_empty());
    }

    #[test]
    fn out_of_range_percentile_is_rejected() {
        assert!(is_hotspot(&scored(&[1.0]), 101.0).is_err());
        assert!(is_hotspot(&scored(&[1.0]), -1.0).is_err());
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 150.0), None);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], -5.0), None);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], f64::NAN), None);
        assert_eq!(percentile(&[1.0, 2.0, 3.0], 100.0), Some(3.0));
    }

    #[test]
    fn summary_counts_hotspots() {
        let buildings = flag_hotspots(&scored(&[1.0, 2.0, 3.0, 10.0]), 90.0).unwrap();
        let summary = summary_statistics(&buildings);
        assert_eq!(summary.total_buildings, 4);
        assert_eq!(summary.hotspot_count, 1);
        assert_relative_eq!(summary.total_demand, 16.0);
        assert_relative_eq!(summary.avg_demand, 4.0);
        assert_relative_eq!(summary.max_demand, 10.0);
        assert_relative_eq!(summary.avg_height, 11.5);
    }
}
