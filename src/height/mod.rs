//! Height imputation: native `height` tag, then `building:levels`, then the mean of the
//! k nearest known-height buildings, then a fixed default.

mod neighbors;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    building::{Buildings, HeightSource, NeighborInfo},
    error::{Error, Result},
    geom::{mean_coord, MetricProjection},
};

pub(crate) use neighbors::NeighborIndex;

/// Meters per storey when converting `building:levels`.
pub const FLOOR_HEIGHT_M: f64 = 3.0;

/// Height used when there are too few known heights to impute from.
pub const DEFAULT_HEIGHT_M: f64 = 10.0;

/// Parameters of the height imputation stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightEstimator {
    /// Number of neighbors averaged for k-NN imputation.
    pub k: usize,
    pub floor_height: f64,
    pub default_height: f64,
}

impl Default for HeightEstimator {
    fn default() -> Self {
        Self { k: 5, floor_height: FLOOR_HEIGHT_M, default_height: DEFAULT_HEIGHT_M }
    }
}

/// Fill in every building's height using `k` neighbors for spatial imputation.
pub fn estimate_heights(buildings: &Buildings, k: usize) -> Result<Buildings> {
    HeightEstimator { k, ..HeightEstimator::default() }.estimate(buildings)
}

impl HeightEstimator {
    /// `k` must be at least 1 and both fallback heights must be positive.
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::config("height", "k-nearest-neighbor count must be at least 1"));
        }
        if self.floor_height.is_nan() || self.floor_height <= 0.0 {
            return Err(Error::config("height", format!("floor height {} must be positive", self.floor_height)));
        }
        if self.default_height.is_nan() || self.default_height <= 0.0 {
            return Err(Error::config("height", format!("default height {} must be positive", self.default_height)));
        }
        Ok(())
    }

    /// Return a copy of `buildings` where every building has a height and a height source.
    pub fn estimate(&self, buildings: &Buildings) -> Result<Buildings> {
        self.validate()?;

        let mut out = buildings.as_slice().to_vec();

        // First pass: attributes.
        let mut unresolved = Vec::new();
        for (i, building) in out.iter_mut().enumerate() {
            let native = building.numeric_tag("height");
            building.height_estimated = native.is_none();
            building.neighbor_info = None;

            if let Some(height) = native {
                building.height = Some(height);
                building.height_source = Some(HeightSource::Native);
            } else if let Some(levels) = building.numeric_tag("building:levels") {
                building.height = Some(levels * self.floor_height);
                building.height_source = Some(HeightSource::Levels);
            } else {
                building.height = None;
                building.height_source = None;
                unresolved.push(i);
            }
        }

        if unresolved.is_empty() {
            info!("[height] all {} buildings resolved from attributes", out.len());
            return Ok(buildings.replace(out));
        }

        // Known-height buildings that can be placed on the map.
        let known: Vec<(usize, geo::Point<f64>)> = out.iter().enumerate()
            .filter(|(_, b)| b.height.is_some())
            .filter_map(|(i, b)| b.centroid().map(|c| (i, c)))
            .collect();

        if known.len() < self.k {
            warn!(
                "[height] only {} known heights for k={}, assigning default {}m to {} buildings",
                known.len(), self.k, self.default_height, unresolved.len()
            );
            for &i in &unresolved {
                out[i].height = Some(self.default_height);
                out[i].height_source = Some(HeightSource::Default);
            }
            return Ok(buildings.replace(out));
        }

        // Phase 1: project into the UTM zone around the known set and build the index.
        let center = mean_coord(known.iter().map(|&(_, c)| c))
            .ok_or_else(|| Error::config("height", "no known-height centroids"))?;
        let projection = MetricProjection::around(center, buildings.epsg())?;

        let index = NeighborIndex::new(
            known.iter()
                .map(|&(i, c)| projection.project(c.0)
                    .map(|p| (i, p))
                    .map_err(|e| Error::geometry("height", out[i].id.clone(), e)))
                .collect::<Result<Vec<_>>>()?
        );

        let queries = unresolved.iter()
            .map(|&i| out[i].centroid()
                .map(|c| projection.project(c.0).map_err(|e| Error::geometry("height", out[i].id.clone(), e)))
                .transpose())
            .collect::<Result<Vec<_>>>()?;

        // Phase 2: independent lookups per unresolved building.
        let neighbors: Vec<Option<Vec<usize>>> = queries.par_iter()
            .map(|query| query.map(|q| index.nearest(q, self.k)))
            .collect();

        let mut degenerate = 0;
        for (&i, found) in unresolved.iter().zip(neighbors) {
            let Some(found) = found else {
                // Empty footprint: nowhere to look from.
                degenerate += 1;
                out[i].height = Some(self.default_height);
                out[i].height_source = Some(HeightSource::Default);
                continue;
            };

            let heights: Vec<f64> = found.iter().filter_map(|&j| out[j].height).collect();
            let coords = found.iter()
                .filter_map(|&j| out[j].centroid())
                .map(|c| (c.y(), c.x()))
                .collect();

            out[i].height = Some(heights.iter().sum::<f64>() / heights.len() as f64);
            out[i].height_source = Some(HeightSource::Knn);
            out[i].neighbor_info = Some(NeighborInfo { indices: found, heights, coords });
        }

        if degenerate > 0 {
            warn!("[height] {degenerate} buildings without a usable footprint got the default height");
        }
        info!(
            "[height] imputed {} of {} buildings from {} known heights (k={}, UTM zone {}{})",
            unresolved.len() - degenerate, out.len(), index.len(), self.k,
            projection.zone(), if projection.is_north() { 'N' } else { 'S' }
        );

        Ok(buildings.replace(out))
    }
}

#[cfg(test)]
mod tests {
    use geo::{polygon, MultiPolygon};

    use super::*;
    use crate::building::Building;

    /// A ~10m square building at (lon, lat).
    fn at(id: &str, lon: f64, lat: f64) -> Building {
        let d = 0.0001;
        Building::new(id, MultiPolygon(vec![polygon![
            (x: lon, y: lat), (x: lon + d, y: lat), (x: lon + d, y: lat + d), (x: lon, y: lat + d),
        ]]))
    }

    #[test]
    fn zero_k_is_rejected() {
        let buildings = Buildings::new(vec![at("a", -97.74, 30.27)]);
        assert!(matches!(estimate_heights(&buildings, 0), Err(Error::Configuration { .. })));
    }

    #[test]
    fn native_height_is_kept_and_levels_are_scaled() {
        let buildings = Buildings::new(vec![
            at("a", -97.740, 30.27).with_tag("height", "23.5").with_tag("building:levels", "2"),
            at("b", -97.741, 30.27).with_tag("building:levels", "7"),
        ]);
        let out = estimate_heights(&buildings, 3).unwrap();

        assert_eq!(out.get(0).unwrap().height, Some(23.5));
        assert_eq!(out.get(0).unwrap().height_source, Some(HeightSource::Native));
        assert!(!out.get(0).unwrap().height_estimated);

        assert_eq!(out.get(1).unwrap().height, Some(21.0));
        assert_eq!(out.get(1).unwrap().height_source, Some(HeightSource::Levels));
        assert!(out.get(1).unwrap().height_estimated);
    }

    #[test]
    fn malformed_values_fall_through_to_default() {
        let buildings = Buildings::new(vec![
            at("a", -97.740, 30.27).with_tag("height", "tall"),
            at("b", -97.741, 30.27).with_tag("building:levels", "?"),
        ]);
        let out = estimate_heights(&buildings, 1).unwrap();
        for b in &out {
            assert_eq!(b.height, Some(DEFAULT_HEIGHT_M));
            assert_eq!(b.height_source, Some(HeightSource::Default));
            assert!(b.height_estimated);
        }
    }

    #[test]
    fn too_few_known_heights_uses_default() {
        let buildings = Buildings::new(vec![
            at("a", -97.740, 30.27).with_tag("height", "30"),
            at("b", -97.741, 30.27).with_tag("height", "40"),
            at("c", -97.742, 30.27),
        ]);
        let out = estimate_heights(&buildings, 3).unwrap();
        assert_eq!(out.get(2).unwrap().height, Some(DEFAULT_HEIGHT_M));
        assert_eq!(out.get(2).unwrap().height_source, Some(HeightSource::Default));
        assert!(out.get(2).unwrap().neighbor_info.is_none());
    }

    #[test]
    fn knn_averages_nearest_known_heights() {
        let buildings = Buildings::new(vec![
            at("a", -97.7400, 30.27).with_tag("height", "10"),
            at("b", -97.7402, 30.27).with_tag("height", "20"),
            at("c", -97.7500, 30.27).with_tag("height", "90"),
            at("d", -97.7401, 30.27),
        ]);
        let out = estimate_heights(&buildings, 2).unwrap();
        let d = out.get(3).unwrap();

        assert_eq!(d.height, Some(15.0));
        assert_eq!(d.height_source, Some(HeightSource::Knn));
        let info = d.neighbor_info.as_ref().unwrap();
        assert_eq!(info.heights.len(), 2);
        let mut indices = info.indices.clone();
        indices.sort();
        assert_eq!(indices, vec![0, 1]);
        // Coordinates are (lat, lon).
        assert!((info.coords[0].0 - 30.27005).abs() < 1e-9);
    }

    #[test]
    fn knn_is_deterministic() {
        let buildings = Buildings::new((0..40)
            .map(|i| {
                let b = at(&format!("b{i}"), -97.74 + 0.0003 * (i % 7) as f64, 30.27 + 0.0003 * (i / 7) as f64);
                if i % 3 == 0 { b } else { b.with_tag("height", format!("{}", 3 + i)) }
            })
            .collect());

        let first = estimate_heights(&buildings, 4).unwrap();
        let second = estimate_heights(&buildings, 4).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|b| b.height.is_some() && b.height_source.is_some()));
    }

    #[test]
    fn non_positive_fallback_heights_are_rejected() {
        let buildings = Buildings::new(vec![at("a", -97.74, 30.27).with_tag("building:levels", "4")]);
        for estimator in [
            HeightEstimator { floor_height: -3.0, ..HeightEstimator::default() },
            HeightEstimator { default_height: 0.0, ..HeightEstimator::default() },
            HeightEstimator { floor_height: f64::NAN, ..HeightEstimator::default() },
        ] {
            let err = estimator.estimate(&buildings).unwrap_err();
            assert!(matches!(err, Error::Configuration { stage: "height", .. }), "{err}");
        }
    }

    #[test]
    fn unprojectable_neighbor_names_the_building() {
        // Known heights centre near -38.5 (zone 24); 80E is too far from its meridian.
        let buildings = Buildings::new(vec![
            at("a", -97.740, 30.27).with_tag("height", "10"),
            at("b", -97.750, 30.27).with_tag("height", "20"),
            at("far", 80.0, 30.27).with_tag("height", "30"),
            at("c", -97.745, 30.27),
        ]);
        let err = estimate_heights(&buildings, 1).unwrap_err();
        assert!(matches!(&err, Error::Geometry { stage: "height", entity, .. } if entity == "far"), "{err}");
    }

    #[test]
    fn custom_floor_height() {
        let estimator = HeightEstimator { floor_height: 3.5, ..HeightEstimator::default() };
        let buildings = Buildings::new(vec![at("a", -97.74, 30.27).with_tag("building:levels", "4")]);
        assert_eq!(estimator.estimate(&buildings).unwrap().get(0).unwrap().height, Some(14.0));
    }
}
