use geo::{Area, BoundingRect, Centroid, Coord, MultiPolygon, Point};
use rstar::{RTree, AABB};

use crate::error::{Error, Result};
use crate::geom::{MetricProjection, ShapeEnvelope};

/// A collection of MultiPolygons in lon/lat, indexed by an R-tree over their bounding boxes.
#[derive(Debug, Clone)]
pub(crate) struct Geometries {
    shapes: Vec<MultiPolygon<f64>>,
    rtree: RTree<ShapeEnvelope>,
    epsg: Option<u32>, // EPSG code, if known
}

impl Geometries {
    /// Construct a Geometries object from a vector of MultiPolygons.
    /// Empty shapes have no bounding box and are left out of the R-tree.
    pub(crate) fn new(shapes: Vec<MultiPolygon<f64>>, epsg: Option<u32>) -> Self {
        Self {
            rtree: RTree::bulk_load(
                shapes.iter().enumerate()
                    .filter_map(|(i, shape)| shape.bounding_rect().map(|rect| ShapeEnvelope::new(i, rect)))
                    .collect()
            ),
            shapes,
            epsg,
        }
    }

    /// Get the number of MultiPolygons.
    #[inline] pub(crate) fn len(&self) -> usize { self.shapes.len() }

    /// Get a reference to the list of MultiPolygons.
    #[inline] pub(crate) fn shapes(&self) -> &[MultiPolygon<f64>] { &self.shapes }

    /// Get the EPSG code, or default to 4326 (WGS84 lon/lat) if unknown.
    #[inline] pub(crate) fn epsg(&self) -> u32 { self.epsg.unwrap_or(4326) }

    /// Query the R-tree for shapes whose bounding boxes intersect the given envelope.
    #[inline]
    pub(crate) fn query(&self, envelope: &AABB<[f64; 2]>) -> impl Iterator<Item = usize> + '_ {
        self.rtree.locate_in_envelope_intersecting(envelope).map(|entry| entry.idx())
    }

    /// Compute the centroids of all MultiPolygons (None for empty shapes).
    pub(crate) fn centroids(&self) -> Vec<Option<Point<f64>>> {
        self.shapes.iter().map(|shape| shape.centroid()).collect()
    }

    /// Planar ground area of every shape in square meters, measured in a UTM zone
    /// centered on the mean centroid of the collection. A shape that cannot be projected
    /// fails with a geometry error naming `entity(i)`.
    pub(crate) fn areas_m2(&self, stage: &'static str, entity: impl Fn(usize) -> String) -> Result<Vec<f64>> {
        let centroids = self.centroids();
        let Some(center) = mean_coord(centroids.iter().flatten().copied()) else {
            return Ok(vec![0.0; self.len()]);
        };
        let projection = MetricProjection::around(center, self.epsg())?;

        self.shapes.iter().enumerate()
            .map(|(i, shape)| {
                projection.project_shape(shape)
                    .map(|projected| projected.unsigned_area())
                    .map_err(|e| Error::geometry(stage, entity(i), e))
            })
            .collect()
    }
}

/// Mean of a set of points, or None if the set is empty.
pub(crate) fn mean_coord(points: impl IntoIterator<Item = Point<f64>>) -> Option<Coord<f64>> {
    let (sum, count) = points.into_iter()
        .fold((Coord { x: 0.0, y: 0.0 }, 0usize), |(sum, n), p| (sum + p.0, n + 1));
    (count > 0).then(|| Coord { x: sum.x / count as f64, y: sum.y / count as f64 })
}
