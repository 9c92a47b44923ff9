use geo::{Contains, Point};
use rstar::AABB;

use crate::geom::Geometries;

impl Geometries {
    /// Find the shape that strictly contains `point` ("within" predicate; points on a
    /// boundary match nothing). Shapes are assumed non-overlapping; the first hit wins.
    pub(crate) fn locate(&self, point: Point<f64>) -> Option<usize> {
        // Query the R-tree with a degenerate AABB at `point`
        let envelope = AABB::from_corners([point.x(), point.y()], [point.x(), point.y()]);

        // Among bbox candidates, pick the one whose geometry contains the point.
        self.query(&envelope)
            .filter(|&j| self.shapes()[j].contains(&point))
            .min()
    }

    /// For each point, the index of the containing shape in `self`, if any.
    pub(crate) fn crosswalk(&self, points: &[Option<Point<f64>>]) -> Vec<Option<u32>> {
        points.iter()
            .map(|point| point.and_then(|p| self.locate(p)).map(|j| j as u32))
            .collect()
    }
}
