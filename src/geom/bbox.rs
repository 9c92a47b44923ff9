use geo::Rect;
use rstar::{RTreeObject, AABB};

/// An R-tree entry: the bounding rectangle of one shape, tagged with its index.
#[derive(Debug, Clone)]
pub(crate) struct ShapeEnvelope {
    idx: usize, // Index of corresponding MultiPolygon in shapes
    bbox: Rect<f64>,
}

impl ShapeEnvelope {
    pub(crate) fn new(idx: usize, bbox: Rect<f64>) -> Self {
        Self { idx, bbox }
    }

    /// Get the index of the corresponding shape.
    #[inline] pub(crate) fn idx(&self) -> usize { self.idx }
}

impl RTreeObject for ShapeEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.bbox.min().into(), self.bbox.max().into())
    }
}
