use geo::Coord;
use rstar::{primitives::GeomWithData, RTree};

/// A planar point tagged with the position of its building in the collection.
type IndexedPoint = GeomWithData<[f64; 2], usize>;

/// Nearest-neighbor index over projected (metric) building centroids.
#[derive(Debug, Clone)]
pub(crate) struct NeighborIndex {
    tree: RTree<IndexedPoint>,
}

impl NeighborIndex {
    /// Bulk-load the index from `(building index, projected centroid)` pairs.
    pub(crate) fn new(points: impl IntoIterator<Item = (usize, Coord<f64>)>) -> Self {
        Self {
            tree: RTree::bulk_load(points.into_iter()
                .map(|(idx, c)| IndexedPoint::new([c.x, c.y], idx))
                .collect()),
        }
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.tree.size() }

    /// Building indices of the `k` points nearest to `query`, closest first.
    /// Equidistant candidates are ordered by building index, so the result is
    /// independent of R-tree layout.
    pub(crate) fn nearest(&self, query: Coord<f64>, k: usize) -> Vec<usize> {
        if k == 0 { return Vec::new() }

        let mut found: Vec<(f64, usize)> = Vec::with_capacity(k + 1);
        for (point, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&[query.x, query.y]) {
            // Keep pulling past k while candidates tie with the current k-th distance.
            if found.len() >= k && distance_2 > found[k - 1].0 { break }
            found.push((distance_2, point.data));
        }

        found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        found.truncate(k);
        found.into_iter().map(|(_, idx)| idx).collect()
    }
}
