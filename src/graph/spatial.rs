//! Spatial index for hover/click hit testing
//!
//! R-tree (via `rstar`) over rendered node discs, rebuilt after each layout
//! tick batch. Hit tests resolve against disc edges, so a fat group node and
//! a small service node compete fairly under the same pointer threshold.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// One rendered node disc, in model coordinates
#[derive(Debug, Clone)]
pub struct SpatialNode {
    pub id: String,
    bounds: AABB<[f32; 2]>,
    pub center: [f32; 2],
    pub radius: f32,
}

impl SpatialNode {
    pub fn new(id: impl Into<String>, center: [f32; 2], radius: f32) -> Self {
        let bounds = AABB::from_corners(
            [center[0] - radius, center[1] - radius],
            [center[0] + radius, center[1] + radius],
        );
        Self {
            id: id.into(),
            bounds,
            center,
            radius,
        }
    }
}

impl RTreeObject for SpatialNode {
    type Envelope = AABB<[f32; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bounds
    }
}

impl PointDistance for SpatialNode {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let d = edge_distance(*point, self);
        d * d
    }

    fn contains_point(&self, point: &[f32; 2]) -> bool {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// Distance from a point to the disc edge (0 inside the disc)
fn edge_distance(point: [f32; 2], node: &SpatialNode) -> f32 {
    let dx = point[0] - node.center[0];
    let dy = point[1] - node.center[1];
    ((dx * dx + dy * dy).sqrt() - node.radius).max(0.0)
}

/// O(log n) hit testing over the current node positions
#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<SpatialNode>,
    count: usize,
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from current positions. Call after layout moves nodes.
    pub fn rebuild(&mut self, nodes: impl Iterator<Item = SpatialNode>) {
        let nodes: Vec<_> = nodes.collect();
        self.count = nodes.len();
        self.tree = RTree::bulk_load(nodes);
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.count = 0;
    }

    /// Closest node whose disc edge is within `threshold` of `point`
    pub fn hit_test(&self, point: [f32; 2], threshold: f32) -> Option<&SpatialNode> {
        let search = AABB::from_corners(
            [point[0] - threshold, point[1] - threshold],
            [point[0] + threshold, point[1] + threshold],
        );
        self.tree
            .locate_in_envelope_intersecting(&search)
            .min_by(|a, b| {
                edge_distance(point, a)
                    .partial_cmp(&edge_distance(point, b))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .filter(|node| edge_distance(point, node) <= threshold)
    }

    /// All nodes whose disc intersects the rectangle
    pub fn query_rect(&self, min: [f32; 2], max: [f32; 2]) -> Vec<&SpatialNode> {
        let bounds = AABB::from_corners(min, max);
        self.tree.locate_in_envelope_intersecting(&bounds).collect()
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
