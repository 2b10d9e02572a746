//! Searches over a built [`KdTree`].
//!
//! All queries take `&self` and keep their scratch state on the stack or in
//! caller-supplied buffers, so any number of them may run concurrently
//! against the same tree.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::trace;
use rayon::prelude::*;

use crate::coordinate::Coordinate;
use crate::error::{KdResult, KdTreeError};
use crate::kdtree::{KdNode, KdTree};
use crate::layout::TreeLayout;

/// Counters reported by a range query.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeStats {
    /// Number of matching points.
    pub count: usize,
    /// Nodes visited, including the descent to the bounding node.
    pub iterations: usize,
    /// Deepest node whose subtree holds every candidate.
    pub bounding_node: usize,
}

/// Result of [`KdTree::find_in_range`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RangeResult {
    /// Matching point indices, unordered and without duplicates.
    pub indices: Vec<usize>,
    pub iterations: usize,
    pub bounding_node: usize,
}

impl RangeResult {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// A point found by a nearest-neighbour search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    pub index: usize,
    pub dist_sq: f64,
}

impl Neighbor {
    pub fn distance(&self) -> f64 {
        self.dist_sq.sqrt()
    }
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Max-heap order: the worst kept neighbour sits on top.
impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist_sq
            .total_cmp(&other.dist_sq)
            .then(self.index.cmp(&other.index))
    }
}

impl<T: Coordinate> KdTree<'_, T> {
    fn check_point(&self, point: &[T]) -> KdResult<()> {
        if point.len() != self.n_dim() {
            return Err(KdTreeError::InvalidQuery(format!(
                "point has {} coordinates, tree has {} dimensions",
                point.len(),
                self.n_dim()
            )));
        }
        if point.iter().any(|v| v.is_nan()) {
            return Err(KdTreeError::InvalidQuery("point has a NaN coordinate".to_string()));
        }
        Ok(())
    }

    fn check_tolerance(&self, delta: &[T]) -> KdResult<()> {
        if delta.len() != self.n_dim() {
            return Err(KdTreeError::InvalidQuery(format!(
                "delta has {} components, tree has {} dimensions",
                delta.len(),
                self.n_dim()
            )));
        }
        // also rejects NaN
        if let Some(d) = delta.iter().position(|&v| !(v >= T::ZERO)) {
            return Err(KdTreeError::InvalidQuery(format!(
                "delta component {} is negative or NaN",
                d
            )));
        }
        Ok(())
    }

    /// Query box `[point - delta, point + delta]`, validated.
    fn query_box(&self, point: &[T], delta: &[T]) -> KdResult<(Vec<T>, Vec<T>)> {
        self.ensure_built()?;
        self.check_point(point)?;
        self.check_tolerance(delta)?;
        let lo: Vec<T> = point.iter().zip(delta).map(|(&p, &d)| p - d).collect();
        let hi: Vec<T> = point.iter().zip(delta).map(|(&p, &d)| p + d).collect();
        // infinite point with infinite delta
        if let Some(d) = lo.iter().chain(&hi).position(|v| v.is_nan()) {
            return Err(KdTreeError::InvalidQuery(format!(
                "query box bound {} is undefined",
                d % self.n_dim()
            )));
        }
        Ok((lo, hi))
    }

    /// Finds every point whose coordinates all lie within `delta` of `point`.
    ///
    /// Bounds are inclusive: a point with `|p[d] - point[d]| == delta[d]` matches.
    pub fn find_in_range(&self, point: &[T], delta: &[T]) -> KdResult<RangeResult> {
        let mut indices = Vec::new();
        let stats = self.find_in_range_into(point, delta, &mut indices)?;
        Ok(RangeResult {
            indices,
            iterations: stats.iterations,
            bounding_node: stats.bounding_node,
        })
    }

    /// Like [`KdTree::find_in_range`], but writes into a caller-owned buffer.
    /// The buffer is cleared first.
    pub fn find_in_range_into(
        &self,
        point: &[T],
        delta: &[T],
        out: &mut Vec<usize>,
    ) -> KdResult<RangeStats> {
        let (lo, hi) = self.query_box(point, delta)?;
        out.clear();

        let mut iterations = 0;
        let bounding_node = self.descend_to_bounding_node(&lo, &hi, &mut iterations);
        self.visit_box(bounding_node, &lo, &hi, &mut iterations, &mut |idx| out.push(idx));

        trace!(
            "range query: {} found, {} nodes visited, entered at node {}",
            out.len(),
            iterations,
            bounding_node
        );
        Ok(RangeStats {
            count: out.len(),
            iterations,
            bounding_node,
        })
    }

    /// Deepest node whose subtree holds every point inside the query box.
    pub fn find_bounding_node(&self, point: &[T], delta: &[T]) -> KdResult<usize> {
        let (lo, hi) = self.query_box(point, delta)?;
        let mut iterations = 0;
        Ok(self.descend_to_bounding_node(&lo, &hi, &mut iterations))
    }

    fn descend_to_bounding_node(&self, lo: &[T], hi: &[T], iterations: &mut usize) -> usize {
        let layout = self.layout();
        let mut node = 0;
        while !layout.is_terminal(node) {
            let KdNode { value, axis } = self.node(node);
            if hi[axis] < value {
                node = TreeLayout::left(node);
            } else if lo[axis] > value {
                node = TreeLayout::right(node);
            } else {
                break;
            }
            *iterations += 1;
        }
        node
    }

    /// Calls `visit` for every point under `node` inside `[lo, hi]`.
    fn visit_box<F>(&self, node: usize, lo: &[T], hi: &[T], iterations: &mut usize, visit: &mut F)
    where
        F: FnMut(usize),
    {
        *iterations += 1;

        if self.layout().is_terminal(node) {
            for &idx in self.bucket(node) {
                if self.points().in_box(idx, lo, hi) {
                    visit(idx);
                }
            }
            return;
        }

        let KdNode { value, axis } = self.node(node);
        // left holds coord <= value, right holds coord >= value
        if lo[axis] <= value {
            self.visit_box(TreeLayout::left(node), lo, hi, iterations, visit);
        }
        if hi[axis] >= value {
            self.visit_box(TreeLayout::right(node), lo, hi, iterations, visit);
        }
    }

    /// Finds every point within Euclidean distance `radius` of `point`.
    pub fn find_in_radius(&self, point: &[T], radius: T) -> KdResult<Vec<usize>> {
        let delta = vec![radius; self.n_dim()];
        let (lo, hi) = self.query_box(point, &delta)?;
        let center: Vec<f64> = point.iter().map(|v| v.to_f64()).collect();
        let r = radius.to_f64();
        let r_sq = r * r;

        let mut iterations = 0;
        let mut found = Vec::new();
        let start = self.descend_to_bounding_node(&lo, &hi, &mut iterations);
        self.visit_box(start, &lo, &hi, &mut iterations, &mut |idx| {
            if self.points().dist_sq(idx, &center) <= r_sq {
                found.push(idx);
            }
        });
        Ok(found)
    }

    /// Terminal node `point` falls into. Coordinates equal to a split value
    /// descend left, so a stored point is always found in its own bucket
    /// unless other points share its coordinate across a split.
    pub fn find_node(&self, point: &[T]) -> KdResult<usize> {
        self.ensure_built()?;
        self.check_point(point)?;
        let layout = self.layout();
        let mut node = 0;
        while !layout.is_terminal(node) {
            let KdNode { value, axis } = self.node(node);
            node = if point[axis] <= value {
                TreeLayout::left(node)
            } else {
                TreeLayout::right(node)
            };
        }
        Ok(node)
    }

    /// Index of a stored point with exactly these coordinates. The lowest
    /// index wins when several points coincide.
    pub fn find_point(&self, point: &[T]) -> KdResult<Option<usize>> {
        let delta = vec![T::ZERO; self.n_dim()];
        let found = self.find_in_range(point, &delta)?;
        Ok(found.indices.into_iter().min())
    }

    /// The `k` points closest to `point`, nearest first. Equal distances
    /// are ordered by index.
    pub fn find_nearest_neighbors(&self, point: &[T], k: usize) -> KdResult<Vec<Neighbor>> {
        self.ensure_built()?;
        self.check_point(point)?;
        if k == 0 {
            return Ok(Vec::new());
        }
        let query: Vec<f64> = point.iter().map(|v| v.to_f64()).collect();
        let mut heap = BinaryHeap::with_capacity(k + 1);
        self.nearest_recursive(0, &query, k, &mut heap);
        Ok(heap.into_sorted_vec())
    }

    fn nearest_recursive(
        &self,
        node: usize,
        query: &[f64],
        k: usize,
        heap: &mut BinaryHeap<Neighbor>,
    ) {
        if self.layout().is_terminal(node) {
            for &index in self.bucket(node) {
                let candidate = Neighbor {
                    index,
                    dist_sq: self.points().dist_sq(index, query),
                };
                if heap.len() < k {
                    heap.push(candidate);
                } else if heap.peek().is_some_and(|worst| candidate < *worst) {
                    heap.pop();
                    heap.push(candidate);
                }
            }
            return;
        }

        let KdNode { value, axis } = self.node(node);
        let diff = query[axis] - value.to_f64();

        // Visit the side containing the query first
        let (first, second) = if diff <= 0.0 {
            (TreeLayout::left(node), TreeLayout::right(node))
        } else {
            (TreeLayout::right(node), TreeLayout::left(node))
        };

        self.nearest_recursive(first, query, k, heap);

        // Points across the split are at least |diff| away
        let worst = heap.peek().map_or(f64::INFINITY, |n| n.dist_sq);
        if heap.len() < k || diff * diff <= worst {
            self.nearest_recursive(second, query, k, heap);
        }
    }

    /// Runs one range query per point in parallel, all with the same tolerance.
    pub fn find_in_range_batch(
        &self,
        points: &[Vec<T>],
        delta: &[T],
    ) -> KdResult<Vec<RangeResult>> {
        points
            .par_iter()
            .map(|point| self.find_in_range(point, delta))
            .collect()
    }

    /// Coordinate `dim` of point `index`.
    pub fn coordinate(&self, dim: usize, index: usize) -> KdResult<T> {
        let n_dim = self.n_dim();
        if dim >= n_dim {
            return Err(KdTreeError::InvalidDimension { dim, n_dim });
        }
        if index >= self.n_points() {
            return Err(KdTreeError::InvalidPoint {
                index,
                count: self.n_points(),
            });
        }
        if !self.points().is_bound(dim) {
            return Err(KdTreeError::MissingData { dim });
        }
        Ok(self.coord(dim, index))
    }
}
