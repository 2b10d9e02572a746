//! Index arithmetic for the implicit node table.
//!
//! The tree is a complete binary tree with one terminal node per bucket,
//! addressed like a binary heap: node `i` has children `2i + 1` and `2i + 2`.
//! Ids `0..n_nodes` are internal, `n_nodes..total_nodes` are terminal.
//!
//! Terminal nodes sit on at most two rows. Read left to right, the deeper row
//! (ids `cross_node..`) comes first and the shallower row (ids
//! `n_nodes..cross_node`) follows, so buckets map onto consecutive slots of
//! the permuted index array without gaps. Every bucket is full except the
//! right-most one, which takes the remainder.

use std::ops::Range;

/// Node table geometry for a given point count and bucket size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeLayout {
    n_points: usize,
    bucket_size: usize,
    n_nodes: usize,
    total_nodes: usize,
    row_t0: usize,
    cross_node: usize,
    offset: usize,
}

impl TreeLayout {
    /// Both arguments must be non-zero.
    pub fn new(n_points: usize, bucket_size: usize) -> Self {
        debug_assert!(n_points > 0 && bucket_size > 0);
        let n_buckets = n_points.div_ceil(bucket_size);
        let row_t0 = n_buckets.ilog2() as usize;
        let deep_buckets = 2 * (n_buckets - (1 << row_t0));
        TreeLayout {
            n_points,
            bucket_size,
            n_nodes: n_buckets - 1,
            total_nodes: 2 * n_buckets - 1,
            row_t0,
            cross_node: (1 << (row_t0 + 1)) - 1,
            offset: deep_buckets * bucket_size,
        }
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Number of internal (splitting) nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Internal plus terminal nodes.
    pub fn total_nodes(&self) -> usize {
        self.total_nodes
    }

    pub fn n_buckets(&self) -> usize {
        self.n_nodes + 1
    }

    /// Row of the first terminal node.
    pub fn row_t0(&self) -> usize {
        self.row_t0
    }

    /// First slot of the deeper terminal row. Equals `total_nodes` when every
    /// bucket sits on the same row.
    pub fn cross_node(&self) -> usize {
        self.cross_node
    }

    /// Number of points held by the deeper terminal row.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Deepest row in use.
    pub fn depth(&self) -> usize {
        if self.cross_node < self.total_nodes { self.row_t0 + 1 } else { self.row_t0 }
    }

    #[inline]
    pub fn is_terminal(&self, node: usize) -> bool {
        node >= self.n_nodes
    }

    #[inline]
    pub fn left(node: usize) -> usize {
        2 * node + 1
    }

    #[inline]
    pub fn right(node: usize) -> usize {
        2 * node + 2
    }

    #[inline]
    pub fn parent(node: usize) -> Option<usize> {
        if node == 0 { None } else { Some((node - 1) / 2) }
    }

    #[inline]
    pub fn row(node: usize) -> usize {
        (node + 1).ilog2() as usize
    }

    /// Slots of the index array owned by terminal `node`.
    #[inline]
    pub fn bucket_range(&self, node: usize) -> Range<usize> {
        debug_assert!(self.is_terminal(node) && node < self.total_nodes);
        let start = if node >= self.cross_node {
            (node - self.cross_node) * self.bucket_size
        } else {
            self.offset + (node - self.n_nodes) * self.bucket_size
        };
        start..(start + self.bucket_size).min(self.n_points)
    }

    /// Slots of the index array owned by any node's subtree.
    pub fn point_range(&self, node: usize) -> Range<usize> {
        let mut first = node;
        while !self.is_terminal(first) {
            first = Self::left(first);
        }
        let mut last = node;
        while !self.is_terminal(last) {
            last = Self::right(last);
        }
        self.bucket_range(first).start..self.bucket_range(last).end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_buckets(layout: &TreeLayout) -> Vec<Range<usize>> {
        // left-to-right walk of the terminal nodes
        fn walk(layout: &TreeLayout, node: usize, out: &mut Vec<Range<usize>>) {
            if layout.is_terminal(node) {
                out.push(layout.bucket_range(node));
            } else {
                walk(layout, TreeLayout::left(node), out);
                walk(layout, TreeLayout::right(node), out);
            }
        }
        let mut out = Vec::new();
        walk(layout, 0, &mut out);
        out
    }

    #[test]
    fn test_single_bucket() {
        let layout = TreeLayout::new(7, 10);
        assert_eq!(layout.n_nodes(), 0);
        assert_eq!(layout.total_nodes(), 1);
        assert_eq!(layout.row_t0(), 0);
        assert_eq!(layout.cross_node(), 1);
        assert_eq!(layout.offset(), 0);
        assert_eq!(layout.bucket_range(0), 0..7);
        assert_eq!(layout.point_range(0), 0..7);
    }

    #[test]
    fn test_partial_deeper_row() {
        // 33 points, bucket 10: four buckets on one row
        let layout = TreeLayout::new(33, 10);
        assert_eq!(layout.n_nodes(), 3);
        assert_eq!(layout.total_nodes(), 7);
        assert_eq!(layout.row_t0(), 2);
        assert_eq!(layout.cross_node(), 7);
        assert_eq!(layout.offset(), 0);
        assert_eq!(layout.bucket_range(6), 30..33);

        // 55 points, bucket 10: six buckets, four on the deeper row
        let layout = TreeLayout::new(55, 10);
        assert_eq!(layout.n_nodes(), 5);
        assert_eq!(layout.total_nodes(), 11);
        assert_eq!(layout.row_t0(), 2);
        assert_eq!(layout.cross_node(), 7);
        assert_eq!(layout.offset(), 40);
        assert_eq!(layout.bucket_range(7), 0..10);
        assert_eq!(layout.bucket_range(10), 30..40);
        assert_eq!(layout.bucket_range(5), 40..50);
        assert_eq!(layout.bucket_range(6), 50..55);
        assert_eq!(layout.point_range(1), 0..40);
        assert_eq!(layout.point_range(2), 40..55);
        assert_eq!(layout.depth(), 3);
    }

    #[test]
    fn test_buckets_tile_points() {
        for n_points in 1..300 {
            for bucket_size in [1, 2, 3, 7, 10, 64] {
                let layout = TreeLayout::new(n_points, bucket_size);
                let buckets = collect_buckets(&layout);
                assert_eq!(buckets.len(), layout.n_buckets());
                let mut next = 0;
                for (i, range) in buckets.iter().enumerate() {
                    assert_eq!(
                        range.start, next,
                        "gap before bucket {i} ({n_points}/{bucket_size})"
                    );
                    assert!(!range.is_empty());
                    assert!(range.len() <= bucket_size);
                    if i + 1 < buckets.len() {
                        assert_eq!(range.len(), bucket_size);
                    }
                    next = range.end;
                }
                assert_eq!(next, n_points);
                assert_eq!(layout.point_range(0), 0..n_points);
            }
        }
    }

    #[test]
    fn test_navigation() {
        assert_eq!(TreeLayout::left(0), 1);
        assert_eq!(TreeLayout::right(0), 2);
        assert_eq!(TreeLayout::parent(0), None);
        assert_eq!(TreeLayout::parent(5), Some(2));
        assert_eq!(TreeLayout::parent(6), Some(2));
        assert_eq!(TreeLayout::row(0), 0);
        assert_eq!(TreeLayout::row(2), 1);
        assert_eq!(TreeLayout::row(7), 3);
    }
}
