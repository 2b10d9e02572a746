use std::borrow::Cow;
use std::cmp::Ordering;
use std::ops::Range;

use log::debug;

use crate::bounds::BoundingBox;
use crate::config::{KdTreeConfig, SplitRule};
use crate::coordinate::Coordinate;
use crate::error::{KdResult, KdTreeError};
use crate::layout::TreeLayout;
use crate::points::PointSet;

/// Internal node: the median coordinate and the axis it was taken on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KdNode<T> {
    pub value: T,
    pub axis: usize,
}

/// Static k-d tree over a fixed point set with bucketed terminal nodes.
///
/// The tree is built once with [`KdTree::build`] and is immutable afterwards.
/// Nodes live in a flat table addressed like a binary heap (see
/// [`TreeLayout`]); points are referenced through a permuted index array so
/// coordinates are never copied.
///
/// Every point under the left child of a node has `coord[axis] <= value`,
/// every point under the right child has `coord[axis] >= value`. Equal
/// coordinates are ordered by point index, so the lower index goes left.
#[derive(Clone, Debug)]
pub struct KdTree<'a, T: Coordinate = f64> {
    config: KdTreeConfig,
    points: PointSet<'a, T>,
    layout: TreeLayout,
    nodes: Vec<KdNode<T>>,
    indices: Vec<usize>,
    domain: Option<BoundingBox<T>>,
}

/// Explicit state of one build pass.
struct BuildContext<'p, 'a, T: Coordinate> {
    points: &'p PointSet<'a, T>,
    layout: &'p TreeLayout,
    split_rule: SplitRule,
    indices: &'p mut [usize],
    nodes: &'p mut [KdNode<T>],
}

impl<T: Coordinate> BuildContext<'_, '_, T> {
    fn build_recursive(&mut self, node: usize) {
        if self.layout.is_terminal(node) {
            return;
        }
        let range = self.layout.point_range(node);
        let split = self.layout.point_range(TreeLayout::right(node)).start;
        let axis = self.choose_axis(node, range.clone());

        let points = self.points;
        let column = points.column(axis).unwrap_or(&[]);
        // the largest point of the left half carries the split value
        let slice = &mut self.indices[range.clone()];
        slice.select_nth_unstable_by(split - 1 - range.start, |&a, &b| split_order(column, a, b));

        self.nodes[node] = KdNode {
            value: column[self.indices[split - 1]],
            axis,
        };

        self.build_recursive(TreeLayout::left(node));
        self.build_recursive(TreeLayout::right(node));
    }

    fn choose_axis(&self, node: usize, range: Range<usize>) -> usize {
        let n_dim = self.points.n_dim();
        match self.split_rule {
            SplitRule::RoundRobin => TreeLayout::row(node) % n_dim,
            SplitRule::WidestSpread => {
                let slice = &self.indices[range];
                let mut best_axis = 0;
                let mut best_spread = f64::NEG_INFINITY;
                for d in 0..n_dim {
                    let (min, max) = self.points.spread(d, slice);
                    let spread = max.to_f64() - min.to_f64();
                    if spread > best_spread {
                        best_spread = spread;
                        best_axis = d;
                    }
                }
                best_axis
            }
        }
    }
}

impl<'a, T: Coordinate> KdTree<'a, T> {
    /// Creates an empty tree for `n_points` points in `n_dim` dimensions.
    /// Coordinates are bound afterwards with [`KdTree::set_data`].
    pub fn new(n_points: usize, n_dim: usize, bucket_size: usize) -> KdResult<Self> {
        Self::with_config(n_points, n_dim, KdTreeConfig::new(bucket_size))
    }

    pub fn with_config(n_points: usize, n_dim: usize, config: KdTreeConfig) -> KdResult<Self> {
        config.validate()?;
        let points = PointSet::new(n_points, n_dim)?;
        Self::from_points(points, config)
    }

    /// Creates a tree over caller-owned columns, one slice per dimension.
    pub fn with_data(n_points: usize, bucket_size: usize, columns: &[&'a [T]]) -> KdResult<Self> {
        let mut tree = Self::new(n_points, columns.len(), bucket_size)?;
        for (dim, column) in columns.iter().enumerate() {
            tree.set_data(dim, column)?;
        }
        Ok(tree)
    }

    /// Creates a tree owning a copy of an interleaved `[x0, y0, .., x1, y1, ..]` buffer.
    pub fn from_interleaved(
        n_dim: usize,
        bucket_size: usize,
        data: &[T],
    ) -> KdResult<KdTree<'static, T>> {
        let config = KdTreeConfig::new(bucket_size);
        config.validate()?;
        let points = PointSet::from_interleaved(n_dim, data)?;
        KdTree::from_points(points, config)
    }

    pub fn from_points(points: PointSet<'a, T>, config: KdTreeConfig) -> KdResult<Self> {
        config.validate()?;
        let layout = TreeLayout::new(points.n_points(), config.bucket_size);
        Ok(KdTree {
            config,
            points,
            layout,
            nodes: Vec::new(),
            indices: Vec::new(),
            domain: None,
        })
    }

    /// Binds the coordinates of dimension `dim`. The slice is read, never written.
    /// Rebinding a dimension discards any previous build.
    pub fn set_data(&mut self, dim: usize, column: &'a [T]) -> KdResult<()> {
        self.points.bind(dim, Cow::Borrowed(column))?;
        self.invalidate();
        Ok(())
    }

    /// Like [`KdTree::set_data`], but the tree takes ownership of the column.
    pub fn set_data_owned(&mut self, dim: usize, column: Vec<T>) -> KdResult<()> {
        self.points.bind(dim, Cow::Owned(column))?;
        self.invalidate();
        Ok(())
    }

    fn invalidate(&mut self) {
        self.nodes.clear();
        self.indices.clear();
        self.domain = None;
    }

    /// Builds the node table from scratch by recursive median partition.
    ///
    /// Calling it again starts over from the identity permutation and
    /// reproduces the same table for the same data.
    pub fn build(&mut self) -> KdResult<()> {
        if let Some(dim) = self.points.first_unbound() {
            return Err(KdTreeError::MissingData { dim });
        }
        let n_points = self.points.n_points();
        let n_dim = self.points.n_dim();

        let mut indices: Vec<usize> = (0..n_points).collect();
        let placeholder = KdNode {
            value: T::ZERO,
            axis: 0,
        };
        let mut nodes = vec![placeholder; self.layout.n_nodes()];

        let mut ctx = BuildContext {
            points: &self.points,
            layout: &self.layout,
            split_rule: self.config.split_rule,
            indices: &mut indices,
            nodes: &mut nodes,
        };
        ctx.build_recursive(0);

        let (min, max): (Vec<T>, Vec<T>) =
            (0..n_dim).map(|d| self.points.spread(d, &indices)).unzip();

        debug!(
            "kd-tree built: {} points, {} dims, bucket {}, {} internal / {} total nodes, row_t0 {}, cross_node {}, offset {}",
            n_points,
            n_dim,
            self.layout.bucket_size(),
            self.layout.n_nodes(),
            self.layout.total_nodes(),
            self.layout.row_t0(),
            self.layout.cross_node(),
            self.layout.offset()
        );

        self.nodes = nodes;
        self.indices = indices;
        self.domain = Some(BoundingBox::new(min, max));
        Ok(())
    }

    pub fn is_built(&self) -> bool {
        self.domain.is_some()
    }

    pub(crate) fn ensure_built(&self) -> KdResult<()> {
        if self.is_built() { Ok(()) } else { Err(KdTreeError::NotBuilt) }
    }

    pub fn config(&self) -> &KdTreeConfig {
        &self.config
    }

    pub fn points(&self) -> &PointSet<'a, T> {
        &self.points
    }

    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn n_points(&self) -> usize {
        self.points.n_points()
    }

    pub fn n_dim(&self) -> usize {
        self.points.n_dim()
    }

    pub fn bucket_size(&self) -> usize {
        self.layout.bucket_size()
    }

    /// Number of internal nodes.
    pub fn n_nodes(&self) -> usize {
        self.layout.n_nodes()
    }

    pub fn total_nodes(&self) -> usize {
        self.layout.total_nodes()
    }

    pub fn row_t0(&self) -> usize {
        self.layout.row_t0()
    }

    pub fn cross_node(&self) -> usize {
        self.layout.cross_node()
    }

    pub fn offset(&self) -> usize {
        self.layout.offset()
    }

    /// Internal nodes in heap order. Empty before `build()`.
    pub fn nodes(&self) -> &[KdNode<T>] {
        &self.nodes
    }

    /// Point indices permuted so every node owns a contiguous run.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Smallest box holding every point.
    pub fn domain(&self) -> KdResult<&BoundingBox<T>> {
        self.domain.as_ref().ok_or(KdTreeError::NotBuilt)
    }

    pub fn point(&self, index: usize) -> KdResult<Vec<T>> {
        if index >= self.n_points() {
            return Err(KdTreeError::InvalidPoint {
                index,
                count: self.n_points(),
            });
        }
        if let Some(dim) = self.points.first_unbound() {
            return Err(KdTreeError::MissingData { dim });
        }
        Ok(self.points.point(index))
    }

    fn check_node(&self, node: usize) -> KdResult<()> {
        self.ensure_built()?;
        if node >= self.layout.total_nodes() {
            return Err(KdTreeError::OutOfRange {
                node,
                count: self.layout.total_nodes(),
            });
        }
        Ok(())
    }

    fn internal_node(&self, node: usize) -> KdResult<&KdNode<T>> {
        self.ensure_built()?;
        self.nodes.get(node).ok_or(KdTreeError::OutOfRange {
            node,
            count: self.nodes.len(),
        })
    }

    /// Split value of an internal node.
    pub fn node_value(&self, node: usize) -> KdResult<T> {
        Ok(self.internal_node(node)?.value)
    }

    /// Split axis of an internal node.
    pub fn node_axis(&self, node: usize) -> KdResult<usize> {
        Ok(self.internal_node(node)?.axis)
    }

    pub fn is_terminal(&self, node: usize) -> KdResult<bool> {
        self.check_node(node)?;
        Ok(self.layout.is_terminal(node))
    }

    pub fn left(&self, node: usize) -> KdResult<Option<usize>> {
        Ok((!self.is_terminal(node)?).then(|| TreeLayout::left(node)))
    }

    pub fn right(&self, node: usize) -> KdResult<Option<usize>> {
        Ok((!self.is_terminal(node)?).then(|| TreeLayout::right(node)))
    }

    pub fn parent(&self, node: usize) -> KdResult<Option<usize>> {
        self.check_node(node)?;
        Ok(TreeLayout::parent(node))
    }

    /// Indices of every point under `node`.
    pub fn node_points(&self, node: usize) -> KdResult<&[usize]> {
        self.check_node(node)?;
        Ok(&self.indices[self.layout.point_range(node)])
    }

    pub fn node_point_count(&self, node: usize) -> KdResult<usize> {
        self.check_node(node)?;
        Ok(self.layout.point_range(node).len())
    }

    /// Cell of `node`: the data domain cut by every ancestor's half-space.
    ///
    /// Reconstructed on each call by walking down from the root, so no
    /// per-node boxes are stored.
    pub fn node_bounding_box(&self, node: usize) -> KdResult<BoundingBox<T>> {
        self.check_node(node)?;
        let mut cell = self.domain()?.clone();

        let mut path = Vec::with_capacity(TreeLayout::row(node));
        let mut current = node;
        while let Some(parent) = TreeLayout::parent(current) {
            path.push((parent, current == TreeLayout::left(parent)));
            current = parent;
        }
        for &(ancestor, is_left) in path.iter().rev() {
            let KdNode { value, axis } = self.nodes[ancestor];
            if is_left {
                cell.clip_max(axis, value);
            } else {
                cell.clip_min(axis, value);
            }
        }
        Ok(cell)
    }

    /// Tight box around the points actually stored under `node`.
    pub fn node_exact_bounds(&self, node: usize) -> KdResult<BoundingBox<T>> {
        let slice = self.node_points(node)?;
        let (min, max) = (0..self.n_dim()).map(|d| self.points.spread(d, slice)).unzip();
        Ok(BoundingBox::new(min, max))
    }

    #[inline]
    pub(crate) fn coord(&self, dim: usize, index: usize) -> T {
        self.points.coord(dim, index)
    }

    #[inline]
    pub(crate) fn node(&self, node: usize) -> KdNode<T> {
        self.nodes[node]
    }

    #[inline]
    pub(crate) fn bucket(&self, node: usize) -> &[usize] {
        &self.indices[self.layout.bucket_range(node)]
    }
}

/// Order of two points along one column, ties broken by point index.
fn split_order<T: Coordinate>(column: &[T], a: usize, b: usize) -> Ordering {
    column[a].order(&column[b]).then(a.cmp(&b))
}
