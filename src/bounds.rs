use crate::coordinate::Coordinate;

/// Axis-aligned box in N-dimensional space.
///
/// A node's box is reported as `position` (the lower corner) plus `size`
/// (the extent along each axis), the layout cell renderers expect.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundingBox<T> {
    pub min: Vec<T>,
    pub max: Vec<T>,
}

impl<T: Coordinate> BoundingBox<T> {
    pub fn new(min: Vec<T>, max: Vec<T>) -> Self {
        debug_assert_eq!(min.len(), max.len());
        Self { min, max }
    }

    /// Box spanning `[point - delta, point + delta]` on every axis.
    pub fn around(point: &[T], delta: &[T]) -> Self {
        let min = point.iter().zip(delta).map(|(&p, &d)| p - d).collect();
        let max = point.iter().zip(delta).map(|(&p, &d)| p + d).collect();
        Self { min, max }
    }

    pub fn n_dim(&self) -> usize {
        self.min.len()
    }

    /// Lower corner.
    pub fn position(&self) -> &[T] {
        &self.min
    }

    /// Extent along each axis.
    pub fn size(&self) -> Vec<T> {
        self.max.iter().zip(&self.min).map(|(&hi, &lo)| hi - lo).collect()
    }

    /// Inclusive on every face.
    pub fn contains(&self, point: &[T]) -> bool {
        point
            .iter()
            .zip(self.min.iter().zip(&self.max))
            .all(|(p, (lo, hi))| p >= lo && p <= hi)
    }

    pub fn contains_box(&self, other: &BoundingBox<T>) -> bool {
        (0..self.n_dim()).all(|d| other.min[d] >= self.min[d] && other.max[d] <= self.max[d])
    }

    pub fn intersects(&self, other: &BoundingBox<T>) -> bool {
        (0..self.n_dim()).all(|d| other.min[d] <= self.max[d] && other.max[d] >= self.min[d])
    }

    /// Restrict to the half-space `x[dim] <= value`.
    pub(crate) fn clip_max(&mut self, dim: usize, value: T) {
        if value < self.max[dim] {
            self.max[dim] = value;
        }
    }

    /// Restrict to the half-space `x[dim] >= value`.
    pub(crate) fn clip_min(&mut self, dim: usize, value: T) {
        if value > self.min[dim] {
            self.min[dim] = value;
        }
    }
}
