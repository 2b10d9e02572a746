use std::borrow::Cow;

use crate::coordinate::Coordinate;
use crate::error::{KdResult, KdTreeError};

/// Per-dimension coordinate columns for `n_points` points.
///
/// Columns are either borrowed from the caller or owned by the set. Borrowed
/// columns are only ever read. A column may be longer than `n_points`, in
/// which case only its first `n_points` values belong to the set.
#[derive(Clone, Debug)]
pub struct PointSet<'a, T: Coordinate> {
    n_points: usize,
    // an empty column marks an unbound dimension (n_points is never zero)
    columns: Vec<Cow<'a, [T]>>,
}

impl<'a, T: Coordinate> PointSet<'a, T> {
    pub fn new(n_points: usize, n_dim: usize) -> KdResult<Self> {
        if n_points == 0 {
            return Err(KdTreeError::InvalidConfiguration(
                "point count must be at least 1".to_string(),
            ));
        }
        if n_dim == 0 {
            return Err(KdTreeError::InvalidConfiguration(
                "dimension count must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            n_points,
            columns: vec![Cow::Borrowed(&[][..]); n_dim],
        })
    }

    /// Copy an interleaved `[x0, y0, .., x1, y1, ..]` buffer into owned columns.
    pub fn from_interleaved(n_dim: usize, data: &[T]) -> KdResult<PointSet<'static, T>> {
        if n_dim == 0 {
            return Err(KdTreeError::InvalidConfiguration(
                "dimension count must be at least 1".to_string(),
            ));
        }
        if data.len() % n_dim != 0 {
            return Err(KdTreeError::InvalidConfiguration(format!(
                "interleaved buffer of {} values is not a multiple of {} dimensions",
                data.len(),
                n_dim
            )));
        }
        let n_points = data.len() / n_dim;
        let mut set = PointSet::new(n_points, n_dim)?;
        for dim in 0..n_dim {
            let column: Vec<T> = data.iter().skip(dim).step_by(n_dim).copied().collect();
            set.bind(dim, Cow::Owned(column))?;
        }
        Ok(set)
    }

    pub fn n_points(&self) -> usize {
        self.n_points
    }

    pub fn n_dim(&self) -> usize {
        self.columns.len()
    }

    /// Bind the coordinate column of `dim`, replacing any previous column.
    pub fn bind(&mut self, dim: usize, column: Cow<'a, [T]>) -> KdResult<()> {
        let n_dim = self.n_dim();
        if dim >= n_dim {
            return Err(KdTreeError::InvalidDimension { dim, n_dim });
        }
        if column.len() < self.n_points {
            return Err(KdTreeError::SizeMismatch {
                dim,
                len: column.len(),
                expected: self.n_points,
            });
        }
        if let Some(index) = column[..self.n_points].iter().position(|v| v.is_nan()) {
            return Err(KdTreeError::NanCoordinate { dim, index });
        }
        self.columns[dim] = column;
        Ok(())
    }

    pub fn is_bound(&self, dim: usize) -> bool {
        self.columns.get(dim).is_some_and(|c| !c.is_empty())
    }

    /// First dimension still waiting for data.
    pub fn first_unbound(&self) -> Option<usize> {
        (0..self.n_dim()).find(|&dim| !self.is_bound(dim))
    }

    /// Coordinates of dimension `dim`, truncated to `n_points`.
    pub fn column(&self, dim: usize) -> Option<&[T]> {
        if self.is_bound(dim) {
            Some(&self.columns[dim][..self.n_points])
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn coord(&self, dim: usize, index: usize) -> T {
        self.columns[dim][index]
    }

    pub(crate) fn point(&self, index: usize) -> Vec<T> {
        self.columns.iter().map(|c| c[index]).collect()
    }

    /// Inclusive box membership on every axis.
    #[inline]
    pub(crate) fn in_box(&self, index: usize, lo: &[T], hi: &[T]) -> bool {
        self.columns.iter().enumerate().all(|(d, c)| {
            let v = c[index];
            v >= lo[d] && v <= hi[d]
        })
    }

    #[inline]
    pub(crate) fn dist_sq(&self, index: usize, point: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(point)
            .map(|(c, &q)| {
                let diff = c[index].to_f64() - q;
                diff * diff
            })
            .sum()
    }

    /// Smallest and largest coordinate of `dim` over `indices`.
    pub(crate) fn spread(&self, dim: usize, indices: &[usize]) -> (T, T) {
        let column = &self.columns[dim];
        let first = column[indices[0]];
        let mut min = first;
        let mut max = first;
        for &idx in &indices[1..] {
            let v = column[idx];
            if v < min { min = v; }
            if v > max { max = v; }
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_empty() {
        assert!(matches!(
            PointSet::<f64>::new(0, 2),
            Err(KdTreeError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            PointSet::<f64>::new(5, 0),
            Err(KdTreeError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_bind_checks() {
        let xs = [1.0, 2.0, 3.0];
        let mut set = PointSet::<f64>::new(3, 2).unwrap();
        assert_eq!(
            set.bind(2, Cow::Borrowed(&xs[..])),
            Err(KdTreeError::InvalidDimension { dim: 2, n_dim: 2 })
        );
        assert_eq!(
            set.bind(0, Cow::Borrowed(&xs[..2])),
            Err(KdTreeError::SizeMismatch {
                dim: 0,
                len: 2,
                expected: 3
            })
        );
        assert_eq!(set.first_unbound(), Some(0));
        set.bind(0, Cow::Borrowed(&xs[..])).unwrap();
        assert_eq!(set.first_unbound(), Some(1));
        set.bind(1, Cow::Owned(vec![4.0, 5.0, 6.0, 7.0])).unwrap();
        assert_eq!(set.first_unbound(), None);
        assert_eq!(set.column(1), Some(&[4.0, 5.0, 6.0][..]));
    }

    #[test]
    fn test_nan_rejected_only_inside_range() {
        let mut set = PointSet::<f32>::new(2, 1).unwrap();
        assert_eq!(
            set.bind(0, Cow::Owned(vec![0.0, f32::NAN])),
            Err(KdTreeError::NanCoordinate { dim: 0, index: 1 })
        );
        // values past n_points are ignored
        assert!(set.bind(0, Cow::Owned(vec![0.0, 1.0, f32::NAN])).is_ok());
    }

    #[test]
    fn test_from_interleaved() {
        let set = PointSet::from_interleaved(2, &[0.0, 10.0, 1.0, 11.0, 2.0, 12.0]).unwrap();
        assert_eq!(set.n_points(), 3);
        assert_eq!(set.column(0), Some(&[0.0, 1.0, 2.0][..]));
        assert_eq!(set.column(1), Some(&[10.0, 11.0, 12.0][..]));
        assert_eq!(set.point(2), vec![2.0, 12.0]);
        assert!(PointSet::from_interleaved(2, &[0.0, 1.0, 2.0]).is_err());
    }
}
