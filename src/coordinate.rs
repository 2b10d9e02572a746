use std::cmp::Ordering;
use std::fmt::Debug;
use std::ops::{Add, Sub};

/// Scalar type a point coordinate can be stored as.
///
/// Implemented for `f32` and `f64`. Distances are always evaluated in `f64`.
pub trait Coordinate:
    Copy + PartialOrd + Debug + Send + Sync + Add<Output = Self> + Sub<Output = Self> + 'static
{
    const ZERO: Self;

    fn to_f64(self) -> f64;

    fn is_nan(self) -> bool;

    /// Total order over all values, NaN included.
    fn order(&self, other: &Self) -> Ordering;
}

impl Coordinate for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn is_nan(self) -> bool {
        f64::is_nan(self)
    }

    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Coordinate for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    #[inline]
    fn is_nan(self) -> bool {
        f32::is_nan(self)
    }

    #[inline]
    fn order(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}
