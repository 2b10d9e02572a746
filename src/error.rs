//! Error types for kd-tree construction and queries.
//!
//! Every condition here is a caller error detected at the call boundary.
//! Nothing is retried and nothing degrades silently.

use thiserror::Error;

/// Main error type for kd-tree operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdTreeError {
    /// Non-positive point count, dimension count or bucket size.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Dimension index outside `0..n_dim`.
    #[error("Dimension {dim} out of range for a {n_dim}-dimensional point set")]
    InvalidDimension { dim: usize, n_dim: usize },

    /// Coordinate array shorter than the number of points.
    #[error("Coordinate array for dimension {dim} has {len} values, expected at least {expected}")]
    SizeMismatch {
        dim: usize,
        len: usize,
        expected: usize,
    },

    /// Build requested before every dimension was bound.
    #[error("No coordinate data bound for dimension {dim}")]
    MissingData { dim: usize },

    /// A bound coordinate is NaN.
    #[error("Coordinate {index} of dimension {dim} is NaN")]
    NanCoordinate { dim: usize, index: usize },

    /// Malformed query: wrong arity, NaN or negative tolerance.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Point index beyond the point set.
    #[error("Point {index} out of range ({count} points)")]
    InvalidPoint { index: usize, count: usize },

    /// Node id beyond the node table.
    #[error("Node {node} out of range ({count} nodes)")]
    OutOfRange { node: usize, count: usize },

    /// Query issued before `build()` completed.
    #[error("Tree has not been built")]
    NotBuilt,
}

/// Result type alias for kd-tree operations.
pub type KdResult<T> = Result<T, KdTreeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_mismatch_display() {
        let err = KdTreeError::SizeMismatch {
            dim: 1,
            len: 3,
            expected: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("dimension 1"));
        assert!(msg.contains("at least 5"));
    }

    #[test]
    fn test_out_of_range_display() {
        let err = KdTreeError::OutOfRange { node: 9, count: 7 };
        assert_eq!(err.to_string(), "Node 9 out of range (7 nodes)");
    }
}
