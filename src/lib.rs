//! # kdbucket
//!
//! `kdbucket` is a Rust library for static k-d trees over large point sets, designed to be
//! used in Rust as well as compiled to WebAssembly (WASM). It builds a binary space partition
//! once and then answers bounded-range queries over millions of points with a small, flat
//! memory footprint.
//!
//! ## Features
//!
//! - **Array-packed nodes**: Nodes live in one flat table addressed like a binary heap,
//!   with no child pointers. Only the split value and axis are stored per node.
//! - **Bucketed leaves**: Terminal nodes hold up to `bucket_size` points. All buckets are
//!   full except the last, and map onto a permuted index array without gaps.
//! - **Borrowed or owned data**: Coordinates are bound per dimension from caller slices
//!   (never written) or copied from an interleaved buffer.
//! - **Queries**: Axis-aligned range search, radius search, k nearest neighbours, point
//!   location, and node cell introspection. Batched range queries run in parallel.
//!
//! ## Example
//!
//! ```
//! use kdbucket::KdTree;
//!
//! let xs = [0.0, 1.0, 2.0, 3.0, 10.0];
//! let ys = [0.0, 1.0, 2.0, 3.0, 10.0];
//! let mut tree = KdTree::with_data(5, 2, &[&xs[..], &ys[..]]).unwrap();
//! tree.build().unwrap();
//!
//! let mut found = tree.find_in_range(&[1.5, 1.5], &[1.0, 1.0]).unwrap().indices;
//! found.sort();
//! assert_eq!(found, vec![1, 2]);
//! ```
//!
//! ## Main Interface
//!
//! The primary entry point is the [`KdTree`] struct, which owns the node table and borrows
//! or owns the point data.

mod bounds;
mod config;
mod coordinate;
mod error;
mod kdtree;
mod layout;
mod points;
mod query;
mod wasm;

pub use bounds::BoundingBox;
pub use config::KdTreeConfig;
pub use config::SplitRule;
pub use config::DEFAULT_BUCKET_SIZE;
pub use coordinate::Coordinate;
pub use error::KdResult;
pub use error::KdTreeError;
pub use kdtree::KdNode;
pub use kdtree::KdTree;
pub use layout::TreeLayout;
pub use points::PointSet;
pub use query::Neighbor;
pub use query::RangeResult;
pub use query::RangeStats;
pub use wasm::KdTreeWasm;

/// Single-precision tree.
pub type KdTreeF32<'a> = KdTree<'a, f32>;
/// Double-precision tree.
pub type KdTreeF64<'a> = KdTree<'a, f64>;
