use crate::kdtree::KdTree;
use rand::prelude::*;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// WASM wrapper around an owned, built `f64` kd-tree.
#[wasm_bindgen(js_name = KdTree)]
pub struct KdTreeWasm {
    inner: KdTree<'static, f64>,
}

#[wasm_bindgen(js_class = KdTree)]
impl KdTreeWasm {
    /// Builds a tree over an interleaved `[x0, y0, .., x1, y1, ..]` buffer.
    #[wasm_bindgen(constructor)]
    pub fn new(n_dim: usize, bucket_size: usize, points: &[f64]) -> Result<KdTreeWasm, JsError> {
        let mut inner = KdTree::from_interleaved(n_dim, bucket_size, points)?;
        inner.build()?;
        Ok(KdTreeWasm { inner })
    }

    /// Builds a tree over `count` points drawn uniformly from `[min, max)` on every axis.
    pub fn random(
        count: usize,
        n_dim: usize,
        bucket_size: usize,
        min: f64,
        max: f64,
        seed: u64,
    ) -> Result<KdTreeWasm, JsError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let points: Vec<f64> = (0..count * n_dim).map(|_| rng.gen_range(min..max)).collect();
        Self::new(n_dim, bucket_size, &points)
    }

    #[wasm_bindgen(getter)]
    pub fn n_points(&self) -> usize {
        self.inner.n_points()
    }

    #[wasm_bindgen(getter)]
    pub fn n_dim(&self) -> usize {
        self.inner.n_dim()
    }

    #[wasm_bindgen(getter)]
    pub fn n_nodes(&self) -> usize {
        self.inner.n_nodes()
    }

    #[wasm_bindgen(getter)]
    pub fn total_nodes(&self) -> usize {
        self.inner.total_nodes()
    }

    #[wasm_bindgen(getter)]
    pub fn row_t0(&self) -> usize {
        self.inner.row_t0()
    }

    #[wasm_bindgen(getter)]
    pub fn cross_node(&self) -> usize {
        self.inner.cross_node()
    }

    #[wasm_bindgen(getter)]
    pub fn offset(&self) -> usize {
        self.inner.offset()
    }

    /// Indices of the points within `delta` of `point` on every axis.
    pub fn find_in_range(&self, point: &[f64], delta: &[f64]) -> Result<Vec<u32>, JsError> {
        let found = self.inner.find_in_range(point, delta)?;
        Ok(found.indices.into_iter().map(|i| i as u32).collect())
    }

    /// Indices of the `k` nearest points, nearest first.
    pub fn find_nearest(&self, point: &[f64], k: usize) -> Result<Vec<u32>, JsError> {
        let found = self.inner.find_nearest_neighbors(point, k)?;
        Ok(found.into_iter().map(|n| n.index as u32).collect())
    }

    /// Cell of a node as `[min_0, .., min_n, max_0, .., max_n]`.
    pub fn node_bounding_box(&self, node: usize) -> Result<Vec<f64>, JsError> {
        let cell = self.inner.node_bounding_box(node)?;
        Ok(cell.min.into_iter().chain(cell.max).collect())
    }

    pub fn node_points(&self, node: usize) -> Result<Vec<u32>, JsError> {
        let points = self.inner.node_points(node)?;
        Ok(points.iter().map(|&i| i as u32).collect())
    }

    pub fn node_point_count(&self, node: usize) -> Result<usize, JsError> {
        Ok(self.inner.node_point_count(node)?)
    }
}
