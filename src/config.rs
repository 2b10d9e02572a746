use crate::error::{KdResult, KdTreeError};

/// Default maximum number of points per bucket.
pub const DEFAULT_BUCKET_SIZE: usize = 10;

/// How an internal node picks the axis it splits on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SplitRule {
    /// Cycle through the axes with tree depth (`depth % n_dim`).
    #[default]
    RoundRobin,
    /// Split the axis with the largest coordinate spread inside the node.
    /// Ties go to the lowest axis.
    WidestSpread,
}

/// Configuration for kd-tree construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KdTreeConfig {
    /// Maximum points stored in one terminal node (default: 10)
    pub bucket_size: usize,
    /// Axis selection per internal node (default: round robin)
    pub split_rule: SplitRule,
}

impl Default for KdTreeConfig {
    fn default() -> Self {
        Self {
            bucket_size: DEFAULT_BUCKET_SIZE,
            split_rule: SplitRule::default(),
        }
    }
}

impl KdTreeConfig {
    pub fn new(bucket_size: usize) -> Self {
        Self {
            bucket_size,
            ..Self::default()
        }
    }

    pub fn with_split_rule(mut self, split_rule: SplitRule) -> Self {
        self.split_rule = split_rule;
        self
    }

    pub fn validate(&self) -> KdResult<()> {
        if self.bucket_size == 0 {
            return Err(KdTreeError::InvalidConfiguration(
                "bucket size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
