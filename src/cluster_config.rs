use crate::error::{MinerError, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Minimum shared-token ratio for a line to join an existing cluster
    pub similarity_threshold: f64,
    /// Clusters with fewer members are left out of the report
    pub lower_bound: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            lower_bound: 0,
        }
    }
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Thresholds outside 0..=1 are kept as given: above 1 nothing merges,
    /// at or below 0 every line joins the first cluster of its length.
    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_lower_bound(mut self, lower_bound: usize) -> Self {
        self.lower_bound = lower_bound;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.similarity_threshold.is_nan() {
            return Err(MinerError::InvalidThreshold(self.similarity_threshold));
        }
        Ok(())
    }
}
