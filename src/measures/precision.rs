//! Precision at k.
//!
//! The user examines exactly `k` items. With binary gains EU is P@k and ETU is
//! the number of relevant items in the top k; with graded gains these become
//! graded precision and cumulative gain.

use super::{cutoff_vector, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@misc{rijsbergen:1979:ir,
  title = {Information Retrieval},
  author = {Van Rijsbergen, Cornelis J},
  year = {1979},
  publisher = {Butterworth-Heinemann}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Precision {
    pub k: usize,
}

impl Precision {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Metric for Precision {
    fn name(&self) -> String {
        format!("P@{}", self.k)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(cutoff_vector(self.k.saturating_sub(1), ranking.depth()))
    }
}
