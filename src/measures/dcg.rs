//! Discounted cumulative gain, scaled into a C/W/L weighting.
//!
//! Continuing from rank `i` with probability `log(i+1)/log(i+2)` makes the
//! visit weights proportional to `1/log(i+1)`, the DCG discount. The log base
//! cancels in the ratio. Beyond the cut-off `k` the user always stops.

use super::{Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@article{Jarvelin:2002:CGE:582415.582418,
  author = {J\"{a}rvelin, Kalervo and Kek\"{a}l\"{a}inen, Jaana},
  title = {Cumulated Gain-based Evaluation of IR Techniques},
  journal = {ACM Trans. Inf. Syst.},
  volume = {20},
  number = {4},
  year = {2002},
  pages = {422--446},
  url = {http://doi.acm.org/10.1145/582415.582418}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndcg {
    pub k: usize,
}

impl Ndcg {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Metric for Ndcg {
    fn name(&self) -> String {
        format!("NDCG-k@{}", self.k)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok((1..=ranking.depth())
            .map(|rank| {
                if rank < self.k {
                    let r = rank as f64;
                    (r + 1.0).ln() / (r + 2.0).ln()
                } else {
                    0.0
                }
            })
            .collect())
    }
}
