//! Search economic metric with diminishing returns.
//!
//! Total gain after `i` items is modelled as `i^beta`, so the marginal weight
//! of rank `i` is `(i+1)^beta - i^beta`. With `beta = 1` this is P@k.

use super::{fmt_param, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Azzopardi:2014:MIE:2600428.2609574,
  author = {Azzopardi, Leif},
  title = {Modelling Interaction with Economic Models of Search},
  booktitle = {Proceedings of the 37th International ACM SIGIR Conference on Research and Development in Information Retrieval},
  year = {2014},
  pages = {3--12},
  url = {http://doi.acm.org/10.1145/2600428.2609574}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchEconomic {
    pub beta: f64,
    pub k: usize,
}

impl SearchEconomic {
    pub fn new(beta: f64, k: usize) -> Self {
        Self { beta, k }
    }

    fn marginal(&self, i: usize) -> f64 {
        let i = i as f64;
        (i + 1.0).powf(self.beta) - i.powf(self.beta)
    }
}

impl Default for SearchEconomic {
    fn default() -> Self {
        Self::new(0.5, 10)
    }
}

impl Metric for SearchEconomic {
    fn name(&self) -> String {
        format!("SET-k@{}-b@{}", self.k, fmt_param(self.beta))
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok((1..=ranking.depth())
            .map(|i| {
                if i < self.k {
                    self.marginal(i + 1) / self.marginal(i)
                } else {
                    0.0
                }
            })
            .collect())
    }
}
