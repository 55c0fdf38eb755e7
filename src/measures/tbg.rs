//! Time-biased gain.
//!
//! Weights decay exponentially with the time (cost) spent before reaching an
//! item, halving every `halflife` units. With equal costs this is RBP.

use super::{continuation_from_weights, cumsum, fmt_param, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Smucker:2012:TCE:2348283.2348300,
  author = {Smucker, Mark D. and Clarke, Charles L.A.},
  title = {Time-based Calibration of Effectiveness Measures},
  booktitle = {Proceedings of the 35th International ACM SIGIR Conference on Research and Development in Information Retrieval},
  series = {SIGIR '12},
  year = {2012},
  pages = {95--104},
  url = {http://doi.acm.org/10.1145/2348283.2348300}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeBiasedGain {
    pub halflife: f64,
}

impl TimeBiasedGain {
    pub fn new(halflife: f64) -> Self {
        Self { halflife }
    }

    fn integral_decay(&self, elapsed: f64) -> f64 {
        let h = self.halflife;
        h * 2f64.powf(-elapsed / h) / std::f64::consts::LN_2
    }
}

impl Default for TimeBiasedGain {
    fn default() -> Self {
        Self::new(224.0)
    }
}

impl Metric for TimeBiasedGain {
    fn name(&self) -> String {
        format!("TBG-H@{}", fmt_param(self.halflife))
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(continuation_from_weights(&self.weight_vector(ranking, bound)?))
    }

    fn weight_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        let mut wvec = Vec::with_capacity(cum_costs.len());
        if !cum_costs.is_empty() {
            wvec.push(self.integral_decay(0.0));
            let last = cum_costs.len() - 1;
            wvec.extend(cum_costs[..last].iter().map(|&c| self.integral_decay(c)));
        }
        let norm: f64 = wvec.iter().sum();
        Ok(wvec.into_iter().map(|w| w / norm).collect())
    }
}
