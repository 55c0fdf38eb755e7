//! U-measure: the user is less likely to continue the more text they have
//! read. `L` is the reading budget; costs are usually characters.

use super::{continuation_from_weights, cumsum, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Sakai:2013:SRR:2484028.2484031,
  author = {Sakai, Tetsuya and Dou, Zhicheng},
  title = {Summaries, Ranked Retrieval and Sessions: A Unified Framework for Information Access Evaluation},
  booktitle = {Proceedings of the 36th International ACM SIGIR Conference on Research and Development in Information Retrieval},
  series = {SIGIR '13},
  year = {2013},
  pages = {473--482},
  url = {http://doi.acm.org/10.1145/2484028.2484031}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UMeasure {
    pub budget: f64,
}

impl UMeasure {
    pub fn new(budget: f64) -> Self {
        Self { budget }
    }

    fn position_decay(&self, read: f64) -> f64 {
        (1.0 - read / self.budget).max(0.0)
    }
}

impl Default for UMeasure {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

impl Metric for UMeasure {
    fn name(&self) -> String {
        format!("U-L@{}", self.budget)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(continuation_from_weights(&self.weight_vector(ranking, bound)?))
    }

    /// `w[i]` decays linearly with the cost read before rank `i`; the last
    /// rank always gets zero weight.
    fn weight_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        let n = cum_costs.len();
        let mut wvec = Vec::with_capacity(n);
        let mut read = 0.0;
        for &cc in cum_costs.iter().take(n.saturating_sub(1)) {
            wvec.push(self.position_decay(read));
            read = cc;
        }
        let norm: f64 = wvec.iter().sum();
        if n > 0 {
            wvec.push(0.0);
        }
        Ok(wvec.into_iter().map(|w| w / norm).collect())
    }
}
