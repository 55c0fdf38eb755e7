//! Constant-patience models: rank-biased precision and net present value.
//!
//! RBP continues with probability `theta` at every rank. NPV reaches the same
//! user model from an economic angle: future items are discounted at `rate`,
//! giving `theta = 1 / (1 + rate)`.

use super::{fmt_param, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const RBP_CITATION: &str = r#"@article{Moffat:2008:RPM:1416950.1416952,
  author = {Moffat, Alistair and Zobel, Justin},
  title = {Rank-biased Precision for Measurement of Retrieval Effectiveness},
  journal = {ACM Trans. Inf. Syst.},
  volume = {27},
  number = {1},
  year = {2008},
  pages = {2:1--2:27},
  url = {http://doi.acm.org/10.1145/1416950.1416952}
}"#;

pub(crate) const CWL_CITATION: &str = r#"@inproceedings{azzopardi2019cwl,
  author = {Azzopardi, Leif and Thomas, Paul and Moffat, Alistair},
  title = {cwl\_eval: An Evaluation Tool for Information Retrieval},
  booktitle = {Proc. of the 42nd International ACM SIGIR Conference},
  series = {SIGIR '19},
  year = {2019}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankBiasedPrecision {
    pub theta: f64,
}

impl RankBiasedPrecision {
    pub fn new(theta: f64) -> Self {
        Self { theta }
    }
}

impl Default for RankBiasedPrecision {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl Metric for RankBiasedPrecision {
    fn name(&self) -> String {
        format!("RBP@{}", fmt_param(self.theta))
    }

    fn citation(&self) -> &'static str {
        RBP_CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(vec![self.theta; ranking.depth()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetPresentValue {
    pub rate: f64,
}

impl NetPresentValue {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl Default for NetPresentValue {
    fn default() -> Self {
        Self::new(0.1)
    }
}

impl Metric for NetPresentValue {
    fn name(&self) -> String {
        format!("NPV-r@{}", fmt_param(self.rate))
    }

    fn citation(&self) -> &'static str {
        CWL_CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(vec![1.0 / (1.0 + self.rate); ranking.depth()])
    }
}
