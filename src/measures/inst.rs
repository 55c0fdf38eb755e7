//! INST and INSQ: adaptive models driven by a target amount of gain `T`.
//!
//! INSQ's user becomes steadily less patient with rank. INST additionally
//! tracks how much of the target is still outstanding, so the continuation
//! probability falls once the accumulated gain approaches `T`.

use super::{cumsum, fmt_param, validate_gain_range, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const INST_CITATION: &str = r#"@inproceedings{Moffat:2015:IAM:2838931.2838938,
  author = {Moffat, Alistair and Bailey, Peter and Scholer, Falk and Thomas, Paul},
  title = {INST: An Adaptive Metric for Information Retrieval Evaluation},
  booktitle = {Proceedings of the 20th Australasian Document Computing Symposium},
  series = {ADCS '15},
  year = {2015},
  pages = {5:1--5:4},
  url = {http://doi.acm.org/10.1145/2838931.2838938}
}"#;

const INSQ_CITATION: &str = r#"@inproceedings{Moffat:2012:MMI:2407085.2407092,
  author = {Moffat, Alistair and Scholer, Falk and Thomas, Paul},
  title = {Models and Metrics: IR Evaluation As a User Process},
  booktitle = {Proceedings of the Seventeenth Australasian Document Computing Symposium},
  series = {ADCS '12},
  year = {2012},
  pages = {47--54},
  url = {http://doi.acm.org/10.1145/2407085.2407092}
}"#;

/// `((rank + 2T - 1) / (rank + 2T))^2`, the INSQ patience at 1-based `rank`.
pub(crate) fn insq_factor(rank: f64, target: f64) -> f64 {
    ((rank + 2.0 * target - 1.0) / (rank + 2.0 * target)).powi(2)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inst {
    pub target: f64,
}

impl Inst {
    pub const MIN_GAIN: f64 = 0.0;
    pub const MAX_GAIN: f64 = 1.0;

    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Default for Inst {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Metric for Inst {
    fn name(&self) -> String {
        format!("INST-T={}", fmt_param(self.target))
    }

    fn citation(&self) -> &'static str {
        INST_CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        validate_gain_range(&self.name(), Self::MIN_GAIN, Self::MAX_GAIN, &gains)?;
        let t = self.target;
        Ok(cumsum(&gains)
            .iter()
            .enumerate()
            .map(|(i, cg)| {
                let rank = i as f64 + 1.0;
                let remaining = t - cg;
                ((rank + t + remaining - 1.0) / (rank + t + remaining)).powi(2)
            })
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Insq {
    pub target: f64,
}

impl Insq {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Default for Insq {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Metric for Insq {
    fn name(&self) -> String {
        format!("INSQ-T={}", fmt_param(self.target))
    }

    fn citation(&self) -> &'static str {
        INSQ_CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, _bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok((0..ranking.depth())
            .map(|i| insq_factor(i as f64 + 1.0, self.target))
            .collect())
    }
}
