//! Average precision as a C/W/L metric.
//!
//! [`AveragePrecision`] continues from rank `i` in proportion to the remaining
//! rank-weighted gain `sum_{j>i} g[j]/(j+1)`. [`TruncatedAveragePrecision`] is
//! Harman's original formulation, normalised by the relevant items seen rather
//! than all known relevant items, and is defined directly through its weights.

use super::{continuation_from_weights, cumsum, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@article{Harman:1992:ESIR,
  author = {Donna Harman},
  title = {Evaluation Issues in Information Retrieval},
  journal = {Information Processing and Management},
  volume = {28},
  number = {4},
  pages = {439--440},
  year = {1992}
}"#;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AveragePrecision;

impl Metric for AveragePrecision {
    fn name(&self) -> String {
        "AP".to_string()
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        let n = gains.len();

        // tail[i] = sum_{j >= i} g[j] / (j + 1)
        let mut tail = vec![0.0; n + 1];
        for i in (0..n).rev() {
            tail[i] = tail[i + 1] + gains[i] / (i as f64 + 1.0);
        }

        let mut cvec: Vec<f64> = (0..n.saturating_sub(1))
            .map(|i| {
                let bottom = tail[i];
                let top = tail[i + 1];
                if top > 0.0 && bottom > 0.0 {
                    top / bottom
                } else {
                    0.0
                }
            })
            .collect();
        if n > 0 {
            cvec.push(0.0);
        }
        Ok(cvec)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TruncatedAveragePrecision;

impl Metric for TruncatedAveragePrecision {
    fn name(&self) -> String {
        "TrAP".to_string()
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(continuation_from_weights(&self.weight_vector(ranking, bound)?))
    }

    fn weight_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        let mut cum_gains = cumsum(&ranking.gain_vector(bound));

        // Ranks before the first gain get a nominal unit so the user starts browsing.
        let last = cum_gains.len().saturating_sub(1);
        for cg in cum_gains.iter_mut().take(last) {
            if *cg != 0.0 {
                break;
            }
            *cg = 1.0;
        }

        let total_rels = ranking.total_rels(bound);
        let scale = if total_rels > 0.0 { total_rels } else { 1.0 };
        Ok(cum_gains
            .iter()
            .zip(&cum_costs)
            .map(|(g, c)| g / c / scale)
            .collect())
    }
}
