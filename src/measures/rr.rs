//! Reciprocal rank: the user stops at the first item with positive gain.

use super::{Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@article{kantor2000trec,
  title = {The TREC-5 Confusion Track},
  author = {Kantor, Paul and Voorhees, Ellen},
  journal = {Information Retrieval},
  volume = {2},
  number = {2-3},
  pages = {165--176},
  year = {2000}
}"#;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReciprocalRank;

impl Metric for ReciprocalRank {
    fn name(&self) -> String {
        "RR".to_string()
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        let first_hit = gains.iter().position(|&g| g > 0.0).unwrap_or(gains.len());
        Ok((0..gains.len())
            .map(|i| if i < first_hit { 1.0 } else { 0.0 })
            .collect())
    }
}
