//! C/W/L metrics and the shared scoring engine.
//!
//! A metric is defined by its continuation vector `c`: the probability that a
//! user who has examined rank `i` goes on to rank `i + 1`. From `c` the engine
//! derives
//!
//! - the stopping likelihoods `l[i] = P[i] * (1 - c[i])`, and
//! - the visit weights `w[i] = P[i] / sum(P)`,
//!
//! where `P[0] = 1` and `P[i] = c[0] * ... * c[i-1]`. Combined with the gain
//! and cost vectors these give the five expectations reported per metric.
//!
//! Metrics that are naturally described by their weights (TrAP, TBG,
//! U-measure) override [`Metric::weight_vector`] and recover `c` from it with
//! [`continuation_from_weights`].

pub mod ap;
pub mod bpm;
pub mod dcg;
pub mod ift;
pub mod inst;
pub mod nerr;
pub mod precision;
pub mod rbp;
pub mod rr;
pub mod set;
pub mod tbg;
pub mod umeasure;

use std::ops::Sub;

use serde::Serialize;
use tracing::{trace, Level};

use crate::ranking::{Bound, Ranking};

pub use ap::{AveragePrecision, TruncatedAveragePrecision};
pub use bpm::{BejeweledDynamic, BejeweledStatic};
pub use dcg::Ndcg;
pub use ift::{IftGoal, IftGoalRate, IftRate};
pub use inst::{Insq, Inst};
pub use nerr::{GrrInsq, GrrRbp, GrrW, NerrEq10, NerrEq11, NerrEq8, NerrEq9};
pub use precision::Precision;
pub use rbp::{NetPresentValue, RankBiasedPrecision};
pub use rr::ReciprocalRank;
pub use set::SearchEconomic;
pub use tbg::TimeBiasedGain;
pub use umeasure::UMeasure;

/// Number of leading vector entries written to trace logs.
const TRACE_PREFIX: usize = 11;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error(
        "gain value {value} violates the assumptions of {metric}: \
         the {bound} allowable gain is {limit}"
    )]
    GainOutOfRange {
        metric: String,
        bound: &'static str,
        limit: f64,
        value: f64,
    },
    #[error("{metric}: expected items is undefined (weight of the first rank is {weight})")]
    UndefinedExpectedItems { metric: String, weight: f64 },
}

/// The five C/W/L expectations for one ranking under one bound.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Expectations {
    /// Expected utility per item examined (EU).
    pub expected_utility: f64,
    /// Expected total utility accumulated before stopping (ETU).
    pub expected_total_utility: f64,
    /// Expected cost per item examined (EC).
    pub expected_cost: f64,
    /// Expected total cost incurred before stopping (ETC).
    pub expected_total_cost: f64,
    /// Expected number of items examined (ED).
    pub expected_items: f64,
}

impl Expectations {
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.expected_utility,
            self.expected_total_utility,
            self.expected_cost,
            self.expected_total_cost,
            self.expected_items,
        ]
    }
}

impl Sub for Expectations {
    type Output = Expectations;

    fn sub(self, rhs: Self) -> Self::Output {
        Expectations {
            expected_utility: self.expected_utility - rhs.expected_utility,
            expected_total_utility: self.expected_total_utility - rhs.expected_total_utility,
            expected_cost: self.expected_cost - rhs.expected_cost,
            expected_total_cost: self.expected_total_cost - rhs.expected_total_cost,
            expected_items: self.expected_items - rhs.expected_items,
        }
    }
}

/// Result of measuring one ranking with one metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub topic_id: String,
    pub metric: String,
    /// Worst-case (lower bound) expectations.
    pub scores: Expectations,
    /// Best case minus worst case; present only when residuals were requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residuals: Option<Expectations>,
}

/// A C/W/L user model.
pub trait Metric: Send + Sync {
    /// Display name used in reports, including parameters (e.g. `P@10`).
    fn name(&self) -> String;

    /// BibTeX entry for the metric; empty when there is none.
    fn citation(&self) -> &'static str {
        ""
    }

    /// Probability of continuing from each rank to the next; `ranking.depth()` long.
    fn continuation_vector(&self, ranking: &Ranking, bound: Bound)
        -> Result<Vec<f64>, MetricError>;

    fn likelihood_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cvec = self.continuation_vector(ranking, bound)?;
        trace_vector(ranking, || self.name(), "cvec", &cvec);
        let lvec = likelihoods_from_continuation(&cvec);
        trace_vector(ranking, || self.name(), "lvec", &lvec);
        Ok(lvec)
    }

    fn weight_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cvec = self.continuation_vector(ranking, bound)?;
        let wvec = weights_from_continuation(&cvec);
        trace_vector(ranking, || self.name(), "wvec", &wvec);
        Ok(wvec)
    }

    /// Score the ranking under a single bound.
    fn expectations(&self, ranking: &Ranking, bound: Bound) -> Result<Expectations, MetricError> {
        let wvec = self.weight_vector(ranking, bound)?;
        let lvec = self.likelihood_vector(ranking, bound)?;
        let gains = ranking.gain_vector(bound);
        let costs = ranking.cost_vector(bound);

        let first_weight = wvec.first().copied().unwrap_or(0.0);
        if !(first_weight > 0.0 && first_weight.is_finite()) {
            return Err(MetricError::UndefinedExpectedItems {
                metric: self.name(),
                weight: first_weight,
            });
        }

        Ok(Expectations {
            expected_utility: dot(&wvec, &gains),
            expected_total_utility: dot(&lvec, &cumsum(&gains)),
            expected_cost: dot(&wvec, &costs),
            expected_total_cost: dot(&lvec, &cumsum(&costs)),
            expected_items: 1.0 / first_weight,
        })
    }

    /// Worst-case scores, plus best-minus-worst residuals when `residuals` is set.
    fn measure(&self, ranking: &Ranking, residuals: bool) -> Result<Measurement, MetricError> {
        let scores = self.expectations(ranking, Bound::Worst)?;
        let residuals = if residuals {
            Some(self.expectations(ranking, Bound::Best)? - scores)
        } else {
            None
        };
        Ok(Measurement {
            topic_id: ranking.topic_id().to_string(),
            metric: self.name(),
            scores,
            residuals,
        })
    }
}

impl std::fmt::Debug for dyn Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Metric({})", self.name())
    }
}

/// `l[i] = (c[0] * ... * c[i-1]) * (1 - c[i])`.
pub fn likelihoods_from_continuation(cvec: &[f64]) -> Vec<f64> {
    let mut reach = 1.0;
    cvec.iter()
        .map(|&c| {
            let l = reach * (1.0 - c);
            reach *= c;
            l
        })
        .collect()
}

/// Normalised visit probabilities: `w[i] = P[i] / sum(P)`.
pub fn weights_from_continuation(cvec: &[f64]) -> Vec<f64> {
    if cvec.is_empty() {
        return Vec::new();
    }
    let mut reach = Vec::with_capacity(cvec.len());
    let mut p = 1.0;
    reach.push(p);
    for &c in &cvec[..cvec.len() - 1] {
        p *= c;
        reach.push(p);
    }
    let w1 = 1.0 / reach.iter().sum::<f64>();
    reach.into_iter().map(|p| p * w1).collect()
}

/// Inverse of the weight derivation: `c[i] = w[i+1] / w[i]`, 0 where `w[i]` is
/// not positive, and 0 at the last rank.
pub fn continuation_from_weights(wvec: &[f64]) -> Vec<f64> {
    let mut cvec: Vec<f64> = wvec
        .windows(2)
        .map(|pair| if pair[0] > 0.0 { pair[1] / pair[0] } else { 0.0 })
        .collect();
    if !wvec.is_empty() {
        cvec.push(0.0);
    }
    cvec
}

/// Check every gain lies in `[min_gain, max_gain]` for metrics that assume it.
pub fn validate_gain_range(
    metric: &str,
    min_gain: f64,
    max_gain: f64,
    gains: &[f64],
) -> Result<(), MetricError> {
    let lowest = gains.iter().copied().fold(f64::INFINITY, f64::min);
    if lowest < min_gain {
        return Err(MetricError::GainOutOfRange {
            metric: metric.to_string(),
            bound: "minimum",
            limit: min_gain,
            value: lowest,
        });
    }
    let highest = gains.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if highest > max_gain {
        return Err(MetricError::GainOutOfRange {
            metric: metric.to_string(),
            bound: "maximum",
            limit: max_gain,
            value: highest,
        });
    }
    Ok(())
}

pub(crate) fn cumsum(values: &[f64]) -> Vec<f64> {
    let mut acc = 0.0;
    values
        .iter()
        .map(|v| {
            acc += v;
            acc
        })
        .collect()
}

/// `[1, 1, ..., 1, 0, ..., 0]` with `ones` leading ones, `depth` long.
pub(crate) fn cutoff_vector(ones: usize, depth: usize) -> Vec<f64> {
    (0..depth).map(|i| if i < ones { 1.0 } else { 0.0 }).collect()
}

/// Render a parameter the way metric names show it (`1.0`, `0.25`, `224.0`).
pub(crate) fn fmt_param(value: f64) -> String {
    format!("{value:?}")
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn trace_vector(
    ranking: &Ranking,
    metric: impl FnOnce() -> String,
    label: &str,
    values: &[f64],
) {
    if !tracing::enabled!(Level::TRACE) {
        return;
    }
    let metric = metric();
    trace!(
        topic = ranking.topic_id(),
        metric = metric.as_str(),
        "{label} {:?}",
        &values[..values.len().min(TRACE_PREFIX)]
    );
}
