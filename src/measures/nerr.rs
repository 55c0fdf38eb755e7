//! "Not but nearly ERR" metrics and the gain-dependent reciprocal-rank family.
//!
//! Each multiplies a base patience by `1 - g[i]`, so a highly relevant item
//! makes the user more likely to stop. The NERR forms assume gains in `[0, 1]`
//! and reject rankings outside that range. The GRR forms are the truncated
//! versions, with continuation forced to zero from rank `k` onwards.

use super::inst::insq_factor;
use super::{fmt_param, validate_gain_range, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Azzopardi:2021:ECE:3471158.3472239,
  author = {Azzopardi, Leif and Mackenzie, Joel and Moffat, Alistair},
  title = {{ERR} is not {C/W/L}: Exploring the Relationship Between Expected Reciprocal Rank and Other Metrics},
  booktitle = {Proceedings of the 2021 ACM SIGIR on International Conference on Theory of Information Retrieval},
  series = {ICTIR '21},
  url = {https://doi.org/10.1145/3471158.3472239}
}"#;

const MIN_GAIN: f64 = 0.0;
const MAX_GAIN: f64 = 1.0;

/// Continuation `patience(rank) * (1 - g)` over the first `limit` positions, 0 after.
fn gain_damped(gains: &[f64], limit: usize, patience: impl Fn(f64) -> f64) -> Vec<f64> {
    gains
        .iter()
        .enumerate()
        .map(|(i, g)| {
            if i < limit {
                patience(i as f64 + 1.0) * (1.0 - g)
            } else {
                0.0
            }
        })
        .collect()
}

fn checked_gains(metric: &dyn Metric, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
    let gains = ranking.gain_vector(bound);
    validate_gain_range(&metric.name(), MIN_GAIN, MAX_GAIN, &gains)?;
    Ok(gains)
}

fn reciprocal_patience(rank: f64) -> f64 {
    rank / (rank + 1.0)
}

/// Truncated at `k` with a flat base patience.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NerrEq8 {
    pub k: usize,
}

impl NerrEq8 {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Metric for NerrEq8 {
    fn name(&self) -> String {
        format!("NERR-EQ8@k={}", self.k)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = checked_gains(self, ranking, bound)?;
        Ok(gain_damped(&gains, self.k.saturating_sub(1), |_| 1.0))
    }
}

/// Truncated at `k` with reciprocal-rank style patience `rank / (rank + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NerrEq9 {
    pub k: usize,
}

impl NerrEq9 {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Metric for NerrEq9 {
    fn name(&self) -> String {
        format!("NERR-EQ9@k={}", self.k)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = checked_gains(self, ranking, bound)?;
        Ok(gain_damped(&gains, self.k.saturating_sub(1), reciprocal_patience))
    }
}

/// Full depth, RBP-like patience `phi`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NerrEq10 {
    pub phi: f64,
}

impl NerrEq10 {
    pub fn new(phi: f64) -> Self {
        Self { phi }
    }
}

impl Default for NerrEq10 {
    fn default() -> Self {
        Self::new(0.9)
    }
}

impl Metric for NerrEq10 {
    fn name(&self) -> String {
        format!("NERR-EQ10@phi={}", fmt_param(self.phi))
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = checked_gains(self, ranking, bound)?;
        Ok(gain_damped(&gains, gains.len(), |_| self.phi))
    }
}

/// Full depth, INSQ-like patience driven by `T`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NerrEq11 {
    pub target: f64,
}

impl NerrEq11 {
    pub fn new(target: f64) -> Self {
        Self { target }
    }
}

impl Default for NerrEq11 {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Metric for NerrEq11 {
    fn name(&self) -> String {
        format!("NERR-EQ11@T={}", fmt_param(self.target))
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = checked_gains(self, ranking, bound)?;
        Ok(gain_damped(&gains, gains.len(), |rank| {
            insq_factor(rank, self.target)
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrrW {
    pub k: usize,
}

impl GrrW {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Metric for GrrW {
    fn name(&self) -> String {
        format!("GRRW@{}", self.k)
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        Ok(gain_damped(&gains, self.k.saturating_sub(1), reciprocal_patience))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrrInsq {
    pub k: usize,
    pub target: f64,
}

impl GrrInsq {
    pub fn new(k: usize, target: f64) -> Self {
        Self { k, target }
    }
}

impl Metric for GrrInsq {
    fn name(&self) -> String {
        format!("GRRINSQ-T={}@{}", fmt_param(self.target), self.k)
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        Ok(gain_damped(&gains, self.k.saturating_sub(1), |rank| {
            insq_factor(rank, self.target)
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrrRbp {
    pub k: usize,
    pub phi: f64,
}

impl GrrRbp {
    pub fn new(k: usize, phi: f64) -> Self {
        Self { k, phi }
    }
}

impl Metric for GrrRbp {
    fn name(&self) -> String {
        format!("GRRRBP-phi={}@{}", fmt_param(self.phi), self.k)
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        Ok(gain_damped(&gains, self.k.saturating_sub(1), |_| self.phi))
    }
}
