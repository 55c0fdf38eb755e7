//! Judged rankings with bound-aware access.
//!
//! A [`Ranking`] stores the gains and costs of one topic's retrieved items in
//! rank order. Unjudged entries are kept as `None` and only resolved when a
//! vector is read: under [`Bound::Worst`] they take the least favourable value
//! (minimum gain, maximum cost), under [`Bound::Best`] the most favourable one.
//! Every read is padded or truncated to the configured depth, so metrics always
//! see exactly `depth` positions.

use serde::{Deserialize, Serialize};

use crate::judgments::{CostSource, GainSource};

/// Resolution policy for unjudged or missing items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bound {
    /// Lower bound: unknown gains are `min_gain`, unknown costs `max_cost`.
    Worst,
    /// Upper bound: unknown gains are `max_gain`, unknown costs `min_cost`.
    Best,
}

/// Gain/cost limits and the evaluation depth shared by every ranking in a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingBounds {
    pub min_gain: f64,
    pub max_gain: f64,
    pub min_cost: f64,
    pub max_cost: f64,
    /// Every ranking is evaluated as if it had exactly this many items.
    pub depth: usize,
}

impl Default for RankingBounds {
    fn default() -> Self {
        Self {
            min_gain: 0.0,
            max_gain: 1.0,
            min_cost: 1.0,
            max_cost: 1.0,
            depth: 1000,
        }
    }
}

impl RankingBounds {
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("min_gain", self.min_gain),
            ("max_gain", self.max_gain),
            ("min_cost", self.min_cost),
            ("max_cost", self.max_cost),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        if self.min_gain > self.max_gain {
            return Err(format!(
                "min_gain ({}) must not exceed max_gain ({})",
                self.min_gain, self.max_gain
            ));
        }
        if self.min_cost <= 0.0 {
            return Err(format!(
                "min_cost must be > 0, got {}; every examined item costs something",
                self.min_cost
            ));
        }
        if self.min_cost > self.max_cost {
            return Err(format!(
                "min_cost ({}) must not exceed max_cost ({})",
                self.min_cost, self.max_cost
            ));
        }
        if self.depth == 0 {
            return Err("depth must be >= 1".to_string());
        }
        Ok(())
    }

    fn unknown_gain(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Worst => self.min_gain,
            Bound::Best => self.max_gain,
        }
    }

    fn unknown_cost(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Worst => self.max_cost,
            Bound::Best => self.min_cost,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ranking {
    topic_id: String,
    gains: Vec<Option<f64>>,
    costs: Vec<Option<f64>>,
    bounds: RankingBounds,
    total_qrel_gain: f64,
    total_qrel_rels: f64,
}

impl Ranking {
    /// Build a ranking from raw gains and costs.
    ///
    /// The judgment totals start as the sum (and count) of the positive known
    /// gains in `gains`; use [`Ranking::with_qrel_totals`] to replace them with
    /// totals over every judged document of the topic.
    pub fn new(
        topic_id: impl Into<String>,
        gains: Vec<Option<f64>>,
        costs: Vec<Option<f64>>,
        bounds: RankingBounds,
    ) -> Self {
        let mut total_qrel_gain = 0.0;
        let mut total_qrel_rels = 0.0;
        for gain in gains.iter().flatten() {
            if *gain > 0.0 {
                total_qrel_gain += gain;
                total_qrel_rels += 1.0;
            }
        }
        Self {
            topic_id: topic_id.into(),
            gains,
            costs,
            bounds,
            total_qrel_gain,
            total_qrel_rels,
        }
    }

    /// Convenience for fully judged rankings.
    pub fn judged(
        topic_id: impl Into<String>,
        gains: &[f64],
        costs: &[f64],
        bounds: RankingBounds,
    ) -> Self {
        Self::new(
            topic_id,
            gains.iter().copied().map(Some).collect(),
            costs.iter().copied().map(Some).collect(),
            bounds,
        )
    }

    pub fn with_qrel_totals(mut self, total_gain: f64, total_rels: f64) -> Self {
        self.total_qrel_gain = total_gain;
        self.total_qrel_rels = total_rels;
        self
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn depth(&self) -> usize {
        self.bounds.depth
    }

    pub fn bounds(&self) -> &RankingBounds {
        &self.bounds
    }

    /// Number of items actually retrieved (before padding or truncation).
    pub fn retrieved(&self) -> usize {
        self.gains.len()
    }

    pub fn gain_vector(&self, bound: Bound) -> Vec<f64> {
        resolve(&self.gains, self.bounds.depth, self.bounds.unknown_gain(bound))
    }

    pub fn cost_vector(&self, bound: Bound) -> Vec<f64> {
        resolve(&self.costs, self.bounds.depth, self.bounds.unknown_cost(bound))
    }

    pub fn total_gain(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Worst => self.total_qrel_gain,
            Bound::Best => {
                let visible: f64 = self.gain_vector(bound).iter().sum();
                visible.max(self.total_qrel_gain)
            }
        }
    }

    pub fn total_rels(&self, bound: Bound) -> f64 {
        match bound {
            Bound::Worst => self.total_qrel_rels,
            Bound::Best => {
                let visible = self
                    .gain_vector(bound)
                    .iter()
                    .filter(|&&g| g > 0.0)
                    .count() as f64;
                visible.max(self.total_qrel_rels)
            }
        }
    }

    pub fn total_cost(&self, bound: Bound) -> f64 {
        self.cost_vector(bound).iter().sum()
    }
}

fn resolve(values: &[Option<f64>], depth: usize, fill: f64) -> Vec<f64> {
    let mut out: Vec<f64> = values
        .iter()
        .take(depth)
        .map(|v| v.unwrap_or(fill))
        .collect();
    out.resize(depth, fill);
    out
}

/// Accumulates one topic's retrieved items, then produces a [`Ranking`].
pub struct RankingBuilder<'a> {
    topic_id: String,
    gain_source: &'a dyn GainSource,
    cost_source: Option<&'a dyn CostSource>,
    bounds: RankingBounds,
    gains: Vec<Option<f64>>,
    costs: Vec<Option<f64>>,
}

impl<'a> RankingBuilder<'a> {
    pub fn new(
        topic_id: impl Into<String>,
        gain_source: &'a dyn GainSource,
        cost_source: Option<&'a dyn CostSource>,
        bounds: RankingBounds,
    ) -> Self {
        Self {
            topic_id: topic_id.into(),
            gain_source,
            cost_source,
            bounds,
            gains: Vec::new(),
            costs: Vec::new(),
        }
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn len(&self) -> usize {
        self.gains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gains.is_empty()
    }

    /// Append the next retrieved item. Unjudged documents and unknown element
    /// types are recorded as `None` and resolved against the bounds at read time.
    pub fn add(&mut self, doc_id: &str, element_type: &str) {
        self.gains.push(self.gain_source.gain(&self.topic_id, doc_id));
        self.costs
            .push(self.cost_source.and_then(|costs| costs.cost(element_type)));
    }

    pub fn finish(self) -> Ranking {
        let total_gain = self.gain_source.total_gain(&self.topic_id);
        let total_rels = self.gain_source.total_rels(&self.topic_id);
        Ranking::new(self.topic_id, self.gains, self.costs, self.bounds)
            .with_qrel_totals(total_gain, total_rels)
    }
}
