//! Information-foraging measures.
//!
//! The goal component stops users as accumulated gain `y` nears the target
//! `T`; the rate component stops them when the gain rate `y/k` (gain per unit
//! cost) falls below the expected rate `A`. `b1`/`b2` are intercepts and
//! `R1`/`R2` rationality: with `R = 0` the component collapses to a constant
//! (RBP-like), while large `R` gives a hard threshold.

use super::{cumsum, fmt_param, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Azzopardi:2018:MUS:3209978.3210027,
  author = {Azzopardi, Leif and Thomas, Paul and Craswell, Nick},
  title = {Measuring the Utility of Search Engine Result Pages: An Information Foraging Based Measure},
  booktitle = {The 41st International ACM SIGIR Conference on Research and Development in Information Retrieval},
  series = {SIGIR '18},
  year = {2018},
  pages = {605--614}
}"#;

#[derive(Debug, Clone, Copy, PartialEq)]
struct GoalTerm {
    target: f64,
    b1: f64,
    r1: f64,
}

impl GoalTerm {
    fn at(&self, gain_so_far: f64) -> f64 {
        1.0 - 1.0 / (1.0 + self.b1 * ((self.target - gain_so_far) * self.r1).exp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RateTerm {
    rate: f64,
    b2: f64,
    r2: f64,
}

impl RateTerm {
    fn at(&self, gain_so_far: f64, cost_so_far: f64) -> f64 {
        1.0 / (1.0 + self.b2 * ((self.rate - gain_so_far / cost_so_far) * self.r2).exp())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IftGoal {
    goal: GoalTerm,
}

impl IftGoal {
    pub fn new(target: f64, b1: f64, r1: f64) -> Self {
        Self {
            goal: GoalTerm { target, b1, r1 },
        }
    }
}

impl Metric for IftGoal {
    fn name(&self) -> String {
        format!(
            "IFT-C1-T={}-b1={}-R1={}",
            fmt_param(self.goal.target),
            fmt_param(self.goal.b1),
            fmt_param(self.goal.r1)
        )
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        Ok(cumsum(&ranking.gain_vector(bound))
            .into_iter()
            .map(|y| self.goal.at(y))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IftRate {
    rate: RateTerm,
}

impl IftRate {
    pub fn new(rate: f64, b2: f64, r2: f64) -> Self {
        Self {
            rate: RateTerm { rate, b2, r2 },
        }
    }
}

impl Metric for IftRate {
    fn name(&self) -> String {
        format!(
            "IFT-C2-A={}-b2={}-R2={}",
            fmt_param(self.rate.rate),
            fmt_param(self.rate.b2),
            fmt_param(self.rate.r2)
        )
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_gains = cumsum(&ranking.gain_vector(bound));
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        Ok(cum_gains
            .iter()
            .zip(&cum_costs)
            .map(|(&y, &k)| self.rate.at(y, k))
            .collect())
    }
}

/// Goal and rate combined; the best fitting variant in the original study.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IftGoalRate {
    goal: GoalTerm,
    rate: RateTerm,
}

impl IftGoalRate {
    pub fn new(target: f64, b1: f64, r1: f64, rate: f64, b2: f64, r2: f64) -> Self {
        Self {
            goal: GoalTerm { target, b1, r1 },
            rate: RateTerm { rate, b2, r2 },
        }
    }
}

impl Metric for IftGoalRate {
    fn name(&self) -> String {
        format!(
            "IFT-C1-C2-T={}-b1={}-R1={}-A={}-b2={}-R2={}",
            fmt_param(self.goal.target),
            fmt_param(self.goal.b1),
            fmt_param(self.goal.r1),
            fmt_param(self.rate.rate),
            fmt_param(self.rate.b2),
            fmt_param(self.rate.r2)
        )
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_gains = cumsum(&ranking.gain_vector(bound));
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        Ok(cum_gains
            .iter()
            .zip(&cum_costs)
            .map(|(&y, &k)| self.goal.at(y) * self.rate.at(y, k))
            .collect())
    }
}
