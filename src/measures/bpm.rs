//! Bejeweled Player Model.
//!
//! The user keeps going while the accumulated gain is below the benefit target
//! `T` and the accumulated cost is below the budget `K`. Gains are expected on
//! a `[0, 1]` scale; `K` is in the units of the cost vector, so with unit costs
//! it is a document count.
//!
//! The dynamic variant moves both limits after every examined item by
//! `h * (g[i] - gain_med)`: better-than-median items raise the targets, worse
//! ones lower them. The budget adjustment follows the published model: the
//! `cwl_eval` Python tool updates `T` a second time in its budget loop and
//! leaves `K` fixed, so its dynamic scores differ from the ones computed here.

use super::{cumsum, fmt_param, Metric, MetricError};
use crate::ranking::{Bound, Ranking};

const CITATION: &str = r#"@inproceedings{Zhang:2017:EWS:3077136.3080841,
  author = {Zhang, Fan and Liu, Yiqun and Li, Xin and Zhang, Min and Xu, Yinghui and Ma, Shaoping},
  title = {Evaluating Web Search with a Bejeweled Player Model},
  booktitle = {Proceedings of the 40th International ACM SIGIR Conference on Research and Development in Information Retrieval},
  series = {SIGIR '17},
  year = {2017},
  pages = {425--434},
  url = {http://doi.acm.org/10.1145/3077136.3080841}
}"#;

/// Leading run of ones while `below(i)` holds; zero from the first failure on.
fn leading_run(len: usize, mut below: impl FnMut(usize) -> bool) -> Vec<bool> {
    let mut out = vec![false; len];
    for (i, slot) in out.iter_mut().enumerate() {
        if !below(i) {
            break;
        }
        *slot = true;
    }
    out
}

fn combine(benefit: &[bool], budget: &[bool]) -> Vec<f64> {
    benefit
        .iter()
        .zip(budget)
        .map(|(&b, &c)| if b && c { 1.0 } else { 0.0 })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BejeweledStatic {
    /// Total benefit desired.
    pub target: f64,
    /// Total cost the user is willing to spend.
    pub budget: f64,
}

impl BejeweledStatic {
    pub fn new(target: f64, budget: f64) -> Self {
        Self { target, budget }
    }
}

impl Default for BejeweledStatic {
    fn default() -> Self {
        Self::new(1.0, 10.0)
    }
}

impl Metric for BejeweledStatic {
    fn name(&self) -> String {
        format!("BPM-Static-T={}-K={}", fmt_param(self.target), self.budget)
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let cum_gains = cumsum(&ranking.gain_vector(bound));
        let cum_costs = cumsum(&ranking.cost_vector(bound));
        let benefit = leading_run(cum_gains.len(), |i| cum_gains[i] < self.target);
        let budget = leading_run(cum_costs.len(), |i| cum_costs[i] < self.budget);
        Ok(combine(&benefit, &budget))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BejeweledDynamic {
    pub target: f64,
    pub budget: f64,
    /// Scale of the benefit-target adjustment.
    pub hb: f64,
    /// Scale of the budget adjustment.
    pub hc: f64,
    pub gain_med: f64,
}

impl BejeweledDynamic {
    pub fn new(target: f64, budget: f64, hb: f64, hc: f64, gain_med: f64) -> Self {
        Self {
            target,
            budget,
            hb,
            hc,
            gain_med,
        }
    }
}

impl Default for BejeweledDynamic {
    fn default() -> Self {
        Self::new(1.0, 10.0, 1.0, 1.0, 0.5)
    }
}

impl Metric for BejeweledDynamic {
    fn name(&self) -> String {
        format!(
            "BPM-Dynamic-T={}-K={}-hb={}-hc={}",
            fmt_param(self.target),
            self.budget,
            fmt_param(self.hb),
            fmt_param(self.hc)
        )
    }

    fn citation(&self) -> &'static str {
        CITATION
    }

    fn continuation_vector(&self, ranking: &Ranking, bound: Bound) -> Result<Vec<f64>, MetricError> {
        let gains = ranking.gain_vector(bound);
        let cum_gains = cumsum(&gains);
        let cum_costs = cumsum(&ranking.cost_vector(bound));

        let mut target = self.target;
        let benefit = leading_run(gains.len(), |i| {
            let below = cum_gains[i] < target;
            target += self.hb * (gains[i] - self.gain_med);
            below
        });

        let mut budget = self.budget;
        let spend = leading_run(gains.len(), |i| {
            let below = cum_costs[i] < budget;
            budget += self.hc * (gains[i] - self.gain_med);
            below
        });

        Ok(combine(&benefit, &spend))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranking::RankingBounds;

    fn ranking(gains: &[f64], depth: usize) -> Ranking {
        let bounds = RankingBounds {
            depth,
            ..RankingBounds::default()
        };
        Ranking::judged("T1", gains, &[], bounds)
    }

    #[test]
    fn static_stops_at_target_gain() {
        let r = ranking(&[0.0, 1.0, 0.0, 0.0], 4);
        let c = BejeweledStatic::new(1.0, 10.0)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        assert_eq!(c, vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn static_stops_at_budget() {
        let r = ranking(&[0.0; 6], 6);
        let c = BejeweledStatic::new(1.0, 3.0)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        assert_eq!(c, vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let m = BejeweledStatic::new(1.0, 3.0).measure(&r, false).unwrap();
        assert!((m.scores.expected_items - 3.0).abs() < 1e-12);
    }

    #[test]
    fn dynamic_budget_shrinks_on_poor_items() {
        // Every item is below the median gain, so K drops by 0.5 per step:
        // cumcost 1 < 2.25, then 2 < 1.75 fails.
        let r = ranking(&[0.0; 5], 5);
        let stat = BejeweledStatic::new(5.0, 2.25)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        let dynamic = BejeweledDynamic::new(5.0, 2.25, 0.0, 1.0, 0.5)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        assert_eq!(stat, vec![1.0, 1.0, 0.0, 0.0, 0.0]);
        assert_eq!(dynamic, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn dynamic_budget_grows_on_good_items() {
        let r = ranking(&[1.0; 5], 5);
        let stat = BejeweledStatic::new(10.0, 2.0)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        let dynamic = BejeweledDynamic::new(10.0, 2.0, 0.0, 1.0, 0.5)
            .continuation_vector(&r, Bound::Worst)
            .unwrap();
        assert_eq!(stat, vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        // K: 2 -> 2.5 -> 3 against cumcost 1, 2, 3.
        assert_eq!(dynamic, vec![1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn names() {
        assert_eq!(BejeweledStatic::default().name(), "BPM-Static-T=1.0-K=10");
        assert_eq!(
            BejeweledDynamic::default().name(),
            "BPM-Dynamic-T=1.0-K=10-hb=1.0-hc=1.0"
        );
    }
}
