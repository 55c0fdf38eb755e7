#![forbid(unsafe_code)]

//! # cwl-eval
//!
//! Information retrieval evaluation under the C/W/L framework.
//!
//! Every metric here is a user model: a probability of continuing from each
//! rank to the next. From that one vector the engine derives where users stop
//! and how often each rank is seen, and reports five expectations per ranking:
//! utility per item (EU), total utility (ETU), cost per item (EC), total cost
//! (ETC) and the number of items examined (ED). Unjudged items are scored
//! twice, once pessimistically and once optimistically, and the gap is
//! reported as residuals.
//!
//! ```no_run
//! use cwl_eval::{MetricRegistry, Ranking, RankingBounds, Ruler};
//!
//! let ranking = Ranking::judged("401", &[1.0, 0.0, 1.0], &[], RankingBounds::default());
//! let ruler = Ruler::from_spec("RBP(0.8)\nINST(2.0)\n", &MetricRegistry::default())?;
//! for m in ruler.measure(&ranking)? {
//!     println!("{} {:.4}", m.metric, m.scores.expected_utility);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod evaluation;
pub mod judgments;
pub mod measures;
pub mod ranking;
pub mod registry;
pub mod report;
pub mod ruler;

pub use config::{load_config_from_path, ConfigError, EvalConfig};
pub use evaluation::{evaluate_run, run_evaluation, EvalError, EvalRequest, EvalSummary};
pub use judgments::{CostSource, CostTable, GainSource, JudgmentError, QrelJudgments};
pub use measures::{Expectations, Measurement, Metric, MetricError};
pub use ranking::{Bound, Ranking, RankingBounds, RankingBuilder};
pub use registry::{parse_metric_spec, MetricRegistry, Param, RegistryError};
pub use report::{write_bibtex, ReportError, ReportFormat, ReportWriter};
pub use ruler::Ruler;
