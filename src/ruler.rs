//! An ordered set of metrics applied to every ranking.

use std::path::Path;
use std::sync::Arc;

use crate::measures::rbp::CWL_CITATION;
use crate::measures::{
    AveragePrecision, Inst, Measurement, Metric, MetricError, Ndcg, Precision,
    RankBiasedPrecision, ReciprocalRank,
};
use crate::ranking::Ranking;
use crate::registry::{MetricRegistry, RegistryError};

#[derive(Debug, Clone)]
pub struct Ruler {
    metrics: Vec<Arc<dyn Metric>>,
    residuals: bool,
}

impl Default for Ruler {
    fn default() -> Self {
        Self::default_set()
    }
}

impl Ruler {
    /// The baseline suite used when no metrics file is given.
    pub fn default_set() -> Self {
        let mut metrics: Vec<Arc<dyn Metric>> = Vec::new();
        for k in [1, 2, 3, 4, 5, 10] {
            metrics.push(Arc::new(Precision::new(k)));
        }
        for theta in [0.2, 0.4, 0.8] {
            metrics.push(Arc::new(RankBiasedPrecision::new(theta)));
        }
        metrics.push(Arc::new(Ndcg::new(5)));
        metrics.push(Arc::new(Ndcg::new(10)));
        metrics.push(Arc::new(ReciprocalRank));
        metrics.push(Arc::new(AveragePrecision));
        for target in [1.0, 2.0, 3.0] {
            metrics.push(Arc::new(Inst::new(target)));
        }
        Self::with_metrics(metrics)
    }

    pub fn with_metrics(metrics: Vec<Arc<dyn Metric>>) -> Self {
        Self {
            metrics,
            residuals: false,
        }
    }

    pub fn from_spec(text: &str, registry: &MetricRegistry) -> Result<Self, RegistryError> {
        Ok(Self::with_metrics(registry.build_all(text)?))
    }

    pub fn load(path: impl AsRef<Path>, registry: &MetricRegistry) -> Result<Self, RegistryError> {
        Ok(Self::with_metrics(registry.load_from_path(path)?))
    }

    pub fn with_residuals(mut self, residuals: bool) -> Self {
        self.residuals = residuals;
        self
    }

    pub fn residuals(&self) -> bool {
        self.residuals
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    pub fn metrics(&self) -> &[Arc<dyn Metric>] {
        &self.metrics
    }

    pub fn metric_names(&self) -> Vec<String> {
        self.metrics.iter().map(|m| m.name()).collect()
    }

    /// Measure `ranking` with every metric, in order. The first metric error
    /// aborts the topic.
    pub fn measure(&self, ranking: &Ranking) -> Result<Vec<Measurement>, MetricError> {
        self.metrics
            .iter()
            .map(|metric| metric.measure(ranking, self.residuals))
            .collect()
    }

    /// The tool's own citation followed by each distinct metric citation.
    pub fn citations(&self) -> Vec<&'static str> {
        let mut out = vec![CWL_CITATION];
        for metric in &self.metrics {
            let citation = metric.citation();
            if !citation.is_empty() && !out.contains(&citation) {
                out.push(citation);
            }
        }
        out
    }
}
