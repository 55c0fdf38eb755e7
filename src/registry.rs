//! Metric registry and metrics-file loader.
//!
//! Metrics are looked up by identifier (`Precision`, `RBP`, `INST`, ...) and
//! built from positional parameters. Identifiers also resolve with a trailing
//! `CWLMetric`, so `PrecisionCWLMetric(5)` and `Precision(5)` name the same
//! metric.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::measures::{
    AveragePrecision, BejeweledDynamic, BejeweledStatic, GrrInsq, GrrRbp, GrrW, IftGoal,
    IftGoalRate, IftRate, Insq, Inst, Metric, Ndcg, NerrEq10, NerrEq11, NerrEq8, NerrEq9,
    NetPresentValue, Precision, RankBiasedPrecision, ReciprocalRank, SearchEconomic,
    TimeBiasedGain, TruncatedAveragePrecision, UMeasure,
};

/// Accepted (and ignored) suffix on metric identifiers.
pub const LEGACY_SUFFIX: &str = "CWLMetric";

static SPEC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z][A-Za-z0-9_]*)\s*(?:\((.*)\))?$").expect("invalid metric spec regex")
});

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("metrics spec line {line}: cannot parse `{text}`")]
    Syntax { line: usize, text: String },
    #[error("unknown metric `{name}`; available: {}", available.join(", "))]
    UnknownMetric {
        name: String,
        available: Vec<String>,
    },
    #[error("invalid parameters for {metric}: {message}")]
    InvalidParameter { metric: String, message: String },
}

/// A positional metric parameter as written in a metrics file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param {
    Int(i64),
    Float(f64),
}

impl Param {
    /// `1.5` is a float, `3` an int.
    pub fn parse(token: &str) -> Option<Self> {
        if token.contains('.') {
            token.parse().ok().map(Param::Float)
        } else {
            token.parse().ok().map(Param::Int)
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Param::Int(v) => v as f64,
            Param::Float(v) => v,
        }
    }
}

/// One parsed line of a metrics file.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub line: usize,
    pub name: String,
    pub params: Vec<Param>,
}

/// Parse metrics-file text: one `Name(p1, p2, ...)` per line, `#` starts a
/// comment, blank lines are skipped.
pub fn parse_metric_spec(text: &str) -> Result<Vec<MetricSpec>, RegistryError> {
    let mut specs = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }
        let syntax = || RegistryError::Syntax {
            line: idx + 1,
            text: raw.to_string(),
        };
        let caps = SPEC_LINE.captures(line).ok_or_else(syntax)?;
        let mut params = Vec::new();
        if let Some(args) = caps.get(2) {
            for token in args.as_str().split(',').map(str::trim) {
                if token.is_empty() {
                    continue;
                }
                params.push(Param::parse(token).ok_or_else(syntax)?);
            }
        }
        specs.push(MetricSpec {
            line: idx + 1,
            name: caps[1].to_string(),
            params,
        });
    }
    Ok(specs)
}

/// Positional parameter reader handed to metric constructors.
pub struct MetricArgs<'a> {
    metric: &'a str,
    params: &'a [Param],
    next: usize,
}

impl<'a> MetricArgs<'a> {
    pub fn new(metric: &'a str, params: &'a [Param]) -> Self {
        Self {
            metric,
            params,
            next: 0,
        }
    }

    fn invalid(&self, message: impl Into<String>) -> RegistryError {
        RegistryError::InvalidParameter {
            metric: self.metric.to_string(),
            message: message.into(),
        }
    }

    fn take(&mut self) -> Option<Param> {
        let param = self.params.get(self.next).copied();
        if param.is_some() {
            self.next += 1;
        }
        param
    }

    /// Next parameter as a real number; `default` applies when it is absent.
    pub fn float(&mut self, name: &str, default: Option<f64>) -> Result<f64, RegistryError> {
        let value = match (self.take(), default) {
            (Some(param), _) => param.as_f64(),
            (None, Some(value)) => value,
            (None, None) => return Err(self.invalid(format!("missing required parameter {name}"))),
        };
        if !value.is_finite() {
            return Err(self.invalid(format!("{name} must be finite")));
        }
        Ok(value)
    }

    /// Next parameter as a rank cut-off (`>= 1`).
    pub fn cutoff(&mut self, name: &str, default: Option<usize>) -> Result<usize, RegistryError> {
        match (self.take(), default) {
            (Some(Param::Int(v)), _) if v >= 1 => usize::try_from(v)
                .map_err(|_| self.invalid(format!("{name} is out of range"))),
            (Some(Param::Int(v)), _) => Err(self.invalid(format!("{name} must be >= 1, got {v}"))),
            (Some(Param::Float(v)), _) => {
                Err(self.invalid(format!("{name} must be an integer, got {v}")))
            }
            (None, Some(value)) => Ok(value),
            (None, None) => Err(self.invalid(format!("missing required parameter {name}"))),
        }
    }

    pub fn probability(&mut self, name: &str, default: Option<f64>) -> Result<f64, RegistryError> {
        let value = self.float(name, default)?;
        if !(0.0..=1.0).contains(&value) {
            return Err(self.invalid(format!("{name} must be in [0,1], got {value}")));
        }
        Ok(value)
    }

    pub fn positive(&mut self, name: &str, default: Option<f64>) -> Result<f64, RegistryError> {
        let value = self.float(name, default)?;
        if value <= 0.0 {
            return Err(self.invalid(format!("{name} must be > 0, got {value}")));
        }
        Ok(value)
    }

    /// Reject parameters nobody consumed.
    pub fn finish(self) -> Result<(), RegistryError> {
        let extra = self.params.len() - self.next;
        if extra > 0 {
            return Err(self.invalid(format!(
                "expected at most {} parameters, got {}",
                self.next,
                self.params.len()
            )));
        }
        Ok(())
    }
}

pub type MetricConstructor =
    Arc<dyn Fn(&mut MetricArgs<'_>) -> Result<Arc<dyn Metric>, RegistryError> + Send + Sync>;

fn ctor<F>(f: F) -> MetricConstructor
where
    F: Fn(&mut MetricArgs<'_>) -> Result<Arc<dyn Metric>, RegistryError> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub struct MetricRegistry {
    constructors: HashMap<String, MetricConstructor>,
}

impl Default for MetricRegistry {
    fn default() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register_builtins();
        registry
    }
}

impl MetricRegistry {
    /// A registry with no metrics at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    pub fn list(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.constructors.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(canonical(name))
    }

    pub fn register(&mut self, name: impl Into<String>, constructor: MetricConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn build(&self, name: &str, params: &[Param]) -> Result<Arc<dyn Metric>, RegistryError> {
        let constructor =
            self.constructors
                .get(canonical(name))
                .ok_or_else(|| RegistryError::UnknownMetric {
                    name: name.to_string(),
                    available: self.list(),
                })?;
        let mut args = MetricArgs::new(name, params);
        let metric = constructor(&mut args)?;
        args.finish()?;
        Ok(metric)
    }

    pub fn build_spec(&self, spec: &MetricSpec) -> Result<Arc<dyn Metric>, RegistryError> {
        self.build(&spec.name, &spec.params)
    }

    /// Parse metrics-file text and build every metric in order.
    pub fn build_all(&self, text: &str) -> Result<Vec<Arc<dyn Metric>>, RegistryError> {
        parse_metric_spec(text)?
            .iter()
            .map(|spec| self.build_spec(spec))
            .collect()
    }

    pub fn load_from_path(
        &self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<Arc<dyn Metric>>, RegistryError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        self.build_all(&text)
    }

    fn register_builtins(&mut self) {
        self.register(
            "Precision",
            ctor(|a| Ok(Arc::new(Precision::new(a.cutoff("k", Some(10))?)))),
        );
        self.register(
            "RBP",
            ctor(|a| Ok(Arc::new(RankBiasedPrecision::new(a.probability("theta", Some(0.9))?)))),
        );
        self.register(
            "NPV",
            ctor(|a| {
                let rate = a.float("rate", Some(0.1))?;
                if rate <= -1.0 {
                    return Err(a.invalid(format!("rate must be > -1, got {rate}")));
                }
                Ok(Arc::new(NetPresentValue::new(rate)))
            }),
        );
        self.register("NDCG", ctor(|a| Ok(Arc::new(Ndcg::new(a.cutoff("k", None)?)))));
        self.register(
            "SET",
            ctor(|a| {
                let beta = a.float("beta", Some(0.5))?;
                let k = a.cutoff("k", Some(10))?;
                Ok(Arc::new(SearchEconomic::new(beta, k)))
            }),
        );
        self.register("RR", ctor(|_| Ok(Arc::new(ReciprocalRank))));
        self.register("AP", ctor(|_| Ok(Arc::new(AveragePrecision))));
        self.register("TrAP", ctor(|_| Ok(Arc::new(TruncatedAveragePrecision))));
        self.register(
            "INST",
            ctor(|a| Ok(Arc::new(Inst::new(a.positive("T", Some(1.0))?)))),
        );
        self.register(
            "INSQ",
            ctor(|a| Ok(Arc::new(Insq::new(a.positive("T", Some(1.0))?)))),
        );
        self.register(
            "IFTGoal",
            ctor(|a| {
                let t = a.float("T", None)?;
                let b1 = a.float("b1", None)?;
                let r1 = a.float("R1", None)?;
                Ok(Arc::new(IftGoal::new(t, b1, r1)))
            }),
        );
        self.register(
            "IFTRate",
            ctor(|a| {
                let rate = a.float("A", None)?;
                let b2 = a.float("b2", None)?;
                let r2 = a.float("R2", None)?;
                Ok(Arc::new(IftRate::new(rate, b2, r2)))
            }),
        );
        self.register(
            "IFTGoalRate",
            ctor(|a| {
                let t = a.float("T", None)?;
                let b1 = a.float("b1", None)?;
                let r1 = a.float("R1", None)?;
                let rate = a.float("A", None)?;
                let b2 = a.float("b2", None)?;
                let r2 = a.float("R2", None)?;
                Ok(Arc::new(IftGoalRate::new(t, b1, r1, rate, b2, r2)))
            }),
        );
        self.register(
            "NERReq8",
            ctor(|a| Ok(Arc::new(NerrEq8::new(a.cutoff("k", None)?)))),
        );
        self.register(
            "NERReq9",
            ctor(|a| Ok(Arc::new(NerrEq9::new(a.cutoff("k", None)?)))),
        );
        self.register(
            "NERReq10",
            ctor(|a| Ok(Arc::new(NerrEq10::new(a.probability("phi", Some(0.9))?)))),
        );
        self.register(
            "NERReq11",
            ctor(|a| Ok(Arc::new(NerrEq11::new(a.positive("T", Some(1.0))?)))),
        );
        self.register("GRRW", ctor(|a| Ok(Arc::new(GrrW::new(a.cutoff("k", None)?)))));
        self.register(
            "GRRINSQ",
            ctor(|a| {
                let k = a.cutoff("k", None)?;
                Ok(Arc::new(GrrInsq::new(k, a.positive("T", Some(1.0))?)))
            }),
        );
        self.register(
            "GRRRBP",
            ctor(|a| {
                let k = a.cutoff("k", None)?;
                Ok(Arc::new(GrrRbp::new(k, a.probability("phi", Some(0.9))?)))
            }),
        );
        self.register(
            "BPM",
            ctor(|a| {
                let t = a.float("T", Some(1.0))?;
                let k = a.float("K", Some(10.0))?;
                Ok(Arc::new(BejeweledStatic::new(t, k)))
            }),
        );
        self.register(
            "BPMD",
            ctor(|a| {
                let t = a.float("T", Some(1.0))?;
                let k = a.float("K", Some(10.0))?;
                let hb = a.float("hb", Some(1.0))?;
                let hc = a.float("hc", Some(1.0))?;
                let gain_med = a.float("gain_med", Some(0.5))?;
                Ok(Arc::new(BejeweledDynamic::new(t, k, hb, hc, gain_med)))
            }),
        );
        self.register(
            "TBG",
            ctor(|a| Ok(Arc::new(TimeBiasedGain::new(a.positive("halflife", Some(224.0))?)))),
        );
        self.register(
            "UMeasure",
            ctor(|a| Ok(Arc::new(UMeasure::new(a.positive("L", Some(1000.0))?)))),
        );
    }
}

fn canonical(name: &str) -> &str {
    match name.strip_suffix(LEGACY_SUFFIX) {
        Some(stem) if !stem.is_empty() => stem,
        _ => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_parse_by_decimal_point() {
        assert_eq!(Param::parse("3"), Some(Param::Int(3)));
        assert_eq!(Param::parse("0.5"), Some(Param::Float(0.5)));
        assert_eq!(Param::parse("2."), Some(Param::Float(2.0)));
        assert_eq!(Param::parse("x"), None);
    }

    #[test]
    fn spec_lines_with_and_without_parens() {
        let text = "# baseline\nPrecisionCWLMetric(5)\n\nRR\nRBP(0.8, )  # trailing comma\nAP()\n";
        let specs = parse_metric_spec(text).unwrap();
        assert_eq!(specs.len(), 4);
        assert_eq!(specs[0].name, "PrecisionCWLMetric");
        assert_eq!(specs[0].params, vec![Param::Int(5)]);
        assert_eq!(specs[0].line, 2);
        assert_eq!(specs[1].name, "RR");
        assert!(specs[1].params.is_empty());
        assert_eq!(specs[2].params, vec![Param::Float(0.8)]);
        assert!(specs[3].params.is_empty());
    }

    #[test]
    fn spec_syntax_errors_report_line() {
        let err = parse_metric_spec("RR\nP@10\n").unwrap_err();
        assert!(matches!(err, RegistryError::Syntax { line: 2, .. }), "{err}");
        let err = parse_metric_spec("RBP(high)\n").unwrap_err();
        assert!(matches!(err, RegistryError::Syntax { line: 1, .. }));
    }

    #[test]
    fn builds_with_defaults_and_legacy_names() {
        let registry = MetricRegistry::default();
        assert_eq!(registry.build("Precision", &[]).unwrap().name(), "P@10");
        assert_eq!(
            registry.build("PrecisionCWLMetric", &[Param::Int(3)]).unwrap().name(),
            "P@3"
        );
        assert_eq!(
            registry.build("RBP", &[Param::Int(1)]).unwrap().name(),
            "RBP@1.0"
        );
        assert_eq!(registry.build("TBG", &[]).unwrap().name(), "TBG-H@224.0");
        assert!(registry.contains("UMeasureCWLMetric"));
        assert!(!registry.contains("CWLMetric"));
    }

    #[test]
    fn unknown_metric_lists_available() {
        let registry = MetricRegistry::default();
        let err = registry.build("Nope", &[]).unwrap_err();
        match &err {
            RegistryError::UnknownMetric { name, available } => {
                assert_eq!(name, "Nope");
                assert!(available.contains(&"INST".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Precision"));
    }

    #[test]
    fn parameters_are_validated() {
        let registry = MetricRegistry::default();
        let cases: &[(&str, Vec<Param>)] = &[
            ("Precision", vec![Param::Int(0)]),
            ("Precision", vec![Param::Float(2.5)]),
            ("RBP", vec![Param::Float(1.5)]),
            ("NDCG", vec![]),
            ("TBG", vec![Param::Int(0)]),
            ("UMeasure", vec![Param::Float(-1.0)]),
            ("NPV", vec![Param::Int(-1)]),
            ("RR", vec![Param::Int(1)]),
            ("IFTGoal", vec![Param::Float(1.0), Param::Float(0.9)]),
        ];
        for (name, params) in cases {
            let err = registry.build(name, params).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidParameter { .. }),
                "{name}: {err}"
            );
        }
    }

    #[test]
    fn custom_constructors_can_be_registered() {
        let mut registry = MetricRegistry::empty();
        assert!(registry.list().is_empty());
        registry.register("Shallow", ctor(|_| Ok(Arc::new(Precision::new(1)))));
        assert_eq!(registry.list(), vec!["Shallow".to_string()]);
        assert_eq!(registry.build("Shallow", &[]).unwrap().name(), "P@1");
    }

    #[test]
    fn build_all_keeps_file_order() {
        let registry = MetricRegistry::default();
        let metrics = registry
            .build_all("INST(2.0)\nNERReq8(5)\nBPMD(1.0, 20)\n")
            .unwrap();
        let names: Vec<String> = metrics.iter().map(|m| m.name()).collect();
        assert_eq!(
            names,
            vec!["INST-T=2.0", "NERR-EQ8@k=5", "BPM-Dynamic-T=1.0-K=20-hb=1.0-hc=1.0"]
        );
    }
}
