use std::fs;
use std::path::Path;

use cwl_eval::{
    run_evaluation, EvalConfig, EvalError, EvalRequest, JudgmentError, MetricRegistry,
    RankingBounds, RegistryError, ReportFormat,
};
use tempfile::tempdir;

const QRELS: &str = "\
401 0 D1 1
401 0 D2 0
401 0 D3 1
402 0 D7 0.5
402 0 D8 1
";

const RUN: &str = "\
401 web D1 1 9.5 bm25
401 web D2 2 8.1 bm25
401 image D4 3 7.7 bm25
402 web D8 1 4.2 bm25
402 web D9 2 3.9 bm25
";

fn write(dir: &Path, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

fn request(dir: &Path) -> EvalRequest {
    EvalRequest {
        gain_file: write(dir, "qrels", QRELS),
        result_file: write(dir, "run", RUN),
        ..EvalRequest::default()
    }
}

fn run_to_string(request: &EvalRequest) -> Result<String, EvalError> {
    let mut out = Vec::new();
    run_evaluation(request, &MetricRegistry::default(), &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

#[test]
fn default_metrics_over_two_topics() {
    let dir = tempdir().unwrap();
    let req = request(dir.path());
    let mut out = Vec::new();
    let summary = run_evaluation(&req, &MetricRegistry::default(), &mut out).unwrap();
    assert_eq!(summary.topics, 2);
    assert_eq!(summary.rows, 32);

    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 32);
    assert_eq!(lines[0], "401\tP@1\t1.0000\t1.0000\t1.0000\t1.0000\t1.0000");
    assert!(lines[16].starts_with("402\tP@1\t1.0000"));
    assert!(lines.iter().all(|l| l.split('\t').count() == 7));
}

#[test]
fn metrics_file_costs_and_residuals() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.metrics_file = Some(write(
        dir.path(),
        "metrics",
        "# cheap baselines\nPrecisionCWLMetric(2)\nRBP(0.5)\n",
    ));
    req.cost_file = Some(write(dir.path(), "costs", "web 1.0\nimage 3.0\n"));
    req.config = EvalConfig {
        bounds: RankingBounds {
            max_cost: 3.0,
            depth: 10,
            ..RankingBounds::default()
        },
        residuals: true,
        colnames: true,
        format: ReportFormat::Tsv,
    };

    let text = run_to_string(&req).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Topic\tMetric\tEU"));
    assert!(lines[0].ends_with("ResED"));

    let p2: Vec<&str> = lines[1].split('\t').collect();
    assert_eq!(p2.len(), 12);
    assert_eq!(&p2[..2], ["401", "P@2"]);
    assert_eq!(p2[2], "0.5000");
    // D1 and D2 are judged, so the top two have nothing left to resolve.
    assert_eq!(p2[7], "0.0000");

    // 402: D8 relevant, D9 unjudged; P@2 residual EU is 0.5.
    let p2_402: Vec<&str> = lines[3].split('\t').collect();
    assert_eq!(p2_402[7], "0.5000");
}

#[test]
fn jsonl_rows_deserialize() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.metrics_file = Some(write(dir.path(), "metrics", "RBP(0.5)\n"));
    req.config.format = ReportFormat::Jsonl;

    let text = run_to_string(&req).unwrap();
    let rows: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["topic_id"], "401");
    assert_eq!(rows[0]["metric"], "RBP@0.5");
    let eu = rows[0]["scores"]["expected_utility"].as_f64().unwrap();
    // 0.5 * 1 (D1) + 0 (D2) + 0 (D4 unjudged, worst case)
    assert!(approx_eq(eu, 0.5, 1e-9));
    assert!(rows[0].get("residuals").is_none());
}

#[test]
fn bibtex_lists_tool_then_metrics() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.metrics_file = Some(write(dir.path(), "metrics", "RBP(0.5)\nRBP(0.9)\nINST\n"));
    let bib = dir.path().join("refs.bib");
    req.bib_file = Some(bib.clone());

    run_to_string(&req).unwrap();
    let text = fs::read_to_string(&bib).unwrap();
    assert!(text.starts_with("@inproceedings{azzopardi2019cwl"));
    assert_eq!(text.matches("Rank-biased Precision").count(), 1);
    assert!(text.contains("INST: An Adaptive Metric"));
}

#[test]
fn gains_above_max_are_rejected_before_scoring() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.gain_file = write(dir.path(), "graded", "401 0 D1 3\n");
    let err = run_to_string(&req).unwrap_err();
    assert!(
        matches!(err, EvalError::Judgment(JudgmentError::GainOutOfRange { .. })),
        "{err}"
    );
    assert!(err.to_string().contains("maximum gain"));
}

#[test]
fn unknown_metric_is_a_configuration_error() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.metrics_file = Some(write(dir.path(), "metrics", "Precision(5)\nERR(3)\n"));
    let err = run_to_string(&req).unwrap_err();
    assert!(matches!(
        err,
        EvalError::Registry(RegistryError::UnknownMetric { .. })
    ));
}

#[test]
fn malformed_run_rows_are_fatal() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.result_file = write(dir.path(), "run", "401 web D1 1 9.5 bm25\n401 D2 2 8.1\n");
    let err = run_to_string(&req).unwrap_err();
    assert!(matches!(err, EvalError::MalformedRow { line: 2, .. }), "{err}");
}

#[test]
fn metric_domain_errors_name_the_topic() {
    let dir = tempdir().unwrap();
    let mut req = request(dir.path());
    req.gain_file = write(dir.path(), "graded", "401 0 D1 2\n");
    req.metrics_file = Some(write(dir.path(), "metrics", "INST\n"));
    req.config.bounds.max_gain = 2.0;
    let err = run_to_string(&req).unwrap_err();
    match err {
        EvalError::Metric { topic, .. } => assert_eq!(topic, "401"),
        other => panic!("unexpected error: {other}"),
    }
}
