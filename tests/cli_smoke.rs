use std::fs;
use std::process::Command;

use tempfile::tempdir;

#[test]
fn cli_scores_run_to_file() {
    let dir = tempdir().unwrap();
    let qrels = dir.path().join("qrels");
    let run = dir.path().join("run");
    let metrics = dir.path().join("metrics");
    let out = dir.path().join("scores.tsv");
    let bib = dir.path().join("refs.bib");
    fs::write(&qrels, "1 0 A 1\n1 0 B 0\n2 0 C 1\n").unwrap();
    fs::write(&run, "1 x A 1 2.0 r\n1 x B 2 1.0 r\n2 x D 1 2.0 r\n2 x C 2 1.0 r\n").unwrap();
    fs::write(&metrics, "Precision(1)\nRR\n").unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_cwl-eval"))
        .arg(&qrels)
        .arg(&run)
        .args(["-n", "-r"])
        .arg("-m")
        .arg(&metrics)
        .arg("-b")
        .arg(&bib)
        .arg("--out")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Topic\tMetric"));
    assert!(lines[1].starts_with("1\tP@1\t1.0000"));
    assert!(lines[3].starts_with("2\tP@1\t0.0000"));
    assert!(fs::read_to_string(&bib).unwrap().contains("cwl\\_eval"));
}

#[test]
fn cli_jsonl_is_deterministic() {
    let dir = tempdir().unwrap();
    let qrels = dir.path().join("qrels");
    let run = dir.path().join("run");
    fs::write(&qrels, "7 0 A 1\n7 0 B 1\n").unwrap();
    fs::write(&run, "7 x B 1 2.0 r\n7 x Z 2 1.0 r\n7 x A 3 0.5 r\n").unwrap();

    let run_once = || {
        let output = Command::new(env!("CARGO_BIN_EXE_cwl-eval"))
            .arg(&qrels)
            .arg(&run)
            .args(["--format", "jsonl", "--max-depth", "50"])
            .output()
            .unwrap();
        assert!(output.status.success());
        String::from_utf8(output.stdout).unwrap()
    };
    let a = run_once();
    let b = run_once();
    assert_eq!(a, b);
    assert_eq!(a.lines().count(), 16);
    let first: serde_json::Value = serde_json::from_str(a.lines().next().unwrap()).unwrap();
    assert_eq!(first["metric"], "P@1");
}

#[test]
fn cli_rejects_unknown_metric_and_lists_names() {
    let dir = tempdir().unwrap();
    let qrels = dir.path().join("qrels");
    let run = dir.path().join("run");
    let metrics = dir.path().join("metrics");
    fs::write(&qrels, "1 0 A 1\n").unwrap();
    fs::write(&run, "1 x A 1 2.0 r\n").unwrap();
    fs::write(&metrics, "Bogus(3)\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cwl-eval"))
        .arg(&qrels)
        .arg(&run)
        .arg("-m")
        .arg(&metrics)
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Bogus"), "{stderr}");
    assert!(stderr.contains("Precision"), "{stderr}");

    let listed = Command::new(env!("CARGO_BIN_EXE_cwl-eval"))
        .arg("--list-metrics")
        .output()
        .unwrap();
    assert!(listed.status.success());
    let names = String::from_utf8(listed.stdout).unwrap();
    assert!(names.lines().any(|l| l == "UMeasure"));
}
