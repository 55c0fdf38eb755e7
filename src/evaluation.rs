//! Evaluate a TREC run file.
//!
//! Rows are `topic element_type doc rank score run`. Consecutive rows that
//! share a topic form one ranking, in file order; the rank and score columns
//! are not consulted. Each ranking is measured with every metric of the
//! ruler and written out before the next topic is read.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{ConfigError, EvalConfig};
use crate::judgments::{CostSource, CostTable, GainSource, JudgmentError, QrelJudgments};
use crate::measures::MetricError;
use crate::ranking::{RankingBounds, RankingBuilder};
use crate::registry::{MetricRegistry, RegistryError};
use crate::report::{write_bibtex, ReportError, ReportWriter};
use crate::ruler::Ruler;

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("result file line {line}: expected 6 fields, got `{text}`")]
    MalformedRow { line: usize, text: String },
    #[error("topic {topic}: {source}")]
    Metric {
        topic: String,
        #[source]
        source: MetricError,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Judgment(#[from] JudgmentError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One line of a run file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResultRow<'a> {
    pub topic_id: &'a str,
    pub element_type: &'a str,
    pub doc_id: &'a str,
    pub rank: &'a str,
    pub score: &'a str,
    pub run_id: &'a str,
}

/// `Ok(None)` for blank lines.
pub fn parse_result_row(text: &str, line: usize) -> Result<Option<ResultRow<'_>>, EvalError> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    match fields.as_slice() {
        [] => Ok(None),
        [topic_id, element_type, doc_id, rank, score, run_id] => Ok(Some(ResultRow {
            topic_id,
            element_type,
            doc_id,
            rank,
            score,
            run_id,
        })),
        _ => Err(EvalError::MalformedRow {
            line,
            text: text.to_string(),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvalSummary {
    pub topics: usize,
    pub rows: usize,
    /// Topics in the run with no positive judgments.
    pub unjudged_topics: usize,
}

/// Everything needed to evaluate one run from files.
#[derive(Debug, Clone, Default)]
pub struct EvalRequest {
    pub gain_file: PathBuf,
    pub result_file: PathBuf,
    pub cost_file: Option<PathBuf>,
    pub metrics_file: Option<PathBuf>,
    pub bib_file: Option<PathBuf>,
    pub config: EvalConfig,
}

/// Load judgments, costs and metrics named by `request`, then score the run
/// into `out`.
pub fn run_evaluation<W: Write>(
    request: &EvalRequest,
    registry: &MetricRegistry,
    out: W,
) -> Result<EvalSummary, EvalError> {
    let config = &request.config;
    config.validate()?;
    let bounds = config.bounds;
    info!(
        results = %request.result_file.display(),
        gains = %request.gain_file.display(),
        costs = ?request.cost_file,
        "evaluating run"
    );
    info!(
        min_gain = bounds.min_gain,
        max_gain = bounds.max_gain,
        min_cost = bounds.min_cost,
        max_cost = bounds.max_cost,
        depth = bounds.depth,
        residuals = config.residuals,
        "ranking bounds"
    );

    let qrels = QrelJudgments::from_path(&request.gain_file)?;
    qrels.validate_gains(bounds.min_gain, bounds.max_gain)?;
    let costs = request
        .cost_file
        .as_ref()
        .map(CostTable::from_path)
        .transpose()?;

    let ruler = match &request.metrics_file {
        Some(path) => Ruler::load(path, registry)?,
        None => Ruler::default_set(),
    }
    .with_residuals(config.residuals);
    debug!(metrics = ?ruler.metric_names(), "metrics loaded");

    let mut writer = ReportWriter::new(out, config.format, config.residuals);
    if config.colnames {
        writer.write_header()?;
    }

    let results = BufReader::new(File::open(&request.result_file)?);
    let cost_source = costs.as_ref().map(|c| c as &dyn CostSource);
    let summary = evaluate_run(results, &qrels, cost_source, &ruler, bounds, &mut writer)?;
    writer.flush()?;

    if let Some(path) = &request.bib_file {
        write_bibtex(File::create(path)?, &ruler.citations())?;
        debug!(path = %path.display(), "bibtex written");
    }
    Ok(summary)
}

/// Score every topic in `results`, writing rows as each topic completes.
pub fn evaluate_run<R: BufRead, W: Write>(
    results: R,
    gains: &dyn GainSource,
    costs: Option<&dyn CostSource>,
    ruler: &Ruler,
    bounds: RankingBounds,
    writer: &mut ReportWriter<W>,
) -> Result<EvalSummary, EvalError> {
    let mut summary = EvalSummary::default();
    let mut current: Option<RankingBuilder<'_>> = None;

    for (idx, line) in results.lines().enumerate() {
        let line = line?;
        let Some(row) = parse_result_row(&line, idx + 1)? else {
            continue;
        };
        let same_topic = current
            .as_ref()
            .is_some_and(|builder| builder.topic_id() == row.topic_id);
        if !same_topic {
            if let Some(builder) = current.take() {
                finish_topic(builder, gains, ruler, writer, &mut summary)?;
            }
            current = Some(RankingBuilder::new(row.topic_id, gains, costs, bounds));
        }
        if let Some(builder) = current.as_mut() {
            builder.add(row.doc_id, row.element_type);
        }
    }
    if let Some(builder) = current.take() {
        finish_topic(builder, gains, ruler, writer, &mut summary)?;
    }

    info!(
        topics = summary.topics,
        rows = summary.rows,
        unjudged_topics = summary.unjudged_topics,
        "run evaluated"
    );
    Ok(summary)
}

fn finish_topic<W: Write>(
    builder: RankingBuilder<'_>,
    gains: &dyn GainSource,
    ruler: &Ruler,
    writer: &mut ReportWriter<W>,
    summary: &mut EvalSummary,
) -> Result<(), EvalError> {
    let topic = builder.topic_id().to_string();
    let retrieved = builder.len();
    let ranking = builder.finish();
    if gains.total_rels(&topic) == 0.0 && gains.total_gain(&topic) == 0.0 {
        warn!(topic = %topic, "no relevant judgments for topic");
        summary.unjudged_topics += 1;
    }
    debug!(topic = %topic, retrieved, "measuring topic");

    let rows = ruler.measure(&ranking).map_err(|source| EvalError::Metric {
        topic: topic.clone(),
        source,
    })?;
    writer.write_measurements(&rows)?;
    summary.topics += 1;
    summary.rows += rows.len();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measures::Precision;
    use crate::report::ReportFormat;
    use std::sync::Arc;

    #[test]
    fn rows_need_six_fields() {
        let row = parse_result_row("T1 web D1 1 0.9 run", 1).unwrap().unwrap();
        assert_eq!(row.topic_id, "T1");
        assert_eq!(row.element_type, "web");
        assert_eq!(row.doc_id, "D1");
        assert_eq!(row.run_id, "run");
        assert!(parse_result_row("   ", 2).unwrap().is_none());
        let err = parse_result_row("T1 Q0 D1 1 0.9", 3).unwrap_err();
        assert!(matches!(err, EvalError::MalformedRow { line: 3, .. }));
    }

    #[test]
    fn consecutive_rows_form_one_topic() {
        let mut qrels = QrelJudgments::new();
        qrels.insert("T1", "D1", 1.0);
        qrels.insert("T2", "D5", 1.0);
        let run = "T1 x D1 1 3 r\nT1 x D2 2 2 r\n\nT2 x D4 1 3 r\nT2 x D5 2 2 r\n";
        let ruler = Ruler::with_metrics(vec![Arc::new(Precision::new(1))]);
        let mut writer = ReportWriter::new(Vec::new(), ReportFormat::Tsv, false);

        let summary = evaluate_run(
            run.as_bytes(),
            &qrels,
            None,
            &ruler,
            RankingBounds::default(),
            &mut writer,
        )
        .unwrap();
        assert_eq!(summary.topics, 2);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.unjudged_topics, 0);

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("T1\tP@1\t1.0000"));
        assert!(lines[1].starts_with("T2\tP@1\t0.0000"));
    }

    #[test]
    fn unjudged_topics_are_counted() {
        let qrels = QrelJudgments::new();
        let ruler = Ruler::with_metrics(vec![Arc::new(Precision::new(1))]);
        let mut writer = ReportWriter::new(Vec::new(), ReportFormat::Tsv, false);
        let summary = evaluate_run(
            "T9 x D1 1 1 r\n".as_bytes(),
            &qrels,
            None,
            &ruler,
            RankingBounds::default(),
            &mut writer,
        )
        .unwrap();
        assert_eq!(summary.unjudged_topics, 1);
        assert_eq!(summary.rows, 1);
    }
}
