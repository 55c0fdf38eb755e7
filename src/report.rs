//! Per-topic score output.
//!
//! TSV rows carry the topic, metric name and the five expectations to four
//! decimal places, followed by the five residuals when they were computed.
//! JSONL writes one serialised [`Measurement`] per line instead.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::measures::{Expectations, Measurement};

const HEADER: &str = "Topic\tMetric\tEU\tETU\tEC\tETC\tED";
const RESIDUAL_HEADER: &str = "\tResEU\tResETU\tResEC\tResETC\tResED";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReportFormat {
    #[default]
    Tsv,
    Jsonl,
}

pub struct ReportWriter<W: Write> {
    out: W,
    format: ReportFormat,
    residuals: bool,
    rows: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W, format: ReportFormat, residuals: bool) -> Self {
        Self {
            out,
            format,
            residuals,
            rows: 0,
        }
    }

    /// Column names; only meaningful for TSV, a no-op for JSONL.
    pub fn write_header(&mut self) -> Result<(), ReportError> {
        if self.format == ReportFormat::Tsv {
            if self.residuals {
                writeln!(self.out, "{HEADER}{RESIDUAL_HEADER}")?;
            } else {
                writeln!(self.out, "{HEADER}")?;
            }
        }
        Ok(())
    }

    pub fn write_measurement(&mut self, m: &Measurement) -> Result<(), ReportError> {
        match self.format {
            ReportFormat::Tsv => {
                let mut line = format!("{}\t{}", m.topic_id, m.metric);
                push_scores(&mut line, &m.scores);
                if self.residuals {
                    push_scores(&mut line, &m.residuals.unwrap_or_default());
                }
                writeln!(self.out, "{line}")?;
            }
            ReportFormat::Jsonl => {
                let line = serde_json::to_string(m)?;
                writeln!(self.out, "{line}")?;
            }
        }
        self.rows += 1;
        Ok(())
    }

    pub fn write_measurements(&mut self, rows: &[Measurement]) -> Result<(), ReportError> {
        for m in rows {
            self.write_measurement(m)?;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn push_scores(line: &mut String, scores: &Expectations) {
    for value in scores.as_array() {
        line.push_str(&format!("\t{value:.4}"));
    }
}

/// Write BibTeX entries separated by blank lines.
pub fn write_bibtex<W: Write>(mut out: W, citations: &[&str]) -> Result<(), ReportError> {
    for citation in citations {
        writeln!(out, "{}\n", citation.trim())?;
    }
    out.flush()?;
    Ok(())
}
