//! Relevance judgments and element costs.
//!
//! A [`GainSource`] answers "what is document D worth for topic T", and a
//! [`CostSource`] answers "what does it cost to examine an element of type X".
//! Rankings are built against these traits; the file-backed implementations
//! here read TREC qrels and plain `element_type cost` tables.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum JudgmentError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed line {line}: expected {expected} fields, got `{text}`")]
    MalformedLine {
        line: usize,
        expected: usize,
        text: String,
    },
    #[error("line {line}: invalid number `{value}`")]
    InvalidNumber { line: usize, value: String },
    #[error("line {line}: cost for `{element_type}` must be > 0, got {value}")]
    NonPositiveCost {
        line: usize,
        element_type: String,
        value: f64,
    },
    #[error(
        "gain {value} for topic {topic} is {relation} the {bound} ({limit}); \
         check the gain file or set the {bound} to {value}"
    )]
    GainOutOfRange {
        topic: String,
        value: f64,
        limit: f64,
        bound: &'static str,
        relation: &'static str,
    },
}

/// Source of per-topic gains.
pub trait GainSource {
    /// Gain of `doc_id` for `topic_id`, or `None` if the document is unjudged.
    fn gain(&self, topic_id: &str, doc_id: &str) -> Option<f64>;

    /// Sum of every judged gain for the topic, retrieved or not.
    fn total_gain(&self, topic_id: &str) -> f64;

    /// Number of judged documents with positive gain for the topic.
    fn total_rels(&self, topic_id: &str) -> f64;
}

/// Source of per-element-type costs.
pub trait CostSource {
    fn cost(&self, element_type: &str) -> Option<f64>;
}

impl CostSource for HashMap<String, f64> {
    fn cost(&self, element_type: &str) -> Option<f64> {
        self.get(element_type).copied()
    }
}

/// In-memory TREC qrels: `topic iteration document gain`. Trailing columns
/// after the gain are ignored.
#[derive(Debug, Clone, Default)]
pub struct QrelJudgments {
    topics: HashMap<String, HashMap<String, f64>>,
}

impl QrelJudgments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, JudgmentError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, JudgmentError> {
        let mut qrels = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() < 4 {
                return Err(JudgmentError::MalformedLine {
                    line: idx + 1,
                    expected: 4,
                    text: line.clone(),
                });
            }
            let gain = parse_number(fields[3], idx + 1)?;
            qrels.insert(fields[0], fields[2], gain);
        }
        Ok(qrels)
    }

    pub fn insert(&mut self, topic_id: impl Into<String>, doc_id: impl Into<String>, gain: f64) {
        self.topics
            .entry(topic_id.into())
            .or_default()
            .insert(doc_id.into(), gain);
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn has_topic(&self, topic_id: &str) -> bool {
        self.topics.contains_key(topic_id)
    }

    /// Reject any judged gain outside `[min_gain, max_gain]`.
    pub fn validate_gains(&self, min_gain: f64, max_gain: f64) -> Result<(), JudgmentError> {
        for (topic, docs) in &self.topics {
            for &gain in docs.values() {
                if gain > max_gain {
                    return Err(JudgmentError::GainOutOfRange {
                        topic: topic.clone(),
                        value: gain,
                        limit: max_gain,
                        bound: "maximum gain",
                        relation: "greater than",
                    });
                }
                if gain < min_gain {
                    return Err(JudgmentError::GainOutOfRange {
                        topic: topic.clone(),
                        value: gain,
                        limit: min_gain,
                        bound: "minimum gain",
                        relation: "less than",
                    });
                }
            }
        }
        Ok(())
    }
}

impl GainSource for QrelJudgments {
    fn gain(&self, topic_id: &str, doc_id: &str) -> Option<f64> {
        self.topics.get(topic_id)?.get(doc_id).copied()
    }

    fn total_gain(&self, topic_id: &str) -> f64 {
        self.topics
            .get(topic_id)
            .map(|docs| docs.values().sum())
            .unwrap_or(0.0)
    }

    fn total_rels(&self, topic_id: &str) -> f64 {
        self.topics
            .get(topic_id)
            .map(|docs| docs.values().filter(|&&g| g > 0.0).count() as f64)
            .unwrap_or(0.0)
    }
}

/// Flat `element_type -> cost` lookup read from a two-column file.
#[derive(Debug, Clone, Default)]
pub struct CostTable {
    costs: HashMap<String, f64>,
}

impl CostTable {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, JudgmentError> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl BufRead) -> Result<Self, JudgmentError> {
        let mut costs = HashMap::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != 2 {
                return Err(JudgmentError::MalformedLine {
                    line: idx + 1,
                    expected: 2,
                    text: line.clone(),
                });
            }
            let cost = parse_number(fields[1], idx + 1)?;
            if cost <= 0.0 {
                return Err(JudgmentError::NonPositiveCost {
                    line: idx + 1,
                    element_type: fields[0].to_string(),
                    value: cost,
                });
            }
            costs.insert(fields[0].to_string(), cost);
        }
        Ok(Self { costs })
    }

    pub fn insert(&mut self, element_type: impl Into<String>, cost: f64) {
        self.costs.insert(element_type.into(), cost);
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }
}

impl CostSource for CostTable {
    fn cost(&self, element_type: &str) -> Option<f64> {
        self.costs.get(element_type).copied()
    }
}

fn parse_number(raw: &str, line: usize) -> Result<f64, JudgmentError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| JudgmentError::InvalidNumber {
            line,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qrels_parse_and_totals() {
        let raw = "T1 0 D1 1\nT1 0 D2 0\nT1 0 D3 0.5\n\nT2 0 D1 1\n";
        let qrels = QrelJudgments::from_reader(raw.as_bytes()).unwrap();

        assert_eq!(qrels.topic_count(), 2);
        assert_eq!(qrels.gain("T1", "D3"), Some(0.5));
        assert_eq!(qrels.gain("T1", "D2"), Some(0.0));
        assert_eq!(qrels.gain("T1", "D9"), None);
        assert_eq!(qrels.gain("T3", "D1"), None);
        assert_eq!(qrels.total_gain("T1"), 1.5);
        assert_eq!(qrels.total_rels("T1"), 2.0);
        assert_eq!(qrels.total_rels("missing"), 0.0);
    }

    #[test]
    fn qrels_reject_short_lines() {
        let err = QrelJudgments::from_reader("T1 0 D1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, JudgmentError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn qrels_ignore_trailing_columns() {
        let raw = "T1 0 D1 1 0.87 extra\nT1 0 D2 0 0.12\n";
        let qrels = QrelJudgments::from_reader(raw.as_bytes()).unwrap();
        assert_eq!(qrels.gain("T1", "D1"), Some(1.0));
        assert_eq!(qrels.gain("T1", "D2"), Some(0.0));
        assert_eq!(qrels.total_rels("T1"), 1.0);
    }

    #[test]
    fn qrels_reject_bad_gain() {
        let err = QrelJudgments::from_reader("T1 0 D1 high\n".as_bytes()).unwrap_err();
        assert!(matches!(err, JudgmentError::InvalidNumber { line: 1, .. }));
    }

    #[test]
    fn validate_gains_reports_bound() {
        let mut qrels = QrelJudgments::new();
        qrels.insert("T1", "D1", 3.0);
        assert!(qrels.validate_gains(0.0, 3.0).is_ok());

        let err = qrels.validate_gains(0.0, 1.0).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("maximum gain"), "{msg}");
        assert!(msg.contains('3'), "{msg}");

        let err = qrels.validate_gains(4.0, 5.0).unwrap_err();
        assert!(err.to_string().contains("minimum gain"));
    }

    #[test]
    fn cost_table_lookup() {
        let table = CostTable::from_reader("snippet 1.0\nimage\t2.5\n".as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.cost("image"), Some(2.5));
        assert_eq!(table.cost("video"), None);

        let err = CostTable::from_reader("snippet 1.0 extra\n".as_bytes()).unwrap_err();
        assert!(matches!(err, JudgmentError::MalformedLine { expected: 2, .. }));
    }

    #[test]
    fn cost_table_rejects_free_and_negative_costs() {
        let err = CostTable::from_reader("snippet 1.0\nad 0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, JudgmentError::NonPositiveCost { line: 2, .. }));
        assert!(err.to_string().contains("`ad`"), "{err}");

        let err = CostTable::from_reader("video -2.5\n".as_bytes()).unwrap_err();
        assert!(matches!(err, JudgmentError::NonPositiveCost { line: 1, .. }));
    }
}
