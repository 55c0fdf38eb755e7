//! Run configuration: ranking bounds, residuals and output format.
//!
//! Loaded from JSON; any missing field takes its default. Command-line flags
//! are applied on top by the binary.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ranking::RankingBounds;
use crate::report::ReportFormat;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    pub bounds: RankingBounds,
    /// Report best-minus-worst residuals alongside the scores.
    pub residuals: bool,
    /// Emit the column-name header before the first row.
    pub colnames: bool,
    pub format: ReportFormat,
}

impl EvalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate().map_err(ConfigError::Invalid)
    }
}

pub fn load_config_from_path(path: impl AsRef<Path>) -> Result<EvalConfig, ConfigError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let config: EvalConfig = serde_json::from_str(&raw)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_takes_defaults() {
        let config: EvalConfig =
            serde_json::from_str(r#"{"residuals": true, "bounds": {"max_gain": 3.0}}"#).unwrap();
        assert!(config.residuals);
        assert!(!config.colnames);
        assert_eq!(config.format, ReportFormat::Tsv);
        assert_eq!(config.bounds.max_gain, 3.0);
        assert_eq!(config.bounds.depth, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_rejects_inverted_bounds() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bounds": {{"min_cost": 5.0, "max_cost": 2.0}}}}"#).unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
    }

    #[test]
    fn load_rejects_zero_cost() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"bounds": {{"min_cost": 0.0, "max_cost": 0.0}}}}"#).unwrap();
        let err = load_config_from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("min_cost"), "{err}");
    }

    #[test]
    fn load_reads_format() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"format": "jsonl", "colnames": true}}"#).unwrap();
        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.format, ReportFormat::Jsonl);
        assert!(config.colnames);
    }

    #[test]
    fn load_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            load_config_from_path(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }
}
