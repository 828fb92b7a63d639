use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{InspectError, InspectResult};
use crate::model::DataType;

pub const CRITERIA_FILE_NAME: &str = "criteria.json";
const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    AtLeast,
    AtMost,
}

impl Direction {
    pub fn passes(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::AtLeast => value >= threshold,
            Self::AtMost => value <= threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::AtLeast => "≥",
            Self::AtMost => "≤",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionSpec {
    pub description: String,
    pub threshold: f64,
    pub direction: Direction,
}

impl CriterionSpec {
    fn new(description: &str, threshold: f64, direction: Direction) -> Self {
        Self {
            description: description.to_string(),
            threshold,
            direction,
        }
    }
}

/// Session verdict bucketing thresholds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictThresholds {
    pub pass_rate_pass: f64,
    pub pass_rate_warn: f64,
    pub label_mismatch_max: f64,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            pass_rate_pass: 90.0,
            pass_rate_warn: 80.0,
            label_mismatch_max: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriteriaConfig {
    #[serde(default)]
    pub preprocessed: BTreeMap<String, CriterionSpec>,
    #[serde(default)]
    pub labeled: BTreeMap<String, CriterionSpec>,
    #[serde(default)]
    pub verdict: VerdictThresholds,
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for CriteriaConfig {
    fn default() -> Self {
        let mut preprocessed = BTreeMap::new();
        preprocessed.insert(
            "record_count".to_string(),
            CriterionSpec::new("Record count ≥ 100,000", 100_000.0, Direction::AtLeast),
        );
        preprocessed.insert(
            "missing_rate".to_string(),
            CriterionSpec::new("Missing rate ≤ 5%", 5.0, Direction::AtMost),
        );
        preprocessed.insert(
            "duplicate_rate".to_string(),
            CriterionSpec::new("Duplicate rate ≤ 5%", 5.0, Direction::AtMost),
        );
        preprocessed.insert(
            "required_fields".to_string(),
            CriterionSpec::new("Required fields present 100%", 100.0, Direction::AtLeast),
        );

        let mut labeled = BTreeMap::new();
        labeled.insert(
            "record_count".to_string(),
            CriterionSpec::new("Labeled record count ≥ 10,000", 10_000.0, Direction::AtLeast),
        );
        labeled.insert(
            "label_missing_rate".to_string(),
            CriterionSpec::new("Label missing rate ≤ 3%", 3.0, Direction::AtMost),
        );

        Self {
            preprocessed,
            labeled,
            verdict: VerdictThresholds::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl CriteriaConfig {
    pub fn for_data_type(
        &self,
        data_type: DataType,
    ) -> InspectResult<&BTreeMap<String, CriterionSpec>> {
        let criteria = match data_type {
            DataType::Preprocessed => &self.preprocessed,
            DataType::Labeled => &self.labeled,
        };
        if criteria.is_empty() {
            return Err(InspectError::MissingCriteriaConfig(data_type));
        }
        Ok(criteria)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// An explicit path must exist; otherwise `<workspace>/criteria.json` is
    /// used when present and the built-in defaults when not.
    pub fn resolve(explicit: Option<&Path>, workspace_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            info!(path = %path.display(), "loading acceptance criteria");
            return Self::load(path);
        }

        let candidate: PathBuf = workspace_root.join(CRITERIA_FILE_NAME);
        if candidate.exists() {
            info!(path = %candidate.display(), "loading acceptance criteria");
            return Self::load(&candidate);
        }

        info!("using built-in acceptance criteria");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_is_configured_not_inferred() {
        assert!(Direction::AtLeast.passes(120_000.0, 100_000.0));
        assert!(!Direction::AtMost.passes(6.0, 5.0));
        assert!(Direction::AtMost.passes(5.0, 5.0));
        assert!(!Direction::AtLeast.passes(0.5, 1.0));
    }

    #[test]
    fn partial_file_keeps_default_verdict_thresholds() {
        let raw = r#"
        {
          "labeled": {
            "record_count": {
              "description": "Labeled records ≥ 500",
              "threshold": 500,
              "direction": "at_least"
            }
          }
        }
        "#;

        let config: CriteriaConfig =
            serde_json::from_str(raw).expect("partial criteria should deserialize");
        assert_eq!(config.verdict, VerdictThresholds::default());
        assert_eq!(config.similarity_threshold, 0.6);
        assert_eq!(config.labeled["record_count"].threshold, 500.0);
        assert!(config.preprocessed.is_empty());
    }

    #[test]
    fn empty_section_is_a_missing_config_error() {
        let config = CriteriaConfig {
            preprocessed: BTreeMap::new(),
            ..CriteriaConfig::default()
        };

        let error = config
            .for_data_type(DataType::Preprocessed)
            .expect_err("missing section must not evaluate");
        assert!(matches!(
            error,
            InspectError::MissingCriteriaConfig(DataType::Preprocessed)
        ));
        assert!(config.for_data_type(DataType::Labeled).is_ok());
    }

    #[test]
    fn resolve_prefers_workspace_file_over_defaults() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let fallback = CriteriaConfig::resolve(None, dir.path()).expect("defaults should load");
        assert_eq!(fallback, CriteriaConfig::default());

        let mut custom = CriteriaConfig::default();
        custom.verdict.pass_rate_pass = 95.0;
        crate::util::write_json_pretty(&dir.path().join(CRITERIA_FILE_NAME), &custom)
            .expect("criteria file should be written");

        let loaded = CriteriaConfig::resolve(None, dir.path()).expect("file should load");
        assert_eq!(loaded.verdict.pass_rate_pass, 95.0);
    }
}
