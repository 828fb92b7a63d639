use std::collections::BTreeMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub type RecordId = i64;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Preprocessed,
    Labeled,
}

impl DataType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Preprocessed => "preprocessed",
            Self::Labeled => "labeled",
        }
    }

    pub fn is_labeled(self) -> bool {
        self == Self::Labeled
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityRef {
    pub similar_id: RecordId,
    pub similarity_score: f64,
}

/// One dataset row. Never mutated once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub is_ad: Option<bool>,
    #[serde(default)]
    pub is_fake: Option<bool>,
    #[serde(default)]
    pub similar_items_info: Vec<SimilarityRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleSpec {
    pub data_type: DataType,
    pub sample_size: usize,
    pub round_num: u32,
    pub seed: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub total_size: usize,
    pub sample_size: usize,
    pub round_num: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleInfo {
    pub session_id: String,
    pub data_type: DataType,
    pub round_num: u32,
    pub sample_size: usize,
    pub total_size: usize,
    pub seed: i64,
    pub created_at: String,
    pub dataset_fingerprint: String,
    pub sample_ids: Vec<RecordId>,
}

/// A sampling run as persisted at creation time.
///
/// Sampled records are kept alongside the ids so an inspection can be
/// resumed without reloading the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSample {
    pub info: SampleInfo,
    pub records: Vec<Record>,
    #[serde(default)]
    pub similar_items: BTreeMap<RecordId, Record>,
}
