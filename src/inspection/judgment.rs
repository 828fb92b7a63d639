use serde::{Deserialize, Serialize};

use crate::model::{Record, RecordId, SimilarityRef};

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Pending,
    Pass,
    Fail,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }

    pub fn is_inspected(self) -> bool {
        self != Self::Pending
    }
}

/// A reviewer decision. `pending` is only ever an initial state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Pass,
    Fail,
}

impl From<Outcome> for Status {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Pass => Self::Pass,
            Outcome::Fail => Self::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityJudgment {
    pub similar_id: RecordId,
    pub similarity_score: f64,
    pub is_similar: Option<bool>,
}

impl SimilarityJudgment {
    /// Re-asserting the stored value clears it.
    pub fn toggle(&mut self, value: bool) {
        self.is_similar = if self.is_similar == Some(value) {
            None
        } else {
            Some(value)
        };
    }
}

impl From<&SimilarityRef> for SimilarityJudgment {
    fn from(link: &SimilarityRef) -> Self {
        Self {
            similar_id: link.similar_id,
            similarity_score: link.similarity_score,
            is_similar: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemJudgment {
    pub item_id: RecordId,
    pub status: Status,
    pub comment: String,
    pub inspector: String,
    pub is_ad_checked: Option<bool>,
    pub is_fake_checked: Option<bool>,
    pub similarity_checks: Vec<SimilarityJudgment>,
}

impl ItemJudgment {
    /// Label checks start from the record's own labels, so a reviewer only
    /// touches the ones that are wrong.
    pub fn pending(record: &Record) -> Self {
        Self {
            item_id: record.id,
            status: Status::Pending,
            comment: String::new(),
            inspector: String::new(),
            is_ad_checked: record.is_ad,
            is_fake_checked: record.is_fake,
            similarity_checks: record
                .similar_items_info
                .iter()
                .map(SimilarityJudgment::from)
                .collect(),
        }
    }
}
