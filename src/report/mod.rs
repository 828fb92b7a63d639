//! Report rollup over saved inspection sessions.
//!
//! Nothing here is stored: a summary is re-derived from saved sessions and
//! the latest metrics run every time it is requested.

mod verdict;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use verdict::{Verdict, session_verdict};

use crate::criteria::CriteriaConfig;
use crate::inspection::{SavedItem, SavedSession};
use crate::metrics::QualityMetrics;
use crate::model::{DataType, Record, RecordId};
use crate::util::{now_utc_string, percentage, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityAccuracy {
    pub total_checks: usize,
    pub agreeing_checks: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStat {
    pub session_id: String,
    pub data_type: DataType,
    pub round_num: u32,
    pub inspected_count: usize,
    pub pass_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_mismatch_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_accuracy: Option<SimilarityAccuracy>,
    pub verdict: Verdict,
    pub saved_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub generated_at: String,
    pub preprocessed_metrics: Option<QualityMetrics>,
    pub labeled_metrics: Option<QualityMetrics>,
    pub inspection_sessions: Vec<SessionStat>,
}

type LabelPair = (Option<bool>, Option<bool>);

/// Original ad/fake labels by record id.
///
/// Items absent from the lookup fall back to the labels denormalized into
/// the saved item, so an empty lookup is valid.
#[derive(Debug, Clone, Default)]
pub struct GroundTruth {
    labels: HashMap<RecordId, LabelPair>,
}

impl GroundTruth {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            labels: records
                .iter()
                .map(|record| (record.id, (record.is_ad, record.is_fake)))
                .collect(),
        }
    }

    pub fn labels_for(&self, item: &SavedItem) -> LabelPair {
        self.labels
            .get(&item.judgment.item_id)
            .copied()
            .unwrap_or((item.original_is_ad, item.original_is_fake))
    }
}

fn label_mismatch_rate(session: &SavedSession, ground_truth: &GroundTruth) -> f64 {
    let inspected = session
        .items
        .iter()
        .filter(|item| item.judgment.status.is_inspected())
        .collect::<Vec<&SavedItem>>();

    let mismatches = inspected
        .iter()
        .filter(|item| {
            let (original_ad, original_fake) = ground_truth.labels_for(item);
            item.judgment.is_ad_checked != original_ad
                || item.judgment.is_fake_checked != original_fake
        })
        .count();

    round_to(percentage(mismatches, inspected.len()), 1)
}

/// A judged similarity pair agrees when the reviewer's call matches the
/// score crossing `threshold`.
fn similarity_accuracy(session: &SavedSession, threshold: f64) -> SimilarityAccuracy {
    let mut total_checks = 0;
    let mut agreeing_checks = 0;

    for check in session
        .items
        .iter()
        .flat_map(|item| item.judgment.similarity_checks.iter())
    {
        let Some(is_similar) = check.is_similar else {
            continue;
        };
        total_checks += 1;
        if is_similar == (check.similarity_score >= threshold) {
            agreeing_checks += 1;
        }
    }

    SimilarityAccuracy {
        total_checks,
        agreeing_checks,
        accuracy: round_to(percentage(agreeing_checks, total_checks), 2),
    }
}

pub fn session_stat(
    session: &SavedSession,
    ground_truth: &GroundTruth,
    config: &CriteriaConfig,
) -> SessionStat {
    let progress = session.progress();
    let (label_mismatch, similarity) = if session.data_type.is_labeled() {
        (
            Some(label_mismatch_rate(session, ground_truth)),
            Some(similarity_accuracy(session, config.similarity_threshold)),
        )
    } else {
        (None, None)
    };

    SessionStat {
        session_id: session.session_id.clone(),
        data_type: session.data_type,
        round_num: session.round_num,
        inspected_count: progress.inspected_count,
        pass_rate: progress.pass_rate,
        label_mismatch_rate: label_mismatch,
        similarity_accuracy: similarity,
        verdict: session_verdict(
            session.data_type,
            progress.pass_rate,
            label_mismatch,
            &config.verdict,
        ),
        saved_at: session.saved_at.clone(),
    }
}

/// Newest save first; ties ordered by session id.
pub fn aggregate(
    sessions: &[SavedSession],
    ground_truth: &GroundTruth,
    config: &CriteriaConfig,
) -> Vec<SessionStat> {
    let mut stats = sessions
        .iter()
        .map(|session| session_stat(session, ground_truth, config))
        .collect::<Vec<SessionStat>>();

    stats.sort_by(|left, right| {
        right
            .saved_at
            .cmp(&left.saved_at)
            .then_with(|| left.session_id.cmp(&right.session_id))
    });
    stats
}

pub fn summarize(
    preprocessed_metrics: Option<QualityMetrics>,
    labeled_metrics: Option<QualityMetrics>,
    sessions: &[SavedSession],
    ground_truth: &GroundTruth,
    config: &CriteriaConfig,
) -> ReportSummary {
    let inspection_sessions = aggregate(sessions, ground_truth, config);

    info!(
        sessions = inspection_sessions.len(),
        passing = inspection_sessions
            .iter()
            .filter(|stat| stat.verdict == Verdict::Pass)
            .count(),
        "report aggregated"
    );

    ReportSummary {
        generated_at: now_utc_string(),
        preprocessed_metrics,
        labeled_metrics,
        inspection_sessions,
    }
}
