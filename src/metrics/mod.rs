//! Dataset-level quality metrics and acceptance criteria.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::criteria::{CriteriaConfig, Direction};
use crate::error::{InspectError, InspectResult};
use crate::model::{DataType, Record};
use crate::util::{percentage, round_to};


const BASE_COLUMNS: [&str; 3] = ["id", "question", "answer"];
const LABEL_COLUMNS: [&str; 2] = ["is_ad", "is_fake"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub description: String,
    pub value: f64,
    pub threshold: f64,
    pub direction: Direction,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub data_type: DataType,
    pub total_records: usize,
    pub missing_rates: BTreeMap<String, f64>,
    pub max_missing_rate: f64,
    pub duplicate_rate: f64,
    pub field_coverage: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fake_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_missing_rate: Option<f64>,
    pub criteria: BTreeMap<String, Criterion>,
    pub all_passed: bool,
}

fn columns_for(data_type: DataType) -> Vec<&'static str> {
    let mut columns = BASE_COLUMNS.to_vec();
    if data_type.is_labeled() {
        columns.extend(LABEL_COLUMNS);
    }
    columns
}

fn required_fields_for(data_type: DataType) -> Vec<&'static str> {
    columns_for(data_type)
        .into_iter()
        .filter(|column| *column != "id")
        .collect()
}

fn is_missing(record: &Record, column: &str) -> bool {
    match column {
        "question" => record.question.trim().is_empty(),
        "answer" => record.answer.trim().is_empty(),
        "is_ad" => record.is_ad.is_none(),
        "is_fake" => record.is_fake.is_none(),
        _ => false,
    }
}

fn row_digest(record: &Record) -> InspectResult<[u8; 32]> {
    let bytes = serde_json::to_vec(record)?;
    let mut digest = [0_u8; 32];
    digest.copy_from_slice(&Sha256::digest(&bytes));
    Ok(digest)
}

pub fn evaluate(
    dataset: &[Record],
    data_type: DataType,
    config: &CriteriaConfig,
) -> InspectResult<QualityMetrics> {
    let criteria_specs = config.for_data_type(data_type)?;
    let total = dataset.len();
    let columns = columns_for(data_type);

    let mut missing_rates = BTreeMap::new();
    for column in &columns {
        let missing = dataset
            .iter()
            .filter(|record| is_missing(record, column))
            .count();
        missing_rates.insert(column.to_string(), round_to(percentage(missing, total), 2));
    }
    let max_missing_rate = missing_rates.values().copied().fold(0.0_f64, f64::max);

    let mut seen = HashSet::with_capacity(total);
    for record in dataset {
        seen.insert(row_digest(record)?);
    }
    let duplicate_rate = round_to(percentage(total - seen.len(), total), 2);

    let field_coverage = required_fields_for(data_type)
        .into_iter()
        .map(|field| {
            let present = dataset
                .iter()
                .filter(|record| !is_missing(record, field))
                .count();
            (field.to_string(), round_to(percentage(present, total), 2))
        })
        .collect::<BTreeMap<String, f64>>();

    let mut metrics = QualityMetrics {
        data_type,
        total_records: total,
        missing_rates,
        max_missing_rate,
        duplicate_rate,
        field_coverage,
        ad_count: None,
        fake_count: None,
        similar_count: None,
        label_missing_rate: None,
        criteria: BTreeMap::new(),
        all_passed: false,
    };

    if data_type.is_labeled() {
        metrics.ad_count = Some(dataset.iter().filter(|r| r.is_ad == Some(true)).count());
        metrics.fake_count = Some(dataset.iter().filter(|r| r.is_fake == Some(true)).count());
        metrics.similar_count = Some(
            dataset
                .iter()
                .filter(|r| !r.similar_items_info.is_empty())
                .count(),
        );
        let missing_labels = dataset
            .iter()
            .map(|r| usize::from(r.is_ad.is_none()) + usize::from(r.is_fake.is_none()))
            .sum::<usize>();
        metrics.label_missing_rate = Some(round_to(percentage(missing_labels, total * 2), 2));
    }

    for (key, spec) in criteria_specs {
        let value = metric_value(&metrics, key).ok_or_else(|| InspectError::UnknownCriterion {
            key: key.clone(),
            data_type,
        })?;
        let passed = spec.direction.passes(value, spec.threshold);
        debug!(criterion = %key, value, threshold = spec.threshold, passed, "criterion evaluated");

        metrics.criteria.insert(
            key.clone(),
            Criterion {
                description: spec.description.clone(),
                value,
                threshold: spec.threshold,
                direction: spec.direction,
                passed,
            },
        );
    }
    metrics.all_passed = metrics.criteria.values().all(|criterion| criterion.passed);

    info!(
        data_type = %data_type,
        total_records = metrics.total_records,
        max_missing_rate = metrics.max_missing_rate,
        duplicate_rate = metrics.duplicate_rate,
        all_passed = metrics.all_passed,
        "quality metrics evaluated"
    );
    Ok(metrics)
}

/// Maps a criterion key onto the metric it is judged against.
fn metric_value(metrics: &QualityMetrics, key: &str) -> Option<f64> {
    let total = metrics.total_records;
    match key {
        "record_count" => Some(total as f64),
        "missing_rate" => Some(metrics.max_missing_rate),
        "duplicate_rate" => Some(metrics.duplicate_rate),
        "required_fields" => Some(
            metrics
                .field_coverage
                .values()
                .copied()
                .fold(f64::INFINITY, f64::min)
                .min(100.0),
        ),
        "label_missing_rate" => metrics.label_missing_rate,
        "ad_rate" => metrics
            .ad_count
            .map(|count| round_to(percentage(count, total), 2)),
        "fake_rate" => metrics
            .fake_count
            .map(|count| round_to(percentage(count, total), 2)),
        _ => None,
    }
}
