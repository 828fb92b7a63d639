//! Deterministic sample selection.
//!
//! Membership and order of a sample depend only on the dataset (contents and
//! order) and the seed. The generator is ChaCha8 seeded from the seed's two's
//! complement bits, driving a partial Fisher–Yates shuffle over record
//! positions; draws use `u64` ranges so results do not depend on pointer width.

use std::collections::{BTreeMap, HashMap};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{InspectError, InspectResult};
use crate::model::{
    DataType, PersistedSample, Record, RecordId, SampleInfo, SampleSpec, SampleSummary,
};
use crate::util::now_utc_string;


pub fn select(dataset: &[Record], spec: &SampleSpec) -> InspectResult<(Vec<Record>, SampleSummary)> {
    let total = dataset.len();
    if spec.sample_size == 0 || spec.sample_size > total {
        return Err(InspectError::InvalidSampleSize {
            requested: spec.sample_size,
            total,
        });
    }

    let positions = draw_positions(total, spec.sample_size, spec.seed);
    let sample = positions
        .into_iter()
        .map(|position| dataset[position].clone())
        .collect::<Vec<Record>>();

    debug!(
        seed = spec.seed,
        total,
        sample_size = sample.len(),
        "sample drawn"
    );

    Ok((
        sample,
        SampleSummary {
            total_size: total,
            sample_size: spec.sample_size,
            round_num: spec.round_num,
        },
    ))
}

fn draw_positions(total: usize, count: usize, seed: i64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let mut positions = (0..total).collect::<Vec<usize>>();

    for slot in 0..count {
        let pick = rng.gen_range(slot as u64..total as u64) as usize;
        positions.swap(slot, pick);
    }

    positions.truncate(count);
    positions
}

pub fn session_id(data_type: DataType, round_num: u32, seed: i64) -> String {
    format!("{}_r{}_s{}", data_type.as_str(), round_num, seed)
}

/// Records referenced by the sample's similarity links, keyed by id.
/// Links pointing outside the dataset are skipped.
pub fn similar_items(dataset: &[Record], sample: &[Record]) -> BTreeMap<RecordId, Record> {
    let by_id = dataset
        .iter()
        .map(|record| (record.id, record))
        .collect::<HashMap<RecordId, &Record>>();

    let mut lookup = BTreeMap::new();
    for link in sample.iter().flat_map(|record| record.similar_items_info.iter()) {
        if lookup.contains_key(&link.similar_id) {
            continue;
        }
        if let Some(record) = by_id.get(&link.similar_id) {
            lookup.insert(link.similar_id, (*record).clone());
        }
    }
    lookup
}

pub fn dataset_fingerprint(dataset: &[Record]) -> InspectResult<String> {
    let mut hasher = Sha256::new();
    for record in dataset {
        hasher.update(serde_json::to_vec(record)?);
        hasher.update(b"\n");
    }
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn build_sample(dataset: &[Record], spec: &SampleSpec) -> InspectResult<PersistedSample> {
    let (records, summary) = select(dataset, spec)?;
    let similar_items = if spec.data_type.is_labeled() {
        similar_items(dataset, &records)
    } else {
        BTreeMap::new()
    };

    let info = SampleInfo {
        session_id: session_id(spec.data_type, spec.round_num, spec.seed),
        data_type: spec.data_type,
        round_num: summary.round_num,
        sample_size: summary.sample_size,
        total_size: summary.total_size,
        seed: spec.seed,
        created_at: now_utc_string(),
        dataset_fingerprint: dataset_fingerprint(dataset)?,
        sample_ids: records.iter().map(|record| record.id).collect(),
    };

    Ok(PersistedSample {
        info,
        records,
        similar_items,
    })
}
