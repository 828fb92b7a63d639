use crate::model::{Record, RecordId, SimilarityRef};

pub fn record(id: RecordId) -> Record {
    Record {
        id,
        question: format!("question {id}"),
        answer: format!("answer {id}"),
        is_ad: None,
        is_fake: None,
        similar_items_info: Vec::new(),
    }
}

pub fn labeled_record(id: RecordId, is_ad: bool, is_fake: bool, links: &[(RecordId, f64)]) -> Record {
    Record {
        is_ad: Some(is_ad),
        is_fake: Some(is_fake),
        similar_items_info: links
            .iter()
            .map(|(similar_id, similarity_score)| SimilarityRef {
                similar_id: *similar_id,
                similarity_score: *similarity_score,
            })
            .collect(),
        ..record(id)
    }
}

pub fn dataset(size: usize) -> Vec<Record> {
    (1..=size as RecordId).map(record).collect()
}

/// Labeled rows where every tenth record links to its neighbour.
pub fn labeled_dataset(size: usize) -> Vec<Record> {
    (1..=size as RecordId)
        .map(|id| {
            let links = if id % 10 == 0 && id > 1 {
                vec![(id - 1, 0.82)]
            } else {
                Vec::new()
            };
            labeled_record(id, id % 7 == 0, id % 11 == 0, &links)
        })
        .collect()
}
