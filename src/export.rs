use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::dataset::MAX_SIMILAR_LINKS;
use crate::inspection::{SavedItem, SavedSession, SimilarityJudgment};
use crate::util::ensure_directory;

const LABELED_HEADERS: [&str; 10] = [
    "id",
    "question",
    "answer",
    "original_is_ad",
    "checked_is_ad",
    "ad_match",
    "original_is_fake",
    "checked_is_fake",
    "fake_match",
    "label_mismatch",
];

const PLAIN_HEADERS: [&str; 5] = ["id", "question", "answer", "status", "comment"];

pub fn headers(session: &SavedSession) -> Vec<String> {
    if !session.data_type.is_labeled() {
        return PLAIN_HEADERS.iter().map(|header| header.to_string()).collect();
    }

    let mut headers = LABELED_HEADERS
        .iter()
        .map(|header| header.to_string())
        .collect::<Vec<String>>();
    for slot in 1..=MAX_SIMILAR_LINKS {
        headers.push(format!("similar_{slot}_id"));
        headers.push(format!("similar_{slot}_result"));
    }
    headers.push("status".to_string());
    headers
}

fn flag(value: Option<bool>) -> String {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "-",
    }
    .to_string()
}

fn agreement(original: Option<bool>, checked: Option<bool>) -> String {
    if original == checked { "match" } else { "mismatch" }.to_string()
}

fn similarity_result(check: Option<&SimilarityJudgment>) -> (String, String) {
    match check {
        None => ("-".to_string(), "-".to_string()),
        Some(check) => {
            let result = match check.is_similar {
                Some(true) => "similar",
                Some(false) => "not_similar",
                None => "unjudged",
            };
            (check.similar_id.to_string(), result.to_string())
        }
    }
}

fn labeled_row(item: &SavedItem) -> Vec<String> {
    let judgment = &item.judgment;
    let mismatch = judgment.is_ad_checked != item.original_is_ad
        || judgment.is_fake_checked != item.original_is_fake;

    let mut row = vec![
        judgment.item_id.to_string(),
        item.question.clone(),
        item.answer.clone(),
        flag(item.original_is_ad),
        flag(judgment.is_ad_checked),
        agreement(item.original_is_ad, judgment.is_ad_checked),
        flag(item.original_is_fake),
        flag(judgment.is_fake_checked),
        agreement(item.original_is_fake, judgment.is_fake_checked),
        if mismatch { "mismatch" } else { "ok" }.to_string(),
    ];
    for slot in 0..MAX_SIMILAR_LINKS {
        let (similar_id, result) = similarity_result(judgment.similarity_checks.get(slot));
        row.push(similar_id);
        row.push(result);
    }
    row.push(judgment.status.as_str().to_string());
    row
}

fn plain_row(item: &SavedItem) -> Vec<String> {
    vec![
        item.judgment.item_id.to_string(),
        item.question.clone(),
        item.answer.clone(),
        item.judgment.status.as_str().to_string(),
        item.judgment.comment.clone(),
    ]
}

pub fn rows(session: &SavedSession) -> Vec<Vec<String>> {
    let labeled = session.data_type.is_labeled();
    session
        .items
        .iter()
        .map(|item| if labeled { labeled_row(item) } else { plain_row(item) })
        .collect()
}

/// Writes the session as CSV with a leading UTF-8 BOM for spreadsheet tools.
pub fn write_csv<W: Write>(mut writer: W, session: &SavedSession) -> Result<()> {
    writer
        .write_all("\u{feff}".as_bytes())
        .context("failed to write csv byte-order mark")?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(headers(session))
        .context("failed to write csv header")?;
    for row in rows(session) {
        csv_writer.write_record(&row).context("failed to write csv row")?;
    }
    csv_writer.flush().context("failed to flush csv output")?;
    Ok(())
}

pub fn write_csv_file(path: &Path, session: &SavedSession) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    write_csv(file, session).with_context(|| format!("failed to export {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::{InspectionSession, Outcome};
    use crate::model::{DataType, SampleSpec};
    use crate::sampling::build_sample;
    use crate::store::SqliteStore;
    use crate::test_support::{dataset, labeled_record};

    fn saved(records: &[crate::model::Record], data_type: DataType) -> SavedSession {
        let sample = build_sample(
            records,
            &SampleSpec {
                data_type,
                sample_size: records.len(),
                round_num: 1,
                seed: 11,
            },
        )
        .expect("sample should build");
        let mut session = InspectionSession::create(&sample);
        session
            .set_status(0, Outcome::Fail, "reviewer")
            .expect("status should set");
        session.set_comment(0, "answer is off-topic").expect("comment should set");
        let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
        session.save(&mut store).expect("session should save")
    }

    #[test]
    fn labeled_export_has_three_similarity_slots() {
        let mut session = saved(
            &[labeled_record(1, true, false, &[(2, 0.9)])],
            DataType::Labeled,
        );

        let header_row = headers(&session);
        assert_eq!(header_row.len(), 17);
        assert_eq!(header_row[10], "similar_1_id");
        assert_eq!(header_row[16], "status");

        let rendered = rows(&session);
        let row = &rendered[0];
        assert_eq!(row.len(), header_row.len());
        assert_eq!(row[3], "yes");
        assert_eq!(row[4], "yes");
        assert_eq!(row[5], "match");
        assert_eq!(row[8], "match");
        assert_eq!(row[9], "ok");
        assert_eq!(row[10], "2");
        assert_eq!(row[11], "unjudged");
        assert_eq!(row[12], "-");
        assert_eq!(row[16], "fail");

        session.items[0].judgment.is_fake_checked = Some(true);
        let rendered = rows(&session);
        let row = &rendered[0];
        assert_eq!(row[7], "yes");
        assert_eq!(row[8], "mismatch");
        assert_eq!(row[9], "mismatch");
    }

    #[test]
    fn plain_export_carries_status_and_comment() {
        let session = saved(&dataset(2), DataType::Preprocessed);

        let rows = rows(&session);
        assert_eq!(headers(&session), PLAIN_HEADERS);
        assert_eq!(rows[0][3], "fail");
        assert_eq!(rows[0][4], "answer is off-topic");
        assert_eq!(rows[1][3], "pending");
    }

    #[test]
    fn csv_output_starts_with_bom_and_quotes_commas() {
        let mut records = dataset(1);
        records[0].question = "Which one, A or B?".to_string();
        let session = saved(&records, DataType::Preprocessed);

        let mut buffer = Vec::new();
        write_csv(&mut buffer, &session).expect("csv should write");
        let text = String::from_utf8(buffer).expect("csv should be utf-8");

        assert!(text.starts_with('\u{feff}'));
        assert!(text.contains("\"Which one, A or B?\""));
        assert_eq!(text.lines().count(), 2);
    }
}
