use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::info;

use crate::model::{DataType, Record, RecordId, SimilarityRef};

pub const MAX_SIMILAR_LINKS: usize = 3;
const BOM: char = '\u{feff}';

pub fn load_csv(path: &Path, data_type: DataType) -> Result<Vec<Record>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let records = read_records(file, data_type)
        .with_context(|| format!("failed to load dataset {}", path.display()))?;

    info!(
        path = %path.display(),
        data_type = %data_type,
        records = records.len(),
        "dataset loaded"
    );
    Ok(records)
}

struct ColumnIndex {
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &csv::StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(position, name)| (name.trim_start_matches(BOM).trim().to_string(), position))
            .collect();
        Self { positions }
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.positions
            .get(name)
            .copied()
            .with_context(|| format!("missing required column: {name}"))
    }

    fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }
}

fn cell<'a>(row: &'a csv::StringRecord, position: Option<usize>) -> &'a str {
    position
        .and_then(|position| row.get(position))
        .map(str::trim)
        .unwrap_or("")
}

pub fn read_records<R: Read>(reader: R, data_type: DataType) -> Result<Vec<Record>> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = csv_reader.headers().context("failed to read csv header")?.clone();
    let columns = ColumnIndex::new(&headers);

    let id_column = columns.require("id")?;
    let question_column = columns.require("question")?;
    let answer_column = columns.require("answer")?;
    let link_columns = (1..=MAX_SIMILAR_LINKS)
        .map(|slot| {
            (
                columns.get(&format!("similar_id_{slot}")),
                columns.get(&format!("similar_id_{slot}_score")),
            )
        })
        .collect::<Vec<(Option<usize>, Option<usize>)>>();

    let mut records = Vec::new();
    for (row_index, row) in csv_reader.records().enumerate() {
        let line = row_index + 2;
        let row = row.with_context(|| format!("failed to read csv row at line {line}"))?;

        let id = parse_id(cell(&row, Some(id_column)))
            .with_context(|| format!("invalid id at line {line}"))?
            .with_context(|| format!("empty id at line {line}"))?;

        let mut record = Record {
            id,
            question: cell(&row, Some(question_column)).to_string(),
            answer: cell(&row, Some(answer_column)).to_string(),
            is_ad: None,
            is_fake: None,
            similar_items_info: Vec::new(),
        };

        if data_type.is_labeled() {
            record.is_ad = parse_flag(cell(&row, columns.get("is_ad")))
                .with_context(|| format!("invalid is_ad at line {line}"))?;
            record.is_fake = parse_flag(cell(&row, columns.get("is_fake")))
                .with_context(|| format!("invalid is_fake at line {line}"))?;

            for (id_position, score_position) in &link_columns {
                let Some(similar_id) = parse_id(cell(&row, *id_position))
                    .with_context(|| format!("invalid similar id at line {line}"))?
                else {
                    continue;
                };
                let score = cell(&row, *score_position);
                let similarity_score = if score.is_empty() {
                    0.0
                } else {
                    score
                        .parse::<f64>()
                        .with_context(|| format!("invalid similarity score at line {line}"))?
                };
                record.similar_items_info.push(SimilarityRef {
                    similar_id,
                    similarity_score,
                });
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Integer ids; float renderings such as `12.0` are accepted.
fn parse_id(raw: &str) -> Result<Option<RecordId>> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    if let Ok(value) = raw.parse::<RecordId>() {
        return Ok(Some(value));
    }

    let value = raw
        .parse::<f64>()
        .with_context(|| format!("not a number: {raw}"))?;
    if value.fract() != 0.0 {
        bail!("not an integer id: {raw}");
    }
    Ok(Some(value as RecordId))
}

fn parse_flag(raw: &str) -> Result<Option<bool>> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "nan" | "null" | "none" => Ok(None),
        "true" | "1" | "1.0" | "yes" | "y" => Ok(Some(true)),
        "false" | "0" | "0.0" | "no" | "n" => Ok(Some(false)),
        other => bail!("unrecognized boolean value: {other}"),
    }
}
