use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::cli::JudgeArgs;
use crate::commands::{check_session_id, flag_label, item_index, open_store, resolve_inspector};
use crate::inspection::resume;

pub fn run(args: JudgeArgs) -> Result<()> {
    check_session_id(&args.session)?;
    let similarity_calls = parse_similarity_calls(&args.similar)?;
    let inspector = resolve_inspector(args.inspector);

    let store = open_store(&args.workspace)?;
    let mut draft = resume(&store, &args.session)?;
    let index = item_index(&draft.session, args.item, args.record_id, draft.cursor)?;

    if let Some(comment) = &args.comment {
        draft.session.set_comment(index, comment)?;
    }
    if let Some(flag) = args.ad {
        draft.session.set_ad_flag(index, flag.as_option())?;
    }
    if let Some(flag) = args.fake {
        draft.session.set_fake_flag(index, flag.as_option())?;
    }
    for (check, value) in similarity_calls {
        let stored = draft.session.set_similarity_judgment(index, check, value)?;
        info!(
            item = index + 1,
            check = check + 1,
            judged = flag_label(stored),
            "similarity judgment recorded"
        );
    }

    draft.cursor = index;
    if let Some(status) = args.status {
        draft.cursor = draft.session.set_status(index, status.into(), &inspector)?;
    }
    store.put_draft(&draft)?;

    let (record, judgment) = draft.session.item(index)?;
    let progress = draft.session.progress();
    info!(
        session_id = %draft.session.session_id(),
        item_id = record.id,
        status = judgment.status.as_str(),
        inspector = %inspector,
        "judgment recorded"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(
        output,
        "Item {}/{} (id {}) is {}; next item {}",
        index + 1,
        draft.session.len(),
        record.id,
        judgment.status.as_str(),
        draft.cursor + 1,
    )?;
    writeln!(
        output,
        "Progress: inspected {}/{} pass_rate={:.2}%",
        progress.inspected_count, progress.total, progress.pass_rate,
    )?;
    output.flush()?;
    Ok(())
}

/// Parses `<check>=yes|no` pairs into 0-based check indexes.
fn parse_similarity_calls(raw: &[String]) -> Result<Vec<(usize, bool)>> {
    let pattern = Regex::new(r"(?i)^\s*(\d+)\s*=\s*(yes|no|true|false)\s*$")
        .context("failed to compile similarity judgment regex")?;

    let mut calls = Vec::with_capacity(raw.len());
    for value in raw {
        let captures = pattern
            .captures(value)
            .with_context(|| format!("expected <check>=yes|no, got: {value}"))?;

        let check = captures
            .get(1)
            .map(|m| m.as_str())
            .context("missing check capture")?
            .parse::<usize>()
            .with_context(|| format!("invalid check number: {value}"))?;
        if check == 0 {
            bail!("similarity checks are numbered from 1: {value}");
        }

        let is_similar = captures
            .get(2)
            .map(|m| m.as_str().to_ascii_lowercase())
            .context("missing judgment capture")?;
        calls.push((check - 1, matches!(is_similar.as_str(), "yes" | "true")));
    }
    Ok(calls)
}
