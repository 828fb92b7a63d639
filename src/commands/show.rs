use std::io::{self, Write};

use anyhow::Result;

use crate::cli::ShowArgs;
use crate::commands::{check_session_id, flag_label, item_index, open_store};
use crate::inspection::resume;

pub fn run(args: ShowArgs) -> Result<()> {
    check_session_id(&args.session)?;
    let store = open_store(&args.workspace)?;
    let draft = resume(&store, &args.session)?;
    let sample = store.get_sample(&args.session)?;

    let index = item_index(&draft.session, args.item, args.record_id, draft.cursor)?;
    let (record, judgment) = draft.session.item(index)?;
    let progress = draft.session.progress();

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(
        output,
        "Session {} round {} item {}/{} [{}]",
        draft.session.session_id(),
        draft.session.round_num(),
        index + 1,
        draft.session.len(),
        judgment.status.as_str(),
    )?;
    writeln!(
        output,
        "Progress: inspected {}/{} pass={} fail={} pass_rate={:.2}%",
        progress.inspected_count,
        progress.total,
        progress.pass_count,
        progress.fail_count,
        progress.pass_rate,
    )?;
    writeln!(output, "ID: {}", record.id)?;
    writeln!(output, "Q: {}", record.question)?;
    writeln!(output, "A: {}", record.answer)?;

    if draft.session.data_type().is_labeled() {
        writeln!(
            output,
            "Ad: original={} checked={}",
            flag_label(record.is_ad),
            flag_label(judgment.is_ad_checked),
        )?;
        writeln!(
            output,
            "Fake: original={} checked={}",
            flag_label(record.is_fake),
            flag_label(judgment.is_fake_checked),
        )?;

        for (check, similarity) in judgment.similarity_checks.iter().enumerate() {
            writeln!(
                output,
                "Similar #{}: id={} score={:.3} judged={}",
                check + 1,
                similarity.similar_id,
                similarity.similarity_score,
                flag_label(similarity.is_similar),
            )?;
            match sample.similar_items.get(&similarity.similar_id) {
                Some(similar) => {
                    writeln!(output, "\tQ: {}", similar.question)?;
                    writeln!(output, "\tA: {}", similar.answer)?;
                }
                None => writeln!(output, "\t(record not in dataset)")?,
            }
        }
    }

    if !judgment.comment.is_empty() {
        writeln!(output, "Comment: {}", judgment.comment)?;
    }
    if !judgment.inspector.is_empty() {
        writeln!(output, "Inspector: {}", judgment.inspector)?;
    }
    output.flush()?;
    Ok(())
}
