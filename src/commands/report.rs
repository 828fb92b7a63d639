use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::ReportArgs;
use crate::commands::metrics::write_metrics_text;
use crate::commands::{open_store, write_json_stdout};
use crate::criteria::CriteriaConfig;
use crate::dataset::load_csv;
use crate::metrics::evaluate;
use crate::model::DataType;
use crate::report::{GroundTruth, ReportSummary, Verdict, summarize};
use crate::store::SessionStore;
use crate::util::write_json_pretty;

pub fn run(args: ReportArgs) -> Result<()> {
    let config = CriteriaConfig::resolve(
        args.workspace.criteria_path.as_deref(),
        &args.workspace.workspace_root,
    )?;

    let preprocessed_metrics = match &args.preprocessed_dataset {
        Some(path) => {
            let records = load_csv(path, DataType::Preprocessed)?;
            Some(evaluate(&records, DataType::Preprocessed, &config)?)
        }
        None => None,
    };

    let (labeled_metrics, ground_truth) = match &args.labeled_dataset {
        Some(path) => {
            let records = load_csv(path, DataType::Labeled)?;
            let metrics = evaluate(&records, DataType::Labeled, &config)?;
            (Some(metrics), GroundTruth::from_records(&records))
        }
        None => (None, GroundTruth::default()),
    };

    let store = open_store(&args.workspace)?;
    let sessions = store.get_all()?;
    let summary = summarize(
        preprocessed_metrics,
        labeled_metrics,
        &sessions,
        &ground_truth,
        &config,
    );

    if let Some(path) = &args.output {
        write_json_pretty(path, &summary)?;
        info!(path = %path.display(), "wrote report");
    }

    if args.json {
        return write_json_stdout(&summary);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_report_text(&mut output, &summary)?;
    output.flush()?;
    Ok(())
}

fn write_report_text<W: Write>(output: &mut W, summary: &ReportSummary) -> Result<()> {
    writeln!(output, "Quality report generated {}", summary.generated_at)?;

    for (title, metrics) in [
        ("Preprocessed dataset", &summary.preprocessed_metrics),
        ("Labeled dataset", &summary.labeled_metrics),
    ] {
        writeln!(output)?;
        writeln!(output, "== {title} ==")?;
        match metrics {
            Some(metrics) => write_metrics_text(output, metrics)?,
            None => writeln!(output, "not evaluated")?,
        }
    }

    writeln!(output)?;
    writeln!(
        output,
        "== Inspection sessions ({}) ==",
        summary.inspection_sessions.len()
    )?;
    for stat in &summary.inspection_sessions {
        let label_mismatch = stat
            .label_mismatch_rate
            .map(|rate| format!("{rate:.1}%"))
            .unwrap_or_else(|| "-".to_string());
        let similarity = stat
            .similarity_accuracy
            .filter(|accuracy| accuracy.total_checks > 0)
            .map(|accuracy| {
                format!(
                    "{:.2}% ({}/{})",
                    accuracy.accuracy, accuracy.agreeing_checks, accuracy.total_checks
                )
            })
            .unwrap_or_else(|| "-".to_string());

        writeln!(
            output,
            "{}\t{}\tround={}\tinspected={}\tpass_rate={:.2}%\tlabel_mismatch={}\tsimilarity={}\tsaved={}",
            stat.verdict.as_str().to_ascii_uppercase(),
            stat.session_id,
            stat.round_num,
            stat.inspected_count,
            stat.pass_rate,
            label_mismatch,
            similarity,
            stat.saved_at,
        )?;
    }

    let count = |verdict: Verdict| {
        summary
            .inspection_sessions
            .iter()
            .filter(|stat| stat.verdict == verdict)
            .count()
    };
    writeln!(
        output,
        "Verdicts: pass={} warn={} fail={}",
        count(Verdict::Pass),
        count(Verdict::Warn),
        count(Verdict::Fail),
    )?;
    Ok(())
}
