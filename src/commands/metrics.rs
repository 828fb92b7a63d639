use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::MetricsArgs;
use crate::commands::write_json_stdout;
use crate::criteria::CriteriaConfig;
use crate::dataset::load_csv;
use crate::metrics::{QualityMetrics, evaluate};
use crate::util::write_json_pretty;

pub fn run(args: MetricsArgs) -> Result<()> {
    let config = CriteriaConfig::resolve(
        args.workspace.criteria_path.as_deref(),
        &args.workspace.workspace_root,
    )?;
    let records = load_csv(&args.dataset, args.data_type)?;
    let metrics = evaluate(&records, args.data_type, &config)?;

    info!(
        data_type = %metrics.data_type,
        records = metrics.total_records,
        all_passed = metrics.all_passed,
        "metrics evaluated"
    );

    if let Some(path) = &args.output {
        write_json_pretty(path, &metrics)?;
        info!(path = %path.display(), "wrote metrics");
    }

    if args.json {
        return write_json_stdout(&metrics);
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    write_metrics_text(&mut output, &metrics)?;
    output.flush()?;
    Ok(())
}

pub(crate) fn write_metrics_text<W: Write>(output: &mut W, metrics: &QualityMetrics) -> Result<()> {
    writeln!(
        output,
        "Dataset: {} records={} duplicate_rate={:.2}% max_missing_rate={:.2}%",
        metrics.data_type,
        metrics.total_records,
        metrics.duplicate_rate,
        metrics.max_missing_rate,
    )?;

    if metrics.data_type.is_labeled() {
        writeln!(
            output,
            "Labels: ads={} fakes={} with_similar={} label_missing_rate={:.2}%",
            metrics.ad_count.unwrap_or(0),
            metrics.fake_count.unwrap_or(0),
            metrics.similar_count.unwrap_or(0),
            metrics.label_missing_rate.unwrap_or(0.0),
        )?;
    }

    writeln!(output, "Criteria:")?;
    for (key, criterion) in &metrics.criteria {
        writeln!(
            output,
            "\t[{}]\t{key}\t{:.2} {} {:.2}\t{}",
            if criterion.passed { "PASS" } else { "FAIL" },
            criterion.value,
            criterion.direction.symbol(),
            criterion.threshold,
            criterion.description,
        )?;
    }
    writeln!(
        output,
        "Overall: {}",
        if metrics.all_passed { "PASS" } else { "FAIL" }
    )?;
    Ok(())
}
