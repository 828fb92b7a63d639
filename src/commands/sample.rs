use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::SampleArgs;
use crate::commands::open_store;
use crate::dataset::load_csv;
use crate::model::SampleSpec;
use crate::sampling::build_sample;
use crate::store::SampleRegistration;

pub fn run(args: SampleArgs) -> Result<()> {
    let records = load_csv(&args.dataset, args.data_type)?;
    let spec = SampleSpec {
        data_type: args.data_type,
        sample_size: args.sample_size,
        round_num: args.round_num,
        seed: args.seed,
    };

    let sample = build_sample(&records, &spec)?;
    let store = open_store(&args.workspace)?;
    let registration = store.put_sample(&sample)?;

    match registration {
        SampleRegistration::Created => info!(
            session_id = %sample.info.session_id,
            "new session ready for inspection"
        ),
        SampleRegistration::Existing => info!(
            session_id = %sample.info.session_id,
            "sample already registered; existing session kept"
        ),
    }

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "Session: {}", sample.info.session_id)?;
    writeln!(
        output,
        "Sampled {} of {} records (round {}, seed {})",
        sample.info.sample_size, sample.info.total_size, sample.info.round_num, sample.info.seed,
    )?;
    if sample.info.data_type.is_labeled() {
        writeln!(output, "Similar items attached: {}", sample.similar_items.len())?;
    }
    output.flush()?;
    Ok(())
}
