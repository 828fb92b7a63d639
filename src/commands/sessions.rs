use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::SessionsArgs;
use crate::commands::open_store;
use crate::inspection::SavedSession;
use crate::store::SessionStore;

pub fn run(args: SessionsArgs) -> Result<()> {
    let store = open_store(&args.workspace)?;
    let samples = store.list_samples()?;
    let saved = store
        .get_all()?
        .into_iter()
        .map(|session| (session.session_id.clone(), session))
        .collect::<HashMap<String, SavedSession>>();

    info!(
        samples = samples.len(),
        saved = saved.len(),
        "listing sessions"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    if samples.is_empty() {
        writeln!(output, "No sessions sampled yet.")?;
        output.flush()?;
        return Ok(());
    }

    for info in &samples {
        let state = match store.get_draft(&info.session_id)? {
            Some(draft) => {
                let progress = draft.session.progress();
                format!(
                    "draft {}/{} inspected",
                    progress.inspected_count, progress.total
                )
            }
            None => match saved.get(&info.session_id) {
                Some(session) => format!(
                    "saved {} pass_rate={:.2}%",
                    session.saved_at, session.pass_rate
                ),
                None => "new".to_string(),
            },
        };

        writeln!(
            output,
            "{}\t{}\tround={}\tsample={}/{}\tcreated={}\t{}",
            info.session_id,
            info.data_type,
            info.round_num,
            info.sample_size,
            info.total_size,
            info.created_at,
            state,
        )?;
    }
    output.flush()?;
    Ok(())
}
