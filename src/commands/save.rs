use std::io::{self, Write};

use anyhow::Result;
use tracing::info;

use crate::cli::SaveArgs;
use crate::commands::{check_session_id, open_store};
use crate::criteria::CriteriaConfig;
use crate::error::{InspectError, InspectResult};
use crate::inspection::{SavedSession, resume};
use crate::report::{GroundTruth, session_stat};
use crate::store::{SessionStore, SqliteStore};

#[derive(Debug)]
pub(crate) enum SaveOutcome {
    Written(SavedSession),
    Unchanged(SavedSession),
}

pub fn run(args: SaveArgs) -> Result<()> {
    check_session_id(&args.session)?;
    let config = CriteriaConfig::resolve(
        args.workspace.criteria_path.as_deref(),
        &args.workspace.workspace_root,
    )?;

    let mut store = open_store(&args.workspace)?;
    let (saved, written) = match save_session(&mut store, &args.session)? {
        SaveOutcome::Written(saved) => (saved, true),
        SaveOutcome::Unchanged(saved) => (saved, false),
    };
    let stat = session_stat(&saved, &GroundTruth::default(), &config);

    let mut output = io::BufWriter::new(io::stdout().lock());
    if written {
        writeln!(output, "Saved {} at {}", saved.session_id, saved.saved_at)?;
    } else {
        writeln!(
            output,
            "No pending changes; {} was last saved at {}",
            saved.session_id, saved.saved_at
        )?;
    }
    writeln!(
        output,
        "Inspected {}/{} pass={} fail={} pass_rate={:.2}%",
        saved.inspected_count, saved.total_items, saved.pass_count, saved.fail_count, saved.pass_rate,
    )?;
    if let Some(rate) = stat.label_mismatch_rate {
        writeln!(output, "Label mismatch rate: {rate:.1}%")?;
    }
    writeln!(output, "Verdict: {}", stat.verdict.as_str())?;
    output.flush()?;
    Ok(())
}

/// Persists the pending draft. Without a draft an existing save is returned
/// untouched; a session never judged fails with `EmptySession`.
pub(crate) fn save_session(store: &mut SqliteStore, session_id: &str) -> InspectResult<SaveOutcome> {
    if !store.has_draft(session_id)? {
        match store.get(session_id) {
            Ok(saved) => {
                info!(session_id, saved_at = %saved.saved_at, "no pending draft; save kept");
                return Ok(SaveOutcome::Unchanged(saved));
            }
            Err(InspectError::SessionNotFound(_)) => {}
            Err(err) => return Err(err),
        }
    }

    let draft = resume(store, session_id)?;
    Ok(SaveOutcome::Written(draft.session.save(store)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspection::{Draft, InspectionSession, Outcome};
    use crate::model::{DataType, SampleSpec};
    use crate::sampling::build_sample;
    use crate::test_support::dataset;

    fn store_with_sample() -> (SqliteStore, String) {
        let sample = build_sample(
            &dataset(10),
            &SampleSpec {
                data_type: DataType::Preprocessed,
                sample_size: 4,
                round_num: 1,
                seed: 3,
            },
        )
        .expect("sample should build");
        let store = SqliteStore::open_in_memory().expect("in-memory store should open");
        store.put_sample(&sample).expect("sample should register");
        (store, sample.info.session_id)
    }

    #[test]
    fn saving_without_a_draft_keeps_the_existing_save() {
        let (mut store, session_id) = store_with_sample();
        let sample = store.get_sample(&session_id).expect("sample should load");
        let mut session = InspectionSession::create(&sample);
        let cursor = session
            .set_status(0, Outcome::Pass, "reviewer")
            .expect("status should set");
        store
            .put_draft(&Draft { session, cursor })
            .expect("draft should persist");

        let first = match save_session(&mut store, &session_id).expect("draft should save") {
            SaveOutcome::Written(saved) => saved,
            other => panic!("expected a write, got {other:?}"),
        };
        let mut stale = first.clone();
        stale.saved_at = "2000-01-01T00:00:00Z".to_string();
        store.put(&stale).expect("save should overwrite");

        match save_session(&mut store, &session_id).expect("second save should succeed") {
            SaveOutcome::Unchanged(saved) => {
                assert_eq!(saved.saved_at, "2000-01-01T00:00:00Z");
                assert_eq!(saved.items, first.items);
            }
            other => panic!("expected the existing save, got {other:?}"),
        }
        assert_eq!(
            store.get(&session_id).expect("save should load").saved_at,
            "2000-01-01T00:00:00Z"
        );
    }

    #[test]
    fn saving_an_untouched_session_is_empty() {
        let (mut store, session_id) = store_with_sample();
        let error = save_session(&mut store, &session_id).expect_err("nothing was judged");
        assert!(matches!(error, InspectError::EmptySession(_)));
    }
}
