use super::judgment::Status;
use super::*;
use crate::error::InspectError;
use crate::model::{DataType, PersistedSample, SampleSpec};
use crate::sampling::build_sample;
use crate::store::{SessionStore, SqliteStore};
use crate::test_support::{labeled_dataset, labeled_record, record};

fn sample_of(records: Vec<crate::model::Record>) -> PersistedSample {
    let size = records.len();
    build_sample(
        &records,
        &SampleSpec {
            data_type: DataType::Labeled,
            sample_size: size,
            round_num: 1,
            seed: 1,
        },
    )
    .expect("sample should build")
}

fn linked_session() -> InspectionSession {
    InspectionSession::create(&sample_of(vec![
        labeled_record(1, true, false, &[(2, 0.91), (3, 0.55)]),
        record(2),
        record(3),
    ]))
}

#[test]
fn create_starts_every_item_pending_with_positional_checks() {
    let data = vec![
        labeled_record(1, true, false, &[(2, 0.91), (3, 0.55)]),
        record(2),
    ];
    let session = InspectionSession::create(&sample_of(data));

    assert_eq!(session.len(), 2);
    for index in 0..session.len() {
        let (source, item) = session.item(index).expect("item should exist");
        assert_eq!(item.status, Status::Pending);
        assert!(item.comment.is_empty());
        assert_eq!(item.is_ad_checked, source.is_ad);
        assert_eq!(item.is_fake_checked, source.is_fake);
    }

    let position = session.position_of(1).expect("linked record should be sampled");
    let (source, item) = session.item(position).expect("item should exist");
    assert_eq!(item.similarity_checks.len(), source.similar_items_info.len());
    for (check, link) in item.similarity_checks.iter().zip(source.similar_items_info.iter()) {
        assert_eq!(check.similar_id, link.similar_id);
        assert_eq!(check.similarity_score, link.similarity_score);
        assert!(check.is_similar.is_none());
    }

    let unlinked = session.position_of(2).expect("record should be sampled");
    assert!(session.items()[unlinked].similarity_checks.is_empty());
}

#[test]
fn similarity_toggle_twice_restores_null() {
    let mut session = linked_session();
    let index = session.position_of(1).expect("linked record should be sampled");

    assert_eq!(
        session.set_similarity_judgment(index, 0, true).expect("toggle should apply"),
        Some(true)
    );
    assert_eq!(
        session.set_similarity_judgment(index, 0, true).expect("toggle should apply"),
        None
    );
    assert_eq!(
        session.set_similarity_judgment(index, 1, false).expect("toggle should apply"),
        Some(false)
    );
    assert_eq!(
        session.set_similarity_judgment(index, 1, true).expect("toggle should apply"),
        Some(true)
    );
}

#[test]
fn similarity_check_out_of_range_is_rejected() {
    let mut session = linked_session();
    let index = session.position_of(1).expect("linked record should be sampled");

    let error = session
        .set_similarity_judgment(index, 2, true)
        .expect_err("third check does not exist");
    assert!(matches!(error, InspectError::CheckOutOfRange { check: 2, len: 2, .. }));
}

#[test]
fn status_can_flip_between_pass_and_fail() {
    let mut session = linked_session();
    session.set_status(0, Outcome::Pass, "kim").expect("status should set");
    session.set_status(0, Outcome::Fail, "lee").expect("status should set");

    let (_, item) = session.item(0).expect("item should exist");
    assert_eq!(item.status, Status::Fail);
    assert_eq!(item.inspector, "lee");
}

#[test]
fn set_status_advances_cursor_until_last_item() {
    let mut session = linked_session();
    assert_eq!(session.set_status(0, Outcome::Pass, "r").expect("status should set"), 1);
    assert_eq!(session.set_status(1, Outcome::Pass, "r").expect("status should set"), 2);
    assert_eq!(session.set_status(2, Outcome::Fail, "r").expect("status should set"), 2);
}

#[test]
fn mutators_reject_out_of_range_items() {
    let mut session = linked_session();
    assert!(matches!(
        session.set_comment(3, "late"),
        Err(InspectError::ItemOutOfRange { index: 3, len: 3 })
    ));
    assert!(session.set_ad_flag(9, Some(true)).is_err());
    assert!(session.set_fake_flag(9, None).is_err());
    assert!(session.set_status(3, Outcome::Pass, "r").is_err());
}

#[test]
fn field_mutators_touch_only_their_item() {
    let mut session = linked_session();
    session.set_comment(1, "typo in answer").expect("comment should set");
    session.set_ad_flag(1, Some(true)).expect("ad flag should set");
    session.set_fake_flag(1, Some(false)).expect("fake flag should set");

    let (_, item) = session.item(1).expect("item should exist");
    assert_eq!(item.comment, "typo in answer");
    assert_eq!(item.is_ad_checked, Some(true));
    assert_eq!(item.is_fake_checked, Some(false));
    assert_eq!(item.status, Status::Pending);

    let (source, untouched) = session.item(0).expect("item should exist");
    assert!(untouched.comment.is_empty());
    assert_eq!(untouched.is_ad_checked, source.is_ad);
}

#[test]
fn progress_of_untouched_session_is_zero_not_nan() {
    let session = linked_session();
    let progress = session.progress();

    assert_eq!(progress.total, 3);
    assert_eq!(progress.inspected_count, 0);
    assert_eq!(progress.pass_rate, 0.0);
    assert!(!progress.pass_rate.is_nan());
}

#[test]
fn progress_counts_pass_and_fail() {
    let mut session = linked_session();
    session.set_status(0, Outcome::Pass, "r").expect("status should set");
    session.set_status(1, Outcome::Pass, "r").expect("status should set");
    session.set_status(2, Outcome::Fail, "r").expect("status should set");

    let progress = session.progress();
    assert_eq!(progress.inspected_count, 3);
    assert_eq!(progress.pass_count, 2);
    assert_eq!(progress.fail_count, 1);
    assert_eq!(progress.pass_rate, 66.67);
    assert!((0.0..=100.0).contains(&progress.pass_rate));
}

#[test]
fn empty_session_save_fails_without_writing() {
    let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
    let session = linked_session();

    let error = session
        .save(&mut store)
        .expect_err("nothing inspected means nothing to save");
    assert!(matches!(error, InspectError::EmptySession(_)));
    assert!(store.list().expect("sessions should list").is_empty());
}

#[test]
fn save_denormalizes_source_rows() {
    let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
    let mut session = linked_session();
    let index = session.position_of(1).expect("linked record should be sampled");
    session.set_status(index, Outcome::Pass, "r").expect("status should set");
    session.set_ad_flag(index, Some(false)).expect("ad flag should set");

    let saved = session.save(&mut store).expect("session should save");
    let item = &saved.items[index];

    assert_eq!(item.question, "question 1");
    assert_eq!(item.answer, "answer 1");
    assert_eq!(item.original_is_ad, Some(true));
    assert_eq!(item.original_is_fake, Some(false));
    assert_eq!(item.judgment.is_ad_checked, Some(false));
    assert_eq!(saved.total_items, 3);
    assert_eq!(saved.inspected_count, 1);
    assert_eq!(saved.pass_rate, 100.0);
    assert_eq!(store.get(session.session_id()).expect("saved session should load"), saved);
}

#[test]
fn resume_without_sample_is_session_not_found() {
    let store = SqliteStore::open_in_memory().expect("in-memory store should open");
    let error = resume(&store, "labeled_r1_s42").expect_err("no sample was drawn");
    assert!(matches!(error, InspectError::SessionNotFound(_)));
}

#[test]
fn resume_prefers_draft_then_saved_then_fresh() {
    let mut store = SqliteStore::open_in_memory().expect("in-memory store should open");
    let sample = build_sample(
        &labeled_dataset(30),
        &SampleSpec {
            data_type: DataType::Labeled,
            sample_size: 4,
            round_num: 1,
            seed: 42,
        },
    )
    .expect("sample should build");
    store.put_sample(&sample).expect("sample should register");
    let session_id = sample.info.session_id.clone();

    let fresh = resume(&store, &session_id).expect("fresh session should open");
    assert_eq!(fresh.cursor, 0);
    assert_eq!(fresh.session.progress().inspected_count, 0);

    let mut draft = fresh;
    draft.cursor = draft
        .session
        .set_status(0, Outcome::Fail, "r")
        .expect("status should set");
    store.put_draft(&draft).expect("draft should persist");

    let resumed = resume(&store, &session_id).expect("draft should resume");
    assert_eq!(resumed, draft);
    assert_eq!(resume(&store, &session_id).expect("draft should resume"), resumed);

    resumed.session.save(&mut store).expect("session should save");
    let reopened = resume(&store, &session_id).expect("saved session should reopen");
    assert_eq!(reopened.cursor, 1);
    assert_eq!(reopened.session.items()[0].status, Status::Fail);
}

#[test]
fn label_checks_start_from_source_labels() {
    let session = InspectionSession::create(&sample_of(vec![
        labeled_record(1, true, false, &[]),
        labeled_record(2, false, true, &[]),
        record(3),
    ]));

    let ad = session.position_of(1).expect("record should be sampled");
    let fake = session.position_of(2).expect("record should be sampled");
    let unlabeled = session.position_of(3).expect("record should be sampled");

    assert_eq!(session.items()[ad].is_ad_checked, Some(true));
    assert_eq!(session.items()[ad].is_fake_checked, Some(false));
    assert_eq!(session.items()[fake].is_ad_checked, Some(false));
    assert_eq!(session.items()[fake].is_fake_checked, Some(true));
    assert_eq!(session.items()[unlabeled].is_ad_checked, None);
}
