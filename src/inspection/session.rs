use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::judgment::{ItemJudgment, Outcome, Status};
use crate::error::{InspectError, InspectResult};
use crate::model::{DataType, PersistedSample, Record, RecordId};
use crate::store::{SessionStore, SqliteStore};
use crate::util::{now_utc_string, percentage, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub inspected_count: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pass_rate: f64,
}

impl Progress {
    pub fn of<'a, I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = &'a Status>,
    {
        let mut progress = Self {
            total: 0,
            inspected_count: 0,
            pass_count: 0,
            fail_count: 0,
            pass_rate: 0.0,
        };
        for status in statuses {
            progress.total += 1;
            match status {
                Status::Pending => {}
                Status::Pass => progress.pass_count += 1,
                Status::Fail => progress.fail_count += 1,
            }
        }
        progress.inspected_count = progress.pass_count + progress.fail_count;
        progress.pass_rate = round_to(percentage(progress.pass_count, progress.inspected_count), 2);
        progress
    }
}

/// A judgment as persisted, with the source row denormalized so reports
/// never need the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    #[serde(flatten)]
    pub judgment: ItemJudgment,
    pub question: String,
    pub answer: String,
    pub original_is_ad: Option<bool>,
    pub original_is_fake: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedSession {
    pub session_id: String,
    pub data_type: DataType,
    pub round_num: u32,
    pub sample_size: usize,
    pub seed: i64,
    pub created_at: String,
    pub saved_at: String,
    pub total_items: usize,
    pub inspected_count: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pass_rate: f64,
    pub items: Vec<SavedItem>,
}

impl SavedSession {
    pub fn progress(&self) -> Progress {
        Progress::of(self.items.iter().map(|item| &item.judgment.status))
    }
}

/// The in-progress record of one sampling run.
///
/// `records[i]` is the source row of `items[i]`; both keep sample order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectionSession {
    session_id: String,
    data_type: DataType,
    sample_size: usize,
    round_num: u32,
    seed: i64,
    created_at: String,
    records: Vec<Record>,
    items: Vec<ItemJudgment>,
}

impl InspectionSession {
    pub fn create(sample: &PersistedSample) -> Self {
        let items = sample
            .records
            .iter()
            .map(ItemJudgment::pending)
            .collect::<Vec<ItemJudgment>>();

        Self {
            session_id: sample.info.session_id.clone(),
            data_type: sample.info.data_type,
            sample_size: sample.info.sample_size,
            round_num: sample.info.round_num,
            seed: sample.info.seed,
            created_at: sample.info.created_at.clone(),
            records: sample.records.clone(),
            items,
        }
    }

    /// Rebuilds a session from a previous save so it can be amended.
    /// Items missing from the save start pending again.
    pub fn from_saved(sample: &PersistedSample, saved: &SavedSession) -> Self {
        let mut session = Self::create(sample);
        for item in &mut session.items {
            let previous = saved.items.iter().find(|previous| {
                previous.judgment.item_id == item.item_id
                    && previous.judgment.similarity_checks.len() == item.similarity_checks.len()
            });
            if let Some(previous) = previous {
                *item = previous.judgment.clone();
            }
        }
        session
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn round_num(&self) -> u32 {
        self.round_num
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[ItemJudgment] {
        &self.items
    }

    pub fn item(&self, index: usize) -> InspectResult<(&Record, &ItemJudgment)> {
        match (self.records.get(index), self.items.get(index)) {
            (Some(record), Some(item)) => Ok((record, item)),
            _ => Err(self.out_of_range(index)),
        }
    }

    pub fn position_of(&self, item_id: RecordId) -> Option<usize> {
        self.items.iter().position(|item| item.item_id == item_id)
    }

    /// Sets the status and returns the cursor position that follows it.
    pub fn set_status(&mut self, index: usize, outcome: Outcome, inspector: &str) -> InspectResult<usize> {
        let len = self.items.len();
        let item = self.item_mut(index)?;
        item.status = outcome.into();
        item.inspector = inspector.to_string();

        debug!(index, status = item.status.as_str(), inspector, "status set");
        Ok(if index + 1 < len { index + 1 } else { index })
    }

    pub fn set_comment(&mut self, index: usize, text: &str) -> InspectResult<()> {
        self.item_mut(index)?.comment = text.to_string();
        Ok(())
    }

    pub fn set_ad_flag(&mut self, index: usize, value: Option<bool>) -> InspectResult<()> {
        self.item_mut(index)?.is_ad_checked = value;
        Ok(())
    }

    pub fn set_fake_flag(&mut self, index: usize, value: Option<bool>) -> InspectResult<()> {
        self.item_mut(index)?.is_fake_checked = value;
        Ok(())
    }

    pub fn set_similarity_judgment(
        &mut self,
        index: usize,
        check_index: usize,
        value: bool,
    ) -> InspectResult<Option<bool>> {
        let item = self.item_mut(index)?;
        let len = item.similarity_checks.len();
        let check = item
            .similarity_checks
            .get_mut(check_index)
            .ok_or(InspectError::CheckOutOfRange {
                item: index,
                check: check_index,
                len,
            })?;
        check.toggle(value);
        Ok(check.is_similar)
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self.items.iter().map(|item| &item.status))
    }

    pub fn save<S: SessionStore>(&self, store: &mut S) -> InspectResult<SavedSession> {
        let progress = self.progress();
        if progress.inspected_count == 0 {
            return Err(InspectError::EmptySession(self.session_id.clone()));
        }

        let saved = self.to_saved(progress);
        store.put(&saved)?;

        info!(
            session_id = %saved.session_id,
            inspected = saved.inspected_count,
            pass_rate = saved.pass_rate,
            "inspection session saved"
        );
        Ok(saved)
    }

    fn to_saved(&self, progress: Progress) -> SavedSession {
        let items = self
            .records
            .iter()
            .zip(self.items.iter())
            .map(|(record, judgment)| SavedItem {
                judgment: judgment.clone(),
                question: record.question.clone(),
                answer: record.answer.clone(),
                original_is_ad: record.is_ad,
                original_is_fake: record.is_fake,
            })
            .collect::<Vec<SavedItem>>();

        SavedSession {
            session_id: self.session_id.clone(),
            data_type: self.data_type,
            round_num: self.round_num,
            sample_size: self.sample_size,
            seed: self.seed,
            created_at: self.created_at.clone(),
            saved_at: now_utc_string(),
            total_items: progress.total,
            inspected_count: progress.inspected_count,
            pass_count: progress.pass_count,
            fail_count: progress.fail_count,
            pass_rate: progress.pass_rate,
            items,
        }
    }

    fn item_mut(&mut self, index: usize) -> InspectResult<&mut ItemJudgment> {
        let len = self.items.len();
        self.items
            .get_mut(index)
            .ok_or(InspectError::ItemOutOfRange { index, len })
    }

    fn out_of_range(&self, index: usize) -> InspectError {
        InspectError::ItemOutOfRange {
            index,
            len: self.items.len(),
        }
    }
}

/// An in-progress session plus the reviewer's cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub session: InspectionSession,
    pub cursor: usize,
}

/// Opens the working copy of a session: the pending draft if one exists,
/// else the last save reopened for amendment, else a fresh session over the
/// persisted sample. A session id without a persisted sample is an error.
pub fn resume(store: &SqliteStore, session_id: &str) -> InspectResult<Draft> {
    if let Some(draft) = store.get_draft(session_id)? {
        debug!(session_id, cursor = draft.cursor, "resuming draft");
        return Ok(draft);
    }

    let sample = store.get_sample(session_id)?;
    let session = match store.get(session_id) {
        Ok(saved) => {
            warn!(session_id, saved_at = %saved.saved_at, "reopening saved session");
            InspectionSession::from_saved(&sample, &saved)
        }
        Err(InspectError::SessionNotFound(_)) => InspectionSession::create(&sample),
        Err(err) => return Err(err),
    };

    let cursor = session
        .items()
        .iter()
        .position(|item| !item.status.is_inspected())
        .unwrap_or(0);
    Ok(Draft { session, cursor })
}
