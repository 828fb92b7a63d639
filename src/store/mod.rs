//! Persistence for samples, drafts and saved inspection sessions.

mod sqlite;

pub use sqlite::{SampleRegistration, SqliteStore};

use crate::error::InspectResult;
use crate::inspection::SavedSession;

pub const DEFAULT_DB_FILE_NAME: &str = "inspection.sqlite";

/// Storage of saved sessions. `put` is all-or-nothing.
pub trait SessionStore {
    fn put(&mut self, session: &SavedSession) -> InspectResult<()>;

    /// Fails with `SessionNotFound` when nothing was saved under the id.
    fn get(&self, session_id: &str) -> InspectResult<SavedSession>;

    fn list(&self) -> InspectResult<Vec<String>>;

    fn get_all(&self) -> InspectResult<Vec<SavedSession>>;
}
