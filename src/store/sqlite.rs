use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info};

use super::SessionStore;
use crate::error::{InspectError, InspectResult};
use crate::inspection::{Draft, SavedSession};
use crate::model::{PersistedSample, SampleInfo};
use crate::util::now_utc_string;

const STORE_SCHEMA_VERSION: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRegistration {
    Created,
    Existing,
}

pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &Path) -> InspectResult<Self> {
        let connection = Connection::open_with_flags(
            db_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        connection.pragma_update(None, "journal_mode", "WAL")?;
        connection.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self { connection };
        store.ensure_schema()?;
        debug!(path = %db_path.display(), "session store opened");
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> InspectResult<Self> {
        let store = Self {
            connection: Connection::open_in_memory()?,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> InspectResult<()> {
        self.connection.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS samples (
              session_id TEXT PRIMARY KEY,
              data_type TEXT NOT NULL,
              round_num INTEGER NOT NULL,
              seed INTEGER NOT NULL,
              created_at TEXT NOT NULL,
              dataset_fingerprint TEXT NOT NULL,
              payload TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS drafts (
              session_id TEXT PRIMARY KEY,
              cursor INTEGER NOT NULL,
              updated_at TEXT NOT NULL,
              payload TEXT NOT NULL,
              FOREIGN KEY(session_id) REFERENCES samples(session_id)
            );

            CREATE TABLE IF NOT EXISTS sessions (
              session_id TEXT PRIMARY KEY,
              data_type TEXT NOT NULL,
              saved_at TEXT NOT NULL,
              payload TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_saved_at ON sessions(saved_at);
            ",
        )?;

        self.connection.execute(
            "INSERT OR IGNORE INTO metadata(key, value) VALUES('store_schema_version', ?1)",
            params![STORE_SCHEMA_VERSION],
        )?;
        Ok(())
    }

    /// Registers a sample. Re-registering the same session id against the
    /// same dataset keeps the original; a different dataset is rejected.
    pub fn put_sample(&self, sample: &PersistedSample) -> InspectResult<SampleRegistration> {
        let existing = self
            .connection
            .query_row(
                "SELECT dataset_fingerprint FROM samples WHERE session_id = ?1",
                params![sample.info.session_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        if let Some(fingerprint) = existing {
            if fingerprint != sample.info.dataset_fingerprint {
                return Err(InspectError::SampleMismatch {
                    session_id: sample.info.session_id.clone(),
                });
            }
            return Ok(SampleRegistration::Existing);
        }

        self.connection.execute(
            "
            INSERT INTO samples(session_id, data_type, round_num, seed, created_at, dataset_fingerprint, payload)
            VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
            params![
                sample.info.session_id,
                sample.info.data_type.as_str(),
                sample.info.round_num,
                sample.info.seed,
                sample.info.created_at,
                sample.info.dataset_fingerprint,
                serde_json::to_string(sample)?,
            ],
        )?;

        info!(
            session_id = %sample.info.session_id,
            sample_size = sample.info.sample_size,
            "sample registered"
        );
        Ok(SampleRegistration::Created)
    }

    pub fn get_sample(&self, session_id: &str) -> InspectResult<PersistedSample> {
        let payload = self
            .connection
            .query_row(
                "SELECT payload FROM samples WHERE session_id = ?1",
                params![session_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| InspectError::SessionNotFound(session_id.to_string()))?;

        Ok(serde_json::from_str(&payload)?)
    }

    pub fn list_samples(&self) -> InspectResult<Vec<SampleInfo>> {
        let mut statement = self
            .connection
            .prepare("SELECT payload FROM samples ORDER BY created_at DESC, session_id ASC")?;
        let mut rows = statement.query([])?;

        let mut out = Vec::<SampleInfo>::new();
        while let Some(row) = rows.next()? {
            let payload: String = row.get(0)?;
            let sample: PersistedSample = serde_json::from_str(&payload)?;
            out.push(sample.info);
        }
        Ok(out)
    }

    pub fn get_draft(&self, session_id: &str) -> InspectResult<Option<Draft>> {
        let payload = self
            .connection
            .query_row(
                "SELECT payload FROM drafts WHERE session_id = ?1",
                params![session_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        match payload {
            Some(payload) => Ok(Some(serde_json::from_str(&payload)?)),
            None => Ok(None),
        }
    }

    pub fn put_draft(&self, draft: &Draft) -> InspectResult<()> {
        self.connection.execute(
            "
            INSERT INTO drafts(session_id, cursor, updated_at, payload)
            VALUES(?1, ?2, ?3, ?4)
            ON CONFLICT(session_id) DO UPDATE SET
              cursor=excluded.cursor,
              updated_at=excluded.updated_at,
              payload=excluded.payload
            ",
            params![
                draft.session.session_id(),
                draft.cursor as i64,
                now_utc_string(),
                serde_json::to_string(draft)?,
            ],
        )?;
        Ok(())
    }

    pub fn has_draft(&self, session_id: &str) -> InspectResult<bool> {
        let found = self
            .connection
            .query_row(
                "SELECT 1 FROM drafts WHERE session_id = ?1",
                params![session_id],
                |_| Ok(1_i64),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

impl SessionStore for SqliteStore {
    fn put(&mut self, session: &SavedSession) -> InspectResult<()> {
        let payload = serde_json::to_string(session)?;

        let transaction = self.connection.transaction()?;
        transaction.execute(
            "
            INSERT INTO sessions(session_id, data_type, saved_at, payload)
            VALUES(?1, ?2, ?3, ?4)
            ON CONFLICT(session_id) DO UPDATE SET
              data_type=excluded.data_type,
              saved_at=excluded.saved_at,
              payload=excluded.payload
            ",
            params![
                session.session_id,
                session.data_type.as_str(),
                session.saved_at,
                payload,
            ],
        )?;
        transaction.execute(
            "DELETE FROM drafts WHERE session_id = ?1",
            params![session.session_id],
        )?;
        transaction.commit()?;
        Ok(())
    }

    fn get(&self, session_id: &str) -> InspectResult<SavedSession> {
        let payload = self
            .connection
            .query_row(
                "SELECT payload FROM sessions WHERE session_id = ?1",
                params![session_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| InspectError::SessionNotFound(session_id.to_string()))?;

        Ok(serde_json::from_str(&payload)?)
    }

    fn list(&self) -> InspectResult<Vec<String>> {
        let mut statement = self
            .connection
            .prepare("SELECT session_id FROM sessions ORDER BY saved_at DESC, session_id ASC")?;
        let ids = statement
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<String>, rusqlite::Error>>()?;
        Ok(ids)
    }

    fn get_all(&self) -> InspectResult<Vec<SavedSession>> {
        let mut statement = self
            .connection
            .prepare("SELECT payload FROM sessions ORDER BY saved_at DESC, session_id ASC")?;
        let mut rows = statement.query([])?;

        let mut out = Vec::<SavedSession>::new();
        while let Some(row) = rows.next()? {
            let payload: String = row.get(0)?;
            out.push(serde_json::from_str(&payload)?);
        }
        Ok(out)
    }
}
