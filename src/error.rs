use thiserror::Error;

use crate::model::DataType;

/// Errors raised by the sampling, inspection and reporting core.
///
/// Every variant is recoverable by the caller; nothing in the core retries.
#[derive(Error, Debug)]
pub enum InspectError {
    #[error("invalid sample size {requested}: dataset holds {total} records")]
    InvalidSampleSize { requested: usize, total: usize },

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("session {0} has no inspected items to save")]
    EmptySession(String),

    #[error("no acceptance criteria configured for {0} data")]
    MissingCriteriaConfig(DataType),

    #[error("criterion {key} does not name a known {data_type} metric")]
    UnknownCriterion { key: String, data_type: DataType },

    #[error("item index {index} out of range for session of {len} items")]
    ItemOutOfRange { index: usize, len: usize },

    #[error("similarity check {check} out of range for item {item} ({len} checks)")]
    CheckOutOfRange { item: usize, check: usize, len: usize },

    #[error("sample {session_id} already exists for a different dataset")]
    SampleMismatch { session_id: String },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

pub type InspectResult<T> = std::result::Result<T, InspectError>;
