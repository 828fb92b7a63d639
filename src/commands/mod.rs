pub mod export;
pub mod judge;
pub mod metrics;
pub mod report;
pub mod sample;
pub mod save;
pub mod sessions;
pub mod show;

use std::env;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Serialize;

use crate::cli::WorkspaceArgs;
use crate::inspection::InspectionSession;
use crate::model::RecordId;
use crate::store::SqliteStore;
use crate::util::ensure_directory;

const INSPECTOR_ENV: &str = "INSPECTION_INSPECTOR";
const DEFAULT_INSPECTOR: &str = "reviewer";

pub(crate) fn open_store(workspace: &WorkspaceArgs) -> Result<SqliteStore> {
    let db_path = workspace.db_path();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }

    SqliteStore::open(&db_path).with_context(|| format!("failed to open {}", db_path.display()))
}

pub(crate) fn check_session_id(session_id: &str) -> Result<()> {
    let pattern = Regex::new(r"^(preprocessed|labeled)_r\d+_s-?\d+$")
        .context("failed to compile session id regex")?;
    if !pattern.is_match(session_id) {
        bail!("malformed session id: {session_id} (expected <data_type>_r<round>_s<seed>)");
    }
    Ok(())
}

/// Flag value first, then `INSPECTION_INSPECTOR`, then a fixed default.
pub(crate) fn resolve_inspector(explicit: Option<String>) -> String {
    explicit
        .or_else(|| env::var(INSPECTOR_ENV).ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_INSPECTOR.to_string())
}

/// Picks the item to act on: a record id, else a 1-based `--item`
/// position, else the reviewer cursor.
pub(crate) fn item_index(
    session: &InspectionSession,
    item: Option<usize>,
    record_id: Option<RecordId>,
    cursor: usize,
) -> Result<usize> {
    if let Some(record_id) = record_id {
        return session
            .position_of(record_id)
            .with_context(|| format!("record {record_id} is not part of this sample"));
    }

    match item {
        None => Ok(cursor),
        Some(0) => bail!("item positions start at 1"),
        Some(position) => Ok(position - 1),
    }
}

pub(crate) fn write_json_stdout<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

pub(crate) fn flag_label(value: Option<bool>) -> &'static str {
    match value {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unset",
    }
}
