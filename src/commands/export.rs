use anyhow::{Result, bail};
use tracing::info;

use crate::cli::ExportArgs;
use crate::commands::{check_session_id, open_store};
use crate::error::InspectError;
use crate::export::write_csv_file;
use crate::store::SessionStore;

pub fn run(args: ExportArgs) -> Result<()> {
    check_session_id(&args.session)?;
    let store = open_store(&args.workspace)?;
    let saved = match store.get(&args.session) {
        Ok(saved) => saved,
        Err(InspectError::SessionNotFound(_)) => {
            let saved_ids = store.list()?;
            let available = if saved_ids.is_empty() {
                "none".to_string()
            } else {
                saved_ids.join(", ")
            };
            bail!(
                "session {} has not been saved yet (saved sessions: {available})",
                args.session
            );
        }
        Err(err) => return Err(err.into()),
    };

    let output_path = args.output.unwrap_or_else(|| {
        args.workspace
            .workspace_root
            .join("exports")
            .join(format!("inspection_{}.csv", saved.session_id))
    });
    write_csv_file(&output_path, &saved)?;

    info!(
        session_id = %saved.session_id,
        items = saved.items.len(),
        path = %output_path.display(),
        "exported inspection session"
    );
    Ok(())
}
