//! Sessions command - list and drop suspended sessions

use crate::cli::SessionsCommands;
use crate::output::OutputWriter;
use crate::session::{SessionState, SessionStore};
use crate::MediapickError;
use chrono::{DateTime, Utc};
use serde::Serialize;

type Result<T> = std::result::Result<T, MediapickError>;

/// One line of `sessions list`
#[derive(Debug, Clone, Serialize)]
pub struct SessionEntry {
    pub name: String,
    pub state: SessionState,
    pub selected: usize,
    pub threshold: usize,
    pub saved_at: DateTime<Utc>,
}

/// Execute the sessions management command
///
/// # Errors
/// Returns an error if the store cannot be read or the named session does
/// not exist.
pub fn execute(
    store: &SessionStore,
    command: &SessionsCommands,
    output: &dyn OutputWriter,
    quiet: bool,
    json: bool,
) -> Result<()> {
    match command {
        SessionsCommands::List => {
            let entries = entries(store)?;
            if json {
                output.write(&serde_json::to_string_pretty(&entries)?);
            } else {
                list(&entries, output, quiet);
            }
            Ok(())
        }
        SessionsCommands::Drop { name } => {
            if !store.remove(name)? {
                return Err(MediapickError::SessionNotFound(name.clone()));
            }
            output.success(&format!("Dropped session '{name}'"));
            Ok(())
        }
    }
}

/// Summaries of every stored session
///
/// # Errors
/// Returns an error if a snapshot cannot be read or decoded.
pub fn entries(store: &SessionStore) -> Result<Vec<SessionEntry>> {
    let mut entries = Vec::new();
    for name in store.names()? {
        if let Some(snapshot) = store.load(&name)? {
            entries.push(SessionEntry {
                name,
                state: snapshot.state,
                selected: snapshot.selection.len(),
                threshold: snapshot.config.threshold(),
                saved_at: snapshot.saved_at,
            });
        }
    }
    Ok(entries)
}

fn list(entries: &[SessionEntry], output: &dyn OutputWriter, quiet: bool) {
    if entries.is_empty() {
        output.info("No suspended sessions.");
        return;
    }

    if !quiet {
        output.info("Suspended sessions:");
    }
    for entry in entries {
        if quiet {
            output.write(&entry.name);
        } else {
            output.write(&format!(
                "  {} ({}/{} selected, {}, saved {})",
                entry.name,
                entry.selected,
                entry.threshold,
                entry.state,
                entry.saved_at.format("%Y-%m-%d %H:%M")
            ));
        }
    }
}
