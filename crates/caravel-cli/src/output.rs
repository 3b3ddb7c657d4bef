//! Renderers for session state and the dispatch log.

use anyhow::anyhow;
use caravel_client::{EntryBody, OutputLog, SessionController};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Prints the dispatch log in arrival order.
///
/// Table mode writes one line per entry: text verbatim, JSON bodies compact,
/// download controls as an indented filename list. JSON mode emits the whole
/// log as one document, timestamps included.
pub(crate) fn print_log(log: &OutputLog, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = log.chronological().collect();
            let text = serde_json::to_string_pretty(&entries)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => {
            for entry in log.chronological() {
                match &entry.body {
                    EntryBody::Text(text) => println!("{text}"),
                    EntryBody::Json(value) => println!("{value}"),
                    EntryBody::Downloads(controls) => {
                        for control in controls {
                            println!("  {}", control.filename);
                        }
                    }
                }
            }
        }
    }
    Ok(())
}

/// Prints who is signed in. The stored token never appears in the output.
pub(crate) fn render_session(session: &SessionController, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => {
            let body = session.profile().map_or_else(
                || json!({"authenticated": false}),
                |profile| {
                    json!({
                        "authenticated": true,
                        "user": {
                            "id": profile.id,
                            "name": profile.display_name,
                            "role": profile.role,
                        }
                    })
                },
            );
            let text = serde_json::to_string_pretty(&body)
                .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
            println!("{text}");
        }
        OutputFormat::Table => match session.profile() {
            Some(profile) => println!("signed in as: {}", profile.display_label()),
            None => println!("not signed in"),
        },
    }
    Ok(())
}
