use std::path::Path;

use agent_session::{AgentMessage, Role};
use notebook_format::{write_notebook, Cell, Notebook, Output};

use crate::error::TranscodeError;
use crate::headings::with_heading;

/// Converts a chat log into a notebook, one cell per narration or code block.
///
/// An assistant entry carrying both narration and code becomes a markdown cell
/// followed by a code cell. An assistant entry carrying neither still yields a
/// markdown cell holding only the heading.
#[must_use]
pub fn export_log(messages: &[AgentMessage]) -> Notebook {
    let mut notebook = Notebook::new();

    for message in messages {
        match message.role {
            Role::User => {
                notebook.push(Cell::markdown(with_heading(Role::User, &message.message)));
            }
            Role::Assistant => {
                if !message.message.is_empty() || !message.has_code() {
                    notebook.push(Cell::markdown(with_heading(
                        Role::Assistant,
                        &message.message,
                    )));
                }

                if let Some(code) = &message.code {
                    let output = message.output.clone().unwrap_or_default();
                    notebook.push(Cell::code(
                        with_heading(Role::Assistant, code),
                        vec![Output::stdout(output)],
                    ));
                }
            }
        }
    }

    tracing::debug!(
        messages = messages.len(),
        cells = notebook.cells.len(),
        "exported chat log"
    );
    notebook
}

/// Exports `messages` and writes the notebook to `path`.
pub fn save_notebook(messages: &[AgentMessage], path: &Path) -> Result<Notebook, TranscodeError> {
    let notebook = export_log(messages);
    write_notebook(path, &notebook)?;
    tracing::info!(path = %path.display(), cells = notebook.cells.len(), "saved notebook");
    Ok(notebook)
}
