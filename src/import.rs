use std::path::Path;

use agent_session::{AgentMessage, ExecutorKind, Role, Session};
use notebook_format::{read_notebook, Cell, Notebook};

use crate::error::TranscodeError;
use crate::headings::split_heading;
use crate::transcript::Transcript;

/// Narration that opens every imported log.
pub const NOTEBOOK_PLACEHOLDER: &str = "Here are the contents of a Jupyter notebook";

/// Language recorded on every replayed code entry. Cells carry no language of their own.
pub const REPLAY_LANGUAGE: &str = "python";

const SHELL_PREFIX: char = '!';

/// Result of replaying a notebook into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// Reconstructed log, starting with the placeholder entry.
    pub messages: Vec<AgentMessage>,
    pub transcript: Transcript,
}

/// Picks the executor for a code cell body and the code it receives.
///
/// A leading `!` sends the rest of the text to the shell; anything else goes
/// to python unchanged.
#[must_use]
pub fn route_code(body: &str) -> (ExecutorKind, &str) {
    match body.strip_prefix(SHELL_PREFIX) {
        Some(command) => (ExecutorKind::Shell, command),
        None => (ExecutorKind::Python, body),
    }
}

/// Replays `notebook` into `session`, re-executing every code cell.
///
/// The session is not reset here; callers that want a clean replay reset it
/// first (see [`load_notebook`]). The reconstructed log is appended to the
/// session once every cell has been processed. `progress` observes the
/// transcript after each visible change.
pub fn import_notebook(
    session: &mut Session,
    notebook: &Notebook,
    progress: &mut dyn FnMut(&Transcript),
) -> Result<ImportOutcome, TranscodeError> {
    let mut messages = vec![AgentMessage::user(NOTEBOOK_PLACEHOLDER)];
    let mut transcript = Transcript::new();
    transcript.push_turn(NOTEBOOK_PLACEHOLDER);
    progress(&transcript);

    for (index, cell) in notebook.cells.iter().enumerate() {
        let text = cell.source();
        if text.trim().is_empty() {
            tracing::debug!(cell = index, "skipping blank cell");
            continue;
        }

        let (role, body) = split_heading(text);
        match cell {
            Cell::Code(_) => {
                let (kind, code) = route_code(body);
                tracing::debug!(cell = index, %kind, "replaying code cell");

                transcript.append_replayed_code(REPLAY_LANGUAGE, body);
                progress(&transcript);

                let executor = session
                    .executor_mut(kind)
                    .map_err(|source| TranscodeError::Replay { cell: index, source })?;
                let steps = executor
                    .run(code)
                    .map_err(|source| TranscodeError::Replay { cell: index, source })?;

                let mut output = String::new();
                for step in steps {
                    if step.is_fault() {
                        tracing::warn!(
                            cell = index,
                            %kind,
                            fault = step.text().trim(),
                            "executor fault during replay"
                        );
                    }
                    output.push_str(step.text());
                    transcript.append_assistant(step.text());
                    progress(&transcript);
                }

                transcript.close_fence();
                messages.push(AgentMessage::code(REPLAY_LANGUAGE, body, output));
            }
            Cell::Markdown(_) | Cell::Raw(_) => {
                push_narration(&mut messages, role, body);
                match role {
                    Role::User => transcript.push_turn(body),
                    Role::Assistant => transcript.append_assistant(body),
                }
            }
        }

        progress(&transcript);
    }

    tracing::info!(
        cells = notebook.cells.len(),
        messages = messages.len(),
        "imported notebook"
    );
    session.extend(messages.iter().cloned());

    Ok(ImportOutcome {
        messages,
        transcript,
    })
}

/// Reads the notebook at `path`, resets `session`, and replays the notebook into it.
///
/// A notebook that cannot be read leaves the session untouched.
pub fn load_notebook(
    session: &mut Session,
    path: &Path,
    progress: &mut dyn FnMut(&Transcript),
) -> Result<ImportOutcome, TranscodeError> {
    let notebook = read_notebook(path)?;
    session.reset()?;
    tracing::info!(path = %path.display(), cells = notebook.cells.len(), "loading notebook");
    import_notebook(session, &notebook, progress)
}

// Assistant narration following an entry that has no narration yet (a replayed
// code block) is attached to that entry instead of starting a new one.
fn push_narration(messages: &mut Vec<AgentMessage>, role: Role, body: &str) {
    if role == Role::Assistant {
        if let Some(previous) = messages.last_mut() {
            if previous.role == Role::Assistant && previous.message.is_empty() {
                previous.message.push_str(body);
                return;
            }
        }
    }

    messages.push(AgentMessage::text(role, body));
}

#[cfg(test)]
mod tests {
    use agent_session::{AgentMessage, ExecutorKind, Role};

    use super::{push_narration, route_code};

    #[test]
    fn bang_prefix_routes_to_shell_without_the_bang() {
        assert_eq!(route_code("!ls -la"), (ExecutorKind::Shell, "ls -la"));
        assert_eq!(route_code("!!echo"), (ExecutorKind::Shell, "!echo"));
    }

    #[test]
    fn other_code_routes_to_python_unchanged() {
        assert_eq!(route_code("print(1)"), (ExecutorKind::Python, "print(1)"));
        assert_eq!(route_code(" !ls"), (ExecutorKind::Python, " !ls"));
    }

    #[test]
    fn assistant_narration_attaches_to_preceding_code_entry() {
        let mut messages = vec![AgentMessage::code("python", "print(1)", "1\n")];

        push_narration(&mut messages, Role::Assistant, "That printed one.");

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].message, "That printed one.");
    }

    #[test]
    fn narration_after_narrated_or_user_entries_starts_a_new_entry() {
        let mut messages = vec![AgentMessage::assistant("first")];
        push_narration(&mut messages, Role::Assistant, "second");
        push_narration(&mut messages, Role::User, "question");
        push_narration(&mut messages, Role::Assistant, "answer");

        assert_eq!(
            messages,
            vec![
                AgentMessage::assistant("first"),
                AgentMessage::assistant("second"),
                AgentMessage::user("question"),
                AgentMessage::assistant("answer"),
            ]
        );
    }

    #[test]
    fn user_narration_never_coalesces() {
        let mut messages = vec![AgentMessage::code("python", "x", "")];
        push_narration(&mut messages, Role::User, "next");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1], AgentMessage::user("next"));
    }
}
