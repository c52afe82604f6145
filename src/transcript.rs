//! Rendered chat history: one user/assistant text pair per turn.
//!
//! Streamed chat events and notebook replays both render into the same
//! markdown conventions, so a front-end can display either without knowing
//! where the text came from.

use std::fmt;

use agent_session::{ChatEvent, Role};

use crate::headings::heading_for;

const FENCE_CLOSE: &str = "\n```\n";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptTurn {
    pub user: String,
    pub assistant: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<TranscriptTurn>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.turns
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Opens a turn for a message typed by the user. Empty input opens nothing.
    pub fn begin_turn(&mut self, user: &str) -> bool {
        if user.is_empty() {
            return false;
        }

        self.push_turn(user);
        true
    }

    pub(crate) fn push_turn(&mut self, user: &str) {
        self.turns.push(TranscriptTurn {
            user: user.to_string(),
            assistant: String::new(),
        });
    }

    /// Appends to the assistant side of the last turn.
    pub fn append_assistant(&mut self, text: &str) {
        if self.turns.is_empty() {
            self.push_turn("");
        }

        if let Some(turn) = self.turns.last_mut() {
            turn.assistant.push_str(text);
        }
    }

    /// Folds one streamed event into the last turn.
    pub fn apply(&mut self, event: &ChatEvent) {
        match event {
            ChatEvent::Message(text) | ChatEvent::Code(text) | ChatEvent::Output(text) => {
                self.append_assistant(text);
            }
            ChatEvent::Language(language) => self.open_fence(language),
            ChatEvent::EndOfCode | ChatEvent::Executing | ChatEvent::EndOfExecution => {
                self.close_fence();
            }
        }
    }

    /// Consumes a reply stream, reporting the transcript after every event.
    pub fn stream_reply<I>(&mut self, events: I, progress: &mut dyn FnMut(&Transcript))
    where
        I: IntoIterator<Item = ChatEvent>,
    {
        for event in events {
            self.apply(&event);
            progress(self);
        }
    }

    /// Appends a finished code block followed by an opened output block.
    pub(crate) fn append_replayed_code(&mut self, language: &str, code: &str) {
        self.open_fence(language);
        self.append_assistant(code);
        self.close_fence();
        self.close_fence();
    }

    pub(crate) fn open_fence(&mut self, language: &str) {
        self.append_assistant(&format!("\n```{language}\n"));
    }

    pub(crate) fn close_fence(&mut self) {
        self.append_assistant(FENCE_CLOSE);
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, turn) in self.turns.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}{}\n\n", heading_for(Role::User), turn.user)?;
            write!(f, "{}{}\n", heading_for(Role::Assistant), turn.assistant)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use agent_session::ChatEvent;
    use pretty_assertions::assert_eq;

    use super::{Transcript, TranscriptTurn};

    #[test]
    fn empty_user_input_opens_no_turn() {
        let mut transcript = Transcript::new();
        assert!(!transcript.begin_turn(""));
        assert!(transcript.is_empty());
        assert!(transcript.begin_turn("hi"));
        assert_eq!(transcript.turns().len(), 1);
    }

    #[test]
    fn streamed_reply_renders_code_and_output_blocks() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("count to two");

        let mut updates = 0;
        transcript.stream_reply(
            vec![
                ChatEvent::Message("Sure.".to_string()),
                ChatEvent::Language("python".to_string()),
                ChatEvent::Code("for i in range(2):".to_string()),
                ChatEvent::Code(" print(i)".to_string()),
                ChatEvent::EndOfCode,
                ChatEvent::Executing,
                ChatEvent::Output("0\n".to_string()),
                ChatEvent::Output("1\n".to_string()),
                ChatEvent::EndOfExecution,
                ChatEvent::Message("Done.".to_string()),
            ],
            &mut |_| updates += 1,
        );

        assert_eq!(updates, 10);
        assert_eq!(
            transcript.turns(),
            &[TranscriptTurn {
                user: "count to two".to_string(),
                assistant: "Sure.\n```python\nfor i in range(2): print(i)\n```\n\n```\n0\n1\n\n```\nDone."
                    .to_string(),
            }]
        );
    }

    #[test]
    fn events_without_an_open_turn_create_an_anonymous_one() {
        let mut transcript = Transcript::new();
        transcript.apply(&ChatEvent::Message("hello".to_string()));

        assert_eq!(
            transcript.turns(),
            &[TranscriptTurn {
                user: String::new(),
                assistant: "hello".to_string(),
            }]
        );
    }

    #[test]
    fn display_renders_turns_with_role_headings() {
        let mut transcript = Transcript::new();
        transcript.begin_turn("hi");
        transcript.append_assistant("hello");
        transcript.begin_turn("bye");

        assert_eq!(
            transcript.to_string(),
            "##### User:\nhi\n\n##### Assistant:\nhello\n\n##### User:\nbye\n\n##### Assistant:\n\n"
        );
    }
}
