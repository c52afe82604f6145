use std::fmt;

use serde::{Deserialize, Serialize};

/// Speaker of one log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the interpreter conversation log.
///
/// An entry carries either narrative text in `message` or a code triple
/// (`language`, `code`, `output`). The shape does not forbid both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessage {
    pub role: Role,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl AgentMessage {
    /// Narrative user entry.
    #[must_use]
    pub fn user(message: impl Into<String>) -> Self {
        Self::text(Role::User, message)
    }

    /// Narrative assistant entry.
    #[must_use]
    pub fn assistant(message: impl Into<String>) -> Self {
        Self::text(Role::Assistant, message)
    }

    #[must_use]
    pub fn text(role: Role, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            language: None,
            code: None,
            output: None,
        }
    }

    /// Assistant entry recording one executed block and its captured output.
    #[must_use]
    pub fn code(
        language: impl Into<String>,
        code: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            message: String::new(),
            language: Some(language.into()),
            code: Some(code.into()),
            output: Some(output.into()),
        }
    }

    #[must_use]
    pub fn has_code(&self) -> bool {
        self.code.is_some()
    }
}
