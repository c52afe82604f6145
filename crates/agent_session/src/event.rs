/// Incremental event streamed by the interpreter while it answers one user message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    Message(String),
    Language(String),
    Code(String),
    EndOfCode,
    Executing,
    Output(String),
    EndOfExecution,
}

/// One record yielded by an executor while running a block of code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecStep {
    /// Text the code printed.
    Output(String),
    /// Executor-level failure (timeout, process exit) rendered as text.
    Fault(String),
}

impl ExecStep {
    /// Text this step contributes to the accumulated output of a run.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Output(text) | Self::Fault(text) => text,
        }
    }

    #[must_use]
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}
