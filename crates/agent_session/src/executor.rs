use std::fmt;

use thiserror::Error;

use crate::event::ExecStep;

/// Kind of code an executor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExecutorKind {
    Shell,
    Python,
}

impl ExecutorKind {
    pub const ALL: [ExecutorKind; 2] = [ExecutorKind::Shell, ExecutorKind::Python];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shell => "shell",
            Self::Python => "python",
        }
    }
}

impl fmt::Display for ExecutorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("failed to start {kind} executor: {source}")]
    Spawn {
        kind: ExecutorKind,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while {operation} for {kind} executor: {source}")]
    Io {
        kind: ExecutorKind,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("no {kind} executor is available")]
    Unavailable { kind: ExecutorKind },
}

impl ExecutorError {
    #[must_use]
    pub fn spawn(kind: ExecutorKind, source: std::io::Error) -> Self {
        Self::Spawn { kind, source }
    }

    #[must_use]
    pub fn io(kind: ExecutorKind, operation: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            kind,
            operation,
            source,
        }
    }
}

/// Lazy, finite sequence of steps for one run.
pub type ExecSteps<'a> = Box<dyn Iterator<Item = ExecStep> + 'a>;

/// Stateful wrapper around something that runs code of one kind.
///
/// Runs are serial: the returned sequence borrows the executor mutably, so the
/// next run can only start once the previous sequence is dropped.
pub trait Executor: Send {
    fn kind(&self) -> ExecutorKind;

    /// Starts running `code` and returns its steps in the order they are produced.
    ///
    /// Failures while the code runs are reported as [`ExecStep::Fault`] steps.
    /// An `Err` means the run could not start at all.
    fn run(&mut self, code: &str) -> Result<ExecSteps<'_>, ExecutorError>;

    /// Returns true while the executor holds a live process.
    fn is_running(&self) -> bool;

    /// Releases the live process, if any. Safe to call repeatedly.
    fn terminate(&mut self);
}

/// Creates fresh executors for a session.
pub trait ExecutorFactory: Send {
    fn create(&self, kind: ExecutorKind) -> Result<Box<dyn Executor>, ExecutorError>;
}

#[cfg(test)]
mod tests {
    use super::{ExecutorError, ExecutorKind};

    #[test]
    fn executor_kind_displays_its_name() {
        assert_eq!(ExecutorKind::Shell.to_string(), "shell");
        assert_eq!(ExecutorKind::Python.to_string(), "python");
    }

    #[test]
    fn spawn_error_names_the_kind() {
        let error = ExecutorError::spawn(
            ExecutorKind::Python,
            std::io::Error::new(std::io::ErrorKind::NotFound, "python3 not found"),
        );
        assert_eq!(
            error.to_string(),
            "failed to start python executor: python3 not found"
        );
    }
}
