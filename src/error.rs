use agent_session::ExecutorError;
use notebook_format::NotebookError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error(transparent)]
    Notebook(#[from] NotebookError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error("failed to replay code cell {cell}: {source}")]
    Replay {
        cell: usize,
        #[source]
        source: ExecutorError,
    },
}
